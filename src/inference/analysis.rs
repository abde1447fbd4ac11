//! Automatic critique of the agent's latest response.
//!
//! After a send whose agent turn contains text, a second independent call
//! to the same generation API reviews the exchange: did the configured
//! context (system instruction, tools) help or hurt, and what should
//! change. Runs concurrently with user input; see `commands::chat` for the
//! staleness handling.

use super::client::AgentClient;
use super::errors::InferenceError;
use super::types::{Content, GenerateContentRequest, Part};

/// Build the fixed analysis prompt embedding both sides of the exchange.
pub fn analysis_prompt(user_prompt: &str, agent_text: &str) -> String {
    format!(
        "You are an expert AI agent analyst. Your task is to review a conversation and \
provide a critical analysis of the AI agent's last response.\n\
Focus on how the agent's pre-configured context (system instruction, tools) may have \
influenced its behavior.\n\
\n\
CONVERSATION:\n\
User: \"{user_prompt}\"\n\
Agent: \"{agent_text}\"\n\
\n\
Please provide a concise analysis in markdown format, covering:\n\
1.  **Clarity & Relevance:** Did the agent directly and clearly address the user's prompt?\n\
2.  **Reasoning Quality:** Are there any logical leaps, factual inaccuracies, or \
unsupported assumptions?\n\
3.  **Contextual Improvement:** Based on this single turn, suggest specific improvements \
to the agent's system instruction or tool definitions that could lead to a better \
response in the future."
    )
}

/// Critique the latest exchange.
///
/// The analysis call carries no system instruction and no tools — it is a
/// plain one-shot prompt against the same model.
pub async fn analyze(
    client: &AgentClient,
    user_prompt: &str,
    agent_text: &str,
) -> Result<String, InferenceError> {
    let request = GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![Part::text(analysis_prompt(user_prompt, agent_text))],
        }],
        system_instruction: None,
        tools: None,
    };

    let raw = client.generate(&request).await?;
    let response: super::types::GenerateContentResponse = serde_json::from_value(raw)
        .map_err(|e| InferenceError::InvalidResponse {
            reason: e.to_string(),
        })?;

    let critique = response
        .first_candidate_parts()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    Ok(critique)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_both_sides() {
        let prompt = analysis_prompt("What is Rust?", "A systems language.");
        assert!(prompt.contains("User: \"What is Rust?\""));
        assert!(prompt.contains("Agent: \"A systems language.\""));
    }

    #[test]
    fn prompt_lists_the_three_criteria() {
        let prompt = analysis_prompt("q", "a");
        assert!(prompt.contains("Clarity & Relevance"));
        assert!(prompt.contains("Reasoning Quality"));
        assert!(prompt.contains("Contextual Improvement"));
    }

    #[test]
    fn prompt_has_no_trailing_whitespace_padding() {
        let prompt = analysis_prompt("q", "a");
        assert_eq!(prompt, prompt.trim());
    }
}
