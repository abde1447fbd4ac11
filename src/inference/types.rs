//! Wire types for the remote generation API.
//!
//! These mirror the Gemini `generateContent` REST schema, used for both
//! request building and response parsing, plus the conversions from the
//! context core's model types onto the wire.

use serde::{Deserialize, Serialize};

use crate::context::types::{
    ContextConfig, ConversationTurn, Fragment, GroundingMode, ToolDefinition, TurnRole,
    UploadedFile,
};
#[cfg(test)]
use crate::context::types::now_timestamp;

// ─── Request Types ──────────────────────────────────────────────────────────

/// Base64-encoded inline file data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// One part of a content entry: text, inline data, or a function call.
/// Exactly one field is set; the others are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Self::default()
        }
    }
}

/// A role-attributed sequence of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// A function declaration sent with the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the parameters object.
    pub parameters: serde_json::Value,
}

/// Marker enabling web-search grounding. Serializes to `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleSearch {}

/// The request's tool configuration: function declarations or web-search
/// grounding, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_declarations: Option<Vec<FunctionDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

/// Request body for `POST /models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<RequestTool>>,
}

// ─── Response Types ─────────────────────────────────────────────────────────

/// Token accounting reported with each response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageMetadata {
    pub prompt_token_count: u64,
    pub candidates_token_count: u64,
    pub total_token_count: u64,
}

/// A web source cited by grounded generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

/// One grounding citation chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

/// Grounding citations attached to a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingMetadata {
    pub web_search_queries: Option<Vec<String>>,
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

/// One response candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Response body of `generateContent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// The first candidate's parts, if any.
    pub fn first_candidate_parts(&self) -> Option<&[Part]> {
        self.candidates
            .as_deref()?
            .first()?
            .content
            .as_ref()
            .map(|c| c.parts.as_slice())
    }
}

// ─── Model → Wire Conversions ───────────────────────────────────────────────

/// Wire role for a turn author.
fn wire_role(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Agent => "model",
    }
}

/// A prior turn as wire content: role and fragments only. UI metadata
/// (attached file display names, function-call records) is stripped.
pub fn content_from_turn(turn: &ConversationTurn) -> Content {
    let parts = turn
        .content
        .iter()
        .map(|f| match f {
            Fragment::Text { text } => Part::text(text.clone()),
            Fragment::InlineFile { mime_type, data } => {
                Part::inline(mime_type.clone(), data.clone())
            }
        })
        .collect();
    Content {
        role: wire_role(turn.role).to_string(),
        parts,
    }
}

/// The new user content for a send: staged file parts in upload order,
/// then the text part.
pub fn user_content(text: &str, staged_files: &[UploadedFile]) -> Content {
    let mut parts: Vec<Part> = staged_files
        .iter()
        .map(|f| Part::inline(f.mime_type.clone(), f.data.clone()))
        .collect();
    parts.push(Part::text(text));
    Content {
        role: "user".to_string(),
        parts,
    }
}

/// Build the wire function declaration for a tool definition.
pub fn function_declaration(tool: &ToolDefinition) -> FunctionDeclaration {
    let mut properties = serde_json::Map::new();
    for p in &tool.parameters {
        let mut schema = serde_json::Map::new();
        schema.insert(
            "type".to_string(),
            serde_json::Value::String(p.spec.param_type.schema_name().to_string()),
        );
        schema.insert(
            "description".to_string(),
            serde_json::Value::String(p.spec.description.clone()),
        );
        if let Some(values) = &p.spec.enum_values {
            schema.insert(
                "enum".to_string(),
                serde_json::Value::Array(
                    values
                        .iter()
                        .map(|v| serde_json::Value::String(v.clone()))
                        .collect(),
                ),
            );
        }
        properties.insert(p.name.clone(), serde_json::Value::Object(schema));
    }

    FunctionDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: serde_json::json!({
            "type": "OBJECT",
            "properties": properties,
            "required": tool.required,
        }),
    }
}

/// The request tool configuration implied by a context: function
/// declarations when tools exist, web-search grounding when enabled,
/// otherwise nothing. Never both.
pub fn request_tools(config: &ContextConfig) -> Option<Vec<RequestTool>> {
    if !config.tools.is_empty() {
        Some(vec![RequestTool {
            function_declarations: Some(
                config.tools.iter().map(function_declaration).collect(),
            ),
            google_search: None,
        }])
    } else if config.grounding_mode == GroundingMode::WebSearch {
        Some(vec![RequestTool {
            function_declarations: None,
            google_search: Some(GoogleSearch {}),
        }])
    } else {
        None
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
