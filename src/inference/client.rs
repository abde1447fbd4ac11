//! Remote generation client.
//!
//! Assembles `generateContent` requests from the context configuration and
//! conversation history, and sends them to the Gemini REST endpoint. The
//! underlying HTTP client and API credential are resolved lazily on the
//! first call and cached for the rest of the session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client as HttpClient;

use super::errors::InferenceError;
use super::types::{
    content_from_turn, request_tools, user_content, Content, GenerateContentRequest,
    GenerateContentResponse, Part, UsageMetadata,
};
use crate::context::types::{
    now_timestamp, ContextConfig, ConversationTurn, Fragment, FunctionCallRecord, TurnRole,
    UploadedFile,
};

// ─── Constants ──────────────────────────────────────────────────────────────

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Base URL of the generation API.
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for both chat turns and analysis calls.
const MODEL: &str = "gemini-2.5-flash";

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout. Generation over large PDF payloads can take a
/// while; the transport timeout is the only one enforced.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shown when a response carries no content parts at all.
const NO_CONTENT_PLACEHOLDER: &str = "No content found.";

// ─── Request Building ───────────────────────────────────────────────────────

/// Assemble the outbound request for one send.
///
/// The content history is the prior turns (role and fragments only — UI
/// metadata stripped) followed by a new user entry of the staged file
/// parts in upload order and then the text part. The system instruction is
/// applied when non-empty; exactly one of function declarations or
/// web-search grounding is attached, never both.
pub fn build_request(
    user_text: &str,
    staged_files: &[UploadedFile],
    config: &ContextConfig,
    prior_turns: &[ConversationTurn],
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = prior_turns.iter().map(content_from_turn).collect();
    contents.push(user_content(user_text, staged_files));

    let system_instruction = if config.system_instruction.is_empty() {
        None
    } else {
        Some(Content {
            role: "user".to_string(),
            parts: vec![Part::text(config.system_instruction.clone())],
        })
    };

    GenerateContentRequest {
        contents,
        system_instruction,
        tools: request_tools(config),
    }
}

/// Convert a response into the agent turn to append.
///
/// Text and inline-data parts become fragments; function-call parts become
/// function-call records. A response with no content parts at all yields a
/// single placeholder text fragment.
pub fn turn_from_response(response: &GenerateContentResponse) -> ConversationTurn {
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut calls: Vec<FunctionCallRecord> = Vec::new();

    match response.first_candidate_parts() {
        Some(parts) => {
            for part in parts {
                if let Some(text) = &part.text {
                    fragments.push(Fragment::text(text.clone()));
                }
                if let Some(blob) = &part.inline_data {
                    fragments.push(Fragment::InlineFile {
                        mime_type: blob.mime_type.clone(),
                        data: blob.data.clone(),
                    });
                }
                if let Some(call) = &part.function_call {
                    calls.push(FunctionCallRecord {
                        name: call.name.clone(),
                        arguments: call.args.clone(),
                    });
                }
            }
        }
        None => fragments.push(Fragment::text(NO_CONTENT_PLACEHOLDER)),
    }

    ConversationTurn {
        role: TurnRole::Agent,
        timestamp: now_timestamp(),
        content: fragments,
        attached_file_names: None,
        function_calls: if calls.is_empty() { None } else { Some(calls) },
    }
}

// ─── AgentClient ────────────────────────────────────────────────────────────

/// Result of a successful send.
#[derive(Debug)]
pub struct SendOutcome {
    /// The agent turn to append to the conversation.
    pub turn: ConversationTurn,
    /// Token usage reported by the API, when present.
    pub usage: Option<UsageMetadata>,
    /// The raw response body, kept for the inspector panel.
    pub raw: serde_json::Value,
}

/// Cached connection state: HTTP client plus credential.
struct ClientInner {
    http: HttpClient,
    api_key: String,
}

/// Client for the remote generation API.
///
/// Cheap to clone; all clones share the lazily initialized connection
/// state.
#[derive(Clone)]
pub struct AgentClient {
    inner: Arc<Mutex<Option<Arc<ClientInner>>>>,
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// The cached connection state, initialized on first use.
    ///
    /// A missing credential fails here — and on every subsequent call
    /// until the variable is set and the app restarted.
    fn handle(&self) -> Result<Arc<ClientInner>, InferenceError> {
        let mut guard = self.inner.lock().expect("client lock poisoned");
        if let Some(inner) = guard.as_ref() {
            return Ok(Arc::clone(inner));
        }

        let api_key = read_credential(API_KEY_VAR)?;
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InferenceError::ConnectionFailed {
                endpoint: API_BASE_URL.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        tracing::info!(model = MODEL, "generation client initialized");
        let inner = Arc::new(ClientInner { http, api_key });
        *guard = Some(Arc::clone(&inner));
        Ok(inner)
    }

    /// Send one user turn and return the resulting agent turn.
    pub async fn send_turn(
        &self,
        user_text: &str,
        staged_files: &[UploadedFile],
        config: &ContextConfig,
        prior_turns: &[ConversationTurn],
    ) -> Result<SendOutcome, InferenceError> {
        let request = build_request(user_text, staged_files, config, prior_turns);

        tracing::info!(
            history = request.contents.len(),
            has_system_instruction = request.system_instruction.is_some(),
            has_tools = request.tools.is_some(),
            staged_files = staged_files.len(),
            "sending generation request"
        );

        let raw = self.generate(&request).await?;
        let response: GenerateContentResponse = serde_json::from_value(raw.clone())
            .map_err(|e| InferenceError::InvalidResponse {
                reason: e.to_string(),
            })?;

        Ok(SendOutcome {
            turn: turn_from_response(&response),
            usage: response.usage_metadata,
            raw,
        })
    }

    /// Send a raw request and return the decoded JSON body.
    pub async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<serde_json::Value, InferenceError> {
        let inner = self.handle()?;
        let url = format!("{API_BASE_URL}/models/{MODEL}:generateContent");

        let response = inner
            .http
            .post(&url)
            .header("x-goog-api-key", &inner.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout {
                        duration_secs: REQUEST_TIMEOUT.as_secs(),
                    }
                } else {
                    InferenceError::ConnectionFailed {
                        endpoint: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| InferenceError::InvalidResponse {
                reason: e.to_string(),
            })
    }
}

/// Read the API credential from the environment.
fn read_credential(var: &str) -> Result<String, InferenceError> {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(InferenceError::MissingCredential {
            var: var.to_string(),
        }),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::types::GroundingMode;

    fn base_config() -> ContextConfig {
        ContextConfig {
            system_instruction: "Be terse.".to_string(),
            tools: Vec::new(),
            grounding_mode: GroundingMode::None,
            attached_files: Vec::new(),
        }
    }

    fn pdf(name: &str, data: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn build_request_appends_new_user_turn() {
        let mut prior = Vec::new();
        prior.push(ConversationTurn {
            role: TurnRole::User,
            timestamp: now_timestamp(),
            content: vec![Fragment::text("earlier question")],
            attached_file_names: Some(vec!["ignored.pdf".to_string()]),
            function_calls: None,
        });
        prior.push(ConversationTurn {
            role: TurnRole::Agent,
            timestamp: now_timestamp(),
            content: vec![Fragment::text("earlier answer")],
            attached_file_names: None,
            function_calls: None,
        });

        let request = build_request("new question", &[], &base_config(), &prior);

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[1].role, "model");
        assert_eq!(
            request.contents[2].parts[0].text.as_deref(),
            Some("new question")
        );
        // UI metadata never reaches the wire.
        let json = serde_json::to_string(&request.contents).unwrap();
        assert!(!json.contains("ignored.pdf"));
    }

    #[test]
    fn build_request_staged_files_precede_text() {
        let files = vec![pdf("a.pdf", "QQ=="), pdf("b.pdf", "Qg==")];
        let request = build_request("compare", &files, &base_config(), &[]);

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].inline_data.as_ref().unwrap().data, "QQ==");
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, "Qg==");
        assert_eq!(parts[2].text.as_deref(), Some("compare"));
    }

    #[test]
    fn build_request_omits_empty_system_instruction() {
        let mut config = base_config();
        config.system_instruction = String::new();
        let request = build_request("hi", &[], &config, &[]);
        assert!(request.system_instruction.is_none());

        let request = build_request("hi", &[], &base_config(), &[]);
        let instruction = request.system_instruction.unwrap();
        assert_eq!(instruction.parts[0].text.as_deref(), Some("Be terse."));
    }

    #[test]
    fn build_request_never_sends_both_tool_kinds() {
        let mut config = base_config();
        config.tools = vec![ToolDefinitionFixture::weather()];
        let request = build_request("hi", &[], &config, &[]);
        let tools = request.tools.unwrap();
        assert!(tools[0].function_declarations.is_some());
        assert!(tools[0].google_search.is_none());

        let mut config = base_config();
        config.grounding_mode = GroundingMode::WebSearch;
        let request = build_request("hi", &[], &config, &[]);
        let tools = request.tools.unwrap();
        assert!(tools[0].function_declarations.is_none());
        assert!(tools[0].google_search.is_some());

        let request = build_request("hi", &[], &base_config(), &[]);
        assert!(request.tools.is_none());
    }

    #[test]
    fn turn_from_response_with_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"hello"}]}}]}"#,
        )
        .unwrap();
        let turn = turn_from_response(&response);
        assert_eq!(turn.role, TurnRole::Agent);
        assert_eq!(turn.joined_text(), "hello");
        assert!(turn.function_calls.is_none());
    }

    #[test]
    fn turn_from_response_collects_function_calls() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[
                {"functionCall":{"name":"get_weather","args":{"location":"Rome"}}}
            ]}}]}"#,
        )
        .unwrap();
        let turn = turn_from_response(&response);
        assert!(turn.content.is_empty());
        assert!(!turn.has_text());
        let calls = turn.function_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].arguments["location"], "Rome");
    }

    #[test]
    fn turn_from_empty_response_uses_placeholder() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let turn = turn_from_response(&response);
        assert_eq!(turn.joined_text(), NO_CONTENT_PLACEHOLDER);
    }

    #[test]
    fn missing_credential_is_descriptive() {
        let err = read_credential("CONTEXT_STUDIO_TEST_UNSET_VAR").unwrap_err();
        assert!(matches!(err, InferenceError::MissingCredential { .. }));
        assert!(err.user_message().contains("CONTEXT_STUDIO_TEST_UNSET_VAR"));
    }

    // Small fixture helper kept out of the templates module so these tests
    // exercise hand-built definitions too.
    struct ToolDefinitionFixture;

    impl ToolDefinitionFixture {
        fn weather() -> crate::context::types::ToolDefinition {
            use crate::context::types::{Parameter, ParameterSpec, ToolDefinition};
            ToolDefinition {
                name: "get_weather".to_string(),
                description: "Weather lookup".to_string(),
                parameters: vec![Parameter {
                    name: "location".to_string(),
                    spec: ParameterSpec::string(),
                }],
                required: vec!["location".to_string()],
            }
        }
    }
}
