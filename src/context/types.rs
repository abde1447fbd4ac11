//! Shared types for the context core.
//!
//! The agent's configurable context (system instruction, tools, grounding,
//! uploaded documents) and the conversation turn model used across the
//! state coordinator, the agent client, and persistence.

use serde::{Deserialize, Serialize};

// ─── Tool Definitions ───────────────────────────────────────────────────────

/// The value type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
}

impl ParamType {
    /// Wire representation used in function-declaration schemas.
    pub fn schema_name(&self) -> &'static str {
        match self {
            ParamType::String => "STRING",
            ParamType::Number => "NUMBER",
            ParamType::Integer => "INTEGER",
            ParamType::Boolean => "BOOLEAN",
        }
    }

    /// Parse from the lowercase form used by the frontend.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ParamType::String),
            "number" => Some(ParamType::Number),
            "integer" => Some(ParamType::Integer),
            "boolean" => Some(ParamType::Boolean),
            _ => None,
        }
    }
}

/// Specification of a single tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    /// Value type. Enum constraints are only valid for `string`.
    pub param_type: ParamType,
    /// Human-readable description shown to the model.
    pub description: String,
    /// Allowed values, when this string parameter is enum-constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ParameterSpec {
    /// A fresh string parameter with an empty description.
    pub fn string() -> Self {
        Self {
            param_type: ParamType::String,
            description: String::new(),
            enum_values: None,
        }
    }
}

/// A named parameter entry in a tool definition.
///
/// Parameters are kept as an ordered list of (name, spec) entries rather
/// than a map, so renames are a single replace-in-place and reorders are
/// pure permutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub spec: ParameterSpec,
}

/// A function-calling tool the agent may request to invoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique within the tool set.
    pub name: String,
    pub description: String,
    /// Ordered parameter list; names unique.
    pub parameters: Vec<Parameter>,
    /// Names of required parameters; every entry exists in `parameters`.
    pub required: Vec<String>,
}

impl ToolDefinition {
    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.spec)
    }

    /// Whether the named parameter exists.
    pub fn has_param(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
}

// ─── Context Configuration ──────────────────────────────────────────────────

/// How the agent is grounded in external context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroundingMode {
    /// No external grounding; the model relies on trained knowledge.
    None,
    /// Live web search. Mutually exclusive with tools and uploaded files.
    WebSearch,
    /// Uploaded documents accompany the next message.
    Document,
}

impl GroundingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroundingMode::None => "none",
            GroundingMode::WebSearch => "web-search",
            GroundingMode::Document => "document",
        }
    }
}

/// A document staged for the next message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Unique within the staged set; re-uploading a name replaces the entry.
    pub name: String,
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

/// The full configurable context for the agent.
///
/// Invariant: `grounding_mode == WebSearch` implies `tools` and
/// `attached_files` are both empty. All mutation goes through
/// [`crate::context::state::ContextState`], which enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    pub system_instruction: String,
    /// Ordered tool list; names unique.
    pub tools: Vec<ToolDefinition>,
    pub grounding_mode: GroundingMode,
    /// Ordered staged files; names unique.
    pub attached_files: Vec<UploadedFile>,
}

impl ContextConfig {
    /// Whether the named tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }
}

// ─── Conversation Turns ─────────────────────────────────────────────────────

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Agent,
}

/// One piece of a turn's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fragment {
    #[serde(rename_all = "camelCase")]
    Text { text: String },
    #[serde(rename_all = "camelCase")]
    InlineFile { mime_type: String, data: String },
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text { text: text.into() }
    }

    /// The text content, if this is a text fragment.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fragment::Text { text } => Some(text),
            Fragment::InlineFile { .. } => None,
        }
    }
}

/// A function call the model requested in an agent turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallRecord {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// ISO 8601 timestamp for a freshly created turn.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// One message in the conversation.
///
/// Turns are append-only: never mutated or deleted individually, only
/// cleared as a whole or replaced wholesale by a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub role: TurnRole,
    /// ISO 8601 creation time.
    pub timestamp: String,
    /// Ordered content fragments. For user turns: staged file fragments in
    /// upload order, then the text fragment.
    pub content: Vec<Fragment>,
    /// Display names of files attached to this turn (UI metadata; stripped
    /// from outbound requests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_file_names: Option<Vec<String>>,
    /// Function calls the model requested in this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_calls: Option<Vec<FunctionCallRecord>>,
}

impl ConversationTurn {
    /// Whether this turn carries at least one text fragment.
    pub fn has_text(&self) -> bool {
        self.content.iter().any(|f| f.as_text().is_some())
    }

    /// All text fragments joined with newlines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(Fragment::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_type_schema_names() {
        assert_eq!(ParamType::String.schema_name(), "STRING");
        assert_eq!(ParamType::Integer.schema_name(), "INTEGER");
    }

    #[test]
    fn param_type_parse_roundtrip() {
        for (s, t) in [
            ("string", ParamType::String),
            ("number", ParamType::Number),
            ("integer", ParamType::Integer),
            ("boolean", ParamType::Boolean),
        ] {
            assert_eq!(ParamType::parse(s), Some(t));
        }
        assert_eq!(ParamType::parse("object"), None);
    }

    #[test]
    fn grounding_mode_serde_kebab_case() {
        let json = serde_json::to_string(&GroundingMode::WebSearch).unwrap();
        assert_eq!(json, r#""web-search""#);
        let back: GroundingMode = serde_json::from_str(r#""document""#).unwrap();
        assert_eq!(back, GroundingMode::Document);
    }

    #[test]
    fn fragment_serde_shape() {
        let text = Fragment::text("hello");
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(json, r#"{"kind":"text","text":"hello"}"#);

        let file = Fragment::InlineFile {
            mime_type: "application/pdf".to_string(),
            data: "AAAA".to_string(),
        };
        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains(r#""kind":"inlineFile""#));
        assert!(json.contains(r#""mimeType":"application/pdf""#));
    }

    #[test]
    fn turn_serde_camel_case() {
        let turn = ConversationTurn {
            role: TurnRole::User,
            timestamp: now_timestamp(),
            content: vec![Fragment::text("hi")],
            attached_file_names: Some(vec!["a.pdf".to_string()]),
            function_calls: None,
        };
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains("attachedFileNames"));
        // Skipped when None
        assert!(!json.contains("functionCalls"));
    }

    #[test]
    fn turn_text_helpers() {
        let turn = ConversationTurn {
            role: TurnRole::Agent,
            timestamp: now_timestamp(),
            content: vec![
                Fragment::InlineFile {
                    mime_type: "application/pdf".to_string(),
                    data: String::new(),
                },
                Fragment::text("first"),
                Fragment::text("second"),
            ],
            attached_file_names: None,
            function_calls: None,
        };
        assert!(turn.has_text());
        assert_eq!(turn.joined_text(), "first\nsecond");

        let no_text = ConversationTurn {
            role: TurnRole::Agent,
            timestamp: now_timestamp(),
            content: vec![Fragment::InlineFile {
                mime_type: "application/pdf".to_string(),
                data: String::new(),
            }],
            attached_file_names: None,
            function_calls: None,
        };
        assert!(!no_text.has_text());
    }

    #[test]
    fn tool_definition_lookup() {
        let tool = ToolDefinition {
            name: "get_weather".to_string(),
            description: "Weather lookup".to_string(),
            parameters: vec![Parameter {
                name: "location".to_string(),
                spec: ParameterSpec::string(),
            }],
            required: vec!["location".to_string()],
        };
        assert!(tool.has_param("location"));
        assert!(!tool.has_param("unit"));
        assert_eq!(tool.param("location").unwrap().param_type, ParamType::String);
    }
}
