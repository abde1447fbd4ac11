//! Static template data: system-instruction presets, ready-made tool
//! definitions, and the guided-tour step content served to the frontend.

use serde::Serialize;

use super::types::{ParamType, Parameter, ParameterSpec, ToolDefinition};

// ─── Instruction Templates ──────────────────────────────────────────────────

/// A named system-instruction preset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionTemplate {
    pub name: String,
    pub prompt: String,
}

/// The built-in system-instruction presets.
pub fn instruction_templates() -> Vec<InstructionTemplate> {
    let presets: [(&str, &str); 4] = [
        (
            "Customer Support Bot",
            "You are a friendly and patient customer support agent. Your goal is to \
             resolve user issues efficiently. Be empathetic, clear, and concise in your \
             communication. If you cannot resolve an issue, explain why and escalate the \
             request to a human agent.",
        ),
        (
            "Creative Writer",
            "You are a world-renowned creative writer, skilled in a range of styles and \
             genres. Your responses should be imaginative, evocative, and well structured. \
             Adapt your writing style to the user's request, whether it is poetry, a short \
             story, or a screenplay.",
        ),
        (
            "Code Assistant",
            "You are an expert programmer and code assistant. Provide clean, efficient, \
             well-commented code in the requested language. Explain your code clearly, \
             outlining the logic and any trade-offs. If a user's request is ambiguous, ask \
             for clarification. Prioritize best practices and security.",
        ),
        (
            "Sarcastic Assistant",
            "You are a sarcastic, begrudgingly helpful assistant. Your responses should be \
             laced with wit and a general sense of being unimpressed. You will still answer \
             the user's questions correctly, but with a heavy sigh and an eye-roll that \
             comes through in the text.",
        ),
    ];

    presets
        .into_iter()
        .map(|(name, prompt)| InstructionTemplate {
            name: name.to_string(),
            prompt: prompt.to_string(),
        })
        .collect()
}

/// Look up an instruction template by name.
pub fn find_instruction_template(name: &str) -> Option<InstructionTemplate> {
    instruction_templates().into_iter().find(|t| t.name == name)
}

// ─── Tool Templates ─────────────────────────────────────────────────────────

/// A named ready-made tool definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolTemplate {
    /// Display name in the template picker.
    pub name: String,
    pub tool: ToolDefinition,
}

fn param(name: &str, param_type: ParamType, description: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        spec: ParameterSpec {
            param_type,
            description: description.to_string(),
            enum_values: None,
        },
    }
}

fn enum_param(name: &str, description: &str, values: &[&str]) -> Parameter {
    Parameter {
        name: name.to_string(),
        spec: ParameterSpec {
            param_type: ParamType::String,
            description: description.to_string(),
            enum_values: Some(values.iter().map(|v| v.to_string()).collect()),
        },
    }
}

fn required(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The built-in tool templates.
pub fn tool_templates() -> Vec<ToolTemplate> {
    vec![
        ToolTemplate {
            name: "Get Weather".to_string(),
            tool: ToolDefinition {
                name: "get_weather".to_string(),
                description: "Gets the current weather for a given location.".to_string(),
                parameters: vec![param(
                    "location",
                    ParamType::String,
                    "The city and state, e.g., San Francisco, CA",
                )],
                required: required(&["location"]),
            },
        },
        ToolTemplate {
            name: "E-commerce Product Search".to_string(),
            tool: ToolDefinition {
                name: "search_products".to_string(),
                description:
                    "Searches products in an e-commerce catalog by query and filters."
                        .to_string(),
                parameters: vec![
                    param(
                        "query",
                        ParamType::String,
                        "The product search query, e.g., \"running shoes\".",
                    ),
                    param(
                        "category",
                        ParamType::String,
                        "The product category to filter by, e.g., \"Apparel\".",
                    ),
                    param(
                        "min_price",
                        ParamType::Number,
                        "The minimum price of products to return.",
                    ),
                    param(
                        "max_price",
                        ParamType::Number,
                        "The maximum price of products to return.",
                    ),
                ],
                required: required(&["query"]),
            },
        },
        ToolTemplate {
            name: "Send Email".to_string(),
            tool: ToolDefinition {
                name: "send_email".to_string(),
                description: "Sends an email to a specified recipient.".to_string(),
                parameters: vec![
                    param(
                        "recipient",
                        ParamType::String,
                        "The recipient's email address.",
                    ),
                    param("subject", ParamType::String, "The email subject line."),
                    param("body", ParamType::String, "The email body content."),
                ],
                required: required(&["recipient", "subject", "body"]),
            },
        },
        ToolTemplate {
            name: "Manage Bookings".to_string(),
            tool: ToolDefinition {
                name: "manage_booking".to_string(),
                description:
                    "Manages customer bookings, such as cancelling or rescheduling \
                     appointments."
                        .to_string(),
                parameters: vec![
                    param(
                        "booking_id",
                        ParamType::String,
                        "The unique ID of the booking to manage.",
                    ),
                    enum_param(
                        "action",
                        "The action to perform on the booking.",
                        &["cancel", "reschedule"],
                    ),
                    param(
                        "new_date_time",
                        ParamType::String,
                        "The new date and time for rescheduling, in ISO 8601 format. \
                         Only required for the \"reschedule\" action.",
                    ),
                ],
                required: required(&["booking_id", "action"]),
            },
        },
        ToolTemplate {
            name: "Get Latest News".to_string(),
            tool: ToolDefinition {
                name: "get_latest_news".to_string(),
                description: "Fetches the latest news headlines on a given topic."
                    .to_string(),
                parameters: vec![
                    param(
                        "topic",
                        ParamType::String,
                        "The topic to search news for, e.g., \"technology\", \"sports\".",
                    ),
                    enum_param(
                        "language",
                        "The news language, e.g., \"en\" for English, \"it\" for Italian.",
                        &["it", "en", "es", "fr", "de"],
                    ),
                ],
                required: required(&["topic"]),
            },
        },
        ToolTemplate {
            name: "Create Calendar Event".to_string(),
            tool: ToolDefinition {
                name: "create_calendar_event".to_string(),
                description: "Creates a new event in the user's calendar.".to_string(),
                parameters: vec![
                    param("title", ParamType::String, "The event title."),
                    param(
                        "start_time",
                        ParamType::String,
                        "The event start time in ISO 8601 format.",
                    ),
                    param(
                        "end_time",
                        ParamType::String,
                        "The event end time in ISO 8601 format.",
                    ),
                    param(
                        "attendees",
                        ParamType::String,
                        "A comma-separated list of attendee email addresses.",
                    ),
                    param("location", ParamType::String, "The event location."),
                ],
                required: required(&["title", "start_time", "end_time"]),
            },
        },
    ]
}

/// Look up a tool template by its display name.
pub fn find_tool_template(name: &str) -> Option<ToolTemplate> {
    tool_templates().into_iter().find(|t| t.name == name)
}

// ─── Tutorial Steps ─────────────────────────────────────────────────────────

/// One step of the guided tour. The frontend anchors the overlay to
/// `selector`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialStep {
    pub selector: String,
    pub title: String,
    pub body: String,
}

/// The guided-tour content, in display order.
pub fn tutorial_steps() -> Vec<TutorialStep> {
    let steps: [(&str, &str, &str); 6] = [
        (
            "#context-panel",
            "The Context Panel",
            "Everything the agent knows before a conversation starts is configured \
             here: its system instruction, its tools, and its grounding sources.",
        ),
        (
            "#system-instruction",
            "System Instruction",
            "The standing instruction that shapes the agent's persona and behavior. \
             Pick a preset from the dropdown or write your own.",
        ),
        (
            "#grounding-section",
            "Grounding",
            "Ground the agent in live web search, or attach PDF documents for it to \
             read. Web search and tools/documents are mutually exclusive.",
        ),
        (
            "#tools-section",
            "Function Tools",
            "Declare callable capabilities the agent may request. Add one from a \
             template or build your own with typed, reorderable parameters.",
        ),
        (
            "#chat-input-form",
            "Exercise the Agent",
            "Send a message to see how the configured context shapes the response. \
             Attached documents ride along with your next message.",
        ),
        (
            "#debug-panel",
            "The Inspector",
            "The raw API response, token usage, and an automatic critique of the \
             agent's latest answer land here after every send.",
        ),
    ];

    steps
        .into_iter()
        .map(|(selector, title, body)| TutorialStep {
            selector: selector.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        })
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_template_names_are_unique() {
        let templates = tool_templates();
        for (i, t) in templates.iter().enumerate() {
            assert!(
                !templates[..i].iter().any(|o| o.tool.name == t.tool.name),
                "duplicate tool name {}",
                t.tool.name
            );
        }
    }

    #[test]
    fn tool_templates_required_names_exist() {
        for t in tool_templates() {
            for r in &t.tool.required {
                assert!(t.tool.has_param(r), "{}: required '{r}' missing", t.tool.name);
            }
        }
    }

    #[test]
    fn enum_templates_have_clean_values() {
        for t in tool_templates() {
            for p in &t.tool.parameters {
                if let Some(values) = &p.spec.enum_values {
                    assert_eq!(p.spec.param_type, ParamType::String);
                    for (i, v) in values.iter().enumerate() {
                        assert!(!v.is_empty());
                        assert!(!values[..i].contains(v), "duplicate enum value {v}");
                    }
                }
            }
        }
    }

    #[test]
    fn find_templates_by_name() {
        assert!(find_tool_template("Get Weather").is_some());
        assert!(find_tool_template("nope").is_none());
        assert!(find_instruction_template("Code Assistant").is_some());
        assert!(find_instruction_template("nope").is_none());
    }

    #[test]
    fn tutorial_has_steps_for_all_panels() {
        let steps = tutorial_steps();
        assert!(steps.len() >= 5);
        assert!(steps.iter().any(|s| s.selector == "#context-panel"));
        assert!(steps.iter().any(|s| s.selector == "#debug-panel"));
    }
}
