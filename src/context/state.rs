//! Context state coordinator.
//!
//! Owns the [`ContextConfig`] and enforces its grounding invariant in the
//! mutators themselves: web-search grounding is mutually exclusive with
//! function tools and with uploaded documents, and correctness does not
//! depend on the frontend disabling the right controls.

use std::time::{Duration, Instant};

use super::errors::ContextError;
use super::types::{ContextConfig, GroundingMode, ToolDefinition, UploadedFile};

// ─── Constants ──────────────────────────────────────────────────────────────

/// Default system instruction for a fresh session.
const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful and friendly AI agent. Your personality is witty and curious.";

/// The only document type accepted for upload.
pub const ACCEPTED_MIME_TYPE: &str = "application/pdf";

/// How long a transient notice stays visible.
const NOTICE_TTL: Duration = Duration::from_secs(3);

// ─── Notice ─────────────────────────────────────────────────────────────────

/// A transient one-shot notice. New notices replace the current one; they
/// are never queued.
#[derive(Debug, Clone)]
struct Notice {
    message: String,
    posted_at: Instant,
}

// ─── ContextState ───────────────────────────────────────────────────────────

/// Mutable holder of the agent's context configuration.
pub struct ContextState {
    config: ContextConfig,
    notice: Option<Notice>,
}

impl Default for ContextState {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextState {
    pub fn new() -> Self {
        Self {
            config: ContextConfig {
                system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
                tools: Vec::new(),
                grounding_mode: GroundingMode::None,
                attached_files: Vec::new(),
            },
            notice: None,
        }
    }

    /// The current configuration (cloned snapshots go to the frontend and
    /// the agent client).
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn set_system_instruction(&mut self, instruction: &str) {
        self.config.system_instruction = instruction.to_string();
    }

    // ─── Grounding ──────────────────────────────────────────────────────

    /// Enable or disable web-search grounding.
    ///
    /// Enabling clears both the tool list and the staged files — the
    /// invariant is enforced here, unconditionally.
    pub fn set_web_search(&mut self, enabled: bool) {
        if enabled {
            if !self.config.tools.is_empty() || !self.config.attached_files.is_empty() {
                tracing::info!(
                    tools = self.config.tools.len(),
                    files = self.config.attached_files.len(),
                    "web search enabled, clearing tools and staged files"
                );
            }
            self.config.tools.clear();
            self.config.attached_files.clear();
            self.config.grounding_mode = GroundingMode::WebSearch;
        } else {
            self.config.grounding_mode = self.derived_grounding();
        }
    }

    /// Grounding mode implied by the current state, ignoring web search.
    fn derived_grounding(&self) -> GroundingMode {
        if self.config.attached_files.is_empty() {
            GroundingMode::None
        } else {
            GroundingMode::Document
        }
    }

    /// Starting a tool or file action turns web search off (the reverse of
    /// enabling it; grounding never silently re-enables).
    fn leave_web_search(&mut self) {
        if self.config.grounding_mode == GroundingMode::WebSearch {
            self.config.grounding_mode = GroundingMode::None;
        }
    }

    // ─── Tools ──────────────────────────────────────────────────────────

    /// Append a tool. Fails if the name is already taken.
    pub fn add_tool(&mut self, tool: ToolDefinition) -> Result<(), ContextError> {
        self.leave_web_search();
        if self.config.has_tool(&tool.name) {
            return Err(ContextError::DuplicateTool { name: tool.name });
        }
        tracing::info!(tool = %tool.name, "tool added");
        self.config.tools.push(tool);
        Ok(())
    }

    /// Replace the tool previously named `original_name` with the edited
    /// definition, keeping its position in the list.
    pub fn replace_tool(
        &mut self,
        original_name: &str,
        tool: ToolDefinition,
    ) -> Result<(), ContextError> {
        let index = self
            .config
            .tools
            .iter()
            .position(|t| t.name == original_name)
            .ok_or_else(|| ContextError::UnknownTool {
                name: original_name.to_string(),
            })?;
        if tool.name != original_name && self.config.has_tool(&tool.name) {
            return Err(ContextError::DuplicateTool { name: tool.name });
        }
        tracing::info!(tool = %tool.name, original = %original_name, "tool replaced");
        self.config.tools[index] = tool;
        Ok(())
    }

    /// Remove a tool by name. Returns whether anything was removed.
    pub fn remove_tool(&mut self, name: &str) -> bool {
        let before = self.config.tools.len();
        self.config.tools.retain(|t| t.name != name);
        before != self.config.tools.len()
    }

    // ─── Staged Files ───────────────────────────────────────────────────

    /// Stage a document for the next message.
    ///
    /// Only PDF documents are accepted; anything else is rejected
    /// individually. An accepted file replaces any staged file with the
    /// same name and switches grounding to document mode.
    pub fn upsert_file(&mut self, file: UploadedFile) -> Result<(), ContextError> {
        if file.mime_type != ACCEPTED_MIME_TYPE {
            return Err(ContextError::FileRejected {
                name: file.name,
                reason: format!("only {ACCEPTED_MIME_TYPE} documents are accepted"),
            });
        }
        self.leave_web_search();
        self.config.attached_files.retain(|f| f.name != file.name);
        tracing::info!(file = %file.name, "document staged");
        self.config.attached_files.push(file);
        self.config.grounding_mode = GroundingMode::Document;
        Ok(())
    }

    /// Unstage a document by name. Returns whether anything was removed.
    pub fn remove_file(&mut self, name: &str) -> bool {
        let before = self.config.attached_files.len();
        self.config.attached_files.retain(|f| f.name != name);
        let removed = before != self.config.attached_files.len();
        if removed && self.config.grounding_mode == GroundingMode::Document {
            self.config.grounding_mode = self.derived_grounding();
        }
        removed
    }

    /// Consume the staged files after a successful send.
    pub fn consume_files(&mut self) {
        self.config.attached_files.clear();
        if self.config.grounding_mode == GroundingMode::Document {
            self.config.grounding_mode = GroundingMode::None;
        }
    }

    // ─── Notices ────────────────────────────────────────────────────────

    /// Post a transient notice, replacing any current one.
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            posted_at: Instant::now(),
        });
    }

    /// The current notice message, if it hasn't expired. Expired notices
    /// are dropped on read.
    pub fn current_notice(&mut self) -> Option<String> {
        match &self.notice {
            Some(n) if n.posted_at.elapsed() < NOTICE_TTL => Some(n.message.clone()),
            Some(_) => {
                self.notice = None;
                None
            }
            None => None,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
