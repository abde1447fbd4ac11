//! Tauri IPC commands for the context panel.
//!
//! System instruction, grounding, tool list, and staged documents. The
//! mutual-exclusion rules live in `ContextState`; these commands only
//! translate between IPC payloads and the coordinator, and post the
//! transient notices the panel shows.

use serde::Serialize;

use crate::context::errors::ContextError;
use crate::context::templates::{
    self, InstructionTemplate, ToolTemplate, TutorialStep,
};
use crate::context::types::{ContextConfig, UploadedFile};
use crate::SharedContext;

// ─── Response Types ─────────────────────────────────────────────────────────

/// Result of a multi-file upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    /// Names staged (in order), including replacements.
    pub accepted: Vec<String>,
    /// Names rejected (wrong document type).
    pub rejected: Vec<String>,
    pub config: ContextConfig,
}

// ─── Commands ───────────────────────────────────────────────────────────────

/// The current context configuration.
#[tauri::command]
pub fn get_context(
    context: tauri::State<'_, SharedContext>,
) -> Result<ContextConfig, String> {
    let ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    Ok(ctx.config().clone())
}

/// The currently visible transient notice, if any.
#[tauri::command]
pub fn get_notice(context: tauri::State<'_, SharedContext>) -> Result<Option<String>, String> {
    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    Ok(ctx.current_notice())
}

#[tauri::command]
pub fn set_system_instruction(
    instruction: String,
    context: tauri::State<'_, SharedContext>,
) -> Result<(), String> {
    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    ctx.set_system_instruction(&instruction);
    Ok(())
}

/// Replace the system instruction with a named preset. Returns the new
/// instruction text.
#[tauri::command]
pub fn apply_instruction_template(
    name: String,
    context: tauri::State<'_, SharedContext>,
) -> Result<String, String> {
    let template = templates::find_instruction_template(&name)
        .ok_or_else(|| ContextError::UnknownTemplate { name }.to_string())?;
    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    ctx.set_system_instruction(&template.prompt);
    Ok(template.prompt)
}

#[tauri::command]
pub fn list_instruction_templates() -> Vec<InstructionTemplate> {
    templates::instruction_templates()
}

#[tauri::command]
pub fn list_tool_templates() -> Vec<ToolTemplate> {
    templates::tool_templates()
}

#[tauri::command]
pub fn list_tutorial_steps() -> Vec<TutorialStep> {
    templates::tutorial_steps()
}

/// Add a tool from a named template.
///
/// A name collision with an existing tool is a no-op with a notice, not an
/// overwrite.
#[tauri::command]
pub fn add_tool_from_template(
    name: String,
    context: tauri::State<'_, SharedContext>,
) -> Result<ContextConfig, String> {
    let template = templates::find_tool_template(&name)
        .ok_or_else(|| ContextError::UnknownTemplate { name }.to_string())?;

    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    let tool_name = template.tool.name.clone();
    match ctx.add_tool(template.tool) {
        Ok(()) => ctx.set_notice(format!("Tool '{tool_name}' added.")),
        Err(ContextError::DuplicateTool { name }) => {
            ctx.set_notice(format!("Tool '{name}' already exists."));
        }
        Err(e) => return Err(e.to_string()),
    }
    Ok(ctx.config().clone())
}

/// Remove a tool from the tool set.
#[tauri::command]
pub fn delete_tool(
    name: String,
    context: tauri::State<'_, SharedContext>,
) -> Result<ContextConfig, String> {
    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    if ctx.remove_tool(&name) {
        ctx.set_notice("Tool deleted successfully.");
    }
    Ok(ctx.config().clone())
}

/// Enable or disable web-search grounding. Enabling clears tools and
/// staged files.
#[tauri::command]
pub fn set_web_search(
    enabled: bool,
    context: tauri::State<'_, SharedContext>,
) -> Result<ContextConfig, String> {
    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    ctx.set_web_search(enabled);
    Ok(ctx.config().clone())
}

/// Stage decoded documents for the next message.
///
/// Each file is validated individually; non-PDF files are rejected with a
/// notice while the rest are staged (re-uploads replace by name).
#[tauri::command]
pub fn upload_files(
    files: Vec<UploadedFile>,
    context: tauri::State<'_, SharedContext>,
) -> Result<UploadOutcome, String> {
    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for file in files {
        let name = file.name.clone();
        match ctx.upsert_file(file) {
            Ok(()) => accepted.push(name),
            Err(ContextError::FileRejected { name, .. }) => rejected.push(name),
            Err(e) => return Err(e.to_string()),
        }
    }

    if !rejected.is_empty() {
        ctx.set_notice("Please upload PDF files only.");
    }

    Ok(UploadOutcome {
        accepted,
        rejected,
        config: ctx.config().clone(),
    })
}

/// Unstage a document by name.
#[tauri::command]
pub fn remove_file(
    name: String,
    context: tauri::State<'_, SharedContext>,
) -> Result<ContextConfig, String> {
    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    ctx.remove_file(&name);
    Ok(ctx.config().clone())
}
