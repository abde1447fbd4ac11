//! Tauri IPC commands for the tool editor dialog.
//!
//! One editor session at a time, held in managed state. Every edit comes
//! through [`EditorChange`] and returns the updated session snapshot so
//! the dialog can re-render (including validation errors and the
//! save-enabled flag). Nothing touches the tool list until `save_tool`.

use serde::Deserialize;

use crate::context::errors::ContextError;
use crate::context::tool_editor::ToolEditorSession;
use crate::context::types::{ContextConfig, ParamType};
use crate::{SharedContext, SharedEditor};

// ─── Edit Operations ────────────────────────────────────────────────────────

/// One edit applied to the open session.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditorChange {
    #[serde(rename_all = "camelCase")]
    SetName { name: String },
    #[serde(rename_all = "camelCase")]
    SetDescription { description: String },
    AddParam,
    #[serde(rename_all = "camelCase")]
    RemoveParam { name: String },
    #[serde(rename_all = "camelCase")]
    RenameParam { from: String, to: String },
    #[serde(rename_all = "camelCase")]
    MoveParam { from: usize, to: usize },
    #[serde(rename_all = "camelCase")]
    SetParamType { name: String, param_type: ParamType },
    #[serde(rename_all = "camelCase")]
    SetParamDescription { name: String, description: String },
    #[serde(rename_all = "camelCase")]
    SetEnumEnabled { name: String, enabled: bool },
    #[serde(rename_all = "camelCase")]
    SetEnumValues { name: String, values: String },
    #[serde(rename_all = "camelCase")]
    SetRequired { name: String, required: bool },
}

// ─── Commands ───────────────────────────────────────────────────────────────

/// Open the editor: over an existing tool (edit mode) or a fresh draft
/// (create mode). Replaces any previously open session.
#[tauri::command]
pub fn open_tool_editor(
    tool_name: Option<String>,
    editor: tauri::State<'_, SharedEditor>,
    context: tauri::State<'_, SharedContext>,
) -> Result<ToolEditorSession, String> {
    let session = match tool_name {
        Some(name) => {
            let ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
            let tool = ctx
                .config()
                .tools
                .iter()
                .find(|t| t.name == name)
                .ok_or_else(|| ContextError::UnknownTool { name }.to_string())?;
            ToolEditorSession::edit(tool)
        }
        None => ToolEditorSession::create(),
    };

    let mut slot = editor.lock().map_err(|e| format!("Lock error: {e}"))?;
    *slot = Some(session.clone());
    Ok(session)
}

/// Apply one edit to the open session and return the updated snapshot.
#[tauri::command]
pub fn update_tool_editor(
    change: EditorChange,
    editor: tauri::State<'_, SharedEditor>,
) -> Result<ToolEditorSession, String> {
    let mut slot = editor.lock().map_err(|e| format!("Lock error: {e}"))?;
    let session = slot
        .as_mut()
        .ok_or_else(|| ContextError::NoEditorSession.to_string())?;

    match change {
        EditorChange::SetName { name } => session.set_name(&name),
        EditorChange::SetDescription { description } => session.set_description(&description),
        EditorChange::AddParam => {
            session.add_param();
        }
        EditorChange::RemoveParam { name } => session.remove_param(&name),
        EditorChange::RenameParam { from, to } => session.rename_param(&from, &to),
        EditorChange::MoveParam { from, to } => session.move_param(from, to),
        EditorChange::SetParamType { name, param_type } => {
            session.set_param_type(&name, param_type)
        }
        EditorChange::SetParamDescription { name, description } => {
            session.set_param_description(&name, &description)
        }
        EditorChange::SetEnumEnabled { name, enabled } => {
            session.set_enum_enabled(&name, enabled)
        }
        EditorChange::SetEnumValues { name, values } => session.set_enum_values(&name, &values),
        EditorChange::SetRequired { name, required } => session.set_required(&name, required),
    }

    Ok(session.clone())
}

/// The open session, if any (dialog re-hydration).
#[tauri::command]
pub fn get_tool_editor(
    editor: tauri::State<'_, SharedEditor>,
) -> Result<Option<ToolEditorSession>, String> {
    let slot = editor.lock().map_err(|e| format!("Lock error: {e}"))?;
    Ok(slot.clone())
}

/// Commit the draft to the tool list and close the editor.
///
/// Fails (keeping the editor open) if the draft carries validation errors
/// or the committed name collides with another tool.
#[tauri::command]
pub fn save_tool(
    editor: tauri::State<'_, SharedEditor>,
    context: tauri::State<'_, SharedContext>,
) -> Result<ContextConfig, String> {
    let mut slot = editor.lock().map_err(|e| format!("Lock error: {e}"))?;
    let session = slot
        .as_ref()
        .ok_or_else(|| ContextError::NoEditorSession.to_string())?;
    let tool = session.finish().map_err(|e| e.to_string())?;

    let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
    let commit = match &session.original_name {
        Some(original) => ctx.replace_tool(original, tool),
        None => ctx.add_tool(tool),
    };
    commit.map_err(|e| e.to_string())?;

    *slot = None;
    ctx.set_notice("Tool saved successfully.");
    Ok(ctx.config().clone())
}

/// Close the editor without committing anything.
#[tauri::command]
pub fn cancel_tool_editor(editor: tauri::State<'_, SharedEditor>) -> Result<(), String> {
    let mut slot = editor.lock().map_err(|e| format!("Lock error: {e}"))?;
    *slot = None;
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
