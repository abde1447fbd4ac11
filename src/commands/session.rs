//! Tauri IPC commands for conversation persistence and search.
//!
//! Save/load/clear operate on the whole turn sequence; load and clear
//! also reset the transient view state (raw response, analysis, session
//! token counter). Search runs over the in-memory log and feeds the
//! persisted query-history ring buffer.

use serde::Serialize;

use crate::context::conversation::SearchMatch;
use crate::context::types::ConversationTurn;
use crate::{SharedChat, SharedHistory};

// ─── Response Types ─────────────────────────────────────────────────────────

/// Result of a conversation search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub matches: Vec<SearchMatch>,
    /// Updated persisted query history, most recent first.
    pub history: Vec<String>,
}

// ─── Commands ───────────────────────────────────────────────────────────────

/// Persist the conversation. A no-op when the log is empty; returns
/// whether anything was written.
#[tauri::command]
pub fn save_chat(
    chat: tauri::State<'_, SharedChat>,
    history: tauri::State<'_, SharedHistory>,
) -> Result<bool, String> {
    let state = chat.lock().map_err(|e| format!("Lock error: {e}"))?;
    let mut store = history.lock().map_err(|e| format!("Lock error: {e}"))?;
    store
        .save_conversation(state.log.turns())
        .map_err(|e| e.to_string())
}

/// Load the stored conversation, if one exists, replacing the in-memory
/// log wholesale and resetting transient view state. Returns the loaded
/// turns, or `None` when nothing is stored.
#[tauri::command]
pub fn load_chat(
    chat: tauri::State<'_, SharedChat>,
    history: tauri::State<'_, SharedHistory>,
) -> Result<Option<Vec<ConversationTurn>>, String> {
    let stored = {
        let store = history.lock().map_err(|e| format!("Lock error: {e}"))?;
        store.load_conversation().map_err(|e| e.to_string())?
    };

    let Some(turns) = stored else {
        return Ok(None);
    };

    let mut state = chat.lock().map_err(|e| format!("Lock error: {e}"))?;
    state.log.replace(turns.clone());
    state.reset_transients();
    tracing::info!(turns = turns.len(), "conversation loaded");
    Ok(Some(turns))
}

/// Clear the conversation: empty the log, delete the stored key, reset
/// transient view state.
#[tauri::command]
pub fn clear_chat(
    chat: tauri::State<'_, SharedChat>,
    history: tauri::State<'_, SharedHistory>,
) -> Result<(), String> {
    {
        let mut store = history.lock().map_err(|e| format!("Lock error: {e}"))?;
        store.clear_conversation().map_err(|e| e.to_string())?;
    }
    let mut state = chat.lock().map_err(|e| format!("Lock error: {e}"))?;
    state.log.clear();
    state.reset_transients();
    Ok(())
}

/// Search the conversation text and record the query in the persisted
/// history.
#[tauri::command]
pub fn search_conversation(
    query: String,
    chat: tauri::State<'_, SharedChat>,
    history: tauri::State<'_, SharedHistory>,
) -> Result<SearchOutcome, String> {
    let matches = {
        let state = chat.lock().map_err(|e| format!("Lock error: {e}"))?;
        state.log.search(&query)
    };

    let mut store = history.lock().map_err(|e| format!("Lock error: {e}"))?;
    let trimmed = query.trim();
    let updated_history = if trimmed.is_empty() {
        store.search_history().map_err(|e| e.to_string())?
    } else {
        store
            .push_search_query(trimmed)
            .map_err(|e| e.to_string())?
    };

    Ok(SearchOutcome {
        matches,
        history: updated_history,
    })
}

/// The persisted search-query history, most recent first.
#[tauri::command]
pub fn get_search_history(
    history: tauri::State<'_, SharedHistory>,
) -> Result<Vec<String>, String> {
    let store = history.lock().map_err(|e| format!("Lock error: {e}"))?;
    store.search_history().map_err(|e| e.to_string())
}
