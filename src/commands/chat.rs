//! Tauri IPC commands for the chat panel.
//!
//! `send_message` drives the whole send path: append the user turn, call
//! the remote API, append the agent (or error) turn, and kick off the
//! analysis task. A busy flag keeps at most one outbound generation
//! request in flight; the analysis call runs independently and may
//! complete after later sends — stale results are discarded by turn-index
//! tag.

use serde::Serialize;
use tauri::Manager;

use crate::context::conversation::ConversationLog;
use crate::context::types::ConversationTurn;
use crate::inference::{analysis, AgentClient, UsageMetadata};
use crate::{SharedChat, SharedContext};

// ─── Chat State ─────────────────────────────────────────────────────────────

/// Outcome of the analysis task for one agent turn.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AnalysisStatus {
    /// The analysis call is still in flight.
    Pending,
    /// The critique text arrived.
    #[serde(rename_all = "camelCase")]
    Complete { text: String },
    /// The analysis call itself failed; the error is shown in its place.
    #[serde(rename_all = "camelCase")]
    Failed { message: String },
}

/// The critique slot, tagged with the agent turn it describes.
///
/// A completion whose `turn_index` no longer matches the newest agent turn
/// is stale and gets dropped instead of overwriting newer state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSlot {
    pub turn_index: usize,
    #[serde(flatten)]
    pub status: AnalysisStatus,
}

/// Mutable chat-side state: the conversation log plus the transient view
/// state that load/clear reset.
#[derive(Default)]
pub struct ChatState {
    pub log: ConversationLog,
    /// Re-entry guard: true while a send is in flight.
    pub busy: bool,
    /// Raw body of the latest response, for the inspector.
    pub latest_raw: Option<serde_json::Value>,
    /// Usage counts of the latest response.
    pub latest_usage: Option<UsageMetadata>,
    /// Critique of the latest agent turn.
    pub analysis: Option<AnalysisSlot>,
}

impl ChatState {
    /// Reset the transient view state (on load and clear).
    pub fn reset_transients(&mut self) {
        self.latest_raw = None;
        self.latest_usage = None;
        self.analysis = None;
    }
}

// ─── Response Types ─────────────────────────────────────────────────────────

/// Snapshot of the chat view for the frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatViewSnapshot {
    pub turns: Vec<ConversationTurn>,
    pub session_token_count: u64,
    pub busy: bool,
    /// Pretty-printed raw response body, when one exists.
    pub latest_raw: Option<String>,
    pub latest_usage: Option<UsageMetadata>,
    pub analysis: Option<AnalysisSlot>,
}

// ─── Commands ───────────────────────────────────────────────────────────────

/// Send a user message through the configured context.
///
/// Returns the appended agent turn. A remote failure still succeeds as a
/// command: the failure becomes a synthetic agent turn, appended like any
/// other (and no analysis follows it).
#[tauri::command]
pub async fn send_message(
    message: String,
    app: tauri::AppHandle,
    chat: tauri::State<'_, SharedChat>,
    context: tauri::State<'_, SharedContext>,
    client: tauri::State<'_, AgentClient>,
) -> Result<ConversationTurn, String> {
    let request_id = uuid::Uuid::new_v4();

    // Phase 1 — under the locks: re-entry check, snapshot, user append.
    let (config, prior_turns) = {
        let mut state = chat.lock().map_err(|e| format!("Lock error: {e}"))?;
        if state.busy {
            return Err("A message is already being sent.".to_string());
        }
        let config = {
            let ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
            ctx.config().clone()
        };
        state.busy = true;
        state.analysis = None;

        let prior_turns = state.log.turns().to_vec();
        state.log.push_user(&message, &config.attached_files);
        (config, prior_turns)
    };

    // Phase 2 — no locks held across the network call.
    tracing::info!(
        %request_id,
        prior_turns = prior_turns.len(),
        staged_files = config.attached_files.len(),
        grounding = config.grounding_mode.as_str(),
        "send started"
    );
    let result = client
        .send_turn(&message, &config.attached_files, &config, &prior_turns)
        .await;

    // Phase 3 — append the outcome.
    let mut state = chat.lock().map_err(|e| format!("Lock error: {e}"))?;
    state.busy = false;

    match result {
        Ok(outcome) => {
            state.latest_raw = Some(outcome.raw);
            state.latest_usage = outcome.usage;
            if let Some(usage) = outcome.usage {
                state.log.add_usage(usage.total_token_count);
            }

            let turn_index = state.log.len();
            let agent_turn = state
                .log
                .push_agent(outcome.turn.content, outcome.turn.function_calls)
                .clone();

            // Staged files are consumed by a successful send.
            {
                let mut ctx = context.lock().map_err(|e| format!("Lock error: {e}"))?;
                ctx.consume_files();
            }

            if agent_turn.has_text() {
                state.analysis = Some(AnalysisSlot {
                    turn_index,
                    status: AnalysisStatus::Pending,
                });
                spawn_analysis(
                    app,
                    client.inner().clone(),
                    message,
                    agent_turn.joined_text(),
                    turn_index,
                );
            }

            Ok(agent_turn)
        }
        Err(err) => {
            tracing::warn!(%request_id, error = %err, "send failed, appending error turn");
            let turn = state.log.push_error(&err.user_message()).clone();
            Ok(turn)
        }
    }
}

/// Run the analysis call in the background and store its outcome —
/// unless a newer agent turn has arrived in the meantime.
fn spawn_analysis(
    app: tauri::AppHandle,
    client: AgentClient,
    user_text: String,
    agent_text: String,
    turn_index: usize,
) {
    tauri::async_runtime::spawn(async move {
        let status = match analysis::analyze(&client, &user_text, &agent_text).await {
            Ok(text) => AnalysisStatus::Complete { text },
            Err(err) => AnalysisStatus::Failed {
                message: format!("Failed to generate analysis: {err}"),
            },
        };

        let chat = app.state::<SharedChat>();
        let mut state = match chat.lock() {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "chat state lock poisoned, dropping analysis");
                return;
            }
        };

        if state.log.last_agent_index() == Some(turn_index) {
            state.analysis = Some(AnalysisSlot { turn_index, status });
        } else {
            tracing::debug!(turn_index, "discarding stale analysis result");
        }
    });
}

/// Current chat view: turns, accounting, raw response, analysis.
#[tauri::command]
pub fn get_chat_view(
    chat: tauri::State<'_, SharedChat>,
) -> Result<ChatViewSnapshot, String> {
    let state = chat.lock().map_err(|e| format!("Lock error: {e}"))?;
    Ok(ChatViewSnapshot {
        turns: state.log.turns().to_vec(),
        session_token_count: state.log.session_token_count(),
        busy: state.busy,
        latest_raw: state
            .latest_raw
            .as_ref()
            .map(|raw| serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string())),
        latest_usage: state.latest_usage,
        analysis: state.analysis.clone(),
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────
