pub mod commands;
pub mod context;
pub mod inference;
pub mod storage;

use std::sync::Mutex;

use commands::chat::ChatState;
use context::ContextState;
use context::ToolEditorSession;
use inference::AgentClient;
use storage::{HistoryStore, SqliteStore};

/// Managed context-panel state.
pub type SharedContext = Mutex<ContextState>;

/// Managed chat state (conversation log + transient view state).
pub type SharedChat = Mutex<ChatState>;

/// Managed tool-editor session slot.
pub type SharedEditor = Mutex<Option<ToolEditorSession>>;

/// Managed persistence facade.
pub type SharedHistory = Mutex<HistoryStore>;

/// Return the platform-standard data directory for Context Studio.
///
/// - macOS: `~/Library/Application Support/com.contextstudio.app/`
/// - Windows: `{FOLDERID_RoamingAppData}\contextstudio\`
/// - Linux: `$XDG_DATA_HOME/com.contextstudio.app/` (fallback `~/.local/share/...`)
///
/// Falls back to `~/.contextstudio/` only if none of the above can be resolved.
pub(crate) fn data_dir() -> std::path::PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("com.contextstudio.app");
    }
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".contextstudio")
}

/// Initialize the tracing subscriber — writes structured logs to the app data directory.
///
/// On each app startup:
/// 1. Rotates existing logs (studio.log → studio.log.1 → .2 → .3, keeps last 3).
/// 2. Opens a fresh studio.log with a line-flushing writer for crash resilience.
/// 3. Logs a startup banner with the data directory path for discoverability.
fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = data_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    let log_path = log_dir.join("studio.log");

    // Rotate: studio.log.2 → .3, .1 → .2, studio.log → .1
    rotate_log_file(&log_path, 3);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("failed to open studio.log");

    let flushing_writer = FlushingWriter::new(log_file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("context_studio=info,warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(flushing_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    // Startup banner — makes it easy to find the right log file
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %log_dir.display(),
        log_file = %log_path.display(),
        pid = std::process::id(),
        "=== Context Studio starting ==="
    );
}

/// Rotate log files: `studio.log` → `studio.log.1` → `.2` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are skipped.
fn rotate_log_file(base_path: &std::path::Path, keep: u32) {
    // Delete the oldest
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    // Shift: .{n-1} → .{n}
    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Current → .1
    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write.
///
/// `tracing-subscriber` buffers log output internally. Without explicit
/// flushing, log entries may sit in OS buffers and be lost on crash.
/// This wrapper ensures each log line is on disk immediately.
#[derive(Clone)]
struct FlushingWriter {
    file: std::sync::Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: std::sync::Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Resolve the path for the local key-value store.
///
/// Uses the platform-standard data directory (creates it if needed).
fn resolve_store_path() -> String {
    let dir = data_dir();
    if !dir.exists() {
        let _ = std::fs::create_dir_all(&dir);
    }
    dir.join("studio.db").to_string_lossy().into_owned()
}

/// Run the Tauri application.
pub fn run() {
    // Initialize tracing FIRST — before any tracing::info!() calls
    init_tracing();

    let store_path = resolve_store_path();
    let store = SqliteStore::open(&store_path).expect("failed to open local store");
    let history = HistoryStore::new(Box::new(store));

    tracing::info!(store_path = %store_path, "local store initialized");

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(Mutex::new(ContextState::new()) as SharedContext)
        .manage(Mutex::new(ChatState::default()) as SharedChat)
        .manage(Mutex::new(None::<ToolEditorSession>) as SharedEditor)
        .manage(Mutex::new(history) as SharedHistory)
        .manage(AgentClient::new())
        .invoke_handler(tauri::generate_handler![
            commands::chat::send_message,
            commands::chat::get_chat_view,
            commands::context::get_context,
            commands::context::get_notice,
            commands::context::set_system_instruction,
            commands::context::apply_instruction_template,
            commands::context::list_instruction_templates,
            commands::context::list_tool_templates,
            commands::context::list_tutorial_steps,
            commands::context::add_tool_from_template,
            commands::context::delete_tool,
            commands::context::set_web_search,
            commands::context::upload_files,
            commands::context::remove_file,
            commands::editor::open_tool_editor,
            commands::editor::update_tool_editor,
            commands::editor::get_tool_editor,
            commands::editor::save_tool,
            commands::editor::cancel_tool_editor,
            commands::session::save_chat,
            commands::session::load_chat,
            commands::session::clear_chat,
            commands::session::search_conversation,
            commands::session::get_search_history,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
