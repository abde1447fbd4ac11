//! Tauri IPC commands exposed to the webview frontend.
//!
//! Each command is callable via `invoke("command_name", { args })` from
//! the frontend code.

pub mod chat;
pub mod context;
pub mod editor;
pub mod session;
