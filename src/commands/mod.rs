//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `account.rs` — register/login/logout/session.
//! - `console.rs` — protected views: dashboard/history/risk/violations/scan/system/report.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate workflow logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod account;
pub mod console;

pub use account::handle_account_commands;
pub use console::handle_console_commands;

use crate::services::session::SessionStore;
use crate::services::settings::Settings;

/// Everything a handler needs besides the parsed CLI.
pub struct Context {
    pub settings: Settings,
    pub store: SessionStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Unhandled,
    Done,
    /// A protected view was entered without a session.
    LoginRedirect,
}
