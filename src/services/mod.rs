//! Service layer containing the console's workflow components and side-effect helpers.
//!
//! ## Service map
//! - `session.rs` — token storage, `Session` lifetime and the route guard.
//! - `loader.rs` — tri-state fetch holder with per-fetch cancellation.
//! - `scan.rs` — scan form validation and single-flight submission.
//! - `violations.rs` — status filter, in-flight tracking and concurrent resolve.
//! - `system_config.rs` — auto-scan settings editor state machine.
//! - `settings.rs` — `config.toml` plus environment overrides.
//! - `storage.rs` — local paths, token file and audit log.
//! - `logging.rs` — tracing subscriber setup.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod loader;
pub mod logging;
pub mod output;
pub mod scan;
pub mod session;
pub mod settings;
pub mod storage;
pub mod system_config;
pub mod violations;
