//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep backend DTOs and rendered view structs in one place.
//! - Avoid cyclic imports and duplicated type definitions.
//! - Make JSON output schema changes explicit and reviewable.
//!
//! ## Files
//! - `models.rs` — backend payloads, view/report/output structs.
//! - `constants.rs` — stable constants (defaults, bounds, exit codes, routes).
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Changes in these structs can affect `--json` outputs and integration contracts.
//! Keep schema-impacting changes explicit and synchronized with `docs/contracts/*`.

pub mod constants;
pub mod models;
