//! Router Module Index
//!
//! Splits the shell's endpoints by who may call them. Access control is applied
//! per module (via Axum layers or extractors), never per handler by convention alone.

/// Routes open to any caller, signed in or not. Decisions they return are computed
/// for the current session, so an anonymous caller simply sees `denied`.
pub mod public;

/// Routes requiring a live session (`CurrentPrincipal`).
pub mod authenticated;

/// Routes restricted to the `superAdmin` role.
pub mod admin;
