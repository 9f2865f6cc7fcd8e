// The core module contains all business logic.
// Nothing in here talks HTTP or prints to the terminal.

#[path = "auth/mod.rs"]
pub mod auth;

#[path = "sheets/mod.rs"]
pub mod sheets;
