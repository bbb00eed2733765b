//! Slangit is a terminal client for the Slangit conversational API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the wire payloads and the HTTP client that opens
//!   conversations and streams replies.
//! - [`core`] owns configuration, the per-space chat session, the batch
//!   runner and the multi-space fan-out with its saved results.
//! - [`ui`] renders the three-panel terminal interface and runs the
//!   interactive event loop.
//! - [`utils`] holds logging setup and the transcript log.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions or into the one-shot commands.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
