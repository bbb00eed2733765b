//! Terminal UI layer for the multi-space chat screen.
//!
//! - [`chat_loop`]: the interaction loop that feeds key presses into
//!   [`crate::core::app::App`] and runs turns in the background.
//! - [`renderer`]: frame composition for the three panels and the broadcast row.
//! - [`theme`]: colors and styles.
//!
//! This layer presents and captures interaction state; [`crate::core`] owns
//! the chat state and talks to the API.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
