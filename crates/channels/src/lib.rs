//! Chat channels for RouteChat.
//!
//! - **CLI**: interactive terminal chat (stdin/stdout)
//! - **render**: how turns are labeled when shown to the user

pub mod cli;
pub mod render;

pub use cli::CliChannel;
pub use render::{render_exchange, render_turn};
