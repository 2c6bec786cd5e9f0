//! GeeChat is a terminal chat client for Google Gemini.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the application state and the reducer that mutates it:
//!   credential validation, session creation, folding streamed replies into
//!   the transcript, and idle presence.
//! - [`ui`] renders the terminal interface and runs the event loop that feeds
//!   user input and background results into the reducer.
//! - [`api`] defines the Gemini `generateContent` payloads.
//! - [`cli`] parses arguments and dispatches to the chat UI or the one-shot
//!   commands.
//!
//! The binary (`src/main.rs`) only calls [`cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
