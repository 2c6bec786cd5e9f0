pub mod app;
pub mod chat_stream;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod credential;
pub mod gemini;
pub mod keyring;
pub mod message;
pub mod presence;
pub mod prompt;
pub mod service;
pub mod session;
pub mod stream;
pub mod validator;
