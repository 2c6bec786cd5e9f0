//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};

use crate::core::app::setup::{build_app, AppParts, StartupOptions};
use crate::core::app::Orchestrator;
use crate::core::constants::KEY_REQUIRED_NOTICE;
use crate::core::stream::SendOutcome;

pub async fn run_say(message: Vec<String>, options: StartupOptions) -> Result<(), Box<dyn Error>> {
    let message = message.join(" ");
    if message.trim().is_empty() {
        eprintln!("Usage: geechat say <message>");
        std::process::exit(1);
    }

    let AppParts { app, validator } = build_app(options)?;
    let mut orchestrator = Orchestrator::new(app, validator);
    orchestrator.start().await;
    if !orchestrator.app().is_credential_valid() {
        let reason = orchestrator
            .app()
            .ui
            .last_error
            .clone()
            .unwrap_or_else(|| KEY_REQUIRED_NOTICE.to_string());
        eprintln!("❌ {reason}");
        eprintln!("💡 Run 'geechat auth' to store a key, or use --env-only with GEMINI_API_KEY.");
        std::process::exit(1);
    }

    let mut stdout = io::stdout();
    let outcome = orchestrator
        .submit_message_streaming(&message, |chunk| {
            let _ = stdout.write_all(chunk.as_bytes());
            let _ = stdout.flush();
        })
        .await;
    println!();

    match outcome {
        Some(SendOutcome::Success { .. }) => Ok(()),
        Some(SendOutcome::Failure { reason }) => {
            eprintln!("❌ Error: {reason}");
            std::process::exit(1);
        }
        None => {
            let reason = orchestrator
                .app()
                .ui
                .last_error
                .clone()
                .unwrap_or_else(|| "The message was not sent.".to_string());
            eprintln!("❌ {reason}");
            std::process::exit(1);
        }
    }
}
