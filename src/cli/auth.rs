//! `geechat auth` and `geechat deauth`.

use std::error::Error;

use crate::core::app::setup::{build_app, AppParts, StartupOptions};
use crate::core::app::Orchestrator;
use crate::core::constants::API_KEY_ENV;
use crate::core::credential::{Credential, CredentialStore, KeyringCredentialStore};
use crate::utils::masked_input::prompt_masked;

pub async fn run_auth(options: StartupOptions) -> Result<(), Box<dyn Error>> {
    if options.env_only {
        eprintln!("❌ --env-only reads {API_KEY_ENV} and never stores keys.");
        std::process::exit(1);
    }

    println!("Enter your Gemini API key. Input is hidden; F2 shows the last four characters.");
    let raw = prompt_masked("Gemini API Key: ")?;
    let credential = Credential::new(raw);
    if credential.is_empty() {
        eprintln!("❌ No API key entered.");
        std::process::exit(1);
    }

    let AppParts { app, validator } = build_app(options)?;
    let mut orchestrator = Orchestrator::new(app, validator);
    println!("Verifying API Key...");
    if !orchestrator.save_credential(credential.expose()).await {
        eprintln!("❌ Invalid API Key. Please check and try again.");
        std::process::exit(1);
    }

    match orchestrator.app().ui.last_error.as_deref() {
        Some(error) => {
            eprintln!("⚠️  {error}");
            std::process::exit(1);
        }
        None => println!("✅ API Key verified and saved successfully!"),
    }
    Ok(())
}

pub fn run_deauth() -> Result<(), Box<dyn Error>> {
    let store = KeyringCredentialStore::new();
    if store.get()?.is_none() {
        println!("No stored Gemini API key.");
        return Ok(());
    }
    store.clear()?;
    println!("✅ Removed the stored Gemini API key.");
    Ok(())
}
