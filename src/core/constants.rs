//! Shared constants used across the application

/// Model bound to every session unless `model` is set in the config file.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Text sent by the credential probe. Any successful reply means the key works.
pub const PROBE_TEXT: &str = "hello";

/// Seed message shown as the first model turn of every new session.
pub const GREETING: &str =
    "Hello! I'm Gee, your Senior, Solution-Oriented Support Assistant AI. How can I assist you today?";

/// Keyring service and account under which the API key is stored.
pub const KEYRING_SERVICE: &str = "geechat";
pub const KEYRING_ACCOUNT: &str = "gemini-api-key";

/// Environment variable consulted by `--env-only`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Filter directive variable for the diagnostics log.
pub const LOG_FILTER_ENV: &str = "GEECHAT_LOG";

/// Banner shown while no usable key is configured.
pub const KEY_REQUIRED_NOTICE: &str =
    "Please set a valid Gemini API key in the settings to start chatting.";

pub const STREAM_CANCELLED: &str = "The reply was cancelled before it finished.";

/// Canned message prefixes offered above the input (Alt+1 to Alt+5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionPrompt {
    pub label: &'static str,
    pub prefix: &'static str,
}

pub const SUGGESTION_PROMPTS: [SuggestionPrompt; 5] = [
    SuggestionPrompt {
        label: "Email",
        prefix: "EO: ",
    },
    SuggestionPrompt {
        label: "Internal Note",
        prefix: "INV: ",
    },
    SuggestionPrompt {
        label: "Chat/RAC Note",
        prefix: "CL: ",
    },
    SuggestionPrompt {
        label: "Consult",
        prefix: "CF: ",
    },
    SuggestionPrompt {
        label: "Quick Summary",
        prefix: "QS: ",
    },
];
