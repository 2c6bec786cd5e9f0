use std::path::Path;

use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self, path: Option<&Path>) {
        match path {
            Some(path) => println!("Current configuration ({}):", path_display(path)),
            None => println!("Current configuration:"),
        }
        println!("  theme: {}", self.theme);
        match &self.model {
            Some(model) => println!("  model: {model}"),
            None => println!("  model: {} (default)", self.model()),
        }
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: {} (default)", self.base_url()),
        }
        match self.idle_timeout_ms {
            Some(ms) => println!("  idle-timeout-ms: {ms}"),
            None => println!(
                "  idle-timeout-ms: {} (default)",
                self.idle_timeout().as_millis()
            ),
        }
    }
}
