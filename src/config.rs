use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{QuizError, Result};

pub const API_KEY_ENV: &str = "QUIZGEN_OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-5-nano";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 16_000;

/// Somewhere an API key can be looked up. Blank values count as absent.
pub trait CredentialSource {
    fn api_key(&self) -> Option<String>;

    /// Where the key is expected, for error messages.
    fn describe(&self) -> String {
        "the configured credential source".to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnvCredentials {
    var: &'static str,
}

impl EnvCredentials {
    pub const fn new(var: &'static str) -> Self {
        Self { var }
    }

    pub fn var(&self) -> &'static str {
        self.var
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        env::var(self.var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn describe(&self) -> String {
        format!("{} (set it in the environment or a .env file)", self.var)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model: String,
    pub api_base: Option<String>,
    pub timeout: Option<Duration>,
    pub max_output_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: None,
            timeout: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Everything needed to talk to the model service, read once at startup.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    pub settings: Settings,
}

impl Config {
    pub fn load(credentials: &impl CredentialSource, settings: Settings) -> Result<Self> {
        let api_key = credentials.api_key().ok_or_else(|| {
            QuizError::Configuration(format!("No API key found in {}", credentials.describe()))
        })?;

        if settings.model.trim().is_empty() {
            return Err(QuizError::Configuration(
                "Model identifier cannot be empty".to_string(),
            ));
        }

        Ok(Self { api_key, settings })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}
