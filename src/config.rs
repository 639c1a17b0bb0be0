//! Configuration management for ai-doctor
//!
//! Settings live in `<config dir>/ai-doctor/config.json`. Environment
//! variables win over the file for the API key and the compiler.

use crate::diagnose::models::{DEFAULT_API_BASE, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_KEY";

/// Environment variable naming the Java compiler to run.
pub const JAVAC_ENV: &str = "AI_DOCTOR_JAVAC";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    /// Model id, e.g. `gemini-2.5-flash`
    pub model: Option<String>,
    pub api_base: Option<String>,
    /// Compiler program (defaults to `javac` on PATH)
    pub javac: Option<String>,
    /// Extra arguments passed to the compiler before the source path
    pub javac_args: Vec<String>,
}

impl Config {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ai-doctor"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit path. A corrupt file is moved aside and
    /// defaults are used.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                preserve_corrupt_config(path, &content);
                warn!(
                    "Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                    err
                );
                Self::default()
            }
        }
    }

    /// API key from `GEMINI_KEY`, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .or_else(|| self.gemini_api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    /// Compiler program from `AI_DOCTOR_JAVAC`, the config file, or `javac`.
    pub fn javac(&self) -> String {
        self.javac_with(std::env::var(JAVAC_ENV).ok())
    }

    fn javac_with(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.javac.clone())
            .unwrap_or_else(|| "javac".to_string())
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/ai-doctor/config.json".to_string())
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}
