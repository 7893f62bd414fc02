use std::path::PathBuf;

pub const DEFAULT_GRADEBOOK_FILE: &str = "gradebook.txt";
pub const DEFAULT_LOG_FILE: &str = "logs/gradebook.log";

/// Runtime settings read from the environment (after `.env` is loaded).
///
/// | Variable         | Default              |
/// |------------------|----------------------|
/// | `GRADEBOOK_FILE` | `gradebook.txt`      |
/// | `LOG_FILE_PATH`  | `logs/gradebook.log` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gradebook_file: PathBuf,
    pub log_file_path: PathBuf,
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            gradebook_file: var("GRADEBOOK_FILE", DEFAULT_GRADEBOOK_FILE),
            log_file_path: var("LOG_FILE_PATH", DEFAULT_LOG_FILE),
        }
    }
}
