use std::path::PathBuf;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_DB_PATH: &str = "data/judgeman.sqlite";

/// Runtime settings, read from the environment.
///
/// | variable            | default                 |
/// |---------------------|-------------------------|
/// | `JUDGEMAN_PROVIDER` | `gemini`                |
/// | `JUDGEMAN_MODEL`    | `gemini-2.0-flash`      |
/// | `GEMINI_API_KEY`    | (none)                  |
/// | `JUDGEMAN_DB`       | `data/judgeman.sqlite`  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub db_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            provider: get("JUDGEMAN_PROVIDER").unwrap_or(defaults.provider),
            model: get("JUDGEMAN_MODEL").unwrap_or(defaults.model),
            api_key: get("GEMINI_API_KEY").unwrap_or(defaults.api_key),
            db_path: get("JUDGEMAN_DB").map(PathBuf::from).unwrap_or(defaults.db_path),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(m) = model.filter(|m| !m.trim().is_empty()) {
            self.model = m;
        }
        self
    }
}
