//! Configuration types for videogen-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

/// Remote generation service settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the generation service (default: the deployed dashboard API)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name sent with every generation request (default: "hunyuan")
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for submit, status and health requests (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_secs_serde")]
    pub request_timeout: Duration,

    /// Whether callers should fall back to mock data when the service is unreachable
    ///
    /// Carried for the caller; the orchestration core never acts on it.
    #[serde(default = "default_true")]
    pub use_mock_data_on_error: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            request_timeout: default_request_timeout(),
            use_mock_data_on_error: true,
        }
    }
}

/// Job polling settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Maximum number of status checks per job (default: 90)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between status checks (default: 3000 ms)
    #[serde(default = "default_poll_interval", with = "duration_ms_serde")]
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval: default_poll_interval(),
        }
    }
}

impl PollingConfig {
    /// Upper bound on how long a single job can be polled
    pub fn worst_case(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Local output settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving videos and the manifest (default: "videos")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Manifest file name inside `output_dir` (default: "metadata.json")
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Maximum redirects followed per artifact fetch (default: 5)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Total time allowed for one artifact fetch, redirects and body included
    /// (default: 300 seconds)
    #[serde(default = "default_download_timeout", with = "duration_secs_serde")]
    pub download_timeout: Duration,

    /// Optional JSON prompt catalogue replacing the built-in prompts
    #[serde(default)]
    pub prompts_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            manifest_name: default_manifest_name(),
            max_redirects: default_max_redirects(),
            download_timeout: default_download_timeout(),
            prompts_file: None,
        }
    }
}

impl OutputConfig {
    /// Full path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_name)
    }
}

/// Main configuration for a generation run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Polling settings
    #[serde(default)]
    pub polling: PollingConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, [`Error::Serialization`]
    /// for malformed JSON and [`Error::Config`] when validation fails.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// When `VIDEOGEN_CONFIG_FILE` is set the file is loaded first (see
    /// [`Config::from_file`]) and the remaining variables override it.
    ///
    /// | Env Var                           | Default                                    |
    /// |-----------------------------------|--------------------------------------------|
    /// | `VIDEOGEN_CONFIG_FILE`            | unset                                      |
    /// | `VIDEOGEN_API_URL`                | `https://tesla-dashboard-api.onrender.com` |
    /// | `VIDEOGEN_MODEL`                  | `hunyuan`                                  |
    /// | `VIDEOGEN_REQUEST_TIMEOUT_SECS`   | `30`                                       |
    /// | `VIDEOGEN_USE_MOCK_DATA_ON_ERROR` | `true`                                     |
    /// | `VIDEOGEN_POLL_MAX_ATTEMPTS`      | `90`                                       |
    /// | `VIDEOGEN_POLL_INTERVAL_MS`       | `3000`                                     |
    /// | `VIDEOGEN_MAX_REDIRECTS`          | `5`                                        |
    /// | `VIDEOGEN_DOWNLOAD_TIMEOUT_SECS`  | `300`                                      |
    /// | `VIDEOGEN_OUTPUT_DIR`             | `videos`                                   |
    /// | `VIDEOGEN_MANIFEST_NAME`          | `metadata.json`                            |
    /// | `VIDEOGEN_PROMPTS_FILE`           | unset                                      |
    ///
    /// Errors carry the name of the variable that holds the bad value.
    pub fn from_env() -> Result<Self> {
        let mut config = match env_string("VIDEOGEN_CONFIG_FILE") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|e| {
                    Error::config(
                        format!("cannot read config file '{}': {}", path, e),
                        "VIDEOGEN_CONFIG_FILE",
                    )
                })?;
                serde_json::from_str::<Config>(&raw).map_err(|e| {
                    Error::config(
                        format!("invalid config file '{}': {}", path, e),
                        "VIDEOGEN_CONFIG_FILE",
                    )
                })?
            }
            None => Config::default(),
        };

        if let Some(url) = env_string("VIDEOGEN_API_URL") {
            config.service.base_url = url;
        }
        if let Some(model) = env_string("VIDEOGEN_MODEL") {
            config.service.model = model;
        }
        if let Some(secs) = env_parse::<u64>("VIDEOGEN_REQUEST_TIMEOUT_SECS")? {
            config.service.request_timeout = Duration::from_secs(secs);
        }
        if let Some(flag) = env_parse::<bool>("VIDEOGEN_USE_MOCK_DATA_ON_ERROR")? {
            config.service.use_mock_data_on_error = flag;
        }
        if let Some(attempts) = env_parse::<u32>("VIDEOGEN_POLL_MAX_ATTEMPTS")? {
            config.polling.max_attempts = attempts;
        }
        if let Some(ms) = env_parse::<u64>("VIDEOGEN_POLL_INTERVAL_MS")? {
            config.polling.interval = Duration::from_millis(ms);
        }
        if let Some(hops) = env_parse::<u32>("VIDEOGEN_MAX_REDIRECTS")? {
            config.output.max_redirects = hops;
        }
        if let Some(secs) = env_parse::<u64>("VIDEOGEN_DOWNLOAD_TIMEOUT_SECS")? {
            config.output.download_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = env_string("VIDEOGEN_OUTPUT_DIR") {
            config.output.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = env_string("VIDEOGEN_MANIFEST_NAME") {
            config.output.manifest_name = name;
        }
        if let Some(path) = env_string("VIDEOGEN_PROMPTS_FILE") {
            config.output.prompts_file = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check settings that would make every request fail
    ///
    /// Error keys name the environment variable controlling the setting.
    pub fn validate(&self) -> Result<()> {
        let base = self.service.base_url.trim();
        if base.is_empty() {
            return Err(Error::config(
                "service base URL must not be empty",
                "VIDEOGEN_API_URL",
            ));
        }
        match url::Url::parse(base) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(Error::config(
                    format!("unsupported URL scheme '{}'", parsed.scheme()),
                    "VIDEOGEN_API_URL",
                ));
            }
            Err(e) => {
                return Err(Error::config(
                    format!("invalid service base URL '{}': {}", base, e),
                    "VIDEOGEN_API_URL",
                ));
            }
        }
        if self.service.model.trim().is_empty() {
            return Err(Error::config("model must not be empty", "VIDEOGEN_MODEL"));
        }
        if self.polling.interval.is_zero() {
            return Err(Error::config(
                "poll interval must be greater than zero",
                "VIDEOGEN_POLL_INTERVAL_MS",
            ));
        }
        if self.output.download_timeout.is_zero() {
            return Err(Error::config(
                "download timeout must be greater than zero",
                "VIDEOGEN_DOWNLOAD_TIMEOUT_SECS",
            ));
        }
        if self.output.manifest_name.trim().is_empty() {
            return Err(Error::config(
                "manifest name must not be empty",
                "VIDEOGEN_MANIFEST_NAME",
            ));
        }
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| {
            Error::config(format!("{} has invalid value '{}': {}", key, raw, e), key)
        }),
    }
}

fn default_base_url() -> String {
    "https://tesla-dashboard-api.onrender.com".to_string()
}

fn default_model() -> String {
    "hunyuan".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    90
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(3000)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("videos")
}

fn default_manifest_name() -> String {
    "metadata.json".to_string()
}

fn default_max_redirects() -> u32 {
    5
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(300)
}

// Duration serialization helper (whole seconds)
mod duration_secs_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
