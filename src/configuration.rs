use std::time::Duration;

use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::services::search_trigger::TriggerPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub openai: OpenAISettings,
    pub pinecone: PineconeSettings,
    pub search_ui: SearchUiSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

/// Embeddings API (OpenAI compatible)
#[derive(Debug, Deserialize, Clone)]
pub struct OpenAISettings {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
}

impl OpenAISettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Managed vector index
#[derive(Debug, Deserialize, Clone)]
pub struct PineconeSettings {
    pub api_key: Secret<String>,
    /// Where indexes are described and created
    pub control_plane_url: String,
    pub index_name: String,
    /// Must match the length of the vectors produced by the embeddings model
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub api_version: String,
    /// Overrides the data plane host returned when describing the index.
    /// Useful to target a local or mocked index.
    pub index_host: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
}

impl PineconeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchUiSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub debounce_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub top_k: usize,
}

impl SearchUiSettings {
    pub fn trigger_policy(&self) -> TriggerPolicy {
        TriggerPolicy::Debounce(Duration::from_millis(self.debounce_ms))
    }
}

/// Conventional variables of the embeddings and vector index providers, honoured on top of the `APP_` ones
const PROVIDER_VARIABLES: [(&str, &str); 3] = [
    ("OPENAI_API_KEY", "openai.api_key"),
    ("PINECONE_API_KEY", "pinecone.api_key"),
    ("PINECONE_INDEX_NAME", "pinecone.index_name"),
];

/// Extracts app settings from configuration files and env variables
///
/// `base.yaml` should contain shared settings for all environments.
/// A specific env file should be created for each environment: `local.yaml` and `production.yaml`
/// The environment is set with the env var `APP_ENVIRONMENT`.
/// If `APP_ENVIRONMENT` is not set, `local.yaml` is the default.
///
/// Settings are also taken from environment variables: with a prefix of APP and '__' as separator
/// For ex: `APP_APPLICATION__PORT=5001` would set `Settings.application.port`.
/// `OPENAI_API_KEY`, `PINECONE_API_KEY` and `PINECONE_INDEX_NAME` take precedence over everything else.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|error| config::ConfigError::Foreign(Box::new(error)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let mut builder = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );

    for (variable, key) in PROVIDER_VARIABLES {
        if let Ok(value) = std::env::var(variable) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()?.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
