use crate::error::{FluxError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::fmt;

pub const MODEL_KEY: &str = "model";
pub const SIZE_KEY: &str = "size";
pub const ENDPOINT_KEY: &str = "endpoint";
pub const API_KEY_KEY: &str = "key";

const SETUP_HINT: &str = "Setup not done. Use `set api flux key <api_key>`, `set api flux model <default_model>`, `set api flux size <default_size>`, and `set api flux endpoint <baseUrl for api>`.";

/// Key/value accessor over a named credential group.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
}

#[async_trait]
impl CredentialSource for HashMap<String, String> {
    async fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Reads the credential group from `<PREFIX>_<KEY>` environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    prefix: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        EnvCredentials {
            prefix: "FLUX".to_string(),
        }
    }
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn var_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key).to_uppercase()
    }
}

#[async_trait]
impl CredentialSource for EnvCredentials {
    async fn get(&self, key: &str) -> Option<String> {
        env::var(self.var_name(key)).ok()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct FluxConfig {
    pub default_model: String,
    pub default_size: String,
    pub endpoint: String,
    pub api_key: String,
}

impl Default for FluxConfig {
    fn default() -> Self {
        FluxConfig {
            default_model: String::new(),
            default_size: String::new(),
            endpoint: String::new(),
            api_key: String::new(),
        }
    }
}

impl fmt::Debug for FluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluxConfig")
            .field("default_model", &self.default_model)
            .field("default_size", &self.default_size)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl FluxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.default_size = size.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Snapshot the credential group. Absent and empty entries both count
    /// as missing; whitespace-only values are kept.
    pub async fn load<S>(source: &S) -> Result<Self>
    where
        S: CredentialSource + ?Sized,
    {
        let mut missing = Vec::new();
        let mut values = HashMap::new();

        for key in [MODEL_KEY, SIZE_KEY, ENDPOINT_KEY, API_KEY_KEY] {
            match source.get(key).await.filter(|v| !v.is_empty()) {
                Some(value) => {
                    values.insert(key, value);
                }
                None => missing.push(key),
            }
        }

        if !missing.is_empty() {
            log::error!("Credential group incomplete, missing: {}", missing.join(", "));
            return Err(FluxError::Setup(format!(
                "{} (missing: {})",
                SETUP_HINT,
                missing.join(", ")
            )));
        }

        let mut take = |key: &str| values.remove(key).unwrap_or_default();
        Ok(FluxConfig {
            default_model: take(MODEL_KEY),
            default_size: take(SIZE_KEY),
            endpoint: take(ENDPOINT_KEY),
            api_key: take(API_KEY_KEY),
        })
    }

    pub fn generations_url(&self) -> String {
        format!(
            "{}/v1/images/generations",
            self.endpoint.trim_end_matches('/')
        )
    }
}
