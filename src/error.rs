use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluxError {
    /// Required credentials are missing from the configuration source.
    #[error("{0}")]
    Setup(String),

    /// Unknown model alias, or the generation endpoint answered with a
    /// non-success status.
    #[error("{0}")]
    Diffusion(String),

    #[error("HTTP error: {message}")]
    Http { status: Option<u16>, message: String },

    /// The backend answered successfully but the body had an unexpected shape.
    #[error("Response error: {0}")]
    Response(String),
}

impl FluxError {
    pub fn model_not_found(model: &str) -> Self {
        FluxError::Diffusion(format!("Model `{}` does not exist.", model))
    }

    pub fn status(status: reqwest::StatusCode) -> Self {
        FluxError::Diffusion(format!("Error?: {}", status.as_u16()))
    }

    /// Errors the command layer turns into a reply. Everything else goes
    /// back to the host untouched.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, FluxError::Diffusion(_) | FluxError::Http { .. })
    }
}

impl From<reqwest::Error> for FluxError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return FluxError::Response(e.to_string());
        }
        FluxError::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FluxError>;
