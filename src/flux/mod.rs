pub mod image_client;

use crate::{
    command::{parse_command, CommandOutcome},
    config::{CredentialSource, FluxConfig},
    error::{FluxError, Result},
    logger,
    models::ImageAttachment,
};
use bytes::Bytes;
use reqwest::Client;
use std::sync::Arc;
use uuid::Uuid;

pub use image_client::ImageClient;

/// Owns the read-only configuration and the shared connection pool for the
/// lifetime of the process. Safe to share between concurrent invocations.
pub struct FluxDispatcher {
    config: Arc<FluxConfig>,
    image_client: ImageClient,
}

impl FluxDispatcher {
    /// Load the credential group and open the connection pool.
    pub async fn start<S>(source: &S) -> Result<Self>
    where
        S: CredentialSource + ?Sized,
    {
        let config = FluxConfig::load(source).await?;
        Self::with_config(config)
    }

    pub fn with_config(config: FluxConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| FluxError::Setup(format!("Failed to build HTTP client: {}", e)))?;
        let config = Arc::new(config);

        logger::log_config_info(&config);
        log::info!("Flux dispatcher started");

        Ok(Self {
            image_client: ImageClient::new(http, config.clone()),
            config,
        })
    }

    /// Release the connection pool. Dropping the dispatcher does the same.
    pub fn stop(self) {
        log::info!("Stopping flux dispatcher");
    }

    pub fn config(&self) -> &FluxConfig {
        &self.config
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub async fn generate_image(
        &self,
        prompt: &str,
        model: Option<&str>,
        size: Option<&str>,
    ) -> Result<Bytes> {
        self.image_client.generate_image(prompt, model, size).await
    }

    pub fn deliver(data: Bytes, prompt: &str) -> ImageAttachment {
        ImageAttachment::new(data, prompt)
    }

    /// Run one command end to end. User-facing failures come back as
    /// `CommandOutcome`; anything else is returned as `Err` for the host.
    pub async fn handle_command(&self, raw: &str) -> Result<CommandOutcome> {
        let invocation = Uuid::new_v4();

        let request = match parse_command(raw) {
            Ok(request) => request,
            Err(invalid) => {
                log::warn!("[{}] Rejected size value: {:?}", invocation, invalid.0);
                return Ok(CommandOutcome::InvalidSize(invalid));
            }
        };

        let _timer = logger::timer(&format!("invocation {}", invocation));

        let generated = self
            .generate_image(
                &request.prompt,
                request.model.as_deref(),
                request.size.as_deref(),
            )
            .await;

        match generated {
            Ok(data) => {
                let model = self
                    .image_client
                    .effective_model(request.model.as_deref())
                    .to_string();
                Ok(CommandOutcome::Generated {
                    attachment: Self::deliver(data, &request.prompt),
                    prompt: request.prompt,
                    model,
                })
            }
            Err(e) if e.is_user_facing() => {
                log::warn!("[{}] Image generation failed: {}", invocation, e);
                Ok(CommandOutcome::Failed(e))
            }
            Err(e) => {
                log::error!("[{}] Unexpected failure: {}", invocation, e);
                Err(e)
            }
        }
    }
}

impl Drop for FluxDispatcher {
    fn drop(&mut self) {
        log::debug!("Connection pool released");
    }
}
