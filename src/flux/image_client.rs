use crate::{
    config::FluxConfig,
    error::{FluxError, Result},
    models::{resolve_alias, ImagesGenerationBody, ImagesGenerationResponse},
};
use bytes::Bytes;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct ImageClient {
    http: Client,
    config: Arc<FluxConfig>,
}

impl ImageClient {
    pub fn new(http: Client, config: Arc<FluxConfig>) -> Self {
        Self { http, config }
    }

    /// Alias the invocation actually runs with: the explicit one, else the
    /// configured default.
    pub fn effective_model<'a>(&'a self, model: Option<&'a str>) -> &'a str {
        model
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.default_model.as_str())
    }

    pub fn effective_size<'a>(&'a self, size: Option<&'a str>) -> &'a str {
        size.filter(|s| !s.is_empty())
            .unwrap_or(self.config.default_size.as_str())
    }

    pub async fn generate_image(
        &self,
        prompt: &str,
        model: Option<&str>,
        size: Option<&str>,
    ) -> Result<Bytes> {
        let alias = self.effective_model(model);
        let backend_model = resolve_alias(alias).ok_or_else(|| FluxError::model_not_found(alias))?;
        let size = self.effective_size(size);

        let body = ImagesGenerationBody::new(prompt, size, backend_model);

        log::info!(
            "Generating image with model: {} ({}), size: {}",
            alias,
            backend_model,
            size
        );
        log::debug!("Image generation prompt: {}", prompt);

        let response = self
            .http
            .post(self.config.generations_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Image generation rejected with status {}", status);
            return Err(FluxError::status(status));
        }

        let generation: ImagesGenerationResponse = response.json().await?;
        let image_url = generation
            .data
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| FluxError::Response("No images generated".into()))?;

        log::debug!("Fetching generated image from {}", image_url);

        let image = self.http.get(&image_url).send().await?.bytes().await?;

        log::info!("Downloaded generated image ({} bytes)", image.len());
        Ok(image)
    }
}
