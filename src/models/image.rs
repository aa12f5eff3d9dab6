use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One parsed command, fresh per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub size: Option<String>,
}

/// JSON body for `POST /v1/images/generations`.
#[derive(Debug, Clone, Serialize)]
pub struct ImagesGenerationBody<'a> {
    pub prompt: &'a str,
    pub n: u32,
    pub size: &'a str,
    pub response_format: &'a str,
    pub model: &'a str,
}

impl<'a> ImagesGenerationBody<'a> {
    pub fn new(prompt: &'a str, size: &'a str, model: &'a str) -> Self {
        Self {
            prompt,
            n: 1,
            size,
            response_format: "url",
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImagesGenerationResponse {
    pub data: Vec<ImageUrl>,
}

#[derive(Debug, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Generated image bytes packaged for the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub data: Bytes,
    pub filename: String,
}

impl ImageAttachment {
    pub fn new(data: impl Into<Bytes>, prompt: &str) -> Self {
        Self {
            data: data.into(),
            filename: attachment_filename(prompt),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.data).await?;
        Ok(path)
    }
}

/// Spaces become underscores; nothing else is touched.
pub fn attachment_filename(prompt: &str) -> String {
    format!("{}.png", prompt.replace(' ', "_"))
}
