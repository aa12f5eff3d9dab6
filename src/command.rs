use crate::{
    error::FluxError,
    models::{supported_models, GenerationRequest, ImageAttachment},
};
use once_cell::sync::Lazy;
use regex::Regex;

pub const COMMAND_NAME: &str = "flux";
pub const COMMAND_ALIASES: &[&str] = &["f"];

pub const INVALID_SIZE_MESSAGE: &str = "Invalid size value. Please provide a valid resolution in the format 'width:height' (e.g., '1920x1080').";

const MODEL_FLAG: &str = "--model=";
const SIZE_FLAG: &str = "--size=";

static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+x\d+$").unwrap());

/// A `--size=` value that is not `<width>x<height>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSize(pub String);

impl InvalidSize {
    pub fn message(&self) -> &'static str {
        INVALID_SIZE_MESSAGE
    }
}

pub fn is_valid_size(size: &str) -> bool {
    SIZE_PATTERN.is_match(size)
}

// `--model=a=b` yields `a`: the value ends at the next `=`.
fn flag_value<'a>(token: &'a str, flag: &str) -> Option<&'a str> {
    token
        .strip_prefix(flag)
        .map(|rest| rest.split('=').next().unwrap_or_default())
}

/// Split free text into prompt and options. Stops at the first malformed
/// `--size=` value.
pub fn parse_command(raw: &str) -> Result<GenerationRequest, InvalidSize> {
    let mut request = GenerationRequest::default();
    let mut prompt_parts = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(model) = flag_value(token, MODEL_FLAG) {
            request.model = Some(model.to_string());
        } else if let Some(size) = flag_value(token, SIZE_FLAG) {
            if !is_valid_size(size) {
                return Err(InvalidSize(size.to_string()));
            }
            request.size = Some(size.to_string());
        } else {
            prompt_parts.push(token);
        }
    }

    request.prompt = prompt_parts.join(" ");
    Ok(request)
}

/// Result of one command invocation.
#[derive(Debug)]
pub enum CommandOutcome {
    Generated {
        attachment: ImageAttachment,
        prompt: String,
        model: String,
    },
    InvalidSize(InvalidSize),
    Failed(FluxError),
}

/// What the host should send back to the channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub content: Option<String>,
    pub embed_description: Option<String>,
    pub attachment: Option<ImageAttachment>,
    /// Reply as a reference to the invoking message.
    pub reference_invoker: bool,
    pub mention_invoker: bool,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Generated { .. })
    }

    pub fn into_reply(self) -> Reply {
        match self {
            CommandOutcome::Generated {
                attachment,
                prompt,
                model,
            } => Reply {
                embed_description: Some(format!("Prompt: {}; Model: {};", prompt, model)),
                attachment: Some(attachment),
                ..Default::default()
            },
            CommandOutcome::InvalidSize(invalid) => Reply {
                content: Some(invalid.message().to_string()),
                ..Default::default()
            },
            CommandOutcome::Failed(err) => {
                let content = match &err {
                    FluxError::Http { status, message } => format!(
                        "Error?: `{}`\n{}",
                        status.map_or_else(|| "none".to_string(), |s| s.to_string()),
                        message
                    ),
                    other => format!("Something went wrong...\n{}", other),
                };
                Reply {
                    content: Some(content),
                    reference_invoker: true,
                    mention_invoker: false,
                    ..Default::default()
                }
            }
        }
    }
}

pub fn help_text() -> String {
    let mut lines = vec![
        "**Arguments:**".to_string(),
        "- `<prompt>` - A detailed description of the image you want to create.".to_string(),
        "- `--model` - Choose the specific model to use for image generation.".to_string(),
        "- `--size` - Resolution for the generated image.".to_string(),
        String::new(),
        "**Models:**".to_string(),
    ];
    for (alias, _, description) in supported_models() {
        lines.push(format!("- `{}` - {}", alias, description));
    }
    lines.push(String::new());
    lines.push(format!("Version: **{}**", env!("CARGO_PKG_VERSION")));
    lines.push(format!("Author: **{}**", env!("CARGO_PKG_AUTHORS")));
    lines.push(format!("Aliases: **{}**", COMMAND_ALIASES.join(", ")));
    lines.join("\n")
}
