pub mod command;
pub mod config;
pub mod error;
pub mod flux;
pub mod logger;
pub mod models;

pub use command::{
    help_text, parse_command, CommandOutcome, InvalidSize, Reply, COMMAND_ALIASES, COMMAND_NAME,
};
pub use config::{CredentialSource, EnvCredentials, FluxConfig};
pub use error::{FluxError, Result};
pub use flux::{FluxDispatcher, ImageClient};
pub use models::{
    resolve_alias, supported_models, GenerationRequest, ImageAttachment,
};
