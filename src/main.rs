use clap::Parser;
use fluximg::logger::{self, LogLevel, LoggerConfig};
use fluximg::{help_text, EnvCredentials, FluxDispatcher};
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate an image from a prompt, e.g. `fluximg a red fox --model=sdxl --size=1024x1024`.
///
/// Credentials come from FLUX_MODEL, FLUX_SIZE, FLUX_ENDPOINT and FLUX_KEY
/// (a `.env` file in the working directory is loaded first).
#[derive(Debug, Parser)]
#[command(name = "fluximg", version)]
struct Cli {
    /// Directory the generated image is written to
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, env = "FLUX_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Emit log lines as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the model aliases and exit
    #[arg(long)]
    list_models: bool,

    /// Prompt text with optional --model=<alias> and --size=<W>x<H> tokens
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let log_config = LoggerConfig::new()
        .with_level(cli.log_level)
        .with_json_output(cli.json_logs);
    if let Err(e) = logger::init_with_config(log_config) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    if cli.list_models {
        println!("{}", help_text());
        return ExitCode::SUCCESS;
    }

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let dispatcher = FluxDispatcher::start(&EnvCredentials::new()).await?;

    let outcome = dispatcher.handle_command(&cli.command.join(" ")).await;
    dispatcher.stop();

    let outcome = outcome?;
    let success = outcome.is_success();
    let reply = outcome.into_reply();

    if let Some(content) = &reply.content {
        println!("{}", content);
    }
    if let Some(description) = &reply.embed_description {
        println!("{}", description);
    }
    if let Some(attachment) = &reply.attachment {
        let path = attachment.write_to(&cli.output_dir).await?;
        println!("Saved {} ({} bytes)", path.display(), attachment.len());
    }

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
