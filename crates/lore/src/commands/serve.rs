//! `lore serve` command implementation.

use clap::Args;
use lore_server::{ServerConfig, run_server};

use super::{ContentArgs, build_navigator, describe_source};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    content: ContentArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (request and navigation logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.content.load_config(self.host, self.port)?;
        let navigator = build_navigator(&config)?;

        output.highlight(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&describe_source(&config));
        if !config.render.gfm {
            output.info("GitHub Flavored Markdown: disabled");
        }

        let server_config = ServerConfig::from_config(&config, version.to_owned());
        run_server(server_config, navigator)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
