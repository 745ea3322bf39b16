//! CLI command implementations.

pub(crate) mod serve;
pub(crate) mod show;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use lore_config::{Backend, CliSettings, Config};
use lore_content::{ContentRepository, ContentfulRepository, FsRepository};
use lore_site::{HtmlRenderer, Navigator};

use crate::error::CliError;

pub(crate) use serve::ServeArgs;
pub(crate) use show::ShowArgs;

/// Content source arguments shared by all commands.
#[derive(Args)]
pub(crate) struct ContentArgs {
    /// Path to configuration file (default: auto-discover lore.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory for the fs backend (overrides config).
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Content backend: fs or contentful (overrides config).
    #[arg(long)]
    backend: Option<Backend>,
}

impl ContentArgs {
    /// Load configuration, applying these arguments plus extra server overrides.
    fn load_config(self, host: Option<String>, port: Option<u16>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            host,
            port,
            content_dir: self.content_dir,
            backend: self.backend,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Build the navigator over the configured content backend.
fn build_navigator(config: &Config) -> Result<Navigator, CliError> {
    let repository: Arc<dyn ContentRepository> = match config.content_resolved.backend {
        Backend::Fs => Arc::new(FsRepository::new(config.content_resolved.dir.clone())),
        Backend::Contentful => {
            let contentful = config.require_contentful()?;
            Arc::new(ContentfulRepository::new(&lore_content::ContentfulConfig {
                base_url: contentful.base_url.clone(),
                space_id: contentful.space_id.clone(),
                environment: contentful.environment.clone(),
                access_token: contentful.access_token.clone(),
            }))
        }
    };
    let renderer = Arc::new(HtmlRenderer::new().with_gfm(config.render.gfm));
    tracing::info!(
        backend = %config.content_resolved.backend,
        gfm = config.render.gfm,
        io_threads = config.content_resolved.io_threads,
        "Content source configured"
    );

    Ok(Navigator::with_io_threads(
        repository,
        renderer,
        config.content_resolved.io_threads,
    )?)
}

/// Describe the configured content source for startup output.
fn describe_source(config: &Config) -> String {
    match config.content_resolved.backend {
        Backend::Fs => format!(
            "Content directory: {}",
            config.content_resolved.dir.display()
        ),
        Backend::Contentful => config.contentful.as_ref().map_or_else(
            || "Contentful".to_owned(),
            |c| format!("Contentful space: {} ({})", c.space_id, c.environment),
        ),
    }
}
