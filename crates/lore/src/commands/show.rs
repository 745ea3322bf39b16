//! `lore show` command implementation.

use std::io::Write;

use clap::Args;
use lore_site::{NavigationError, Navigator, PageView};

use super::{ContentArgs, build_navigator};
use crate::error::CliError;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    #[command(flatten)]
    content: ContentArgs,

    /// Discipline slug (default: lowest-order discipline).
    discipline: Option<String>,

    /// Language slug (default: the discipline's first language).
    #[arg(requires = "discipline")]
    language: Option<String>,

    /// Node slug (default: the discipline's root node).
    #[arg(requires = "language")]
    node: Option<String>,

    /// Enable verbose output (navigation logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ShowArgs {
    /// Execute the show command, printing the page view JSON to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page cannot be assembled.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.content.load_config(None, None)?;
        let navigator = build_navigator(&config)?;

        let view = view(
            &navigator,
            self.discipline.as_deref(),
            self.language.as_deref(),
            self.node.as_deref(),
        )?;

        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &view)?;
        writeln!(stdout)?;
        Ok(())
    }
}

/// Dispatch to the navigator entry point matching the supplied slugs.
fn view(
    navigator: &Navigator,
    discipline: Option<&str>,
    language: Option<&str>,
    node: Option<&str>,
) -> Result<PageView, NavigationError> {
    match (discipline, language, node) {
        (Some(d), Some(l), Some(n)) => navigator.node_view(d, l, n),
        (Some(d), Some(l), None) => navigator.language_view(d, l),
        (Some(d), None, _) => navigator.discipline_view(d),
        (None, _, _) => navigator.default_view(),
    }
}
