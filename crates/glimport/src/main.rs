use crate::prelude::*;
use clap::Parser;

mod error;
mod gitlab;
mod import;
mod mapping;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Import open GitLab issues into a destination-neutral format"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// GitLab instance URL
    #[clap(long, env = "GITLAB_BASE_URL", global = true)]
    base_url: Option<String>,

    /// GitLab personal access token
    #[clap(long, env = "GITLAB_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Per-request timeout in seconds (default 30)
    #[clap(long, env = "GITLAB_TIMEOUT_SECS", global = true)]
    timeout: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "GLIMPORT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Import the open issues of a GitLab project
    Import(crate::import::ImportOptions),

    /// Resolve a project path to its GitLab project
    Resolve(crate::gitlab::project::ResolveOptions),

    /// Print the effective label/status/priority/assignee mapping tables
    Mapping(crate::mapping::MappingCommandOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Import(options) => crate::import::handler(options, app.global).await,
        SubCommands::Resolve(options) => crate::gitlab::project::handler(options, app.global).await,
        SubCommands::Mapping(options) => crate::mapping::handler(options, app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
