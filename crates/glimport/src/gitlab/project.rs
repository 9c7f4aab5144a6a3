//! Project name resolution

use colored::Colorize;
use glimport_core::gitlab::{find_project_by_path, GitLabProject};
use serde::{Deserialize, Serialize};

use super::{GitLabClient, GitLabConfig};
use crate::prelude::{println, *};

/// Search page size; only the first page is consulted
const SEARCH_PAGE_SIZE: u32 = 100;

/// Options for resolving a project
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ResolveOptions {
    /// Project path (e.g., "web" for acme/web)
    #[clap(env = "GITLAB_PROJECT")]
    pub project: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Resolve a project name to the project whose path matches it exactly.
///
/// Request failures are wrapped as [`Error::ProjectLookup`]; a search without
/// an exact match is [`Error::ProjectNotFound`].
pub async fn resolve_project(client: &GitLabClient, name: &str) -> Result<GitLabProject, Error> {
    let search_path = format!(
        "projects?per_page={}&search={}",
        SEARCH_PAGE_SIZE,
        urlencoding::encode(name)
    );

    let projects: Vec<GitLabProject> = client
        .get(&search_path)
        .await
        .map_err(|e| Error::ProjectLookup(Box::new(e)))?;

    debug!("project search for '{}' returned {} result(s)", name, projects.len());

    let project = find_project_by_path(&projects, name)
        .cloned()
        .ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;

    info!(
        "resolved project '{}' to {} (id {})",
        name, project.path_with_namespace, project.id
    );
    Ok(project)
}

/// Handle the resolve command
pub async fn handler(options: ResolveOptions, global: crate::Global) -> Result<()> {
    let config = GitLabConfig::load(global.base_url, global.token, global.timeout)?;

    if global.verbose {
        println!("Resolving project {} on {}...", options.project, config.web_base());
    }

    let client = GitLabClient::new(&config)?;
    let project = resolve_project(&client, &options.project).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row![
            "ID".bold().cyan(),
            project.id.to_string().green()
        ]);
        table.add_row(prettytable::row![
            "Name".bold().cyan(),
            project.name.bright_white()
        ]);
        table.add_row(prettytable::row![
            "Path".bold().cyan(),
            project.path_with_namespace.bright_blue()
        ]);
        table.add_row(prettytable::row![
            "URL".bold().cyan(),
            project.web_url.bright_black()
        ]);
        table.printstd();
    }

    Ok(())
}
