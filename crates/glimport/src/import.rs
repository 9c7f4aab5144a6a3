//! Import orchestration: resolve, fetch, map, aggregate

use std::path::PathBuf;

use colored::Colorize;
use glimport_core::import::{build_import_result, ImportResult};
use glimport_core::mapping::MappingConfig;
use indicatif::{ProgressBar, ProgressStyle};

use crate::gitlab::{issues, project, GitLabClient, GitLabConfig};
use crate::mapping::MappingOptions;
use crate::prelude::{println, *};

/// Options for importing a project
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Import the open issues of acme/web and show a summary:
  glimport import web

  # Print the full import result as JSON:
  glimport import web --json

  # Write the result to a file using a custom mapping file:
  glimport import web --mapping mapping.toml --output web.json

NOTES:
  - The project is matched on its exact path, not its display name
  - Only issues in the opened state are imported; system notes are skipped
  - Any failing request aborts the whole import")]
pub struct ImportOptions {
    /// Project path to import (e.g., "web" for acme/web)
    #[clap(env = "GITLAB_PROJECT")]
    pub project: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the JSON result to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub mapping: MappingOptions,
}

/// Run one import for `project_name`.
///
/// Resolution, issue listing and notes fetching happen strictly in sequence.
/// Either the complete [`ImportResult`] is returned or the first error.
pub async fn run_import(
    client: &GitLabClient,
    project_name: &str,
    mapping: &MappingConfig,
    spinner: Option<&ProgressBar>,
) -> Result<ImportResult, Error> {
    if let Some(s) = spinner {
        s.set_message(format!("Resolving project {project_name}..."));
    }
    let project = project::resolve_project(client, project_name).await?;

    let fetched = issues::fetch_issues(client, &project, spinner).await?;

    let result = build_import_result(fetched, mapping);
    let summary = result.summary();
    info!(
        "imported {} issue(s), {} comment(s), {} label(s), {} user(s) from {}",
        summary.issues,
        summary.comments,
        summary.labels,
        summary.users,
        project.path_with_namespace
    );

    Ok(result)
}

/// Handle the import command
pub async fn handler(options: ImportOptions, global: crate::Global) -> Result<()> {
    let config = GitLabConfig::load(global.base_url, global.token, global.timeout)?;
    let mapping = options.mapping.load()?;

    if global.verbose {
        println!(
            "Importing {} from {} (status table {})...",
            options.project,
            config.web_base(),
            mapping.status_table
        );
    }

    let client = GitLabClient::new(&config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| eyre!("Invalid spinner template: {}", e))?,
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = run_import(&client, &options.project, &mapping, Some(&spinner)).await;
    spinner.finish_and_clear();

    let result = outcome.map_err(|err| {
        let rejected = err.is_authentication();
        let report = color_eyre::eyre::Report::new(err);
        if rejected {
            report.wrap_err("GitLab rejected the token; check GITLAB_TOKEN or --token")
        } else {
            report
        }
    })?;

    if let Some(path) = &options.output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json)
            .wrap_err_with(|| format!("Failed to write import result to {}", path.display()))?;
        if global.verbose {
            println!("Wrote import result to {}", path.display());
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display_result(&result);
    }

    Ok(())
}

/// Display imported issues and totals as a formatted CLI table
fn display_result(result: &ImportResult) {
    if result.issues.is_empty() {
        println!("No open issues found.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Title".bold().cyan(),
        "Status".bold().cyan(),
        "Priority".bold().cyan(),
        "Assignee".bold().cyan(),
        "Labels".bold().cyan(),
        "Comments".bold().cyan()
    ]);

    for issue in &result.issues {
        let priority = match issue.priority {
            0 => "-".to_string(),
            rank => rank.to_string(),
        };
        let assignee = match &issue.assignee_id {
            Some(email) => email.bright_magenta(),
            None => "Unassigned".bright_black(),
        };
        table.add_row(prettytable::row![
            issue.title.bright_white(),
            issue.status.as_str().green(),
            priority.bright_yellow(),
            assignee,
            issue.labels.join(", ").bright_blue(),
            issue.comments.len()
        ]);
    }

    table.printstd();

    let summary = result.summary();
    println!(
        "\n{} issue(s), {} comment(s), {} label(s), {} user(s), {} unassigned",
        summary.issues.to_string().bold(),
        summary.comments.to_string().bold(),
        summary.labels.to_string().bold(),
        summary.users.to_string().bold(),
        summary.unassigned.to_string().bold()
    );
}
