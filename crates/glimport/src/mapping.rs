//! Mapping table loading and the `mapping` command

use std::path::{Path, PathBuf};

use glimport_core::mapping::{MappingConfig, StatusTableVersion};

use crate::prelude::{println, *};

/// Where the mapping tables come from
#[derive(Debug, clap::Args, Clone, Default)]
pub struct MappingOptions {
    /// TOML file overriding the built-in mapping tables
    #[arg(long, env = "GLIMPORT_MAPPING")]
    pub mapping: Option<PathBuf>,

    /// Built-in status table revision (v1 or v2); wins over the mapping file
    #[arg(long)]
    pub status_table: Option<StatusTableVersion>,
}

impl MappingOptions {
    /// Build the effective mapping configuration
    pub fn load(&self) -> Result<MappingConfig> {
        let mut config = match &self.mapping {
            Some(path) => load_mapping_file(path)?,
            None => MappingConfig::default(),
        };

        if let Some(version) = self.status_table {
            config.status_table = version;
            config.replace_status_rules(version.rules());
        }

        Ok(config)
    }
}

/// Read and validate a TOML mapping file
pub fn load_mapping_file(path: &Path) -> Result<MappingConfig> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read mapping file {}", path.display()))?;

    let config = MappingConfig::from_toml_str(&contents)
        .wrap_err_with(|| format!("Invalid mapping file {}", path.display()))?;

    debug!(
        "loaded mapping file {} ({} status rule(s), {} directory entr(ies))",
        path.display(),
        config.status_rules.len(),
        config.users.len()
    );
    Ok(config)
}

/// Options for the mapping command
#[derive(Debug, clap::Args, Clone)]
pub struct MappingCommandOptions {
    #[clap(flatten)]
    pub source: MappingOptions,

    /// Output as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

/// Print the effective mapping tables
pub fn handler(options: MappingCommandOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        match &options.source.mapping {
            Some(path) => println!("Using mapping file {}", path.display()),
            None => println!("Using built-in mapping tables"),
        }
    }

    let config = options.source.load()?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", config.to_toml_string()?);
    }

    Ok(())
}
