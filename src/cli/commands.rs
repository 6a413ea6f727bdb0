//! Command-line interface definition and execution

use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use crate::blob::{AzureBlobStore, PublicAccessLevel};
use crate::config::{Config, MAX_PAGE_SIZE};
use crate::error::Result;
use crate::quickstart;
use crate::utils::interactive::console_pause;

/// Get the full version string with build information
fn get_version() -> &'static str {
    env!("VERSION_WITH_GIT")
}

fn parse_public_access(value: &str) -> std::result::Result<PublicAccessLevel, String> {
    value.parse::<PublicAccessLevel>().map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "quickblob")]
#[command(about = "Azure Blob Storage quickstart: create a container, upload a file, list, download and clean up")]
#[command(version = get_version(), author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Configuration file (defaults to ~/.config/quickblob/quickblob.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Storage connection string (overrides the storageconnectionstring variable)
    #[arg(long, value_name = "CONNECTION_STRING")]
    pub connection_string: Option<String>,

    /// Directory the sample file is written to (defaults to the documents folder)
    #[arg(long, value_name = "DIR")]
    pub local_dir: Option<PathBuf>,

    /// Prefix of the generated container name
    #[arg(long, value_name = "PREFIX")]
    pub container_prefix: Option<String>,

    /// Anonymous access level of the new container (none, blob, container)
    #[arg(long, value_name = "LEVEL", value_parser = parse_public_access)]
    pub public_access: Option<PublicAccessLevel>,

    /// Number of blobs requested per listing page
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_SIZE as i64))]
    pub page_size: Option<u32>,

    /// Do not wait for a key press between steps
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print a JSON report of the run when it finishes. The report follows
    /// the sample's console output on stdout, after the last progress line.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Apply command-line flags on top of file and environment settings
    pub fn apply_to(&self, config: &mut Config) {
        if self.debug {
            config.debug = true;
        }
        if let Some(value) = &self.connection_string {
            config.connection_string = Some(value.clone());
        }
        if let Some(dir) = &self.local_dir {
            config.local_dir = Some(dir.clone());
        }
        if let Some(prefix) = &self.container_prefix {
            config.container_prefix = prefix.clone();
        }
        if let Some(level) = self.public_access {
            config.public_access = level;
        }
        if let Some(size) = self.page_size {
            config.page_size = Some(size);
        }
        if self.yes {
            config.interactive = false;
        }
        if self.json {
            config.output_json = true;
        }
    }

    /// Run the quickstart with the given configuration
    pub async fn execute(&self, mut config: Config) -> Result<()> {
        self.apply_to(&mut config);
        debug!("Effective configuration: {:?}", config);

        println!("Azure Blob Storage - Rust quickstart sample");
        println!();

        let pause = console_pause(config.interactive);
        let report = quickstart::execute(&config, pause.as_ref(), AzureBlobStore::new).await?;

        if config.output_json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        pause.wait("Press any key to exit the sample application.").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_required() {
        let cli = Cli::try_parse_from(["quickblob"]).unwrap();
        assert!(!cli.yes);
        assert!(cli.connection_string.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "quickblob",
            "--connection-string",
            "UseDevelopmentStorage=true",
            "--local-dir",
            "/tmp/qb",
            "--container-prefix",
            "demo",
            "--public-access",
            "none",
            "--page-size",
            "10",
            "-y",
            "--json",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.connection_string.as_deref(), Some("UseDevelopmentStorage=true"));
        assert_eq!(config.local_dir, Some(PathBuf::from("/tmp/qb")));
        assert_eq!(config.container_prefix, "demo");
        assert_eq!(config.public_access, PublicAccessLevel::None);
        assert_eq!(config.page_size, Some(10));
        assert!(!config.interactive);
        assert!(config.output_json);
    }

    #[test]
    fn test_json_help_states_report_comes_last() {
        let command = Cli::command();
        let json = command
            .get_arguments()
            .find(|arg| arg.get_id() == "json")
            .unwrap();
        let help = json.get_long_help().or(json.get_help()).unwrap().to_string();
        assert!(help.contains("after the last progress line"));
    }

    #[test]
    fn test_invalid_flag_values_rejected() {
        assert!(Cli::try_parse_from(["quickblob", "--page-size", "0"]).is_err());
        assert!(Cli::try_parse_from(["quickblob", "--page-size", "5001"]).is_err());
        assert!(Cli::try_parse_from(["quickblob", "--public-access", "world"]).is_err());
    }
}
