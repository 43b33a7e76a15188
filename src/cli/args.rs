// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the control actions and the standalone render modes for stevedore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stevedore")]
#[command(about = "Render templated compose projects and manage their deployments")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List declared projects merged with live container state
    List {
        #[arg(long, help = "Print the registry as JSON")]
        json: bool,
    },

    /// List projects discovered under the template directory
    Scan,

    /// Render a project and deploy it with docker compose
    Install {
        #[arg(help = "Project name")]
        name: String,
    },

    /// Re-render a project and apply it again (same as install)
    Update {
        #[arg(help = "Project name")]
        name: String,
    },

    /// Start a project's container
    Start {
        #[arg(help = "Project name")]
        name: String,
    },

    /// Stop a project's container
    Stop {
        #[arg(help = "Project name")]
        name: String,
    },

    /// Stop and start a project's container
    Restart {
        #[arg(help = "Project name")]
        name: String,
    },

    /// Render a template directory into the output directory
    #[command(name = "render-dir", visible_alias = "dir")]
    RenderDir {
        #[arg(help = "Directory containing template files")]
        dir: PathBuf,

        #[arg(short, long, help = "Output directory (defaults to output_dir)")]
        output: Option<PathBuf>,
    },

    /// Render a single template file into the output directory
    #[command(name = "render-file", visible_alias = "file")]
    RenderFile {
        #[arg(help = "Single template file to process")]
        file: PathBuf,

        #[arg(short, long, help = "Output directory (defaults to output_dir)")]
        output: Option<PathBuf>,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_install() {
        let args = Args::try_parse_from(["stevedore", "install", "api"]).unwrap();
        match args.command {
            Commands::Install { name } => assert_eq!(name, "api"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_render_dir_with_global_flags() {
        let args = Args::try_parse_from([
            "stevedore",
            "render-dir",
            "./templates",
            "-o",
            "./out",
            "--verbose",
            "--config",
            "custom.yml",
        ])
        .unwrap();

        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("custom.yml")));
        match args.command {
            Commands::RenderDir { dir, output } => {
                assert_eq!(dir, PathBuf::from("./templates"));
                assert_eq!(output, Some(PathBuf::from("./out")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_lifecycle_requires_name() {
        assert!(Args::try_parse_from(["stevedore", "stop"]).is_err());
    }
}
