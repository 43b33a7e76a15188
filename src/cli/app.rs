// ABOUTME: Main application orchestration for the stevedore CLI
// ABOUTME: Coordinates between CLI arguments, configuration, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands::{self, Action};
use super::{Args, Commands, Config};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting stevedore v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);
        debug!("Template directory: {}", self.config.template_dir.display());

        match args.command {
            Commands::List { json } => commands::list_projects(json, &self.config).await,
            Commands::Scan => commands::scan(&self.config).await,

            // update is a full re-render and re-apply
            Commands::Install { name } | Commands::Update { name } => {
                commands::install(name, &self.config).await
            }

            Commands::Start { name } => {
                commands::lifecycle(Action::Start, name, &self.config).await
            }
            Commands::Stop { name } => commands::lifecycle(Action::Stop, name, &self.config).await,
            Commands::Restart { name } => {
                commands::lifecycle(Action::Restart, name, &self.config).await
            }

            Commands::RenderDir { dir, output } => {
                commands::render_dir(dir, output, &self.config).await
            }
            Commands::RenderFile { file, output } => {
                commands::render_file(file, output, &self.config).await
            }
        }
    }

    /// Create application from parsed command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}
