use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "loyalty-service")]
#[command(about = "Loyalty card and discount program service")]
pub struct CliConfig {
    #[arg(long, default_value = "config.toml", help = "Path to the TOML configuration file")]
    pub config: PathBuf,

    #[arg(long, help = "Override server.http_port from the configuration file")]
    pub port: Option<u16>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Applies command-line overrides on top of the loaded file configuration.
    pub fn apply_overrides(&self, config: &mut super::ServiceConfig) {
        if let Some(port) = self.port {
            config.server.http_port = port;
        }
        if self.verbose {
            config.logs.level = "debug".to_string();
        }
    }
}
