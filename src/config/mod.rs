pub mod cli;
pub mod toml_config;

pub use cli::Command;
pub use toml_config::{AppConfig, HttpConfig, LogFormat, LoggingConfig, ProviderConfig, ServerConfig};

use crate::utils::error::Result;
use clap::Parser;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "city-raster")]
#[command(about = "Population raster backend: WorldPop lookup, TIFF to PNG conversion, layer storage")]
pub struct CliConfig {
    #[arg(short, long, default_value = "city-raster.toml", help = "Path to TOML configuration file")]
    pub config: String,

    #[arg(long, help = "Override server.host")]
    pub host: Option<String>,

    #[arg(long, help = "Override server.port")]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl CliConfig {
    /// 載入設定檔（不存在時使用預設值），再套用命令列覆蓋
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = if Path::new(&self.config).exists() {
            AppConfig::from_file(&self.config)?
        } else {
            AppConfig::default()
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
