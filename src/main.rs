use city_raster::config::Command;
use city_raster::core::codec;
use city_raster::utils::{logger, validation::Validate};
use city_raster::{AppConfig, CliConfig, HttpDownloader, RasterPipeline, Result, WorldPopClient};
use clap::Parser;
use serde::Serialize;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match cli.load_app_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    logger::init_logger(&config.logging, cli.verbose);
    tracing::info!("Starting city-raster");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli.command(), &config).await {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Serve => city_raster::serve(config).await,
        Command::Files { country_code } => {
            let files = pipeline(config)?.get_raster_file_list(&country_code).await?;
            print_json(&files)
        }
        Command::Images { country_code } => {
            let images = pipeline(config)?
                .get_population_images(&country_code)
                .await?;
            print_json(&images)
        }
        Command::Png {
            country_code,
            output,
        } => {
            let png = pipeline(config)?.get_raster_as_png(&country_code).await?;
            let output = output.unwrap_or_else(|| format!("{}_map.png", country_code.trim()));
            std::fs::write(&output, png)?;
            tracing::info!("📁 PNG saved to: {}", output);
            println!("✅ {}", output);
            Ok(())
        }
        Command::Convert { input, output } => {
            let output = output.unwrap_or_else(|| {
                Path::new(&input)
                    .with_extension("png")
                    .to_string_lossy()
                    .into_owned()
            });
            let png = tokio::task::spawn_blocking(move || codec::convert_file(&input))
                .await
                .map_err(|e| city_raster::RasterError::EncodeFailure {
                    message: format!("conversion task failed: {}", e),
                })??;
            std::fs::write(&output, png)?;
            tracing::info!("📁 PNG saved to: {}", output);
            println!("✅ {}", output);
            Ok(())
        }
    }
}

fn pipeline(config: &AppConfig) -> Result<RasterPipeline<WorldPopClient, HttpDownloader>> {
    Ok(RasterPipeline::new(
        WorldPopClient::new(&config.provider, &config.http)?,
        HttpDownloader::new(&config.http)?,
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        city_raster::RasterError::EncodeFailure {
            message: format!("failed to render JSON: {}", e),
        }
    })?;
    println!("{}", text);
    Ok(())
}
