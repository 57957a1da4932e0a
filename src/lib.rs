pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::{HttpDownloader, WorldPopClient};
pub use adapters::storage::InMemoryRepository;
pub use adapters::web::{build_router, serve, AppState};
pub use config::{AppConfig, CliConfig};
pub use core::{GraphicService, LayerService, RasterPipeline};
pub use domain::model::{FileReference, GraphicRecord, Layer, PopulationImage};
pub use utils::error::{RasterError, Result};
