pub mod codec;
pub mod graphics;
pub mod layers;
pub mod navigator;
pub mod pipeline;

pub use graphics::GraphicService;
pub use layers::LayerService;
pub use pipeline::RasterPipeline;
