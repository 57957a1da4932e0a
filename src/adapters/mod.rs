// Adapters layer: concrete implementations for external systems (provider api, raster host, storage, web)

pub mod http;
pub mod storage;
pub mod web;
