pub mod downloader;
pub mod provider_client;

pub use downloader::HttpDownloader;
pub use provider_client::WorldPopClient;
