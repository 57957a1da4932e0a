use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve,

    /// Print the raster file references for a country
    Files { country_code: String },

    /// Print the population density images for a country
    Images { country_code: String },

    /// Resolve, download and convert the first raster of a country
    Png {
        country_code: String,

        /// Output path, defaults to <code>_map.png
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Convert a local raster file to PNG
    Convert {
        input: String,

        /// Output path, defaults to the input name with a .png extension
        #[arg(short, long)]
        output: Option<String>,
    },
}
