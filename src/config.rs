use std::path::PathBuf;

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub data_dir: PathBuf,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Config {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    // Read variables, falling back to the conventional export location
    let data_dir = std::env::var("STREAMING_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    Config {
        data_dir: PathBuf::from(data_dir),
    }
}
