/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_BASE_URL: &str = "";
pub const DEFAULT_STATIC_DIR: &str = "literallycanvas";

// Storage defaults
pub const DEFAULT_IMAGE_PATH: &str = "images";
pub const DEFAULT_MAX_SIZE: u64 = 50_000_000; // 50MB
pub const DEFAULT_MAX_COUNT: usize = 500;

// Ingestion defaults
pub const DEFAULT_MAX_IMAGE_SIZE: u64 = 10_000_000; // 10MB
pub const DEFAULT_MIN_DELAY_SECS: u64 = 5;
