//! Configuration management for imagemill.
//!
//! All settings come from command-line arguments or environment variables
//! with the `IMAGEMILL_` prefix, and are fixed at process start.
//!
//! # Environment Variables
//!
//! - `IMAGEMILL_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMAGEMILL_PORT` - Server port (default: 3000)
//! - `IMAGEMILL_IMAGE_DIR` - Directory holding original images
//! - `IMAGEMILL_STATIC_DIR` - Directory served as static files ("" disables)
//! - `IMAGEMILL_CACHE_ENTRIES` - Max cached derivatives (default: 256)
//! - `IMAGEMILL_CACHE_TTL` - Derivative TTL in seconds (default: 600)
//! - `IMAGEMILL_DEFAULT_WIDTH` - Width used when none is requested (default: 800)
//! - `IMAGEMILL_JPEG_QUALITY` - Output JPEG quality (default: 80)
//! - `IMAGEMILL_CACHE_MAX_AGE` - HTTP Cache-Control max-age seconds (default: 600)
//! - `IMAGEMILL_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::derivative::{DEFAULT_CACHE_ENTRIES, DEFAULT_JPEG_QUALITY, DEFAULT_WIDTH};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default directory for original images.
pub const DEFAULT_IMAGE_DIR: &str = "public/images";

/// Default directory for static files.
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Default derivative TTL in seconds (ten minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Default HTTP Cache-Control max-age in seconds (ten minutes).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// imagemill - an on-demand image derivative server.
///
/// Serves width-adapted, re-encoded derivatives of images stored in a local
/// directory, caching each derivative so repeated requests never transcode
/// twice.
#[derive(Parser, Debug, Clone)]
#[command(name = "imagemill")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMAGEMILL_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMAGEMILL_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Directory containing the original images.
    #[arg(long, default_value = DEFAULT_IMAGE_DIR, env = "IMAGEMILL_IMAGE_DIR")]
    pub image_dir: PathBuf,

    /// Directory served as static files at the site root.
    ///
    /// Pass an empty string to disable static file serving.
    #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "IMAGEMILL_STATIC_DIR")]
    pub static_dir: String,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Maximum number of derivatives to keep in memory.
    #[arg(long, default_value_t = DEFAULT_CACHE_ENTRIES, env = "IMAGEMILL_CACHE_ENTRIES")]
    pub cache_entries: usize,

    /// Time-to-live for cached derivatives, in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS, env = "IMAGEMILL_CACHE_TTL")]
    pub cache_ttl: u64,

    // =========================================================================
    // Derivative Configuration
    // =========================================================================
    /// Output width used when a request does not specify one.
    #[arg(long, default_value_t = DEFAULT_WIDTH, env = "IMAGEMILL_DEFAULT_WIDTH")]
    pub default_width: u32,

    /// JPEG quality for encoded derivatives (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "IMAGEMILL_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// HTTP Cache-Control max-age in seconds for derivative responses.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "IMAGEMILL_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMAGEMILL_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_entries == 0 {
            return Err("cache_entries must be greater than 0".to_string());
        }
        if self.cache_ttl == 0 {
            return Err("cache_ttl must be greater than 0".to_string());
        }
        if self.default_width == 0 {
            return Err("default_width must be greater than 0".to_string());
        }
        if self.default_width > 10_000 {
            return Err("default_width must be at most 10000".to_string());
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }
        if self.image_dir.as_os_str().is_empty() {
            return Err("image_dir is required".to_string());
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Derivative TTL as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Static file directory, if static serving is enabled.
    pub fn static_dir(&self) -> Option<PathBuf> {
        if self.static_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.static_dir))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
