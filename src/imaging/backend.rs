//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the asset pipeline
//! needs: identify and optimize. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::OptimizeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One encoded output image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// A re-encoded master plus its responsive variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedImage {
    pub master: EncodedImage,
    /// `(tier name, image)` pairs, narrowest first.
    pub variants: Vec<(&'static str, EncodedImage)>,
}

/// Trait for image processing backends.
///
/// Implementations are synchronous and CPU-bound.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions from encoded bytes.
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError>;

    /// Re-encode at natural size and at every breakpoint that fits.
    fn optimize(&self, bytes: &[u8], params: &OptimizeParams)
        -> Result<OptimizedImage, BackendError>;
}
