//! Image re-encoding for the asset pipeline.
//!
//! ## Module layout
//!
//! - `backend`: the `ImageBackend` trait and its result types
//! - `params`: quality and breakpoint parameters
//! - `calculations`: pure variant-selection and scaling math
//! - `rust_backend`: the `image`-crate implementation (AVIF output)
//!
//! Backends are synchronous. Callers run them on tokio's blocking pool.

pub mod backend;
pub mod calculations;
pub mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend, OptimizedImage};
pub use calculations::{scaled_height, select_breakpoints};
pub use params::{Breakpoint, OptimizeParams, Quality, BREAKPOINTS, OUTPUT_EXTENSION};
pub use rust_backend::RustBackend;
