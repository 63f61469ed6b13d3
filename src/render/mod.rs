//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (Chromium via chromiumoxide). Every page gets its own
//! context; contexts are never shared between concurrent workers.

pub mod chromium;

pub use chromium::ChromiumRenderer;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("navigation to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("screenshot failed: {0}")]
    Screenshot(String),

    #[error("browser protocol error: {0}")]
    Protocol(String),
}

/// Browser window size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Per-context settings applied before navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    pub viewport: Viewport,
    pub user_agent: String,
}

impl ContextOptions {
    pub fn from_config(config: &crate::config::CrawlerConfig) -> Self {
        Self {
            viewport: Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
            },
            user_agent: config.user_agent.clone(),
        }
    }
}

/// A browser engine that can create isolated rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new isolated context with the given viewport and user agent.
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn RenderContext>, RenderError>;
    /// Number of currently open contexts.
    fn active_contexts(&self) -> usize;
}

/// A single isolated browser context holding one page.
#[async_trait]
pub trait RenderContext: Send {
    /// Navigate to a URL and wait until the load has settled, bounded by `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError>;
    /// The final rendered HTML of the page.
    async fn html(&self) -> Result<String, RenderError>;
    /// A full-page PNG screenshot.
    async fn screenshot(&self) -> Result<Vec<u8>, RenderError>;
    /// Close the context and release its resources.
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}
