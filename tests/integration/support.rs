//! Shared mocks for the integration tests

use async_trait::async_trait;
use sitelift::config::CrawlerConfig;
use sitelift::imaging::{
    BackendError, Dimensions, EncodedImage, ImageBackend, OptimizeParams, OptimizedImage,
};
use sitelift::render::{ContextOptions, RenderContext, RenderError, Renderer};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bytes returned as every screenshot
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nmock-screenshot";

#[derive(Debug, Default)]
struct Counters {
    active: AtomicUsize,
    max_active: AtomicUsize,
    opened: AtomicUsize,
}

/// Renderer serving canned HTML per URL
#[derive(Debug, Default)]
pub struct MockRenderer {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Duration,
    counters: Arc<Counters>,
    navigated: Arc<Mutex<Vec<String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Navigation to `url` fails with a navigation error
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Time each navigation takes
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_active(&self) -> usize {
        self.counters.max_active.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn navigated(&self) -> Vec<String> {
        self.navigated.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn new_context(
        &self,
        _options: &ContextOptions,
    ) -> Result<Box<dyn RenderContext>, RenderError> {
        let counters = Arc::clone(&self.counters);
        counters.opened.fetch_add(1, Ordering::SeqCst);
        let now = counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_active.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(MockContext {
            pages: self.pages.clone(),
            failing: self.failing.clone(),
            delay: self.delay,
            counters,
            navigated: Arc::clone(&self.navigated),
            html: None,
        }))
    }

    fn active_contexts(&self) -> usize {
        self.counters.active.load(Ordering::SeqCst)
    }
}

struct MockContext {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Duration,
    counters: Arc<Counters>,
    navigated: Arc<Mutex<Vec<String>>>,
    html: Option<String>,
}

#[async_trait]
impl RenderContext for MockContext {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), RenderError> {
        self.navigated.lock().unwrap().push(url.to_string());
        tokio::time::sleep(self.delay).await;

        if self.failing.contains(url) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }

        match self.pages.get(url) {
            Some(html) => {
                self.html = Some(html.clone());
                Ok(())
            }
            None => Err(RenderError::Navigation {
                url: url.to_string(),
                message: "404".to_string(),
            }),
        }
    }

    async fn html(&self) -> Result<String, RenderError> {
        self.html
            .clone()
            .ok_or_else(|| RenderError::Protocol("no page loaded".to_string()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, RenderError> {
        Ok(FAKE_PNG.to_vec())
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Crawler settings suited to tests: no settle delay, short timeouts
pub fn crawler_config(concurrency: usize) -> CrawlerConfig {
    CrawlerConfig {
        concurrency,
        navigation_timeout_ms: 2_000,
        settle_delay_ms: 0,
        ..CrawlerConfig::default()
    }
}

/// A minimal HTML page
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

/// Image backend that reads real headers and fakes the encoder
///
/// Outputs are zero-filled buffers, a tenth of the input size, so every
/// optimized image is smaller than its original.
#[derive(Debug, Default)]
pub struct FakeEncoder {
    pub fail: bool,
}

impl ImageBackend for FakeEncoder {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| BackendError::ProcessingFailed(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn optimize(
        &self,
        bytes: &[u8],
        params: &OptimizeParams,
    ) -> Result<OptimizedImage, BackendError> {
        if self.fail {
            return Err(BackendError::ProcessingFailed("encoder crashed".to_string()));
        }
        let dims = self.identify(bytes)?;
        let size = (bytes.len() / 10).max(1);

        let variants = sitelift::imaging::select_breakpoints(dims.width, &params.breakpoints)
            .into_iter()
            .map(|bp| {
                (
                    bp.name,
                    EncodedImage {
                        width: bp.width,
                        height: sitelift::imaging::scaled_height(dims, bp.width),
                        bytes: vec![0; size],
                    },
                )
            })
            .collect();

        Ok(OptimizedImage {
            master: EncodedImage {
                width: dims.width,
                height: dims.height,
                bytes: vec![0; size],
            },
            variants,
        })
    }
}

/// Encoder that records how many optimize calls overlap
#[derive(Debug, Default)]
pub struct CountingEncoder {
    inner: FakeEncoder,
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl CountingEncoder {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageBackend for CountingEncoder {
    fn identify(&self, bytes: &[u8]) -> Result<Dimensions, BackendError> {
        self.inner.identify(bytes)
    }

    fn optimize(
        &self,
        bytes: &[u8],
        params: &OptimizeParams,
    ) -> Result<OptimizedImage, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        // Runs on the blocking pool, so a thread sleep stands in for encoding
        std::thread::sleep(self.delay);
        let result = self.inner.optimize(bytes, params);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Encodes a solid-color JPEG of the given size
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}
