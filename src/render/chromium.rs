//! Chromium-based renderer using chromiumoxide.

use super::{ContextOptions, RenderContext, RenderError, Renderer};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Environment variable naming an explicit Chrome/Chromium binary.
pub const CHROME_PATH_ENV: &str = "SITELIFT_CHROME";

impl From<CdpError> for RenderError {
    fn from(e: CdpError) -> Self {
        RenderError::Protocol(e.to_string())
    }
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    ///
    /// Uses `SITELIFT_CHROME` when set, otherwise chromiumoxide's own
    /// executable detection.
    pub async fn launch() -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--hide-scrollbars");

        if let Ok(path) = std::env::var(CHROME_PATH_ENV) {
            builder = builder.chrome_executable(PathBuf::from(path));
        }

        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler event error: {}", e);
                }
            }
        });

        tracing::info!("Launched headless Chromium");

        Ok(Self {
            browser: Arc::new(browser),
            handler,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self, options: &ContextOptions) -> Result<Box<dyn RenderContext>, RenderError> {
        let context_id = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(RenderError::Protocol)?;

        let page = match self.browser.new_page(target).await {
            Ok(page) => page,
            Err(e) => {
                dispose_context(&self.browser, context_id).await;
                return Err(e.into());
            }
        };

        let mut context = ChromiumContext {
            page,
            browser: Arc::clone(&self.browser),
            context_id,
            active_count: Arc::clone(&self.active_count),
        };
        self.active_count.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = context.configure(options).await {
            let _ = Box::new(context).close().await;
            return Err(e);
        }

        Ok(Box::new(context))
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::SeqCst)
    }
}

async fn dispose_context(browser: &Browser, context_id: BrowserContextId) {
    if let Err(e) = browser
        .execute(DisposeBrowserContextParams::new(context_id))
        .await
    {
        tracing::debug!("failed to dispose browser context: {}", e);
    }
}

/// A single Chromium page inside its own browser context.
pub struct ChromiumContext {
    page: Page,
    browser: Arc<Browser>,
    context_id: BrowserContextId,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumContext {
    async fn configure(&mut self, options: &ContextOptions) -> Result<(), RenderError> {
        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                i64::from(options.viewport.width),
                i64::from(options.viewport.height),
                1.0,
                false,
            ))
            .await?;
        self.page.set_user_agent(user_agent_override(options)).await?;
        Ok(())
    }
}

/// User-agent override sent to the network domain for a context
fn user_agent_override(options: &ContextOptions) -> SetUserAgentOverrideParams {
    SetUserAgentOverrideParams::new(options.user_agent.clone())
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, CdpError>(())
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
                timeout,
            }),
        }
    }

    async fn html(&self) -> Result<String, RenderError> {
        Ok(self.page.content().await?)
    }

    async fn screenshot(&self) -> Result<Vec<u8>, RenderError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        self.page
            .screenshot(params)
            .await
            .map_err(|e| RenderError::Screenshot(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        let this = *self;
        this.active_count.fetch_sub(1, Ordering::SeqCst);
        let closed = this.page.close().await;
        dispose_context(&this.browser, this.context_id).await;
        closed.map_err(RenderError::from)
    }
}
