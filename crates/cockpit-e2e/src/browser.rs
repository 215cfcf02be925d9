//! Browser control for headless testing.
//!
//! With the `browser` feature this provides [`ChromiumDriver`], a
//! [`PageDriver`](crate::driver::PageDriver) over the Chrome `DevTools`
//! Protocol via chromiumoxide. The configuration type is always available
//! so it can be loaded from config files on any build.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 1024,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::PageDriver;
    use crate::locator::Locator;
    use crate::result::{E2eError, E2eResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use tokio::sync::Mutex;

    const IS_DISPLAYED_FN: &str =
        "function() { return !!(this.offsetWidth || this.offsetHeight || this.getClientRects().length); }";

    /// Chromium-backed driver with one page
    #[derive(Debug)]
    pub struct ChromiumDriver {
        config: BrowserConfig,
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        handle: tokio::task::JoinHandle<()>,
    }

    fn page_error(e: impl std::fmt::Display) -> E2eError {
        E2eError::PageError {
            message: e.to_string(),
        }
    }

    impl ChromiumDriver {
        /// Launch a browser and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if the browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> E2eResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| E2eError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                E2eError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(page_error)?;
            tracing::debug!(headless = config.headless, "chromium launched");

            Ok(Self {
                config,
                browser: Mutex::new(browser),
                page,
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        async fn first(&self, locator: &Locator) -> E2eResult<Option<Element>> {
            let elements = self
                .page
                .find_elements(locator.css())
                .await
                .map_err(page_error)?;
            Ok(elements.into_iter().next())
        }

        async fn require(&self, locator: &Locator) -> E2eResult<Element> {
            self.first(locator)
                .await?
                .ok_or_else(|| E2eError::ElementNotFound {
                    selector: locator.css(),
                })
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> E2eResult<()> {
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| E2eError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> E2eResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(page_error)?
                .unwrap_or_default())
        }

        async fn count(&self, locator: &Locator) -> E2eResult<usize> {
            let elements = self
                .page
                .find_elements(locator.css())
                .await
                .map_err(page_error)?;
            Ok(elements.len())
        }

        async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
            match self.first(locator).await? {
                Some(element) => element.attribute(name).await.map_err(page_error),
                None => Ok(None),
            }
        }

        async fn text(&self, locator: &Locator) -> E2eResult<Option<String>> {
            match self.first(locator).await? {
                Some(element) => element.inner_text().await.map_err(page_error),
                None => Ok(None),
            }
        }

        async fn is_displayed(&self, locator: &Locator) -> E2eResult<bool> {
            let Some(element) = self.first(locator).await? else {
                return Ok(false);
            };
            let returns = element
                .call_js_fn(IS_DISPLAYED_FN, false)
                .await
                .map_err(page_error)?;
            Ok(returns
                .result
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(false))
        }

        async fn click(&self, locator: &Locator) -> E2eResult<()> {
            let element = self.require(locator).await?;
            let _ = element
                .click()
                .await
                .map_err(|e| E2eError::InteractionFailed {
                    selector: locator.css(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn send_keys(&self, locator: &Locator, text: &str) -> E2eResult<()> {
            let element = self.require(locator).await?;
            let interaction = |e: chromiumoxide::error::CdpError| E2eError::InteractionFailed {
                selector: locator.css(),
                message: e.to_string(),
            };
            let _ = element.click().await.map_err(interaction)?;
            let _ = element.type_str(text).await.map_err(interaction)?;
            Ok(())
        }

        async fn close(&self) -> E2eResult<()> {
            let mut browser = self.browser.lock().await;
            let _ = browser.close().await.map_err(page_error)?;
            self.handle.abort();
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
