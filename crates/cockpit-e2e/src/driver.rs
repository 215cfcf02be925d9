//! PageDriver - abstract browser automation seam.
//!
//! Page objects talk to the browser only through [`PageDriver`], so the
//! same page object runs against a real Chromium (`ChromiumDriver`, feature
//! `browser`) or the in-memory [`MockDriver`].
//!
//! Queries degrade on a missing node (`None`, `0`, `false`). Interactions
//! (`click`, `send_keys`) on a missing node fail with
//! [`E2eError::ElementNotFound`].

use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Abstract driver trait for browser automation
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    /// Get current URL
    async fn current_url(&self) -> E2eResult<String>;

    /// Number of nodes matching the locator
    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    /// Read an attribute of the first matching node
    async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>>;

    /// Read the rendered text of the first matching node
    async fn text(&self, locator: &Locator) -> E2eResult<Option<String>>;

    /// Whether the first matching node is rendered visibly
    async fn is_displayed(&self, locator: &Locator) -> E2eResult<bool>;

    /// Click the first matching node
    async fn click(&self, locator: &Locator) -> E2eResult<()>;

    /// Type text into the first matching node
    async fn send_keys(&self, locator: &Locator, text: &str) -> E2eResult<()>;

    /// Close the browser
    async fn close(&self) -> E2eResult<()>;

    /// Poll until the locator resolves to a displayed node
    async fn wait_for_displayed(&self, locator: &Locator) -> E2eResult<()> {
        let started = Instant::now();
        loop {
            if self.is_displayed(locator).await? {
                return Ok(());
            }
            if started.elapsed() >= locator.timeout() {
                return Err(E2eError::Timeout {
                    ms: locator.timeout().as_millis() as u64,
                });
            }
            tokio::time::sleep(locator.poll_interval()).await;
        }
    }

    /// Poll until nothing matches the locator
    async fn wait_for_absent(&self, locator: &Locator) -> E2eResult<()> {
        let started = Instant::now();
        loop {
            if self.count(locator).await? == 0 {
                return Ok(());
            }
            if started.elapsed() >= locator.timeout() {
                return Err(E2eError::Timeout {
                    ms: locator.timeout().as_millis() as u64,
                });
            }
            tokio::time::sleep(locator.poll_interval()).await;
        }
    }
}

/// A node in the [`MockDriver`] DOM
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Attribute values by name
    pub attributes: HashMap<String, String>,
    /// Rendered text
    pub text: Option<String>,
    /// Whether the node is visible
    pub displayed: bool,
    /// Whether clicks and typing are accepted
    pub interactable: bool,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            attributes: HashMap::new(),
            text: None,
            displayed: true,
            interactable: true,
        }
    }
}

impl MockElement {
    /// Create a visible, interactable element with no attributes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `class` attribute
    #[must_use]
    pub fn with_class(self, classes: impl Into<String>) -> Self {
        self.with_attribute("class", classes)
    }

    /// Set the rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Mark the element as not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark the element as rejecting interaction
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.interactable = false;
        self
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    elements: HashMap<String, MockElement>,
    call_history: Vec<String>,
}

/// Mock driver for unit testing
///
/// Elements are keyed by the exact CSS string a locator renders to.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace the element matched by `css`
    pub fn add_element(&self, css: impl Into<String>, element: MockElement) {
        let _ = self.state().elements.insert(css.into(), element);
    }

    /// Remove the element matched by `css`
    pub fn remove_element(&self, css: &str) {
        let _ = self.state().elements.remove(css);
    }

    /// Set an attribute on an existing element, returns false if absent
    pub fn set_attribute(&self, css: &str, name: &str, value: impl Into<String>) -> bool {
        match self.state().elements.get_mut(css) {
            Some(element) => {
                let _ = element.attributes.insert(name.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_history.iter().any(|c| c.starts_with(method))
    }

    fn lookup(&self, locator: &Locator) -> Option<MockElement> {
        self.state().elements.get(&locator.css()).cloned()
    }

    fn interact(&self, locator: &Locator, call: String) -> E2eResult<()> {
        let css = locator.css();
        let element = self
            .lookup(locator)
            .ok_or_else(|| E2eError::ElementNotFound {
                selector: css.clone(),
            })?;
        if !element.interactable {
            return Err(E2eError::InteractionFailed {
                selector: css,
                message: "element is not interactable".to_string(),
            });
        }
        self.state().call_history.push(call);
        Ok(())
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("navigate:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.state().current_url.clone())
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        Ok(usize::from(self.lookup(locator).is_some()))
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
        Ok(self
            .lookup(locator)
            .and_then(|e| e.attributes.get(name).cloned()))
    }

    async fn text(&self, locator: &Locator) -> E2eResult<Option<String>> {
        Ok(self.lookup(locator).and_then(|e| e.text))
    }

    async fn is_displayed(&self, locator: &Locator) -> E2eResult<bool> {
        Ok(self.lookup(locator).is_some_and(|e| e.displayed))
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.interact(locator, format!("click:{}", locator.css()))
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        self.interact(locator, format!("send_keys:{}:{text}", locator.css()))
    }

    async fn close(&self) -> E2eResult<()> {
        self.state().call_history.push("close".to_string());
        Ok(())
    }
}
