//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a value: it names zero or more DOM nodes and is resolved
//! by the driver on every query. Nothing is cached, so a locator built
//! before a navigation is just as valid (or invalid) after it.

use std::time::Duration;

/// Default timeout for waiting on a locator (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval while waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Render the CSS selector handed to the driver
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(s) => s.clone(),
            Self::TestId(id) => attr_selector("data-testid", id),
        }
    }
}

/// A locator for finding and interacting with elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    timeout: Duration,
    poll_interval: Duration,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set a custom wait timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// CSS string for this locator
    #[must_use]
    pub fn css(&self) -> String {
        self.selector.to_css()
    }

    /// Wait timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.css())
    }
}

/// Build an attribute-equals selector, `[name="value"]`.
///
/// The value is interpolated as-is apart from escaping `\` and `"`, so an
/// unknown key yields a selector that simply matches nothing.
#[must_use]
pub fn attr_selector(name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[{name}=\"{escaped}\"]")
}

/// Token membership test on a `class` attribute value.
///
/// A missing attribute counts as an empty class list.
#[must_use]
pub fn class_list_contains(classes: Option<&str>, class: &str) -> bool {
    classes.is_some_and(|list| list.split_whitespace().any(|c| c == class))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_passthrough() {
            let sel = Selector::css("button.primary");
            assert_eq!(sel.to_css(), "button.primary");
        }

        #[test]
        fn test_test_id_renders_attribute() {
            let sel = Selector::test_id("submit");
            assert_eq!(sel.to_css(), "[data-testid=\"submit\"]");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let loc = Locator::new("#target");
            assert_eq!(loc.css(), "#target");
            assert_eq!(loc.timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
            assert_eq!(
                loc.poll_interval(),
                Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
            );
        }

        #[test]
        fn test_builders() {
            let loc = Locator::new("div")
                .with_timeout(Duration::from_millis(200))
                .with_poll_interval(Duration::from_millis(10));
            assert_eq!(loc.timeout(), Duration::from_millis(200));
            assert_eq!(loc.poll_interval(), Duration::from_millis(10));
        }

        #[test]
        fn test_display_is_css() {
            let loc = Locator::from_selector(Selector::test_id("x"));
            assert_eq!(loc.to_string(), "[data-testid=\"x\"]");
        }
    }

    mod attr_selector_tests {
        use super::*;

        #[test]
        fn test_plain_value() {
            assert_eq!(
                attr_selector("data-element-id", "UserTask_1"),
                "[data-element-id=\"UserTask_1\"]"
            );
        }

        #[test]
        fn test_quotes_are_escaped() {
            assert_eq!(
                attr_selector("data-element-id", "a\"b"),
                "[data-element-id=\"a\\\"b\"]"
            );
        }

        #[test]
        fn test_backslash_is_escaped() {
            assert_eq!(attr_selector("x", "a\\b"), "[x=\"a\\\\b\"]");
        }
    }

    mod class_list_tests {
        use super::*;

        #[test]
        fn test_token_present() {
            assert!(class_list_contains(Some("badge highlight"), "highlight"));
        }

        #[test]
        fn test_token_absent() {
            assert!(!class_list_contains(Some("badge"), "highlight"));
        }

        #[test]
        fn test_partial_token_does_not_match() {
            assert!(!class_list_contains(Some("highlighted"), "highlight"));
        }

        #[test]
        fn test_missing_attribute() {
            assert!(!class_list_contains(None, "ng-hide"));
        }
    }
}
