//! Page Object Model support.
//!
//! A page object maps semantic UI concepts (an activity in the process
//! diagram, a badge next to it) to [`Locator`]s and wraps the interactions
//! a test needs. Every page object is built from two capabilities:
//!
//! - [`PageObject`]: what the page is (its route pattern and name)
//! - [`BasePage`]: shared navigation and waiting helpers over a
//!   [`PageDriver`]
//!
//! Concrete pages implement both and add their own locators; there is no
//! deeper hierarchy.

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::E2eResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait for page objects representing a page or component in the UI.
pub trait PageObject {
    /// Route pattern that matches this page (e.g., "/dashboard", "/process-definition/:id/runtime")
    fn url_pattern(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Navigation and waiting helpers shared by every console page.
///
/// # Example
///
/// ```ignore
/// let page = DiagramPage::new(&driver, "http://localhost:8080/operaton/app/cockpit/default/");
/// page.navigate_to("/process-definition/suspension-process:1:4/runtime").await?;
/// assert!(page.is_active().await?);
/// ```
#[async_trait]
pub trait BasePage: PageObject + Sync {
    /// Driver type used by this page
    type Driver: PageDriver;

    /// The driver this page talks to
    fn driver(&self) -> &Self::Driver;

    /// Application root, e.g. `http://localhost:8080/operaton/app/cockpit/default/`
    fn base_url(&self) -> &str;

    /// Navigate the browser to a route below the application root
    async fn navigate_to(&self, route: &str) -> E2eResult<()> {
        let url = join_route(self.base_url(), route);
        tracing::debug!(page = self.page_name(), %url, "navigate");
        self.driver().navigate(&url).await
    }

    /// Whether the browser currently shows this page
    async fn is_active(&self) -> E2eResult<bool> {
        let url = self.driver().current_url().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches(route_of(&url)))
    }

    /// Wait until the locator resolves to a visible node
    async fn wait_for_element_to_be_visible(&self, locator: &Locator) -> E2eResult<()> {
        self.driver().wait_for_displayed(locator).await
    }

    /// Wait until nothing matches the locator
    async fn wait_for_element_to_be_not_present(&self, locator: &Locator) -> E2eResult<()> {
        self.driver().wait_for_absent(locator).await
    }
}

/// Join an application root and a hash route.
///
/// The console routes on the fragment, so `/dashboard` under
/// `http://host/app/cockpit/default/` becomes
/// `http://host/app/cockpit/default/#/dashboard`.
#[must_use]
pub fn join_route(base_url: &str, route: &str) -> String {
    let base = base_url.split('#').next().unwrap_or(base_url);
    let base = base.trim_end_matches('/');
    let route = route.trim_start_matches('#').trim_start_matches('/');
    format!("{base}/#/{route}")
}

/// Extract the route part of a console URL.
///
/// Prefers the hash fragment; falls back to the path when there is none.
/// Query strings are dropped.
#[must_use]
pub fn route_of(url: &str) -> &str {
    let route = match url.split_once('#') {
        Some((_, fragment)) => fragment,
        None => url
            .split_once("://")
            .map_or(url, |(_, rest)| rest.find('/').map_or("/", |i| &rest[i..])),
    };
    route.split('?').next().unwrap_or(route)
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support:
    /// - Literal segments: `/dashboard`
    /// - Wildcards: `/process-definition/*`
    /// - Named parameters: `/process-definition/:id/runtime`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a route matches the pattern
    #[must_use]
    pub fn matches(&self, route: &str) -> bool {
        let route_segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();

        // wildcards and parameters each consume exactly one segment
        if route_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(route_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract parameters from a route
    #[must_use]
    pub fn extract_params(&self, route: &str) -> HashMap<String, String> {
        let route_segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();

        self.segments
            .iter()
            .zip(route_segments)
            .filter_map(|(segment, value)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), value.to_string())),
                _ => None,
            })
            .collect()
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
