//! Cockpit E2E: end-to-end test support for the Operaton Cockpit webapp
//!
//! Two halves make up a cockpit test run:
//!
//! - **Scenarios** describe the engine state a test needs (deploy a
//!   process, start instances) as an ordered list of REST operations and
//!   execute them once, before the browser steps.
//! - **Page objects** wrap the cockpit's DOM behind named queries and
//!   actions, driven through a [`PageDriver`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Cockpit E2E Architecture                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐         │
//! │   │ Scenario   │    │ Scenario   │    │ Engine     │         │
//! │   │ (suites)   │───►│ Runner     │───►│ REST API   │         │
//! │   └────────────┘    └────────────┘    └────────────┘         │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐         │
//! │   │ Page       │    │ Page       │    │ Headless   │         │
//! │   │ Object     │───►│ Driver     │───►│ Browser    │         │
//! │   └────────────┘    └────────────┘    └────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cockpit_e2e::prelude::*;
//!
//! # async fn run() -> E2eResult<()> {
//! let scenario = cockpit_e2e::suites::suspension::setup1(&ResourceDir::default())?;
//! let backend = RestBackend::new("http://localhost:8080/engine-rest");
//! let report = ScenarioRunner::new(backend).run(&scenario).await?;
//! assert_eq!(report.calls.len(), 4);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Browser launch settings and the CDP-backed driver
pub mod browser;
/// Test environment configuration
pub mod config;
/// Page driver abstraction and its in-memory double
pub mod driver;
/// Element locators
pub mod locator;
/// Page object base traits
pub mod page_object;
/// Cockpit page objects
pub mod pages;
/// Error types
pub mod result;
/// Setup scenarios and their execution
pub mod scenario;
/// Named setup scenarios
pub mod suites;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{E2eConfig, DEFAULT_APP_URL, DEFAULT_REST_URL};
pub use driver::{MockDriver, MockElement, PageDriver};
pub use locator::{Locator, Selector, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
pub use page_object::{BasePage, PageObject, UrlMatcher};
pub use pages::DiagramPage;
pub use result::{E2eError, E2eResult};
#[cfg(feature = "rest")]
pub use scenario::rest::RestBackend;
pub use scenario::{
    combine, operation, read_resource, BackendClient, Call, CallRecord, MockBackend, Operation,
    ResourceDir, RunState, Scenario, ScenarioReport, ScenarioRunner,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::pages::*;
    pub use super::result::*;
    #[cfg(feature = "rest")]
    pub use super::scenario::rest::RestBackend;
    pub use super::scenario::*;
}
