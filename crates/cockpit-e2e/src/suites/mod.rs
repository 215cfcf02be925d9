//! Named scenarios used by the console test suites.

pub mod suspension;

use crate::result::E2eResult;
use crate::scenario::{ResourceDir, Scenario};

/// Builds a scenario from a fixture directory
pub type ScenarioBuilder = fn(&ResourceDir) -> E2eResult<Scenario>;

/// A named scenario in the catalog
#[derive(Debug, Clone, Copy)]
pub struct SuiteEntry {
    /// Name used on the command line, `<suite>::<setup>`
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Scenario constructor
    pub build: ScenarioBuilder,
}

const CATALOG: &[SuiteEntry] = &[SuiteEntry {
    name: "suspension::setup1",
    description: "deploy suspension-process and start three instances",
    build: suspension::setup1,
}];

/// All named scenarios
#[must_use]
pub fn catalog() -> &'static [SuiteEntry] {
    CATALOG
}

/// Build a named scenario; `None` if the name is unknown
#[must_use]
pub fn build(name: &str, resources: &ResourceDir) -> Option<E2eResult<Scenario>> {
    catalog()
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.build)(resources))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<&str> = catalog().iter().map(|e| e.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_build_known_scenario() {
        let scenario = build("suspension::setup1", &ResourceDir::default())
            .unwrap()
            .unwrap();
        assert_eq!(scenario.call_count(), 4);
    }

    #[test]
    fn test_build_unknown_scenario() {
        assert!(build("nope::setup", &ResourceDir::default()).is_none());
    }
}
