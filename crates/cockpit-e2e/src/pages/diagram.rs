//! Process diagram page object.
//!
//! The BPMN viewer renders each flow node as an element carrying
//! `data-element-id`, and the cockpit overlays badges in a container keyed by
//! `data-container-id`. Both ids are the activity id from the BPMN file.

use crate::driver::PageDriver;
use crate::locator::{attr_selector, class_list_contains, Locator};
use crate::page_object::{BasePage, PageObject};
use crate::result::E2eResult;

/// Class the viewer puts on a selected flow node
pub const SELECTED_CLASS: &str = "highlight";

/// Class that hides a badge without removing it from the DOM
pub const HIDDEN_CLASS: &str = "ng-hide";

const RUNNING_INSTANCES_TOOLTIP: &str = "Running Activity Instances";
const OPEN_INCIDENTS_TOOLTIP: &str = "Open Incidents";
const SUSPENDED_JOB_DEFINITION_TOOLTIP: &str = "Suspended Job Definition";

/// The process diagram shown on the process definition runtime view
#[derive(Debug)]
pub struct DiagramPage<'d, D> {
    driver: &'d D,
    base_url: String,
}

impl<'d, D: PageDriver> DiagramPage<'d, D> {
    /// Create a diagram page over a driver and application root
    pub fn new(driver: &'d D, base_url: impl Into<String>) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
        }
    }

    /// The viewer element itself
    #[must_use]
    pub fn diagram_element(&self) -> Locator {
        Locator::new("[cam-widget-bpmn-viewer]")
    }

    fn badge_for(activity: &str, tooltip: &str) -> Locator {
        Locator::new(format!(
            "{} .badge{}",
            attr_selector("data-container-id", activity),
            attr_selector("uib-tooltip", tooltip)
        ))
    }

    /// Badge counting running instances of an activity
    #[must_use]
    pub fn instances_badge_for(&self, activity: &str) -> Locator {
        Self::badge_for(activity, RUNNING_INSTANCES_TOOLTIP)
    }

    /// Badge counting open incidents of an activity
    #[must_use]
    pub fn incidents_badge_for(&self, activity: &str) -> Locator {
        Self::badge_for(activity, OPEN_INCIDENTS_TOOLTIP)
    }

    /// Badge flagging a suspended job definition on an activity
    #[must_use]
    pub fn suspended_badge_for(&self, activity: &str) -> Locator {
        Self::badge_for(activity, SUSPENDED_JOB_DEFINITION_TOOLTIP)
    }

    /// The rendered flow node of an activity
    #[must_use]
    pub fn diagram_activity(&self, activity: &str) -> Locator {
        Locator::new(format!("*{}", attr_selector("data-element-id", activity)))
    }

    /// Click an activity in the diagram
    ///
    /// # Errors
    ///
    /// Propagates the driver error if the activity cannot be clicked
    pub async fn select_activity(&self, activity: &str) -> E2eResult<()> {
        self.driver.click(&self.diagram_activity(activity)).await
    }

    /// Click the empty diagram, clearing any selection
    ///
    /// # Errors
    ///
    /// Propagates the driver error if the diagram cannot be clicked
    pub async fn deselect_all(&self) -> E2eResult<()> {
        self.driver.click(&self.diagram_element()).await
    }

    /// Whether the activity is highlighted; false if it does not resolve
    pub async fn is_activity_selected(&self, activity: &str) -> E2eResult<bool> {
        let classes = self
            .driver
            .attribute(&self.diagram_activity(activity), "class")
            .await?;
        Ok(class_list_contains(classes.as_deref(), SELECTED_CLASS))
    }

    /// Whether the suspended badge of the activity is shown.
    ///
    /// The badge is always rendered and toggled with `ng-hide`, so a
    /// resolvable badge without that class means suspended, including one
    /// with no `class` attribute at all. A badge that does not resolve
    /// means not suspended.
    pub async fn is_activity_suspended(&self, activity: &str) -> E2eResult<bool> {
        let badge = self.suspended_badge_for(activity);
        if self.driver.count(&badge).await? == 0 {
            return Ok(false);
        }
        let classes = self.driver.attribute(&badge, "class").await?;
        Ok(!class_list_contains(classes.as_deref(), HIDDEN_CLASS))
    }

    /// Number shown on the running instances badge
    pub async fn running_instances_for(&self, activity: &str) -> E2eResult<Option<u64>> {
        self.badge_count(&self.instances_badge_for(activity)).await
    }

    /// Number shown on the open incidents badge
    pub async fn open_incidents_for(&self, activity: &str) -> E2eResult<Option<u64>> {
        self.badge_count(&self.incidents_badge_for(activity)).await
    }

    async fn badge_count(&self, badge: &Locator) -> E2eResult<Option<u64>> {
        let text = self.driver.text(badge).await?;
        Ok(text.and_then(|t| t.trim().parse().ok()))
    }
}

impl<D> PageObject for DiagramPage<'_, D> {
    fn url_pattern(&self) -> &str {
        "/process-definition/:id/runtime"
    }

    fn page_name(&self) -> &str {
        "diagram"
    }
}

impl<D: PageDriver> BasePage for DiagramPage<'_, D> {
    type Driver = D;

    fn driver(&self) -> &D {
        self.driver
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
