//! Plan listing controller: the monthly/weekly toggle and the jump to
//! checkout. The triggering control is an explicit parameter rather than
//! ambient event context, so the active-marker invariant is checkable.

use tiffin_catalog::PlanGroup;
use url::Url;

use crate::error::Result;

#[derive(Debug)]
pub struct PlanToggle {
    visible: PlanGroup,
    active_control: String,
}

impl PlanToggle {
    pub fn new(initial: PlanGroup, control: impl Into<String>) -> Self {
        Self {
            visible: initial,
            active_control: control.into(),
        }
    }

    /// Shows exactly one group and marks exactly one control active.
    pub fn show_plans(&mut self, group: PlanGroup, control: impl Into<String>) {
        self.visible = group;
        self.active_control = control.into();
    }

    pub fn visible_group(&self) -> PlanGroup {
        self.visible
    }

    pub fn is_visible(&self, group: PlanGroup) -> bool {
        self.visible == group
    }

    pub fn active_control(&self) -> &str {
        &self.active_control
    }
}

/// Checkout URL carrying the plan id. The id is not validated here;
/// the checkout page owns that decision.
pub fn checkout_url(base: &Url, plan_id: &str) -> Result<Url> {
    let mut url = base.join("/checkout")?;
    url.query_pairs_mut().append_pair("plan", plan_id);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_is_mutually_exclusive() {
        let mut toggle = PlanToggle::new(PlanGroup::Monthly, "monthly-btn");
        assert!(toggle.is_visible(PlanGroup::Monthly));
        assert!(!toggle.is_visible(PlanGroup::Weekly));

        toggle.show_plans(PlanGroup::Weekly, "weekly-btn");
        assert!(toggle.is_visible(PlanGroup::Weekly));
        assert!(!toggle.is_visible(PlanGroup::Monthly));
        assert_eq!(toggle.active_control(), "weekly-btn");

        toggle.show_plans(PlanGroup::Monthly, "monthly-btn");
        assert_eq!(toggle.visible_group(), PlanGroup::Monthly);
        assert_eq!(toggle.active_control(), "monthly-btn");
    }

    #[test]
    fn checkout_url_carries_the_plan_id() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let url = checkout_url(&base, "basic-weekly").unwrap();
        assert_eq!(url.path(), "/checkout");
        assert_eq!(url.query(), Some("plan=basic-weekly"));
    }

    #[test]
    fn checkout_url_does_not_validate_the_id() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let url = checkout_url(&base, "no-such-plan").unwrap();
        assert_eq!(url.query(), Some("plan=no-such-plan"));
    }
}
