// Page chrome around the navigation: profile dropdown, alert messages and the
// delete confirmation modal.

use std::collections::BTreeMap;

use crate::dom::{Dom, NodeId};
use crate::error::{NavError, Result};
use crate::modules::navigation::with_base;
use crate::selector::Selector;
use crate::settings::{ClassConfig, Selectors};

pub const DEFAULT_ITEM_TITLE: &str = "this item";
pub const DEFAULT_ITEM_TYPE: &str = "item";

fn find<D: Dom>(dom: &D, selector: &Selector) -> Result<NodeId> {
    dom.query(selector)
        .ok_or_else(|| NavError::ElementNotFound(selector.to_string()))
}

pub fn toggle_dropdown<D: Dom>(dom: &mut D, selectors: &Selectors, classes: &ClassConfig) -> Result<bool> {
    let dropdown = find(dom, &selectors.profile_dropdown)?;
    Ok(dom.toggle_class(dropdown, &classes.active))
}

/// Closes the dropdown unless the click landed on the icon or inside the
/// dropdown itself. Returns whether it was open and got closed.
pub fn close_dropdown_on_outside_click<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    clicked: NodeId,
) -> bool {
    let Some(dropdown) = dom.query(&selectors.profile_dropdown) else {
        return false;
    };
    let on_icon = dom
        .query_all(&selectors.profile_icon)
        .into_iter()
        .any(|icon| dom.contains(icon, clicked));
    if on_icon || dom.contains(dropdown, clicked) {
        return false;
    }
    dom.set_class(dropdown, &classes.active, false)
}

/// Resolves a profile menu item's `data-action` to a navigation target and
/// closes the dropdown.
pub fn menu_action_target<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    actions: &BTreeMap<String, String>,
    base_path: &str,
    item: NodeId,
) -> Option<String> {
    if let Some(dropdown) = dom.query(&selectors.profile_dropdown) {
        dom.set_class(dropdown, &classes.active, false);
    }

    let Some(action) = dom.attr(item, "data-action") else {
        log::warn!("[Profile] menu item has no data-action attribute");
        return None;
    };
    match actions.get(&action) {
        Some(target) => Some(with_base(base_path, target)),
        None => {
            log::warn!("[Profile] unknown menu action: {}", action);
            None
        }
    }
}

/// Fills the confirmation modal from a delete button and shows it.
pub fn open_confirm<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    trigger: NodeId,
) -> Result<()> {
    let modal = find(dom, &selectors.confirm_modal)?;

    let title = ["data-title", "taskTitle", "tutorialTitle"]
        .iter()
        .find_map(|name| dom.attr(trigger, name).filter(|v| !v.is_empty()))
        .unwrap_or_else(|| DEFAULT_ITEM_TITLE.to_string());
    let item_type = dom
        .attr(trigger, "data-type")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ITEM_TYPE.to_string());

    if let Some(text) = dom.query(&selectors.confirm_text) {
        dom.set_text(text, &format!("Do you want to delete the '{}'? {}", item_type, title));
    }
    if let (Some(yes), Some(href)) = (dom.query(&selectors.confirm_yes), dom.attr(trigger, "href")) {
        dom.set_attr(yes, "href", &href);
    }

    dom.set_class(modal, &classes.show, true);
    dom.set_attr(modal, "aria-hidden", "false");
    log::debug!("[Modal] confirm delete of {} '{}'", item_type, title);
    Ok(())
}

pub fn close_confirm<D: Dom>(dom: &mut D, selectors: &Selectors, classes: &ClassConfig) -> bool {
    let Some(modal) = dom.query(&selectors.confirm_modal) else {
        return false;
    };
    let changed = dom.set_class(modal, &classes.show, false);
    dom.set_attr(modal, "aria-hidden", "true");
    changed
}

/// First step of dismissing alerts: start the fade. Returns the alerts touched.
pub fn fade_alerts<D: Dom>(dom: &mut D, selectors: &Selectors, classes: &ClassConfig) -> Vec<NodeId> {
    let alerts = dom.query_all(&selectors.alerts);
    for alert in &alerts {
        dom.set_class(*alert, &classes.show, false);
        dom.set_class(*alert, &classes.fade, true);
    }
    alerts
}

/// Second step: drop the faded alerts that are still on the page.
pub fn remove_alerts<D: Dom>(dom: &mut D, selectors: &Selectors, alerts: &[NodeId]) -> usize {
    alerts
        .iter()
        .filter(|a| dom.matches(**a, &selectors.alerts) && dom.remove(**a))
        .count()
}
