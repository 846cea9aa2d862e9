// Sidebar DOM updates: collapsed class, dark mode, menu highlighting.
// Every function reports whether it changed the document, and none of them
// touch an element whose state already matches.

use crate::dom::{Dom, NodeId};
use crate::error::{NavError, Result};
use crate::modules::navigation::{best_match, normalize_path, Location};
use crate::settings::{ClassConfig, NavEntry, Selectors};

pub const LIGHT_MODE_TEXT: &str = "Light mode";
pub const DARK_MODE_TEXT: &str = "Dark mode";

pub fn apply_collapsed<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    collapsed: bool,
) -> Result<bool> {
    let panel = dom
        .query(&selectors.panel)
        .ok_or_else(|| NavError::ElementNotFound(selectors.panel.to_string()))?;
    Ok(dom.set_class(panel, &classes.collapsed, collapsed))
}

pub fn mark_ready<D: Dom>(dom: &mut D, selectors: &Selectors, classes: &ClassConfig) -> Result<bool> {
    let panel = dom
        .query(&selectors.panel)
        .ok_or_else(|| NavError::ElementNotFound(selectors.panel.to_string()))?;
    Ok(dom.set_class(panel, &classes.ready, true))
}

/// Dark class on the body; the mode switch label names the mode it would
/// switch to.
pub fn apply_dark_mode<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    dark: bool,
) -> Result<bool> {
    let body = dom
        .query(&selectors.body)
        .ok_or_else(|| NavError::ElementNotFound(selectors.body.to_string()))?;
    let mut changed = dom.set_class(body, &classes.dark, dark);

    if let Some(text) = dom.query(&selectors.mode_text) {
        changed |= dom.set_text(text, if dark { LIGHT_MODE_TEXT } else { DARK_MODE_TEXT });
    }
    Ok(changed)
}

/// Makes `target` the only active navigation link. `None` clears them all.
pub fn highlight_link<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    target: Option<NodeId>,
) -> bool {
    let mut changed = false;
    for link in dom.query_all(&selectors.nav_links) {
        changed |= dom.set_class(link, &classes.active, Some(link) == target);
    }
    changed
}

/// First navigation link whose href resolves to `entry_path`.
pub fn link_for_path<D: Dom>(dom: &D, selectors: &Selectors, base_path: &str, entry_path: &str) -> Option<NodeId> {
    let want = normalize_path(entry_path);
    dom.query_all(&selectors.nav_links).into_iter().find(|link| {
        dom.attr(*link, "href")
            .and_then(|href| Location::parse(&href, base_path).ok())
            .map(|loc| loc.path == want)
            .unwrap_or(false)
    })
}

/// Highlights the link of the entry that best matches `path`. Returns the
/// index of that entry.
pub fn highlight_for_path<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    entries: &[NavEntry],
    base_path: &str,
    path: &str,
) -> Option<usize> {
    let index = best_match(entries, path);
    let link = index.and_then(|i| link_for_path(dom, selectors, base_path, &entries[i].path));
    highlight_link(dom, selectors, classes, link);
    index.filter(|_| link.is_some())
}
