// Settings tab activation driven by the URL hash.
// A tab is known when the page carries both a pane with the hash's id and a
// trigger pointing at it (`href="#id"` or `id="id-tab"`).

use crate::dom::{Dom, NodeId};
use crate::error::{NavError, Result};
use crate::settings::{ClassConfig, Selectors};

/// Locates the trigger and pane for `hash`.
pub fn find_tab<D: Dom>(dom: &D, selectors: &Selectors, hash: &str) -> Result<(NodeId, NodeId)> {
    let id = hash.trim().trim_start_matches('#');
    if id.is_empty() {
        return Err(NavError::MalformedHash(hash.to_string()));
    }

    let pane = dom
        .query_all(&selectors.tab_panes)
        .into_iter()
        .find(|p| dom.element_id(*p).as_deref() == Some(id));

    let href = format!("#{}", id);
    let trigger_id = format!("{}-tab", id);
    let trigger = dom.query_all(&selectors.tab_triggers).into_iter().find(|t| {
        dom.attr(*t, "href").as_deref() == Some(href.as_str())
            || dom.element_id(*t).as_deref() == Some(trigger_id.as_str())
    });

    match (trigger, pane) {
        (Some(t), Some(p)) => Ok((t, p)),
        _ => Err(NavError::MalformedHash(hash.to_string())),
    }
}

/// Activates the tab named by `hash` and deactivates every other one.
/// Returns whether the document changed.
pub fn activate_tab<D: Dom>(
    dom: &mut D,
    selectors: &Selectors,
    classes: &ClassConfig,
    hash: &str,
) -> Result<bool> {
    let (trigger, pane) = find_tab(dom, selectors, hash)?;
    let mut changed = false;

    for t in dom.query_all(&selectors.tab_triggers) {
        let on = t == trigger;
        changed |= dom.set_class(t, &classes.active, on);
        changed |= dom.set_attr(t, "aria-selected", if on { "true" } else { "false" });
    }

    for p in dom.query_all(&selectors.tab_panes) {
        let on = p == pane;
        changed |= dom.set_class(p, &classes.show, on);
        changed |= dom.set_class(p, &classes.active, on);
    }

    Ok(changed)
}

/// Hash of the tab the page currently shows, if any.
pub fn active_tab_hash<D: Dom>(dom: &D, selectors: &Selectors, classes: &ClassConfig) -> Option<String> {
    let pane_hash = dom
        .query_all(&selectors.tab_panes)
        .into_iter()
        .filter(|p| dom.has_class(*p, &classes.active) || dom.has_class(*p, &classes.show))
        .find_map(|p| dom.element_id(p))
        .map(|id| format!("#{}", id));
    if pane_hash.is_some() {
        return pane_hash;
    }

    dom.query_all(&selectors.tab_triggers)
        .into_iter()
        .filter(|t| dom.has_class(*t, &classes.active))
        .find_map(|t| trigger_hash(dom, t))
}

/// The hash a tab trigger points at.
pub fn trigger_hash<D: Dom>(dom: &D, trigger: NodeId) -> Option<String> {
    if let Some(href) = dom.attr(trigger, "href") {
        if href.len() > 1 && href.starts_with('#') {
            return Some(href);
        }
    }
    dom.element_id(trigger)
        .and_then(|id| id.strip_suffix("-tab").map(|s| format!("#{}", s)))
        .filter(|h| h.len() > 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, MemoryDom};
    use crate::selector::Selector;
    use crate::settings::SelectorConfig;

    const TABS: [&str; 3] = ["account-general", "account-change-password", "account-info"];

    fn settings_page() -> MemoryDom {
        let mut dom = MemoryDom::new();
        let body = dom.body();

        let mut links = Element::new("div").class("list-group account-settings-links");
        let mut panes = Element::new("div").class("tab-content");
        for (i, id) in TABS.iter().enumerate() {
            let mut link = Element::new("a").class("list-group-item").attr("href", &format!("#{}", id));
            let mut pane = Element::new("div").class("tab-pane fade").id(id);
            if i == 0 {
                link = link.class("active");
                pane = pane.class("active show");
            }
            links = links.child(link);
            panes = panes.child(pane);
        }
        dom.append(body, links);
        dom.append(body, panes);
        dom
    }

    fn selectors() -> Selectors {
        SelectorConfig::default().compile().unwrap()
    }

    fn active_panes(dom: &MemoryDom) -> Vec<String> {
        dom.query_all(&Selector::parse(".tab-pane.active").unwrap())
            .into_iter()
            .filter_map(|p| dom.element_id(p))
            .collect()
    }

    #[test]
    fn test_activate_switches_tab() {
        let mut dom = settings_page();
        let sel = selectors();
        let classes = ClassConfig::default();

        assert!(activate_tab(&mut dom, &sel, &classes, "#account-info").unwrap());
        assert_eq!(active_panes(&dom), vec!["account-info"]);

        let active_links = dom.query_all(&Selector::parse(".account-settings-links a.active").unwrap());
        assert_eq!(active_links.len(), 1);
        assert_eq!(dom.attr(active_links[0], "href").as_deref(), Some("#account-info"));
        assert_eq!(dom.attr(active_links[0], "aria-selected").as_deref(), Some("true"));
    }

    #[test]
    fn test_activate_twice_is_idempotent() {
        let mut dom = settings_page();
        let sel = selectors();
        let classes = ClassConfig::default();

        activate_tab(&mut dom, &sel, &classes, "#account-general").unwrap();
        let revision = dom.revision();

        assert!(!activate_tab(&mut dom, &sel, &classes, "#account-general").unwrap());
        assert_eq!(dom.revision(), revision);
        assert_eq!(active_panes(&dom), vec!["account-general"]);
    }

    #[test]
    fn test_unknown_hash_is_malformed() {
        let mut dom = settings_page();
        let sel = selectors();
        let revision = dom.revision();

        let err = activate_tab(&mut dom, &sel, &ClassConfig::default(), "#billing").unwrap_err();
        assert!(matches!(err, NavError::MalformedHash(_)));
        assert!(matches!(find_tab(&dom, &sel, "#"), Err(NavError::MalformedHash(_))));
        assert_eq!(dom.revision(), revision);
    }

    #[test]
    fn test_trigger_found_by_id() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        dom.append(
            body,
            Element::new("ul")
                .class("account-settings-links")
                .child(Element::new("a").id("account-tab").attr("href", "javascript:void(0)")),
        );
        dom.append(body, Element::new("div").class("tab-pane").id("account"));

        let sel = selectors();
        assert!(activate_tab(&mut dom, &sel, &ClassConfig::default(), "account").unwrap());
        let trigger = dom.query(&Selector::id("account-tab")).unwrap();
        assert_eq!(trigger_hash(&dom, trigger).as_deref(), Some("#account"));
    }

    #[test]
    fn test_active_tab_hash() {
        let mut dom = settings_page();
        let sel = selectors();
        let classes = ClassConfig::default();
        assert_eq!(active_tab_hash(&dom, &sel, &classes).as_deref(), Some("#account-general"));

        for p in dom.query_all(&sel.tab_panes) {
            dom.set_class(p, "active", false);
            dom.set_class(p, "show", false);
        }
        // falls back to the active trigger
        assert_eq!(active_tab_hash(&dom, &sel, &classes).as_deref(), Some("#account-general"));
    }
}
