// Rebuilds the breadcrumb list from a crumb trail.

use crate::dom::{Dom, Element};
use crate::error::{NavError, Result};
use crate::modules::navigation::Crumb;
use crate::settings::Selectors;

fn crumb_element(crumb: &Crumb, index: usize) -> Element {
    let mut item = Element::new("li").class("breadcrumb-item");
    if index > 0 {
        item = item.child(
            Element::new("span")
                .class("breadcrumb-separator")
                .child(Element::new("i").class("fas fa-chevron-right")),
        );
    }

    match &crumb.href {
        Some(href) if index == 0 => item.child(
            Element::new("a")
                .class("breadcrumb-link")
                .attr("href", href)
                .child(Element::new("i").class("fas fa-home"))
                .child(Element::new("span").text(&crumb.label)),
        ),
        Some(href) => item.child(
            Element::new("a")
                .class("breadcrumb-link")
                .attr("href", href)
                .text(&crumb.label),
        ),
        None => item.child(Element::new("span").class("breadcrumb-current").text(&crumb.label)),
    }
}

/// Replaces the breadcrumb list's children. Returns the number of items.
pub fn render<D: Dom>(dom: &mut D, selectors: &Selectors, crumbs: &[Crumb]) -> Result<usize> {
    let list = dom
        .query(&selectors.breadcrumb_list)
        .ok_or_else(|| NavError::ElementNotFound(selectors.breadcrumb_list.to_string()))?;

    dom.clear_children(list);
    for (i, crumb) in crumbs.iter().enumerate() {
        dom.append(list, crumb_element(crumb, i));
    }
    log::debug!("[Breadcrumb] rendered {} items", crumbs.len());
    Ok(crumbs.len())
}

/// Reads the rendered trail back as `(label, href)` pairs.
pub fn read<D: Dom>(dom: &D, selectors: &Selectors) -> Vec<(String, Option<String>)> {
    let Some(list) = dom.query(&selectors.breadcrumb_list) else {
        return Vec::new();
    };

    dom.children(list)
        .into_iter()
        .map(|item| {
            let href = dom
                .children(item)
                .into_iter()
                .find_map(|child| dom.attr(child, "href"));
            (dom.text(item).trim().to_string(), href)
        })
        .collect()
}
