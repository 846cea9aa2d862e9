// Server-rendered layout stand-in.
// Builds the element structure the site templates emit, laid out for the
// default selectors in `SelectorConfig`.

use crate::dom::{Dom, Element, MemoryDom};
use crate::modules::sidebar::DARK_MODE_TEXT;
use crate::settings::NavConfig;

/// What to include besides the sidebar and top bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOptions {
    pub settings_tabs: bool,
    pub success_alert: bool,
    pub delete_button: bool,
}

fn top_navbar(config: &NavConfig) -> Element {
    let mut dropdown = Element::new("div").class("profile-dropdown navbar-right-profile");
    for action in config.menu_actions.keys() {
        dropdown = dropdown.child(
            Element::new("a")
                .class("navbar-profile-item")
                .attr("data-action", action)
                .text(action),
        );
    }

    Element::new("div")
        .class("top_navbar")
        .child(
            Element::new("div")
                .class("hamburger")
                .child(Element::new("div").class("hamburger__inner")),
        )
        .child(
            Element::new("div")
                .class("right_menu")
                .child(Element::new("i").class("fas fa-user")),
        )
        .child(dropdown)
}

fn sidebar(config: &NavConfig) -> Element {
    let mut list = Element::new("ul");
    for entry in &config.nav_entries {
        let href = crate::modules::navigation::with_base(&config.base_path, &entry.path);
        list = list.child(
            Element::new("li").child(
                Element::new("a")
                    .attr("href", &href)
                    .child(Element::new("span").class("title").text(&entry.label)),
            ),
        );
    }

    Element::new("div").class("sidebar").child(list).child(
        Element::new("div")
            .class("bottom-content")
            .child(Element::new("div").class("toggle-switch"))
            .child(Element::new("span").class("mode-text").text(DARK_MODE_TEXT)),
    )
}

fn settings_tabs(config: &NavConfig) -> Element {
    let mut links = Element::new("div").class("list-group account-settings-links");
    let mut panes = Element::new("div").class("tab-content");
    for (i, tab) in config.hash_labels.iter().enumerate() {
        let id = tab.hash.trim_start_matches('#');
        let mut link = Element::new("a")
            .class("list-group-item list-group-item-action")
            .attr("href", &format!("#{}", id))
            .text(&tab.label);
        let mut pane = Element::new("div").class("tab-pane fade").id(id);
        if i == 0 {
            link = link.class("active");
            pane = pane.class("active show");
        }
        links = links.child(link);
        panes = panes.child(pane);
    }
    Element::new("div").class("card").child(links).child(panes)
}

fn confirm_modal() -> Element {
    Element::new("div")
        .id("confirmModal")
        .class("modal fade")
        .attr("aria-hidden", "true")
        .child(Element::new("p").id("confirmText"))
        .child(Element::new("a").id("yesBtn").class("btn btn-danger").text("Yes"))
}

/// Renders the shared layout into a fresh document.
pub fn render_layout(config: &NavConfig, options: LayoutOptions) -> MemoryDom {
    let mut dom = MemoryDom::new();
    let body = dom.body();

    let mut container = Element::new("div").class("container").child(
        Element::new("nav").child(
            Element::new("ol")
                .class("breadcrumb-list")
                .child(Element::new("li").class("breadcrumb-item").text(&config.home_label)),
        ),
    );
    if options.success_alert {
        container = container.child(
            Element::new("div")
                .class("alert alert-success alert-dismissible show")
                .text("Saved"),
        );
    }
    if options.delete_button {
        container = container.child(
            Element::new("a")
                .class("btn btn-delete")
                .attr("href", "/tasks/delete/1")
                .attr("data-title", "First task")
                .attr("data-type", "Task")
                .text("Delete"),
        );
    }
    if options.settings_tabs {
        container = container.child(settings_tabs(config));
    }

    dom.append(
        body,
        Element::new("div")
            .class("wrapper")
            .child(top_navbar(config))
            .child(sidebar(config))
            .child(Element::new("div").class("main_container").child(container)),
    );
    dom.append(body, confirm_modal());
    dom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SelectorConfig;

    #[test]
    fn test_layout_matches_default_selectors() {
        let config = NavConfig::default();
        let options = LayoutOptions {
            settings_tabs: true,
            success_alert: true,
            delete_button: true,
        };
        let dom = render_layout(&config, options);
        let sel = SelectorConfig::default().compile().unwrap();

        for s in [
            &sel.panel,
            &sel.toggle,
            &sel.body,
            &sel.mode_switch,
            &sel.mode_text,
            &sel.breadcrumb_list,
            &sel.profile_icon,
            &sel.profile_dropdown,
            &sel.alerts,
            &sel.delete_buttons,
            &sel.confirm_modal,
            &sel.confirm_text,
            &sel.confirm_yes,
        ] {
            assert!(dom.query(s).is_some(), "missing {}", s);
        }
        assert_eq!(dom.query_all(&sel.nav_links).len(), config.nav_entries.len());
        assert_eq!(dom.query_all(&sel.tab_triggers).len(), config.hash_labels.len());
        assert_eq!(dom.query_all(&sel.tab_panes).len(), config.hash_labels.len());
        assert_eq!(dom.query_all(&sel.profile_items).len(), config.menu_actions.len());
    }

    #[test]
    fn test_layout_options_off() {
        let dom = render_layout(&NavConfig::default(), LayoutOptions::default());
        let sel = SelectorConfig::default().compile().unwrap();
        assert!(dom.query(&sel.tab_panes).is_none());
        assert!(dom.query(&sel.alerts).is_none());
        assert!(dom.query(&sel.delete_buttons).is_none());
    }
}
