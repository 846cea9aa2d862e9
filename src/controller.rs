// NavigationStateController: keeps sidebar, dark mode, menu highlight, settings
// tab and breadcrumbs in line with the persisted flags and the current URL.
//
// Page-level operations never fail. Missing elements and unknown hashes are
// logged at debug level and leave the page as it was.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{Dom, NodeId};
use crate::error::Result;
use crate::modules::navigation::{self, normalize_hash, Crumb, Location};
use crate::modules::{breadcrumbs, chrome, sidebar, tabs, wait};
use crate::selector::Selector;
use crate::settings::{NavConfig, Selectors};
use crate::state::{ClickOutcome, NavState};
use crate::storage::{FlagStore, DARK_MODE_KEY, SIDEBAR_COLLAPSED_KEY};

pub struct NavigationStateController<D: Dom, S: FlagStore> {
    doc: Rc<RefCell<D>>,
    store: S,
    config: NavConfig,
    selectors: Selectors,
    state: NavState,
}

impl<D: Dom, S: FlagStore> NavigationStateController<D, S> {
    /// Fails only when a configured selector does not parse.
    pub fn new(doc: Rc<RefCell<D>>, store: S, config: NavConfig, location: &Location) -> Result<Self> {
        let selectors = config.selectors.compile()?;
        let state = NavState::load(&store, location);
        Ok(Self {
            doc,
            store,
            config,
            selectors,
            state,
        })
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn document(&self) -> &Rc<RefCell<D>> {
        &self.doc
    }

    fn persist(&mut self, key: &str, value: bool) {
        if let Err(e) = self.store.set_bool(key, value) {
            log::warn!("[Flags] Failed to persist {}: {}", key, e);
        }
    }

    // --- sidebar ---

    /// Applies the persisted collapsed flag to the panel, waiting a bounded
    /// time for the panel to appear. Returns the collapsed state.
    pub async fn restore_collapsed_state(&mut self) -> bool {
        self.state.collapsed = self.store.get_bool(SIDEBAR_COLLAPSED_KEY);

        if let Err(e) = wait::wait_for_element(&self.doc, &self.selectors.panel, self.config.restore_timeout()).await {
            log::debug!("[Sidebar] restore skipped: {}", e);
            return self.state.collapsed;
        }

        let result = sidebar::apply_collapsed(
            &mut *self.doc.borrow_mut(),
            &self.selectors,
            &self.config.classes,
            self.state.collapsed,
        );
        match result {
            Ok(true) => log::debug!("[Sidebar] restored collapsed={}", self.state.collapsed),
            Ok(false) => {}
            Err(e) => log::debug!("[Sidebar] restore skipped: {}", e),
        }
        self.state.collapsed
    }

    /// Flips the collapsed state and persists it. No-op without a panel.
    pub fn toggle_collapsed(&mut self) -> bool {
        let collapsed = !self.state.collapsed;
        {
            let mut dom = self.doc.borrow_mut();
            let classes = &self.config.classes;
            if let Err(e) = sidebar::apply_collapsed(&mut *dom, &self.selectors, classes, collapsed) {
                log::debug!("[Sidebar] toggle skipped: {}", e);
                return self.state.collapsed;
            }
            // transitions only once the user acts
            if let Err(e) = sidebar::mark_ready(&mut *dom, &self.selectors, classes) {
                log::debug!("[Sidebar] ready marker skipped: {}", e);
            }
        }

        self.state.collapsed = collapsed;
        self.persist(SIDEBAR_COLLAPSED_KEY, collapsed);
        log::info!("[Sidebar] collapsed={}", collapsed);
        collapsed
    }

    /// Adds the ready class after the configured delay.
    pub async fn mark_ready(&self) {
        tokio::time::sleep(self.config.ready_delay()).await;
        if let Err(e) = sidebar::mark_ready(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes) {
            log::debug!("[Sidebar] ready marker skipped: {}", e);
        }
    }

    pub fn restore_dark_mode(&mut self) -> bool {
        self.state.dark_mode = self.store.get_bool(DARK_MODE_KEY);
        let dark = self.state.dark_mode;
        if let Err(e) = sidebar::apply_dark_mode(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes, dark) {
            log::debug!("[Sidebar] dark mode restore skipped: {}", e);
        }
        dark
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        let dark = !self.state.dark_mode;
        let result = sidebar::apply_dark_mode(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes, dark);
        if let Err(e) = result {
            log::debug!("[Sidebar] dark mode toggle skipped: {}", e);
            return self.state.dark_mode;
        }

        self.state.dark_mode = dark;
        self.persist(DARK_MODE_KEY, dark);
        log::info!("[Sidebar] dark_mode={}", dark);
        dark
    }

    // --- menu ---

    /// Highlights the navigation entry best matching `path` and clears all
    /// others. Returns the index of the highlighted entry.
    pub fn set_active_menu_item(&mut self, path: &str) -> Option<usize> {
        let location = Location::new(path, None, &self.config.base_path);
        self.state.active_path = location.path.clone();
        let index = sidebar::highlight_for_path(
            &mut *self.doc.borrow_mut(),
            &self.selectors,
            &self.config.classes,
            &self.config.nav_entries,
            &self.config.base_path,
            &location.path,
        );
        if index.is_none() {
            log::debug!("[Sidebar] no menu entry for {}", location.path);
        }
        index
    }

    // --- breadcrumbs ---

    pub fn build_breadcrumbs(&self, path: &str, hash: &str) -> Vec<Crumb> {
        navigation::build_breadcrumbs(&self.config, path, hash)
    }

    /// Rebuilds the breadcrumb list from the current state.
    pub fn render_breadcrumbs(&self) -> Vec<Crumb> {
        let crumbs = self.build_breadcrumbs(
            &self.state.active_path,
            self.state.active_hash.as_deref().unwrap_or_default(),
        );
        if let Err(e) = breadcrumbs::render(&mut *self.doc.borrow_mut(), &self.selectors, &crumbs) {
            log::debug!("[Breadcrumb] render skipped: {}", e);
        }
        crumbs
    }

    // --- tabs ---

    /// Activates the tab named by `hash`. Unknown hashes leave the page alone.
    pub fn activate_tab_from_hash(&mut self, hash: &str) -> bool {
        let result = tabs::activate_tab(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes, hash);
        match result {
            Ok(changed) => {
                if changed {
                    log::debug!("[Tabs] activated {}", hash);
                }
                true
            }
            Err(e) => {
                log::debug!("[Tabs] {}", e);
                false
            }
        }
    }

    /// Brings the URL hash and the visible tab into agreement. A hash in the
    /// URL wins; without one, an already active tab's hash is adopted.
    fn sync_tab_with_location(&mut self) {
        match self.state.active_hash.clone() {
            Some(hash) => {
                self.activate_tab_from_hash(&hash);
            }
            None => {
                let active = tabs::active_tab_hash(&*self.doc.borrow(), &self.selectors, &self.config.classes);
                if let Some(hash) = active {
                    log::debug!("[Tabs] adopting active tab {}", hash);
                    self.state.active_hash = Some(hash);
                }
            }
        }
    }

    // --- lifecycle ---

    pub async fn on_page_load(&mut self) {
        self.restore_collapsed_state().await;
        self.restore_dark_mode();
        let path = self.state.active_path.clone();
        self.set_active_menu_item(&path);
        self.sync_tab_with_location();
        self.render_breadcrumbs();
        self.mark_ready().await;
    }

    pub fn on_hash_change(&mut self, hash: &str) {
        self.state.active_hash = normalize_hash(hash);
        if let Some(hash) = self.state.active_hash.clone() {
            self.activate_tab_from_hash(&hash);
        }
        self.render_breadcrumbs();
    }

    /// Fades then removes the success alerts. Returns how many were removed.
    pub async fn dismiss_alerts(&self) -> usize {
        tokio::time::sleep(self.config.alert_delay()).await;
        let faded = chrome::fade_alerts(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes);
        if faded.is_empty() {
            return 0;
        }

        tokio::time::sleep(self.config.fade_delay()).await;
        chrome::remove_alerts(&mut *self.doc.borrow_mut(), &self.selectors, &faded)
    }

    pub fn open_confirm(&mut self, trigger: NodeId) -> bool {
        let result = chrome::open_confirm(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes, trigger);
        if let Err(e) = &result {
            log::debug!("[Modal] open skipped: {}", e);
        }
        result.is_ok()
    }

    pub fn close_confirm(&mut self) -> bool {
        chrome::close_confirm(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes)
    }

    // --- clicks ---

    /// Innermost element matching `selector` that is `node` or contains it.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let dom = self.doc.borrow();
        dom.query_all(selector)
            .into_iter()
            .rev()
            .find(|candidate| dom.contains(*candidate, node))
    }

    /// Routes a click on `node` to the behaviour its element carries.
    /// Navigation links only move the highlight; they never change the
    /// collapsed state.
    pub fn handle_click(&mut self, node: NodeId) -> ClickOutcome {
        let closed = chrome::close_dropdown_on_outside_click(
            &mut *self.doc.borrow_mut(),
            &self.selectors,
            &self.config.classes,
            node,
        );

        let outcome = self.route_click(node);
        if outcome == ClickOutcome::Ignored && closed {
            ClickOutcome::DropdownClosed
        } else {
            outcome
        }
    }

    fn route_click(&mut self, node: NodeId) -> ClickOutcome {
        if self.closest(node, &self.selectors.toggle).is_some() {
            let collapsed = self.toggle_collapsed();
            return ClickOutcome::Toggled { collapsed };
        }

        if self.closest(node, &self.selectors.mode_switch).is_some() {
            let dark = self.toggle_dark_mode();
            return ClickOutcome::DarkModeToggled { dark };
        }

        if let Some(item) = self.closest(node, &self.selectors.profile_items) {
            let target = chrome::menu_action_target(
                &mut *self.doc.borrow_mut(),
                &self.selectors,
                &self.config.classes,
                &self.config.menu_actions,
                &self.config.base_path,
                item,
            );
            return match target {
                Some(url) => ClickOutcome::Navigate { url },
                None => ClickOutcome::Ignored,
            };
        }

        if self.closest(node, &self.selectors.profile_icon).is_some() {
            return match chrome::toggle_dropdown(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes) {
                Ok(open) => ClickOutcome::DropdownToggled { open },
                Err(e) => {
                    log::debug!("[Profile] {}", e);
                    ClickOutcome::Ignored
                }
            };
        }

        if let Some(link) = self.closest(node, &self.selectors.nav_links) {
            let href = self.doc.borrow().attr(link, "href").unwrap_or_default();
            sidebar::highlight_link(&mut *self.doc.borrow_mut(), &self.selectors, &self.config.classes, Some(link));
            return ClickOutcome::MenuSelected { href };
        }

        if let Some(trigger) = self.closest(node, &self.selectors.tab_triggers) {
            let hash = tabs::trigger_hash(&*self.doc.borrow(), trigger);
            if let Some(hash) = hash {
                if self.activate_tab_from_hash(&hash) {
                    self.state.active_hash = Some(hash.clone());
                    self.render_breadcrumbs();
                    return ClickOutcome::TabActivated { hash };
                }
            }
            return ClickOutcome::Ignored;
        }

        if let Some(button) = self.closest(node, &self.selectors.delete_buttons) {
            return if self.open_confirm(button) {
                ClickOutcome::ModalOpened
            } else {
                ClickOutcome::Ignored
            };
        }

        if let Some(yes) = self.closest(node, &self.selectors.confirm_yes) {
            let href = self.doc.borrow().attr(yes, "href").filter(|h| !h.is_empty());
            if let Some(url) = href {
                self.close_confirm();
                return ClickOutcome::Navigate { url };
            }
        }

        ClickOutcome::Ignored
    }
}
