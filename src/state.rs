// Per-page state shared between the controller and whatever hosts it.

use serde::Serialize;

use crate::controller::NavigationStateController;
use crate::dom::{Dom, NodeId};
use crate::modules::navigation::Location;
use crate::storage::{FlagStore, DARK_MODE_KEY, SIDEBAR_COLLAPSED_KEY};

/// UI flags for one page load. Only `collapsed` and `dark_mode` are ever
/// written back to the flag store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavState {
    pub collapsed: bool,
    pub dark_mode: bool,
    pub active_path: String,
    pub active_hash: Option<String>,
}

impl NavState {
    pub fn load<S: FlagStore>(store: &S, location: &Location) -> Self {
        Self {
            collapsed: store.get_bool(SIDEBAR_COLLAPSED_KEY),
            dark_mode: store.get_bool(DARK_MODE_KEY),
            active_path: location.path.clone(),
            active_hash: location.hash.clone(),
        }
    }

    /// Site-relative address the page should show.
    pub fn url(&self) -> String {
        format!("{}{}", self.active_path, self.active_hash.as_deref().unwrap_or_default())
    }
}

/// What a click did, for the host to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Toggled { collapsed: bool },
    DarkModeToggled { dark: bool },
    MenuSelected { href: String },
    TabActivated { hash: String },
    DropdownToggled { open: bool },
    DropdownClosed,
    ModalOpened,
    Navigate { url: String },
    Ignored,
}

/// Everything a page's handlers need, passed explicitly instead of living in
/// globals.
pub struct AppContext<D: Dom, S: FlagStore> {
    pub nav: NavigationStateController<D, S>,
    pub pending_navigation: Option<String>,
}

impl<D: Dom, S: FlagStore> AppContext<D, S> {
    pub fn new(nav: NavigationStateController<D, S>) -> Self {
        Self {
            nav,
            pending_navigation: None,
        }
    }

    /// Routes a click and remembers any navigation it requests.
    pub fn click(&mut self, node: NodeId) -> ClickOutcome {
        let outcome = self.nav.handle_click(node);
        if let ClickOutcome::Navigate { url } = &outcome {
            self.pending_navigation = Some(url.clone());
        }
        outcome
    }

    pub fn take_navigation(&mut self) -> Option<String> {
        self.pending_navigation.take()
    }
}
