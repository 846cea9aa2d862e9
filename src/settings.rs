use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::selector::Selector;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavEntry {
    pub path: String,
    pub label: String,
}

impl NavEntry {
    pub fn new(path: &str, label: &str) -> Self {
        Self {
            path: path.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HashLabel {
    pub hash: String,
    pub label: String,
}

/// Where the controller finds things on the page. Plain strings here; the
/// controller parses them once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub panel: String,
    pub toggle: String,
    pub body: String,
    pub mode_switch: String,
    pub mode_text: String,
    pub nav_links: String,
    pub breadcrumb_list: String,
    pub tab_triggers: String,
    pub tab_panes: String,
    pub profile_icon: String,
    pub profile_dropdown: String,
    pub profile_items: String,
    pub alerts: String,
    pub delete_buttons: String,
    pub confirm_modal: String,
    pub confirm_text: String,
    pub confirm_yes: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            panel: ".wrapper".to_string(),
            toggle: ".hamburger .hamburger__inner".to_string(),
            body: "body".to_string(),
            mode_switch: ".sidebar .bottom-content .toggle-switch".to_string(),
            mode_text: ".sidebar .bottom-content .mode-text".to_string(),
            nav_links: ".sidebar ul li a".to_string(),
            breadcrumb_list: ".breadcrumb-list".to_string(),
            tab_triggers: ".account-settings-links a".to_string(),
            tab_panes: ".tab-pane".to_string(),
            profile_icon: ".top_navbar .right_menu .fas".to_string(),
            profile_dropdown: ".profile-dropdown".to_string(),
            profile_items: ".profile-dropdown .navbar-profile-item".to_string(),
            alerts: ".alert.alert-success.alert-dismissible".to_string(),
            delete_buttons: ".btn-delete".to_string(),
            confirm_modal: "#confirmModal".to_string(),
            confirm_text: "#confirmText".to_string(),
            confirm_yes: "#yesBtn".to_string(),
        }
    }
}

impl SelectorConfig {
    pub fn compile(&self) -> Result<Selectors> {
        Ok(Selectors {
            panel: self.panel.parse()?,
            toggle: self.toggle.parse()?,
            body: self.body.parse()?,
            mode_switch: self.mode_switch.parse()?,
            mode_text: self.mode_text.parse()?,
            nav_links: self.nav_links.parse()?,
            breadcrumb_list: self.breadcrumb_list.parse()?,
            tab_triggers: self.tab_triggers.parse()?,
            tab_panes: self.tab_panes.parse()?,
            profile_icon: self.profile_icon.parse()?,
            profile_dropdown: self.profile_dropdown.parse()?,
            profile_items: self.profile_items.parse()?,
            alerts: self.alerts.parse()?,
            delete_buttons: self.delete_buttons.parse()?,
            confirm_modal: self.confirm_modal.parse()?,
            confirm_text: self.confirm_text.parse()?,
            confirm_yes: self.confirm_yes.parse()?,
        })
    }
}

/// Parsed form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct Selectors {
    pub panel: Selector,
    pub toggle: Selector,
    pub body: Selector,
    pub mode_switch: Selector,
    pub mode_text: Selector,
    pub nav_links: Selector,
    pub breadcrumb_list: Selector,
    pub tab_triggers: Selector,
    pub tab_panes: Selector,
    pub profile_icon: Selector,
    pub profile_dropdown: Selector,
    pub profile_items: Selector,
    pub alerts: Selector,
    pub delete_buttons: Selector,
    pub confirm_modal: Selector,
    pub confirm_text: Selector,
    pub confirm_yes: Selector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassConfig {
    pub collapsed: String,
    pub ready: String,
    pub dark: String,
    pub active: String,
    pub show: String,
    pub fade: String,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            collapsed: "active".to_string(),
            ready: "sidebar-ready".to_string(),
            dark: "dark".to_string(),
            active: "active".to_string(),
            show: "show".to_string(),
            fade: "fade".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Context path the site is mounted under, e.g. `/portal`. Empty for root.
    pub base_path: String,
    pub home_label: String,
    /// Ordered; earlier entries win ties.
    pub nav_entries: Vec<NavEntry>,
    pub hash_labels: Vec<HashLabel>,
    pub selectors: SelectorConfig,
    pub classes: ClassConfig,
    pub restore_timeout_ms: u64,
    pub ready_delay_ms: u64,
    pub alert_delay_ms: u64,
    pub fade_delay_ms: u64,
    /// Profile menu `data-action` -> target path.
    pub menu_actions: BTreeMap<String, String>,
}

impl Default for NavConfig {
    fn default() -> Self {
        let hash_labels = [
            ("#account-general", "General"),
            ("#account-change-password", "Change Password"),
            ("#account-info", "Info"),
            ("#account-social-links", "Social Links"),
            ("#account-connections", "Connections"),
            ("#account-notifications", "Notifications"),
        ]
        .into_iter()
        .map(|(hash, label)| HashLabel {
            hash: hash.to_string(),
            label: label.to_string(),
        })
        .collect();

        let menu_actions = [
            ("profile", "/settings#account-general"),
            ("password", "/settings#account-change-password"),
            ("logout", "/"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            base_path: String::new(),
            home_label: "Home".to_string(),
            nav_entries: vec![
                NavEntry::new("/", "Home"),
                NavEntry::new("/tasks", "Tasks"),
                NavEntry::new("/tutorials", "Tutorials"),
                NavEntry::new("/reports", "Reports"),
                NavEntry::new("/admin", "Admin"),
                NavEntry::new("/settings", "Settings"),
                NavEntry::new("/dashboard", "Dashboard"),
            ],
            hash_labels,
            selectors: SelectorConfig::default(),
            classes: ClassConfig::default(),
            restore_timeout_ms: 300,
            ready_delay_ms: 50,
            alert_delay_ms: 5000,
            fade_delay_ms: 500,
            menu_actions,
        }
    }
}

impl NavConfig {
    /// Missing file means defaults; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&tmp_path, json)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Configured label for an exact path, if any.
    pub fn path_label(&self, path: &str) -> Option<&str> {
        self.nav_entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.label.as_str())
    }

    /// Configured label for a `#`-prefixed hash, if any.
    pub fn hash_label(&self, hash: &str) -> Option<&str> {
        self.hash_labels
            .iter()
            .find(|h| h.hash == hash)
            .map(|h| h.label.as_str())
    }

    pub fn restore_timeout(&self) -> Duration {
        Duration::from_millis(self.restore_timeout_ms)
    }

    pub fn ready_delay(&self) -> Duration {
        Duration::from_millis(self.ready_delay_ms)
    }

    pub fn alert_delay(&self) -> Duration {
        Duration::from_millis(self.alert_delay_ms)
    }

    pub fn fade_delay(&self) -> Duration {
        Duration::from_millis(self.fade_delay_ms)
    }
}
