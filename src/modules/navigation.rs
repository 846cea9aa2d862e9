// Pure navigation logic - no DOM access allowed.
// URL splitting, menu matching and breadcrumb building live here so they can be
// unit tested on their own.

use serde::Serialize;
use url::Url;

use crate::error::{NavError, Result};
use crate::settings::{NavConfig, NavEntry};

/// Current page address as the controller sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Context path stripped, no trailing slash, `/` for root.
    pub path: String,
    /// Always `#`-prefixed and non-empty when present.
    pub hash: Option<String>,
}

impl Location {
    pub fn new(path: &str, hash: Option<&str>, base_path: &str) -> Self {
        Self {
            path: normalize_path(strip_base(path, base_path)),
            hash: hash.and_then(normalize_hash),
        }
    }

    /// Accepts an absolute URL or a site-relative `/path?query#hash`.
    pub fn parse(input: &str, base_path: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.starts_with('#') {
            let (rest, hash) = match trimmed.split_once('#') {
                Some((rest, hash)) => (rest, Some(hash)),
                None => (trimmed, None),
            };
            let path = rest.split('?').next().unwrap_or_default();
            return Ok(Self::new(path, hash, base_path));
        }

        let url = Url::parse(trimmed).map_err(|e| NavError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
        Ok(Self::new(url.path(), url.fragment(), base_path))
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }
}

/// `""` and `"/"` become `/`; trailing slashes are dropped; a leading slash
/// is added when missing.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// `"#x"` and `"x"` both become `Some("#x")`; `""` and `"#"` become `None`.
pub fn normalize_hash(hash: &str) -> Option<String> {
    let bare = hash.trim().trim_start_matches('#');
    if bare.is_empty() {
        None
    } else {
        Some(format!("#{}", bare))
    }
}

fn strip_base<'a>(path: &'a str, base_path: &str) -> &'a str {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Prepends the context path to a site-relative path.
pub fn with_base(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        path.to_string()
    } else if path == "/" {
        base.to_string()
    } else {
        format!("{}{}", base, path)
    }
}

/// Segment-aware prefix test: `/tasks` covers `/tasks` and `/tasks/7`,
/// never `/tasksboard`.
fn covers(entry: &str, path: &str) -> bool {
    match path.strip_prefix(entry) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Index of the navigation entry to highlight for `path`.
///
/// Longest covering prefix wins; equal lengths keep the first declared. The
/// root entry is only chosen when nothing else covers the path.
pub fn best_match(entries: &[NavEntry], path: &str) -> Option<usize> {
    let path = normalize_path(path);
    let mut best: Option<(usize, usize)> = None;
    let mut root = None;

    for (i, entry) in entries.iter().enumerate() {
        let candidate = normalize_path(&entry.path);
        if candidate == "/" {
            root = root.or(Some(i));
            continue;
        }
        if covers(&candidate, &path) && best.map_or(true, |(_, len)| candidate.len() > len) {
            best = Some((i, candidate.len()));
        }
    }

    best.map(|(i, _)| i).or(root)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `my-folder` -> `My Folder`. Dashes become spaces, then every word is
/// capitalized.
pub fn derive_label(slug: &str) -> String {
    slug.replace('-', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub label: String,
    /// `None` for the current, non-navigable entry.
    pub href: Option<String>,
}

impl Crumb {
    fn link(label: String, href: String) -> Self {
        Self { label, href: Some(href) }
    }

    pub fn is_current(&self) -> bool {
        self.href.is_none()
    }
}

/// Home, then one crumb per path segment, then the hash if present. Only the
/// last crumb after Home is non-navigable. The root path yields Home alone,
/// whatever the hash.
pub fn build_breadcrumbs(config: &NavConfig, path: &str, hash: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb::link(
        config.home_label.clone(),
        with_base(&config.base_path, "/"),
    )];
    if normalize_path(path) == "/" {
        return crumbs;
    }

    let hash = normalize_hash(hash);

    let mut cumulative = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        cumulative.push('/');
        cumulative.push_str(segment);

        let decoded = urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        let label = config
            .path_label(&cumulative)
            .or_else(|| config.path_label(&format!("/{}", segment)))
            .map(str::to_string)
            .unwrap_or_else(|| derive_label(&decoded));

        crumbs.push(Crumb::link(label, with_base(&config.base_path, &cumulative)));
    }

    match hash {
        Some(hash) => {
            let label = config
                .hash_label(&hash)
                .map(str::to_string)
                .unwrap_or_else(|| derive_label(&hash[1..]));
            crumbs.push(Crumb { label, href: None });
        }
        None => {
            if crumbs.len() > 1 {
                if let Some(last) = crumbs.last_mut() {
                    last.href = None;
                }
            }
        }
    }

    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entries() -> Vec<NavEntry> {
        vec![
            NavEntry::new("/", "Home"),
            NavEntry::new("/tasks", "Tasks"),
            NavEntry::new("/reports", "Reports"),
        ]
    }

    // --- Location ---

    #[rstest]
    #[case("https://example.com/settings#account-general", "/settings", Some("#account-general"))]
    #[case("https://example.com/", "/", None)]
    #[case("https://example.com/tasks/7/?page=2", "/tasks/7", None)]
    #[case("/tasks/7#", "/tasks/7", None)]
    #[case("/reports?year=2024#summary", "/reports", Some("#summary"))]
    #[case("", "/", None)]
    #[case("#account-info", "/", Some("#account-info"))]
    fn test_location_parse(#[case] input: &str, #[case] path: &str, #[case] hash: Option<&str>) {
        let loc = Location::parse(input, "").unwrap();
        assert_eq!(loc.path, path);
        assert_eq!(loc.hash.as_deref(), hash);
    }

    #[rstest]
    #[case("/portal/tasks", "/tasks")]
    #[case("/portal", "/")]
    #[case("/portal/", "/")]
    #[case("/portalx/tasks", "/portalx/tasks")]
    fn test_location_strips_base(#[case] input: &str, #[case] path: &str) {
        assert_eq!(Location::parse(input, "/portal/").unwrap().path, path);
    }

    #[test]
    fn test_location_rejects_garbage() {
        assert!(matches!(Location::parse("not a url", ""), Err(NavError::InvalidUrl(_))));
    }

    // --- best_match ---

    #[rstest]
    #[case("/tasks/7", Some(1))]
    #[case("/tasks", Some(1))]
    #[case("/tasks/", Some(1))]
    #[case("/reports/2024/q1", Some(2))]
    #[case("/", Some(0))]
    #[case("", Some(0))]
    #[case("/tasksboard", Some(0))]
    #[case("/unknown", Some(0))]
    fn test_best_match(#[case] path: &str, #[case] expected: Option<usize>) {
        assert_eq!(best_match(&entries(), path), expected);
    }

    #[test]
    fn test_best_match_longest_prefix() {
        let entries = vec![
            NavEntry::new("/admin", "Admin"),
            NavEntry::new("/admin/users", "Users"),
        ];
        assert_eq!(best_match(&entries, "/admin/users/3"), Some(1));
        assert_eq!(best_match(&entries, "/admin/roles"), Some(0));
    }

    #[test]
    fn test_best_match_tie_keeps_first_declared() {
        let entries = vec![
            NavEntry::new("/tasks", "Tasks"),
            NavEntry::new("/tasks/", "Tasks again"),
        ];
        assert_eq!(best_match(&entries, "/tasks/1"), Some(0));
    }

    #[test]
    fn test_best_match_without_root() {
        let entries = vec![NavEntry::new("/tasks", "Tasks")];
        assert_eq!(best_match(&entries, "/"), None);
        assert_eq!(best_match(&[], "/tasks"), None);
    }

    // --- labels ---

    #[rstest]
    #[case("my-folder", "My Folder")]
    #[case("account-change-password", "Account Change Password")]
    #[case("reports", "Reports")]
    #[case("año-nuevo", "Año Nuevo")]
    #[case("my-task list", "My Task List")]
    #[case("two--dashes", "Two Dashes")]
    fn test_derive_label(#[case] slug: &str, #[case] expected: &str) {
        assert_eq!(derive_label(slug), expected);
    }

    // --- breadcrumbs ---

    fn labels(crumbs: &[Crumb]) -> Vec<&str> {
        crumbs.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_breadcrumbs_settings_hash() {
        let crumbs = build_breadcrumbs(&NavConfig::default(), "/settings", "#account-general");
        assert_eq!(labels(&crumbs), vec!["Home", "Settings", "General"]);
        assert_eq!(crumbs[0].href.as_deref(), Some("/"));
        assert_eq!(crumbs[1].href.as_deref(), Some("/settings"));
        assert!(crumbs[2].is_current());
    }

    #[rstest]
    #[case("/", "")]
    #[case("/", "#account-general")]
    #[case("", "#unknown-tab")]
    fn test_breadcrumbs_root_only_home(#[case] path: &str, #[case] hash: &str) {
        let crumbs = build_breadcrumbs(&NavConfig::default(), path, hash);
        assert_eq!(labels(&crumbs), vec!["Home"]);
        assert_eq!(crumbs[0].href.as_deref(), Some("/"));
    }

    #[test]
    fn test_breadcrumbs_nested_path() {
        let crumbs = build_breadcrumbs(&NavConfig::default(), "/tasks/my-task%20list", "");
        assert_eq!(labels(&crumbs), vec!["Home", "Tasks", "My Task List"]);
        assert_eq!(crumbs[1].href.as_deref(), Some("/tasks"));
        assert!(crumbs[2].is_current());
        assert_eq!(crumbs.iter().filter(|c| c.is_current()).count(), 1);
    }

    #[test]
    fn test_breadcrumbs_unknown_hash_is_derived() {
        let crumbs = build_breadcrumbs(&NavConfig::default(), "/settings", "billing-info");
        assert_eq!(labels(&crumbs), vec!["Home", "Settings", "Billing Info"]);
    }

    #[test]
    fn test_breadcrumbs_with_base_path() {
        let mut config = NavConfig::default();
        config.base_path = "/portal".to_string();
        let crumbs = build_breadcrumbs(&config, "/reports/annual", "");
        assert_eq!(crumbs[0].href.as_deref(), Some("/portal"));
        assert_eq!(crumbs[1].href.as_deref(), Some("/portal/reports"));
        assert!(crumbs[2].is_current());
    }
}
