// CSS selector subset used to discover page elements.
// Supports `tag`, `#id`, `.class` compounds, the descendant combinator
// (whitespace) and comma-separated groups. Nothing else.

use std::fmt;
use std::str::FromStr;

use crate::error::NavError;

/// One simple-selector sequence, e.g. `a.nav-link#home`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    fn push(&mut self, marker: Option<char>, name: String) -> Option<()> {
        match marker {
            None if name.is_empty() => Some(()),
            None => {
                self.tag = Some(name.to_ascii_lowercase());
                Some(())
            }
            Some(_) if name.is_empty() => None,
            Some('#') => {
                if self.id.is_some() {
                    return None;
                }
                self.id = Some(name);
                Some(())
            }
            Some(_) => {
                self.classes.push(name);
                Some(())
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty()
    }

    /// Checks a single element against this compound.
    pub fn matches(&self, tag: &str, id: Option<&str>, has_class: impl Fn(&str) -> bool) -> bool {
        if let Some(t) = &self.tag {
            if !t.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if id != Some(want.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| has_class(c))
    }
}

fn parse_compound(text: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut marker: Option<char> = None;
    let mut name = String::new();

    for ch in text.chars() {
        match ch {
            '#' | '.' => {
                compound.push(marker, std::mem::take(&mut name))?;
                marker = Some(ch);
            }
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => name.push(c),
            _ => return None,
        }
    }
    compound.push(marker, name)?;

    if compound.is_empty() {
        None
    } else {
        Some(compound)
    }
}

/// A parsed selector. Each group is a descendant chain, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(text: &str) -> Result<Self, NavError> {
        let mut groups = Vec::new();
        for group in text.split(',') {
            let chain = group
                .split_whitespace()
                .map(parse_compound)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| NavError::InvalidSelector(text.to_string()))?;
            if chain.is_empty() {
                return Err(NavError::InvalidSelector(text.to_string()));
            }
            groups.push(chain);
        }

        Ok(Self {
            source: text.trim().to_string(),
            groups,
        })
    }

    /// Selector for a single element id.
    pub fn id(id: &str) -> Self {
        Self {
            source: format!("#{}", id),
            groups: vec![vec![Compound {
                id: Some(id.to_string()),
                ..Compound::default()
            }]],
        }
    }

    pub fn groups(&self) -> &[Vec<Compound>] {
        &self.groups
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_compound_parts() {
        let sel = Selector::parse("a.nav-link.active#home").unwrap();
        let compound = &sel.groups()[0][0];
        assert_eq!(compound.tag.as_deref(), Some("a"));
        assert_eq!(compound.id.as_deref(), Some("home"));
        assert_eq!(compound.classes, vec!["nav-link", "active"]);
    }

    #[test]
    fn test_descendant_and_groups() {
        let sel = Selector::parse(".tab-pane.active, .sidebar ul li a").unwrap();
        assert_eq!(sel.groups().len(), 2);
        assert_eq!(sel.groups()[0].len(), 1);
        assert_eq!(sel.groups()[1].len(), 4);
        assert_eq!(sel.to_string(), ".tab-pane.active, .sidebar ul li a");
    }

    #[rstest]
    #[case("")]
    #[case("a,,b")]
    #[case("..x")]
    #[case("#a#b")]
    #[case("a[href]")]
    #[case("ul > li")]
    fn test_rejects(#[case] input: &str) {
        assert!(matches!(Selector::parse(input), Err(NavError::InvalidSelector(_))));
    }

    #[test]
    fn test_from_str_and_id() {
        let sel: Selector = ".wrapper".parse().unwrap();
        assert_eq!(sel.as_str(), ".wrapper");
        assert_eq!(Selector::id("yesBtn"), Selector::parse("#yesBtn").unwrap());
    }

    #[test]
    fn test_compound_matching() {
        let sel = Selector::parse("LI.item").unwrap();
        let compound = &sel.groups()[0][0];
        assert!(compound.matches("li", None, |c| c == "item"));
        assert!(!compound.matches("div", None, |c| c == "item"));
        assert!(!compound.matches("li", None, |_| false));
    }
}
