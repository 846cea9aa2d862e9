// Document abstraction the controller works against.
// The server renders the structure; the controller only discovers elements by
// selector and toggles classes, attributes and text on them.

use std::collections::BTreeMap;

use tokio::sync::watch;

use crate::selector::{Compound, Selector};

pub type NodeId = usize;

/// Description of an element to insert. Built with the chained setters.
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        for c in class.split_whitespace() {
            if !self.classes.iter().any(|existing| existing == c) {
                self.classes.push(c.to_string());
            }
        }
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

/// Subscription to document mutations. Dropping it deregisters.
pub struct MutationObserver {
    rx: watch::Receiver<u64>,
}

impl MutationObserver {
    /// Waits for the next mutation. Returns `false` once the document is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// The page as seen by the controller.
///
/// Mutating methods return whether anything actually changed, and
/// implementations must only notify observers when it did.
pub trait Dom {
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;

    fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool;

    /// True when `node` is `ancestor` or lies beneath it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) -> bool;

    fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        let on = !self.has_class(node, class);
        self.set_class(node, class, on);
        on
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> bool;

    fn element_id(&self, node: NodeId) -> Option<String> {
        self.attr(node, "id").filter(|id| !id.is_empty())
    }

    /// Text content of the node and all its descendants.
    fn text(&self, node: NodeId) -> String;

    /// Replaces the node's children with a single text run.
    fn set_text(&mut self, node: NodeId, text: &str) -> bool;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn append(&mut self, parent: NodeId, element: Element) -> NodeId;

    fn clear_children(&mut self, node: NodeId) -> bool;

    fn remove(&mut self, node: NodeId) -> bool;

    fn observe(&self) -> MutationObserver;
}

#[derive(Debug)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document used natively and in tests.
///
/// Node 0 is `html`, node 1 is `body`. Removing a node frees its whole
/// subtree and later inserts reuse the slots, so a removed node's id must not
/// be used again.
pub struct MemoryDom {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    revision: watch::Sender<u64>,
}

const ROOT: NodeId = 0;

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        let mut dom = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            revision,
        };
        dom.alloc(Element::new("html"), None);
        dom.alloc(Element::new("body"), Some(ROOT));
        dom
    }

    pub fn body(&self) -> NodeId {
        1
    }

    /// Number of effective mutations so far.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Number of elements currently held, detached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.revision.receiver_count()
    }

    fn touch(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn alloc(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            tag: element.tag,
            classes: element.classes,
            attrs: element.attrs,
            text: element.text,
            parent,
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.push(id);
        }
        for child in element.children {
            self.alloc(child, Some(id));
        }
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    /// Drops `id` and everything beneath it, returning the slots for reuse.
    fn release(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id).and_then(Option::take) else {
            return;
        };
        self.free.push(id);
        for child in node.children {
            self.release(child);
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn compound_matches(&self, id: NodeId, compound: &Compound) -> bool {
        match self.node(id) {
            Some(n) => compound.matches(
                &n.tag,
                n.attrs.get("id").map(String::as_str),
                |c| n.classes.iter().any(|have| have == c),
            ),
            None => false,
        }
    }

    fn chain_matches(&self, id: NodeId, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        if !self.compound_matches(id, last) {
            return false;
        }

        // Greedy leftward walk is exact for descendant-only chains.
        let mut remaining = ancestors;
        let mut cursor = self.node(id).and_then(|n| n.parent);
        while let Some((want, rest)) = remaining.split_last() {
            loop {
                match cursor {
                    None => return false,
                    Some(p) => {
                        cursor = self.node(p).and_then(|n| n.parent);
                        if self.compound_matches(p, want) {
                            break;
                        }
                    }
                }
            }
            remaining = rest;
        }
        true
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(n) = self.node(id) {
            out.push_str(&n.text);
            for child in &n.children {
                self.collect_text(*child, out);
            }
        }
    }

    fn detach_children(&mut self, id: NodeId) -> bool {
        let children = match self.node_mut(id) {
            Some(n) => std::mem::take(&mut n.children),
            None => return false,
        };
        let changed = !children.is_empty();
        for child in children {
            self.release(child);
        }
        changed
    }
}

impl Dom for MemoryDom {
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            if selector.groups().iter().any(|chain| self.chain_matches(id, chain)) {
                found.push(id);
            }
            if let Some(n) = self.node(id) {
                stack.extend(n.children.iter().rev());
            }
        }
        found
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.groups().iter().any(|chain| self.chain_matches(node, chain))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn set_class(&mut self, node: NodeId, class: &str, on: bool) -> bool {
        let Some(n) = self.node_mut(node) else {
            return false;
        };
        let present = n.classes.iter().position(|c| c == class);
        let changed = match (present, on) {
            (None, true) => {
                n.classes.push(class.to_string());
                true
            }
            (Some(i), false) => {
                n.classes.remove(i);
                true
            }
            _ => false,
        };
        if changed {
            self.touch();
        }
        changed
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).and_then(|n| n.attrs.get(name).cloned())
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(n) = self.node_mut(node) else {
            return false;
        };
        if n.attrs.get(name).map(String::as_str) == Some(value) {
            return false;
        }
        n.attrs.insert(name.to_string(), value.to_string());
        self.touch();
        true
    }

    fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> bool {
        let unchanged = match self.node(node) {
            Some(n) => n.children.is_empty() && n.text == text,
            None => return false,
        };
        if unchanged {
            return false;
        }
        self.detach_children(node);
        if let Some(n) = self.node_mut(node) {
            n.text = text.to_string();
        }
        self.touch();
        true
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let parent = self.node(parent).map(|_| parent);
        let id = self.alloc(element, parent);
        self.touch();
        id
    }

    fn clear_children(&mut self, node: NodeId) -> bool {
        let changed = self.detach_children(node);
        if changed {
            self.touch();
        }
        changed
    }

    fn remove(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.node(node).and_then(|n| n.parent) else {
            return false;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != node);
        }
        self.release(node);
        self.touch();
        true
    }

    fn observe(&self) -> MutationObserver {
        MutationObserver {
            rx: self.revision.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    fn sidebar_page() -> MemoryDom {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        dom.append(
            body,
            Element::new("div").class("wrapper").child(
                Element::new("div").class("sidebar").child(
                    Element::new("ul")
                        .child(Element::new("li").child(Element::new("a").attr("href", "/").text("Home")))
                        .child(Element::new("li").child(Element::new("a").attr("href", "/tasks").text("Tasks"))),
                ),
            ),
        );
        dom
    }

    #[test]
    fn test_query_document_order() {
        let dom = sidebar_page();
        let links = dom.query_all(&sel(".sidebar ul li a"));
        assert_eq!(links.len(), 2);
        assert_eq!(dom.attr(links[0], "href").as_deref(), Some("/"));
        assert_eq!(dom.attr(links[1], "href").as_deref(), Some("/tasks"));
        assert!(dom.query(&sel(".wrapper li a.missing")).is_none());
        assert!(dom.query(&sel("body .wrapper")).is_some());
    }

    #[test]
    fn test_descendant_requires_ancestor() {
        let mut dom = sidebar_page();
        let body = dom.body();
        dom.append(body, Element::new("a").attr("href", "/outside"));
        assert_eq!(dom.query_all(&sel(".sidebar a")).len(), 2);
        assert_eq!(dom.query_all(&sel("a")).len(), 3);
    }

    #[test]
    fn test_set_class_only_touches_on_change() {
        let mut dom = sidebar_page();
        let wrapper = dom.query(&sel(".wrapper")).unwrap();
        let before = dom.revision();

        assert!(dom.set_class(wrapper, "active", true));
        assert!(!dom.set_class(wrapper, "active", true));
        assert_eq!(dom.revision(), before + 1);

        assert!(!dom.toggle_class(wrapper, "active"));
        assert!(!dom.has_class(wrapper, "active"));
    }

    #[test]
    fn test_text_and_set_text() {
        let mut dom = sidebar_page();
        let list = dom.query(&sel(".sidebar ul")).unwrap();
        assert_eq!(dom.text(list), "HomeTasks");

        assert!(dom.set_text(list, "gone"));
        assert!(!dom.set_text(list, "gone"));
        assert!(dom.query(&sel(".sidebar a")).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut dom = sidebar_page();
        let list = dom.query(&sel(".sidebar ul")).unwrap();
        let first = dom.children(list)[0];

        assert!(dom.remove(first));
        assert!(!dom.remove(first));
        assert_eq!(dom.children(list).len(), 1);

        assert!(dom.clear_children(list));
        assert!(!dom.clear_children(list));
        assert!(dom.query(&sel("li")).is_none());
    }

    #[test]
    fn test_removed_subtrees_are_reused() {
        let mut dom = sidebar_page();
        let list = dom.query(&sel(".sidebar ul")).unwrap();
        let before = dom.node_count();

        for _ in 0..5 {
            dom.clear_children(list);
            dom.append(list, Element::new("li").child(Element::new("a").attr("href", "/tasks")));
            dom.append(list, Element::new("li").child(Element::new("a").attr("href", "/reports")));
        }
        assert_eq!(dom.node_count(), before);
        assert_eq!(dom.query_all(&sel(".sidebar a")).len(), 2);

        let link = dom.query(&sel(".sidebar a")).unwrap();
        dom.set_text(list, "empty");
        assert_eq!(dom.node_count(), before - 4);
        assert!(!dom.has_class(link, "active"));
        assert_eq!(dom.attr(link, "href"), None);
    }

    #[test]
    fn test_contains() {
        let dom = sidebar_page();
        let sidebar = dom.query(&sel(".sidebar")).unwrap();
        let link = dom.query(&sel(".sidebar a")).unwrap();
        assert!(dom.contains(sidebar, link));
        assert!(dom.contains(link, link));
        assert!(!dom.contains(link, sidebar));
    }

    #[tokio::test]
    async fn test_observer_sees_mutation() {
        let mut dom = sidebar_page();
        let mut observer = dom.observe();
        assert_eq!(dom.observer_count(), 1);

        let body = dom.body();
        dom.append(body, Element::new("p"));
        assert!(observer.changed().await);

        drop(observer);
        assert_eq!(dom.observer_count(), 0);
    }
}
