use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::dom::{Dom, NodeId};
use crate::error::{NavError, Result};
use crate::selector::Selector;

/// Waits up to `timeout` for `selector` to match something in the document.
///
/// Resolves immediately when the element is already there. Otherwise every
/// document mutation triggers a re-query. The observer is dropped on every
/// exit path, found or not.
pub async fn wait_for_element<D: Dom>(
    doc: &Rc<RefCell<D>>,
    selector: &Selector,
    timeout: Duration,
) -> Result<NodeId> {
    let mut observer = {
        let dom = doc.borrow();
        if let Some(node) = dom.query(selector) {
            return Ok(node);
        }
        dom.observe()
    };

    let found = tokio::time::timeout(timeout, async {
        while observer.changed().await {
            if let Some(node) = doc.borrow().query(selector) {
                return Some(node);
            }
        }
        None
    })
    .await;

    match found {
        Ok(Some(node)) => Ok(node),
        _ => {
            log::debug!("[Wait] gave up on {} after {:?}", selector, timeout);
            Err(NavError::ElementNotFound(selector.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, MemoryDom};

    fn doc() -> Rc<RefCell<MemoryDom>> {
        Rc::new(RefCell::new(MemoryDom::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_present_resolves_immediately() {
        let doc = doc();
        {
            let mut dom = doc.borrow_mut();
            let body = dom.body();
            dom.append(body, Element::new("div").class("wrapper"));
        }
        let sel = Selector::parse(".wrapper").unwrap();
        assert!(wait_for_element(&doc, &sel, Duration::from_millis(300)).await.is_ok());
        assert_eq!(doc.borrow().observer_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_when_element_arrives() {
        let doc = doc();
        let sel = Selector::parse(".wrapper").unwrap();

        let insert = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let mut dom = doc.borrow_mut();
            let body = dom.body();
            // unrelated mutation first
            dom.append(body, Element::new("nav"));
            dom.append(body, Element::new("div").class("wrapper"));
        };

        let (found, _) = tokio::join!(wait_for_element(&doc, &sel, Duration::from_millis(300)), insert);
        let node = found.unwrap();
        assert!(doc.borrow().has_class(node, "wrapper"));
        assert_eq!(doc.borrow().observer_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_and_deregisters() {
        let doc = doc();
        let sel = Selector::parse(".wrapper").unwrap();

        let late = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let mut dom = doc.borrow_mut();
            let body = dom.body();
            dom.append(body, Element::new("div").class("wrapper"));
        };

        let (result, _) = tokio::join!(wait_for_element(&doc, &sel, Duration::from_millis(300)), late);
        assert!(matches!(result, Err(NavError::ElementNotFound(_))));
        assert_eq!(doc.borrow().observer_count(), 0);
    }
}
