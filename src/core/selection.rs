//! Marker selection notifications
//!
//! One listener at a time; registering a new one replaces the old. Dispatch
//! is synchronous and fire-and-forget.

use super::nodes::{MarkerCategory, NodeId};

/// Raised when a visible marker is clicked
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSelected<P> {
    pub id: NodeId,
    /// Position in the node list at click time
    pub index: usize,
    pub category: MarkerCategory,
    pub payload: P,
}

pub type SelectListener<P> = Box<dyn FnMut(&NodeSelected<P>)>;

pub struct SelectionDispatch<P> {
    listener: Option<SelectListener<P>>,
}

impl<P> Default for SelectionDispatch<P> {
    fn default() -> Self {
        Self { listener: None }
    }
}

impl<P> SelectionDispatch<P> {
    pub fn set(&mut self, listener: SelectListener<P>) {
        self.listener = Some(listener);
    }

    pub fn clear(&mut self) {
        self.listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Returns whether a listener received the event
    pub fn dispatch(&mut self, event: &NodeSelected<P>) -> bool {
        match self.listener.as_mut() {
            Some(listener) => {
                listener(event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn event(payload: &'static str) -> NodeSelected<&'static str> {
        NodeSelected { id: NodeId(7), index: 0, category: MarkerCategory::User, payload }
    }

    #[test]
    fn test_no_listener() {
        let mut dispatch = SelectionDispatch::default();
        assert!(!dispatch.dispatch(&event("a")));
    }

    #[test]
    fn test_new_listener_replaces_old() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatch = SelectionDispatch::default();

        let first = Rc::clone(&seen);
        dispatch.set(Box::new(move |e: &NodeSelected<&str>| first.borrow_mut().push(("first", e.payload))));
        let second = Rc::clone(&seen);
        dispatch.set(Box::new(move |e: &NodeSelected<&str>| second.borrow_mut().push(("second", e.payload))));

        assert!(dispatch.dispatch(&event("alice")));
        assert_eq!(*seen.borrow(), vec![("second", "alice")]);

        dispatch.clear();
        assert!(!dispatch.has_listener());
    }
}
