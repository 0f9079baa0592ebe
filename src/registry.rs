//! Three mutually-consistent mappings from X window id to the decoration
//! triple that contains it.
//!
//! Backed by one owning map `by_client` plus two secondary maps that resolve
//! a frame or title id back to its client id, so every mutation updates all
//! three through a single path instead of juggling three independent maps.

use std::collections::HashMap;
use x11::xlib::Window;

/// The `{ title, client, frame }` triple for one managed window. The three
/// ids are pairwise distinct and the triple is immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationTriple {
    pub title: Window,
    pub client: Window,
    pub frame: Window,
}

#[derive(Debug, Default)]
pub struct Registry {
    by_client: HashMap<Window, DecorationTriple>,
    by_frame: HashMap<Window, Window>,
    by_title: HashMap<Window, Window>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Establishes all three mappings atomically. Overwrites any prior
    /// triple under the same client id.
    pub fn insert(&mut self, triple: DecorationTriple) {
        self.by_frame.insert(triple.frame, triple.client);
        self.by_title.insert(triple.title, triple.client);
        self.by_client.insert(triple.client, triple);
    }

    /// Removes the triple (if any) for `client`, along with both of its
    /// secondary index entries.
    pub fn remove_by_client(&mut self, client: Window) -> Option<DecorationTriple> {
        let triple = self.by_client.remove(&client)?;
        self.by_frame.remove(&triple.frame);
        self.by_title.remove(&triple.title);
        Some(triple)
    }

    pub fn lookup_by_client(&self, id: Window) -> Option<DecorationTriple> {
        self.by_client.get(&id).copied()
    }

    pub fn lookup_by_frame(&self, id: Window) -> Option<DecorationTriple> {
        let client = *self.by_frame.get(&id)?;
        self.by_client.get(&client).copied()
    }

    pub fn lookup_by_title(&self, id: Window) -> Option<DecorationTriple> {
        let client = *self.by_title.get(&id)?;
        self.by_client.get(&client).copied()
    }

    pub fn contains_client(&self, id: Window) -> bool {
        self.by_client.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_client.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_client.is_empty()
    }

    /// Removes whichever single index contains `id`, leaving the other two
    /// untouched. Used when an async DestroyNotify arrives for a window
    /// whose triple may already be partially torn down.
    pub fn forget(&mut self, id: Window) {
        if self.by_client.remove(&id).is_some() {
            return;
        }
        if let Some(client) = self.by_frame.remove(&id) {
            // Leave `by_client`/`by_title` alone: the triple is torn, not
            // necessarily gone, and the client/title destroy notifications
            // (if they come) will clean up their own index independently.
            let _ = client;
            return;
        }
        if let Some(client) = self.by_title.remove(&id) {
            let _ = client;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(client: Window, frame: Window, title: Window) -> DecorationTriple {
        DecorationTriple {
            client,
            frame,
            title,
        }
    }

    #[test]
    fn insert_establishes_all_three_mappings() {
        let mut reg = Registry::new();
        let t = triple(1, 2, 3);
        reg.insert(t);

        assert_eq!(reg.lookup_by_client(1), Some(t));
        assert_eq!(reg.lookup_by_frame(2), Some(t));
        assert_eq!(reg.lookup_by_title(3), Some(t));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_by_client_removes_all_three() {
        let mut reg = Registry::new();
        let t = triple(1, 2, 3);
        reg.insert(t);

        let removed = reg.remove_by_client(1);
        assert_eq!(removed, Some(t));
        assert_eq!(reg.lookup_by_client(1), None);
        assert_eq!(reg.lookup_by_frame(2), None);
        assert_eq!(reg.lookup_by_title(3), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn framing_idempotence_via_reinsert() {
        let mut reg = Registry::new();
        let t = triple(1, 2, 3);
        reg.insert(t);
        reg.insert(t);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn forget_tears_one_index_without_touching_others() {
        let mut reg = Registry::new();
        let t = triple(1, 2, 3);
        reg.insert(t);

        // Simulate a DestroyNotify arriving for the frame only.
        reg.forget(2);

        // The frame's own index entry is gone...
        assert_eq!(reg.lookup_by_frame(2), None);
        // ...but the client and title indexes are untouched by a frame-only tear.
        assert_eq!(reg.lookup_by_client(1), Some(t));
        assert_eq!(reg.by_title.get(&3), Some(&1));
    }

    #[test]
    fn forget_unknown_window_is_a_no_op() {
        let mut reg = Registry::new();
        reg.insert(triple(1, 2, 3));
        reg.forget(999);
        assert_eq!(reg.len(), 1);
    }
}
