//! Owned element tree for the rendered scene
//!
//! Elements live in a slot arena and are addressed by [`NodeId`] handles, so
//! the renderer can hold onto ids across passes without borrowing the tree.
//! Removal frees a whole subtree and recycles its slots; a removed id simply
//! stops resolving. Creation and removal totals are tracked so a caller can
//! observe whether a pass touched the tree at all.

use std::collections::BTreeMap;

/// Handle to one element in a [`Scene`]. Valid until the element (or an
/// ancestor) is removed; the slot may then be reused by a later creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// One SVG-like element: a tag, sorted attributes, optional text content and
/// an ordered child list.
#[derive(Debug)]
pub struct Element {
    tag: &'static str,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attributes in name order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug)]
pub struct Scene {
    slots: Vec<Option<Element>>,
    free: Vec<usize>,
    root: NodeId,
    created: u64,
    removed: u64,
}

impl Scene {
    /// New scene holding only a root element of the given tag.
    pub fn new(tag: &'static str) -> Self {
        let root = Element {
            tag,
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        };
        Self {
            slots: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
            created: 1,
            removed: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a child element under `parent` and return its handle.
    pub fn create(&mut self, parent: NodeId, tag: &'static str) -> NodeId {
        let element = Element {
            tag,
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
            parent: Some(parent),
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(element);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(element));
                NodeId(self.slots.len() - 1)
            }
        };
        if let Some(p) = self.slot_mut(parent) {
            p.children.push(id);
        }
        self.created += 1;
        id
    }

    /// Remove an element and everything nested under it. A no-op for ids
    /// that no longer resolve.
    pub fn remove(&mut self, id: NodeId) {
        let parent = match self.get(id) {
            Some(element) => element.parent,
            None => return,
        };
        if let Some(p) = parent.and_then(|p| self.slot_mut(p)) {
            p.children.retain(|child| *child != id);
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.slots.get_mut(next.0).and_then(Option::take) {
                stack.extend(element.children);
                self.free.push(next.0);
                self.removed += 1;
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.slot_mut(id) {
            element.attrs.insert(name.to_string(), value.into());
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(element) = self.slot_mut(id) {
            element.text = Some(text.into());
        }
    }

    /// Child handles of `id`, empty when the id is dead.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Element::children)
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Elements ever created, root included.
    pub fn created_total(&self) -> u64 {
        self.created
    }

    /// Elements ever removed, subtree members included.
    pub fn removed_total(&self) -> u64 {
        self.removed
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }
}
