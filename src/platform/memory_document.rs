//! In-memory document tree.
//!
//! Nodes live in an arena addressed by generational indices, so a handle to a
//! dropped node can never alias a node that later reuses its slot. The tree
//! has a single root; a node is connected when its parent chain reaches it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::DocumentError;

use super::{Document, RemovalObserver};

/// Handle to a node in a [`MemoryDocument`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

struct ObserverSlot {
    id: u64,
    watched: Vec<NodeId>,
    /// Connection state of each watched node at the last check
    connected: Vec<bool>,
    records: Vec<NodeId>,
}

struct Inner {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    observers: Vec<ObserverSlot>,
    next_observer: u64,
}

impl Inner {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let node = Node {
            tag: tag.to_string(),
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn is_connected(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.node(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.node(id).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    /// Record watched nodes that went from connected to disconnected.
    fn notify_observers(&mut self) {
        let mut observers = std::mem::take(&mut self.observers);
        for observer in &mut observers {
            for (i, &node) in observer.watched.iter().enumerate() {
                let now_connected = self.is_connected(node);
                if observer.connected[i] && !now_connected {
                    observer.records.push(node);
                }
                observer.connected[i] = now_connected;
            }
        }
        self.observers = observers;
    }
}

/// Shared handle to an in-memory document. Clones refer to the same tree.
#[derive(Clone)]
pub struct MemoryDocument {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut inner = Inner {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            observers: Vec::new(),
            next_observer: 0,
        };
        inner.root = inner.alloc("body");
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().node(node).map(|n| n.tag.clone())
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Position of `node` among its parent's children.
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let inner = self.inner.borrow();
        let parent = inner.node(node)?.parent?;
        inner.node(parent)?.children.iter().position(|&c| c == node)
    }

    /// Detach `node` (and its subtree) from its parent, as host code would.
    pub fn remove(&self, node: NodeId) -> Result<(), DocumentError> {
        let mut inner = self.inner.borrow_mut();
        if inner.node(node).is_none() {
            return Err(DocumentError::UnknownNode);
        }
        inner.unlink(node);
        inner.notify_observers();
        Ok(())
    }

    /// Drop `node` and its subtree from the arena. Their handles become stale.
    pub fn destroy(&self, node: NodeId) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        if node == inner.root {
            return;
        }
        inner.unlink(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(slot) = inner.slots.get_mut(id.index as usize) {
                if slot.generation == id.generation {
                    if let Some(n) = slot.node.take() {
                        pending.extend(n.children);
                        inner.free.push(id.index);
                    }
                }
            }
        }
        inner.notify_observers();
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;
    type Observer = MemoryObserver;

    fn create_element(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().alloc(tag)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DocumentError> {
        let mut inner = self.inner.borrow_mut();
        if inner.node(*parent).is_none() || inner.node(*child).is_none() {
            return Err(DocumentError::UnknownNode);
        }
        if inner.is_ancestor(*child, *parent) {
            return Err(DocumentError::Cycle);
        }
        inner.unlink(*child);
        if let Some(n) = inner.node_mut(*child) {
            n.parent = Some(*parent);
        }
        if let Some(p) = inner.node_mut(*parent) {
            p.children.push(*child);
        }
        inner.notify_observers();
        Ok(())
    }

    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        self.inner.borrow().node(*node).and_then(|n| n.parent)
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.inner.borrow().is_connected(*node)
    }

    fn replace_with(&self, node: &NodeId, replacement: &NodeId) -> Result<(), DocumentError> {
        let mut inner = self.inner.borrow_mut();
        if inner.node(*node).is_none() || inner.node(*replacement).is_none() {
            return Err(DocumentError::UnknownNode);
        }
        if node == replacement {
            return Ok(());
        }
        let parent = inner.node(*node).and_then(|n| n.parent);
        let parent = parent.ok_or(DocumentError::NoParent)?;
        if inner.is_ancestor(*replacement, parent) {
            return Err(DocumentError::Cycle);
        }

        inner.unlink(*replacement);
        let position = inner
            .node(parent)
            .and_then(|p| p.children.iter().position(|c| c == node))
            .ok_or(DocumentError::NoParent)?;
        if let Some(p) = inner.node_mut(parent) {
            p.children[position] = *replacement;
        }
        if let Some(n) = inner.node_mut(*replacement) {
            n.parent = Some(parent);
        }
        if let Some(n) = inner.node_mut(*node) {
            n.parent = None;
        }
        inner.notify_observers();
        Ok(())
    }

    fn observe_removal(&self, nodes: &[NodeId]) -> MemoryObserver {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_observer;
        inner.next_observer += 1;
        let connected = nodes.iter().map(|&n| inner.is_connected(n)).collect();
        inner.observers.push(ObserverSlot {
            id,
            watched: nodes.to_vec(),
            connected,
            records: Vec::new(),
        });
        MemoryObserver {
            inner: Rc::clone(&self.inner),
            id,
        }
    }
}

/// Removal observer registered on a [`MemoryDocument`].
pub struct MemoryObserver {
    inner: Rc<RefCell<Inner>>,
    id: u64,
}

impl RemovalObserver for MemoryObserver {
    type Node = NodeId;

    fn take_records(&mut self) -> Vec<NodeId> {
        let mut inner = self.inner.borrow_mut();
        inner
            .observers
            .iter_mut()
            .find(|o| o.id == self.id)
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    fn disconnect(&mut self) {
        let id = self.id;
        self.inner.borrow_mut().observers.retain(|o| o.id != id);
    }
}

impl Drop for MemoryObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}
