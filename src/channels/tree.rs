//! Channel tree mirrored from the remote directory
//!
//! Nodes are registered, updated with field deltas, and removed as the
//! directory emits events. Children stay ordered by (position, name) the
//! way the channel view renders them. Link edges are kept as recorded:
//! an edge may live on either endpoint, the closure walk treats the
//! relation as symmetric.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Directory-assigned channel identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

/// Registration payload from a `newChannel` directory event
#[derive(Debug, Clone, Default)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub parent: Option<ChannelId>,
    pub name: String,
    pub position: i32,
    pub links: Vec<ChannelId>,
}

/// Changed-field delta from a per-channel `update` event
#[derive(Debug, Clone, Default)]
pub struct ChannelUpdate {
    pub name: Option<String>,
    pub position: Option<i32>,
    pub parent: Option<ChannelId>,
    pub links: Option<Vec<ChannelId>>,
}

/// One channel node
#[derive(Debug)]
pub struct Channel {
    pub id: ChannelId,
    pub parent: Option<ChannelId>,
    children: Vec<ChannelId>,
    pub name: String,
    pub position: i32,
    /// Link edges as recorded by the directory; possibly one-sided
    pub links: HashSet<ChannelId>,
    linked: bool,
}

impl Channel {
    /// Child ids ordered by (position, name)
    pub fn children(&self) -> &[ChannelId] {
        &self.children
    }

    /// Whether this channel is reachable from the current channel over the
    /// link closure (as of the last recomputation)
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

/// The mirrored channel hierarchy
#[derive(Debug, Default)]
pub struct ChannelTree {
    channels: HashMap<ChannelId, Channel>,
    root: Option<ChannelId>,
}

impl ChannelTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<ChannelId> {
        self.root
    }

    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(&id)
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.channels.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Convenience for the UI collaborator's pull-style query
    pub fn is_linked(&self, id: ChannelId) -> bool {
        self.channels.get(&id).map(|c| c.linked).unwrap_or(false)
    }

    pub(crate) fn set_linked(&mut self, id: ChannelId, linked: bool) {
        if let Some(channel) = self.channels.get_mut(&id) {
            channel.linked = linked;
        }
    }

    /// Register a channel from a directory event. The first parentless
    /// channel becomes the root.
    pub fn register(&mut self, info: ChannelInfo) {
        let channel = Channel {
            id: info.id,
            parent: info.parent,
            children: Vec::new(),
            name: info.name,
            position: info.position,
            links: info.links.into_iter().collect(),
            linked: false,
        };

        if info.parent.is_none() && self.root.is_none() {
            self.root = Some(info.id);
        }
        self.channels.insert(info.id, channel);

        if let Some(parent) = info.parent {
            self.attach_child(parent, info.id);
        }
    }

    /// Apply a changed-field delta. Returns whether the link graph became
    /// dirty (caller should trigger a recomputation).
    pub fn apply_update(&mut self, id: ChannelId, update: ChannelUpdate) -> bool {
        if !self.channels.contains_key(&id) {
            return false;
        }

        let mut links_dirty = false;
        let mut resort_parent = None;

        if let Some(channel) = self.channels.get_mut(&id) {
            if let Some(name) = update.name {
                channel.name = name;
                resort_parent = channel.parent;
            }
            if let Some(position) = update.position {
                channel.position = position;
                resort_parent = channel.parent;
            }
            if let Some(links) = update.links {
                channel.links = links.into_iter().collect();
                links_dirty = true;
            }
        }

        if let Some(new_parent) = update.parent {
            let old_parent = self.channels.get(&id).and_then(|c| c.parent);
            if old_parent != Some(new_parent) {
                if let Some(old) = old_parent {
                    self.detach_child(old, id);
                }
                if let Some(channel) = self.channels.get_mut(&id) {
                    channel.parent = Some(new_parent);
                }
                self.attach_child(new_parent, id);
                resort_parent = None; // attach already sorted
            }
        }

        if let Some(parent) = resort_parent {
            self.sort_children(parent);
        }

        links_dirty
    }

    /// Remove a channel on a directory removal event. Only detaches from
    /// its parent; link edges elsewhere that still name this id are simply
    /// skipped by the next closure walk.
    pub fn remove(&mut self, id: ChannelId) -> bool {
        let Some(channel) = self.channels.remove(&id) else {
            return false;
        };
        if let Some(parent) = channel.parent {
            self.detach_child(parent, id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        true
    }

    fn attach_child(&mut self, parent: ChannelId, child: ChannelId) {
        if let Some(node) = self.channels.get_mut(&parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
        self.sort_children(parent);
    }

    fn detach_child(&mut self, parent: ChannelId, child: ChannelId) {
        if let Some(node) = self.channels.get_mut(&parent) {
            node.children.retain(|c| *c != child);
        }
    }

    fn sort_children(&mut self, parent: ChannelId) {
        let Some(node) = self.channels.get(&parent) else {
            return;
        };
        let mut keyed: Vec<(i32, String, ChannelId)> = node
            .children
            .iter()
            .filter_map(|id| {
                self.channels
                    .get(id)
                    .map(|c| (c.position, c.name.clone(), *id))
            })
            .collect();
        keyed.sort();

        if let Some(node) = self.channels.get_mut(&parent) {
            node.children = keyed.into_iter().map(|(_, _, id)| id).collect();
        }
    }
}

/// Thread-safe handle to a channel tree, readable by the UI while
/// directory events mutate it
pub type SharedChannelTree = Arc<RwLock<ChannelTree>>;

/// Create a new shared channel tree
pub fn create_shared_tree() -> SharedChannelTree {
    Arc::new(RwLock::new(ChannelTree::new()))
}
