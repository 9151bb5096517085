//! Link reachability over the channel tree
//!
//! A channel is "linked" iff it is reachable from the user's current
//! channel through the undirected closure of the link relation. Edges may
//! be recorded on either endpoint, so the walk follows a node's own links
//! and every edge pointing back at it. Recomputed wholesale on every
//! relevant mutation; channel and link churn is rare compared to how often
//! the UI reads the flags.

use std::collections::{HashMap, HashSet};

use crate::channels::tree::{ChannelId, ChannelTree};

/// Recomputes the `linked` flag over a [`ChannelTree`]
#[derive(Debug, Default)]
pub struct ChannelLinkSynchronizer {
    current: Option<ChannelId>,
}

impl ChannelLinkSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_channel(&self) -> Option<ChannelId> {
        self.current
    }

    /// Track the user's current channel. Callers should recompute after a
    /// change.
    pub fn set_current_channel(&mut self, channel: Option<ChannelId>) {
        self.current = channel;
    }

    /// Walk the symmetric closure from the current channel and mark every
    /// channel's `linked` flag by membership. The current channel itself is
    /// always linked.
    ///
    /// No-op while the current channel is unknown or absent from the tree
    /// (pre-connection or mid-reset): prior flags are left untouched.
    /// Link edges naming removed channels are skipped.
    pub fn recompute(&self, tree: &mut ChannelTree) {
        let Some(current) = self.current else {
            return;
        };
        if !tree.contains(current) {
            return;
        }

        // Edges may be stored on either endpoint; index the reverse
        // direction once so the walk is O(V+E)
        let mut reverse: HashMap<ChannelId, Vec<ChannelId>> = HashMap::new();
        for channel in tree.iter() {
            for &peer in &channel.links {
                reverse.entry(peer).or_default().push(channel.id);
            }
        }

        let mut visited: HashSet<ChannelId> = HashSet::new();
        visited.insert(current);
        let mut stack = vec![current];

        while let Some(id) = stack.pop() {
            let Some(channel) = tree.get(id) else {
                continue;
            };
            let forward = channel.links.iter().copied();
            let backward = reverse.get(&id).into_iter().flatten().copied();
            for peer in forward.chain(backward) {
                if tree.contains(peer) && visited.insert(peer) {
                    stack.push(peer);
                }
            }
        }

        let ids: Vec<ChannelId> = tree.iter().map(|c| c.id).collect();
        for id in ids {
            tree.set_linked(id, visited.contains(&id));
        }
    }
}
