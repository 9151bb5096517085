//! Channel tree and link reachability
//!
//! Mirrors the remote directory's channel hierarchy and tracks which
//! channels are "linked" to the user's current channel through the
//! undirected closure of the link relation.

pub mod links;
pub mod tree;

pub use links::ChannelLinkSynchronizer;
pub use tree::{
    create_shared_tree, Channel, ChannelId, ChannelInfo, ChannelTree, ChannelUpdate,
    SharedChannelTree,
};
