//! Marker nodes and the node list
//!
//! A node list is built wholesale on every data refresh. Each node carries a
//! stable `NodeId` derived from a caller key, so clicks resolve to the same
//! entity even when the list is reordered or refetched between frames.

use std::hash::{Hash, Hasher};

use fnv::FnvHasher;
use tracing::debug;

use super::geo::GeoPoint;

/// Stable node identity (FNV-1a of the caller's key)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn from_key<K: Hash + ?Sized>(key: &K) -> Self {
        let mut hasher = FnvHasher::default();
        key.hash(&mut hasher);
        NodeId(hasher.finish())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerCategory {
    User,
    Partner,
}

#[derive(Clone, Debug)]
pub struct MarkerNode<P> {
    pub id: NodeId,
    pub position: GeoPoint,
    /// Drives the marker radius: sqrt(weight) * marker_scale
    pub weight: f64,
    pub category: MarkerCategory,
    pub payload: P,
    pub is_new: bool,
}

/// Ordered, immutable list of marker nodes
#[derive(Clone, Debug)]
pub struct NodeList<P> {
    nodes: Vec<MarkerNode<P>>,
}

impl<P> Default for NodeList<P> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<P> NodeList<P> {
    pub fn builder() -> NodeListBuilder<P> {
        NodeListBuilder { nodes: Vec::new(), skipped: 0 }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerNode<P>> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[MarkerNode<P>] {
        &self.nodes
    }

    /// Current position and node for an id
    pub fn find(&self, id: NodeId) -> Option<(usize, &MarkerNode<P>)> {
        self.nodes.iter().enumerate().find(|(_, n)| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }
}

pub struct NodeListBuilder<P> {
    nodes: Vec<MarkerNode<P>>,
    skipped: usize,
}

impl<P> NodeListBuilder<P> {
    /// Add a node keyed by `key`.
    ///
    /// Coordinates go through `GeoPoint::sanitized`; nodes with non-finite
    /// coordinates or a duplicate key are skipped. Returns the assigned id.
    pub fn push<K: Hash + ?Sized>(
        &mut self,
        key: &K,
        longitude: f64,
        latitude: f64,
        weight: f64,
        category: MarkerCategory,
        payload: P,
    ) -> Option<NodeId> {
        let Some(position) = GeoPoint::sanitized(longitude, latitude) else {
            self.skipped += 1;
            return None;
        };
        let id = NodeId::from_key(key);
        if self.nodes.iter().any(|n| n.id == id) {
            self.skipped += 1;
            return None;
        }
        self.nodes.push(MarkerNode {
            id,
            position,
            weight: if weight.is_finite() { weight.max(0.0) } else { 0.0 },
            category,
            payload,
            is_new: false,
        });
        Some(id)
    }

    /// Flag the most recently pushed node as new (pulses in the view)
    pub fn mark_last_new(&mut self) {
        if let Some(node) = self.nodes.last_mut() {
            node.is_new = true;
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn build(self) -> NodeList<P> {
        if self.skipped > 0 {
            debug!(kept = self.nodes.len(), skipped = self.skipped, "Node list built with skipped entries");
        }
        NodeList { nodes: self.nodes }
    }
}
