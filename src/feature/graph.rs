//! Feature dependency graph.
//!
//! Features live in an arena and are addressed by [`FeatureId`]. An edge may
//! only point from an earlier registration to a later one, so walking the
//! arena in id order visits every parent before its children and cycles
//! cannot be built.

use rust_decimal::Decimal;
use tracing::trace;

use super::Feature;
use crate::domain::{DepthData, DomainError};

/// Index of a feature inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(usize);

impl FeatureId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

struct Node {
    feature: Box<dyn Feature>,
    reported: bool,
    parents: usize,
    /// `(child, slot)` edges.
    children: Vec<(FeatureId, usize)>,
}

/// Arena of features with parent -> child edges.
#[derive(Default)]
pub struct FeatureGraph {
    nodes: Vec<Node>,
}

impl FeatureGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature. `reported` features appear in [`reported`](Self::reported).
    pub fn register(&mut self, feature: Box<dyn Feature>, reported: bool) -> FeatureId {
        let id = FeatureId(self.nodes.len());
        self.nodes.push(Node {
            feature,
            reported,
            parents: 0,
            children: Vec::new(),
        });
        id
    }

    /// Make `child` listen to `parent` on `slot`.
    ///
    /// # Errors
    ///
    /// Fails with [`DomainError::InvalidEdge`] unless `parent` was registered
    /// before `child`, and with [`DomainError::UnknownFeature`] for ids from
    /// another graph.
    pub fn add_parent(
        &mut self,
        child: FeatureId,
        parent: FeatureId,
        slot: usize,
    ) -> Result<(), DomainError> {
        for id in [child, parent] {
            if id.0 >= self.nodes.len() {
                return Err(DomainError::UnknownFeature(id.0));
            }
        }
        if parent >= child {
            return Err(DomainError::InvalidEdge {
                parent: parent.0,
                child: child.0,
            });
        }

        let initial = self.nodes[parent.0].feature.value();
        self.nodes[parent.0].children.push((child, slot));
        self.nodes[child.0].parents += 1;
        // Seed the child with whatever the parent already knows.
        if self.nodes[child.0].feature.on_parent_update(slot, initial) {
            self.nodes[child.0].feature.update();
        }
        Ok(())
    }

    /// Include or exclude an existing feature from reports.
    pub fn set_reported(&mut self, id: FeatureId, reported: bool) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.reported = reported;
        }
    }

    /// Look up a feature by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<FeatureId> {
        self.nodes
            .iter()
            .position(|n| n.feature.name() == name)
            .map(FeatureId)
    }

    #[must_use]
    pub fn value(&self, id: FeatureId) -> Option<Decimal> {
        self.nodes.get(id.0).and_then(|n| n.feature.value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Feed depth data through the graph. Returns whether any feature changed.
    pub fn on_depth(&mut self, depth: &DepthData) -> bool {
        let mut triggered = vec![false; self.nodes.len()];
        for (i, node) in self.nodes.iter_mut().enumerate() {
            if node.parents == 0 && node.feature.on_depth(depth) {
                triggered[i] = true;
            }
        }

        let mut changed = false;
        for i in 0..self.nodes.len() {
            if !triggered[i] {
                continue;
            }
            changed = true;
            self.nodes[i].feature.update();
            let value = self.nodes[i].feature.value();
            trace!(feature = self.nodes[i].feature.name(), value = ?value, "Feature updated");

            let children = self.nodes[i].children.clone();
            for (child, slot) in children {
                if self.nodes[child.0].feature.on_parent_update(slot, value) {
                    triggered[child.0] = true;
                }
            }
        }
        changed
    }

    /// `(name, value)` of every reported feature, in registration order.
    #[must_use]
    pub fn reported(&self) -> Vec<(&'static str, Option<Decimal>)> {
        self.nodes
            .iter()
            .filter(|n| n.reported)
            .map(|n| (n.feature.name(), n.feature.value()))
            .collect()
    }

    /// Names of reported features, in registration order.
    #[must_use]
    pub fn reported_names(&self) -> Vec<&'static str> {
        self.nodes
            .iter()
            .filter(|n| n.reported)
            .map(|n| n.feature.name())
            .collect()
    }
}
