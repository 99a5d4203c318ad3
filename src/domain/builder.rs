//! Tree builder: flat parent-referencing records to a rooted hierarchy.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::arena::Hierarchy;
use crate::domain::error::StructureError;
use crate::domain::record::{NodeKey, Record};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, StructureError>;

/// Constructs a hierarchy under a synthetic root from flat records.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    root_label: String,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new("ROOT")
    }
}

impl HierarchyBuilder {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self {
            root_label: root_label.into(),
        }
    }

    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    /// Build the hierarchy for one record snapshot.
    ///
    /// Returns `Ok(None)` for an empty snapshot. Top-level records become
    /// children of the synthetic root. Every children list is ordered by
    /// ascending height, ties keeping input order.
    ///
    /// # Errors
    ///
    /// * [`StructureError::DuplicateId`] if two records share an identifier.
    /// * [`StructureError::SelfReference`] if a record is its own parent.
    /// * [`StructureError::MissingParent`] if a parent identifier is unknown.
    /// * [`StructureError::Cycle`] if records form a loop detached from the root.
    #[instrument(level = "debug", skip(self, records), fields(count = records.len()))]
    pub fn build(&self, records: &[Record]) -> TreeResult<Option<Hierarchy>> {
        if records.is_empty() {
            debug!("no records, no hierarchy");
            return Ok(None);
        }

        if let Some(id) = records.iter().map(|r| r.id.as_str()).duplicates().next() {
            return Err(StructureError::DuplicateId(id.to_string()));
        }
        let known: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();

        // parent -> children, in input order
        let mut relationships: HashMap<NodeKey, Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            let parent = match record.parent_id.as_deref() {
                None => NodeKey::Root,
                Some(parent_id) if parent_id == record.id => {
                    return Err(StructureError::SelfReference(record.id.clone()));
                }
                Some(parent_id) if known.contains(parent_id) => NodeKey::from(parent_id),
                Some(parent_id) => {
                    return Err(StructureError::MissingParent {
                        id: record.id.clone(),
                        parent_id: parent_id.to_string(),
                    });
                }
            };
            relationships.entry(parent).or_default().push(i);
        }

        let mut hierarchy = Hierarchy::with_root(Some(self.root_label.clone()));
        let mut stack: Vec<(Index, NodeKey)> = vec![(hierarchy.root(), NodeKey::Root)];
        while let Some((parent_idx, parent_key)) = stack.pop() {
            if let Some(children) = relationships.get(&parent_key) {
                for &i in children {
                    let record = &records[i];
                    let key = NodeKey::from(record.id.as_str());
                    let idx = hierarchy.insert_node(key.clone(), record.label.clone(), parent_idx);
                    stack.push((idx, key));
                }
            }
        }

        // Everything not reachable from the root sits on (or below) a loop
        if hierarchy.len() != records.len() + 1 {
            let stranded = records
                .iter()
                .find(|r| hierarchy.find(&NodeKey::from(r.id.as_str())).is_none())
                .map(|r| r.id.clone())
                .unwrap_or_default();
            return Err(StructureError::Cycle(stranded));
        }

        compute_heights(&mut hierarchy);
        sort_by_height(&mut hierarchy);
        debug!(
            nodes = hierarchy.len(),
            depth = hierarchy.depth(),
            "hierarchy built"
        );
        Ok(Some(hierarchy))
    }
}

fn compute_heights(hierarchy: &mut Hierarchy) {
    let order: Vec<Index> = hierarchy.iter_postorder().map(|(idx, _)| idx).collect();
    for idx in order {
        let height = hierarchy
            .node(idx)
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|&c| hierarchy.node(c))
                    .map(|c| c.height + 1)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        if let Some(node) = hierarchy.node_mut(idx) {
            node.height = height;
        }
    }
}

fn sort_by_height(hierarchy: &mut Hierarchy) {
    let order: Vec<Index> = hierarchy.iter().map(|(idx, _)| idx).collect();
    for idx in order {
        let mut children = match hierarchy.node(idx) {
            Some(node) if node.children.len() > 1 => node
                .children
                .iter()
                .map(|&c| (hierarchy.node(c).map_or(0, |n| n.height), c))
                .collect::<Vec<_>>(),
            _ => continue,
        };
        // stable: equal heights keep insertion order
        children.sort_by_key(|&(height, _)| height);
        if let Some(node) = hierarchy.node_mut(idx) {
            node.children = children.into_iter().map(|(_, c)| c).collect();
        }
    }
}
