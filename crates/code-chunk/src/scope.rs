//! Containment forest over extracted entities.
//!
//! Nodes live in a single arena and refer to each other by [`ScopeId`], so the
//! parent link is purely navigational.

use crate::types::{ByteRange, Entity, EntityKind};

/// Index of a node within its [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone)]
pub struct ScopeNode {
    entity: usize,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
}

impl ScopeNode {
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Child scopes, ordered by start offset
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }
}

/// Forest of scope nodes plus the import/export buckets and the flat entity list
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
    roots: Vec<ScopeId>,
    imports: Vec<usize>,
    exports: Vec<usize>,
    entities: Vec<Entity>,
}

impl ScopeTree {
    /// Build the forest by attaching each entity, in start order, under the
    /// deepest existing node that contains it
    pub fn build(entities: Vec<Entity>) -> Self {
        let mut tree = Self {
            entities,
            ..Self::default()
        };

        let mut scoped = Vec::new();
        for (idx, entity) in tree.entities.iter().enumerate() {
            match entity.kind {
                EntityKind::Import => tree.imports.push(idx),
                EntityKind::Export => tree.exports.push(idx),
                _ => scoped.push(idx),
            }
        }
        // Stable: equal starts keep extraction order, so outer nodes come first
        scoped.sort_by_key(|&idx| tree.entities[idx].byte_range.start);

        for idx in scoped {
            let range = tree.entities[idx].byte_range;
            let parent = tree.deepest_container(&range);
            let id = ScopeId(tree.nodes.len());
            tree.nodes.push(ScopeNode {
                entity: idx,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(parent) => tree.nodes[parent.0].children.push(id),
                None => tree.roots.push(id),
            }
        }

        log::debug!(
            "Built scope tree: {} nodes, {} roots, {} imports, {} exports",
            tree.nodes.len(),
            tree.roots.len(),
            tree.imports.len(),
            tree.exports.len()
        );
        tree
    }

    fn deepest_container(&self, range: &ByteRange) -> Option<ScopeId> {
        self.descend(|id| self.node_range(id).contains_range(range))
    }

    /// Walk down from the roots, always taking the first child accepted by `accept`
    fn descend(&self, accept: impl Fn(ScopeId) -> bool) -> Option<ScopeId> {
        let mut found = None;
        let mut candidates = self.roots.as_slice();
        while let Some(&next) = candidates.iter().find(|&&id| accept(id)) {
            found = Some(next);
            candidates = &self.nodes[next.0].children;
        }
        found
    }

    fn node_range(&self, id: ScopeId) -> ByteRange {
        self.entity(id).byte_range
    }

    /// Innermost scope containing `offset` (end-exclusive)
    pub fn scope_at_offset(&self, offset: usize) -> Option<ScopeId> {
        self.descend(|id| self.node_range(id).contains_offset(offset))
    }

    /// Enclosing scopes of `id`, nearest first, excluding `id` itself
    pub fn ancestor_chain(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes[parent.0].parent;
        }
        chain
    }

    /// Every scope node in pre-order
    pub fn flatten(&self) -> Vec<ScopeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ScopeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    pub fn roots(&self) -> &[ScopeId] {
        &self.roots
    }

    pub fn node(&self, id: ScopeId) -> &ScopeNode {
        &self.nodes[id.0]
    }

    /// The entity wrapped by a scope node
    pub fn entity(&self, id: ScopeId) -> &Entity {
        &self.entities[self.nodes[id.0].entity]
    }

    pub fn imports(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.imports.iter().map(|&idx| &self.entities[idx])
    }

    pub fn exports(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.exports.iter().map(|&idx| &self.entities[idx])
    }

    /// All extracted entities in extraction order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
