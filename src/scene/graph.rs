//! Scene graph: CPU-side hierarchy of nodes.
//!
//! Nodes carry either nothing (groups) or a mesh with materials. World
//! transforms are cached on each node and recomputed by
//! [`SceneGraph::update_world_transforms`] whenever the hierarchy or a local
//! transform changed.

use std::collections::HashMap;

use glam::Mat4;

use super::node::{LocalTransform, MeshNode, NodeContent, SceneNode, SceneNodeId};

/// CPU-side scene graph of groups and meshes.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    /// Set when world transforms are stale
    dirty: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            dirty: true,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Allocate a fresh node ID.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.parent = Some(parent);

        self.nodes.insert(id, node);

        // Register as child of parent
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }

        self.dirty = true;
        id
    }

    /// Add a mesh node under `parent`.
    pub fn add_mesh(&mut self, parent: SceneNodeId, name: impl Into<String>, mesh: MeshNode) -> SceneNodeId {
        self.add_child(parent, name, NodeContent::Mesh(mesh))
    }

    /// Remove a node and its entire subtree. Cannot remove the root.
    pub fn remove(&mut self, id: SceneNodeId) {
        if id == self.root {
            return;
        }

        let to_remove = self.subtree(id);

        // Detach from parent
        if let Some(parent_id) = self.nodes.get(&id).and_then(|node| node.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        for nid in to_remove {
            self.nodes.remove(&nid);
        }

        self.dirty = true;
    }

    /// Move a node to a new parent. Cannot reparent the root or move a node
    /// under its own subtree.
    pub fn reparent(&mut self, id: SceneNodeId, new_parent: SceneNodeId) {
        if id == self.root || self.subtree(id).contains(&new_parent) {
            return;
        }

        // Detach from old parent
        if let Some(old_parent_id) = self.nodes.get(&id).and_then(|node| node.parent) {
            if let Some(old_parent) = self.nodes.get_mut(&old_parent_id) {
                old_parent.children.retain(|c| *c != id);
            }
        }

        // Attach to new parent
        if let Some(new_parent_node) = self.nodes.get_mut(&new_parent) {
            new_parent_node.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
        }

        self.dirty = true;
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = transform;
            self.dirty = true;
        }
    }

    /// Set the visibility of a node.
    pub fn set_visible(&mut self, id: SceneNodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node.
    ///
    /// Marks world transforms stale, since the caller may edit the local
    /// transform or children directly.
    pub fn get_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNode> {
        self.dirty = true;
        self.nodes.get_mut(&id)
    }

    /// Mesh content of a node, if it is a mesh.
    pub fn mesh(&self, id: SceneNodeId) -> Option<&MeshNode> {
        self.nodes.get(&id).and_then(SceneNode::mesh)
    }

    /// Mutable mesh content of a node. Does not touch transforms.
    pub fn mesh_mut(&mut self, id: SceneNodeId) -> Option<&mut MeshNode> {
        self.nodes.get_mut(&id).and_then(SceneNode::mesh_mut)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// `id` and all of its descendants, breadth-first. Empty if `id` is unknown.
    pub fn subtree(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        if !self.nodes.contains_key(&id) {
            return Vec::new();
        }

        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            if let Some(node) = self.nodes.get(&out[i]) {
                out.extend_from_slice(&node.children);
            }
            i += 1;
        }
        out
    }

    /// Mesh nodes in the subtree rooted at `id`, including `id` itself.
    pub fn meshes_in(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        self.subtree(id)
            .into_iter()
            .filter(|nid| self.mesh(*nid).is_some())
            .collect()
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether world transforms need recomputing.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Propagate world transforms from the root if anything changed.
    pub fn update_world_transforms(&mut self) {
        if !self.dirty {
            return;
        }
        self.propagate_transforms(self.root, Mat4::IDENTITY);
        self.dirty = false;
    }

    /// Recursively propagate world transforms.
    fn propagate_transforms(&mut self, node_id: SceneNodeId, parent_world: Mat4) {
        let (local_mat, children) = {
            let node = match self.nodes.get(&node_id) {
                Some(n) => n,
                None => return,
            };
            (node.local_transform.to_mat4(), node.children.clone())
        };

        let world = parent_world * local_mat;

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.world_transform = world;
        }

        for child_id in children {
            self.propagate_transforms(child_id, world);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use glam::Vec3;

    use crate::geometry::Geometry;

    fn mesh() -> MeshNode {
        MeshNode::new(Arc::new(Geometry::indexed(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        )))
    }

    #[test]
    fn test_new_scene_graph() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node_count(), 1); // root only
        assert_eq!(graph.get(graph.root()).unwrap().name, "root");
    }

    #[test]
    fn test_add_multiple_children() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(root, "b", NodeContent::Group);
        let c = graph.add_mesh(a, "c", mesh());

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.children(root).count(), 2);
        assert!(graph.children(a).any(|x| x == c));
        assert_eq!(graph.children(b).count(), 0);
        assert_eq!(graph.get(c).unwrap().parent, Some(a));
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = graph.add_child(root, "parent", NodeContent::Group);
        let child1 = graph.add_mesh(parent, "c1", mesh());
        let child2 = graph.add_child(parent, "c2", NodeContent::Group);
        let _grandchild = graph.add_mesh(child1, "gc", mesh());

        assert_eq!(graph.node_count(), 5);

        graph.remove(parent);

        assert_eq!(graph.node_count(), 1); // only root
        assert!(graph.get(child1).is_none());
        assert!(graph.get(child2).is_none());
        assert_eq!(graph.children(root).count(), 0);
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph.remove(root);
        assert_eq!(graph.node_count(), 1); // root survives
    }

    #[test]
    fn test_reparent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(root, "b", NodeContent::Group);
        let c = graph.add_child(a, "c", NodeContent::Group);

        graph.reparent(c, b);

        assert_eq!(graph.children(a).count(), 0);
        assert!(graph.children(b).any(|x| x == c));
        assert_eq!(graph.get(c).unwrap().parent, Some(b));
    }

    #[test]
    fn test_reparent_into_own_subtree_ignored() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(a, "b", NodeContent::Group);

        graph.reparent(a, b);
        assert_eq!(graph.get(a).unwrap().parent, Some(root));
        assert_eq!(graph.get(b).unwrap().parent, Some(a));
    }

    #[test]
    fn test_meshes_in_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_child(root, "building", NodeContent::Group);
        let wall = graph.add_mesh(group, "wall", mesh());
        let floor = graph.add_child(group, "floor", NodeContent::Group);
        let tile = graph.add_mesh(floor, "tile", mesh());
        let _other = graph.add_mesh(root, "other", mesh());

        assert_eq!(graph.meshes_in(group), vec![wall, tile]);
        assert_eq!(graph.meshes_in(wall), vec![wall]);
        assert!(graph.meshes_in(SceneNodeId(999)).is_empty());
    }

    #[test]
    fn test_set_visible_keeps_transforms_clean() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let child = graph.add_mesh(root, "child", mesh());
        graph.update_world_transforms();

        graph.set_visible(child, false);
        assert!(!graph.get(child).unwrap().visible);
        assert!(!graph.is_dirty());
    }

    #[test]
    fn test_transform_propagation() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let parent = graph.add_child(root, "parent", NodeContent::Group);
        graph.set_transform(parent, LocalTransform::from_position(Vec3::new(10.0, 0.0, 0.0)));

        let child = graph.add_mesh(parent, "tree", mesh());
        graph.set_transform(child, LocalTransform::from_position(Vec3::new(5.0, 0.0, 0.0)));

        assert!(graph.is_dirty());
        graph.update_world_transforms();
        assert!(!graph.is_dirty());

        let world = graph.get(child).unwrap().world_position();
        assert!((world - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_mesh_mut_swaps_geometry() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let id = graph.add_mesh(root, "m", mesh());
        let empty = Arc::new(Geometry::empty());

        graph.mesh_mut(id).unwrap().geometry = empty.clone();
        assert!(Arc::ptr_eq(&graph.mesh(id).unwrap().geometry, &empty));
        assert!(graph.mesh(root).is_none());
    }
}
