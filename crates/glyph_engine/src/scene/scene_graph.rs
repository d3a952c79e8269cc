//! Scene graph trait and implementations
//!
//! Nodes carry a transform relative to an optional parent; drawables attach a
//! mesh range, texture and shader program to a node. The text compositor only
//! talks to the [`SceneGraph`] trait, so a host renderer can plug in its own
//! node store. [`Scene`] is the slot-map backed implementation.

use slotmap::{new_key_type, SlotMap};

use crate::assets::MeshRange;
use crate::foundation::math::{Mat4, Transform};
use crate::render::TextureHandle;

new_key_type! {
    /// Stable identifier of a scene node
    pub struct NodeId;
}

/// Shader program a drawable is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Pipeline state of one drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    /// Shader program
    pub program: ProgramHandle,
    /// Vertices to draw from the shared vertex buffer
    pub mesh: MeshRange,
    /// Texture bound to slot 0
    pub texture: Option<TextureHandle>,
}

/// Who created a drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawableRole {
    /// Scene content not managed by the text compositor
    Model,
    /// Glyph placement owned by the text compositor
    GlyphPlacement,
}

/// A node plus what to draw at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawable {
    /// Node providing the transform
    pub node: NodeId,
    /// What to draw
    pub pipeline: Pipeline,
    /// Owner tag
    pub role: DrawableRole,
}

/// Node in the transform hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Optional debug name
    pub name: String,
    /// Local transform relative to `parent`
    pub transform: Transform,
    /// Parent node, `None` for scene roots
    pub parent: Option<NodeId>,
}

/// Scene services used by the text compositor
pub trait SceneGraph {
    /// Create a node under `parent` (or at the root)
    fn create_node(&mut self, parent: Option<NodeId>, transform: Transform) -> NodeId;

    /// Remove a node; returns `false` if it did not exist
    fn remove_node(&mut self, node: NodeId) -> bool;

    /// Register a drawable for rendering
    fn add_drawable(&mut self, drawable: Drawable);

    /// Remove every drawable matching `predicate`; returns how many were removed
    fn remove_drawables(&mut self, predicate: &mut dyn FnMut(&Drawable) -> bool) -> usize;
}

/// Slot-map backed scene
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    drawables: Vec<Drawable>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named node
    pub fn create_named_node(&mut self, name: impl Into<String>, parent: Option<NodeId>, transform: Transform) -> NodeId {
        self.nodes.insert(Node { name: name.into(), transform, parent })
    }

    /// Get a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a node for editing its transform or parent
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Find the first node with a given name
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Direct children of a node
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    /// Local-to-world matrix, composed through the parent chain
    ///
    /// A parent that no longer exists ends the chain.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(id)?;
        let mut matrix = node.transform.to_matrix();
        let mut depth = 0;
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            matrix = parent.transform.to_matrix() * matrix;
            node = parent;
            depth += 1;
            if depth > self.nodes.len() {
                log::error!("Parent cycle detected at node {:?}", id);
                break;
            }
        }
        Some(matrix)
    }

    /// All registered drawables in registration order
    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    /// Drawables attached to one node
    pub fn drawables_at(&self, node: NodeId) -> impl Iterator<Item = &Drawable> {
        self.drawables.iter().filter(move |d| d.node == node)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of drawables
    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }
}

impl SceneGraph for Scene {
    fn create_node(&mut self, parent: Option<NodeId>, transform: Transform) -> NodeId {
        self.create_named_node(String::new(), parent, transform)
    }

    fn remove_node(&mut self, node: NodeId) -> bool {
        self.nodes.remove(node).is_some()
    }

    fn add_drawable(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }

    fn remove_drawables(&mut self, predicate: &mut dyn FnMut(&Drawable) -> bool) -> usize {
        let before = self.drawables.len();
        self.drawables.retain(|d| !predicate(d));
        before - self.drawables.len()
    }
}
