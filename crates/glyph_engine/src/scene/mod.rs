//! Scene management
//!
//! A minimal transform hierarchy with drawables, the surface the text
//! compositor places glyph nodes into.

mod scene_graph;

pub use scene_graph::{
    SceneGraph, Scene, Node, NodeId, Drawable, DrawableRole, Pipeline, ProgramHandle,
};
