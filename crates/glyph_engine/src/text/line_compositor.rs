//! Line lifecycle
//!
//! A line is one shaping call placed under its own root node. The compositor
//! records which glyph nodes each line owns, so erasing a line removes exactly
//! those nodes and their drawables and nothing else.

use std::collections::{HashMap, HashSet};

use super::shaper::TextShaper;
use super::TextError;
use crate::assets::{GlyphAsset, GlyphAssets};
use crate::foundation::math::{Transform, Vec3};
use crate::scene::{Drawable, DrawableRole, NodeId, Pipeline, ProgramHandle, SceneGraph};

/// Identifies a line by its root node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineHandle(NodeId);

impl LineHandle {
    /// Root node; its transform positions the whole line
    pub fn root(&self) -> NodeId {
        self.0
    }
}

/// Nodes owned by one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// Line root
    pub root: NodeId,
    /// One placement node per shaped glyph, in shaping order
    pub glyphs: Vec<NodeId>,
    /// Source text
    pub text: String,
}

/// Creates and erases lines of glyph placements
#[derive(Debug)]
pub struct LineCompositor {
    program: ProgramHandle,
    lines: HashMap<LineHandle, TextLine>,
}

impl LineCompositor {
    /// Compositor drawing every glyph with `program`
    pub fn new(program: ProgramHandle) -> Self {
        Self { program, lines: HashMap::new() }
    }

    fn drawable(&self, node: NodeId, asset: &GlyphAsset) -> Drawable {
        Drawable {
            node,
            pipeline: Pipeline {
                program: self.program,
                mesh: asset.mesh,
                texture: Some(asset.texture.handle),
            },
            role: DrawableRole::GlyphPlacement,
        }
    }

    /// Shape `text` and place it under a new root node
    ///
    /// Every glyph is resolved before the scene is touched, so a
    /// [`TextError::MissingGlyph`] leaves no nodes behind.
    pub fn create_line(
        &mut self,
        shaper: &TextShaper<'_>,
        assets: &GlyphAssets,
        scene: &mut dyn SceneGraph,
        text: &str,
    ) -> Result<LineHandle, TextError> {
        let shaped = shaper.shape(text)?;
        let placements = shaped
            .iter()
            .map(|glyph| assets.get(&glyph.glyph_name).map(|asset| (glyph.position, asset)))
            .collect::<Result<Vec<_>, _>>()?;

        let root = scene.create_node(None, Transform::identity());
        let mut glyphs = Vec::with_capacity(placements.len());
        for (position, asset) in placements {
            let node = scene.create_node(
                Some(root),
                Transform::from_position(Vec3::new(position.x, position.y, 0.0)),
            );
            scene.add_drawable(self.drawable(node, asset));
            glyphs.push(node);
        }

        let handle = LineHandle(root);
        log::debug!("Created line {:?} with {} glyphs: {:?}", root, glyphs.len(), text);
        self.lines.insert(handle, TextLine { root, glyphs, text: text.to_string() });
        Ok(handle)
    }

    /// Remove a line's drawables, glyph nodes and root
    ///
    /// Returns `false` for a handle that is unknown or already erased.
    pub fn erase_line(&mut self, scene: &mut dyn SceneGraph, handle: LineHandle) -> bool {
        let Some(line) = self.lines.remove(&handle) else {
            return false;
        };

        let owned: HashSet<NodeId> = line.glyphs.iter().copied().collect();
        let removed = scene.remove_drawables(&mut |d: &Drawable| {
            d.role == DrawableRole::GlyphPlacement && owned.contains(&d.node)
        });
        for node in &line.glyphs {
            scene.remove_node(*node);
        }
        scene.remove_node(line.root);

        log::debug!("Erased line {:?}: {} drawables removed", line.root, removed);
        true
    }

    /// Draw a single glyph at an existing node; not owned by any line
    pub fn place_glyph(
        &self,
        assets: &GlyphAssets,
        scene: &mut dyn SceneGraph,
        node: NodeId,
        glyph_name: &str,
    ) -> Result<(), TextError> {
        let asset = assets.get(glyph_name)?;
        scene.add_drawable(self.drawable(node, asset));
        Ok(())
    }

    /// Remove glyph drawables at a node placed with [`Self::place_glyph`]
    ///
    /// Nodes owned by a line are left to [`Self::erase_line`].
    pub fn erase_glyph(&self, scene: &mut dyn SceneGraph, node: NodeId) -> usize {
        if self.lines.values().any(|line| line.glyphs.contains(&node)) {
            log::warn!("Node {:?} belongs to a line; erase the line instead", node);
            return 0;
        }
        scene.remove_drawables(&mut |d: &Drawable| d.role == DrawableRole::GlyphPlacement && d.node == node)
    }

    /// A live line
    pub fn line(&self, handle: LineHandle) -> Option<&TextLine> {
        self.lines.get(&handle)
    }

    /// Number of live lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Erase every live line
    pub fn clear(&mut self, scene: &mut dyn SceneGraph) {
        let handles: Vec<LineHandle> = self.lines.keys().copied().collect();
        for handle in handles {
            self.erase_line(scene, handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{GlyphTexture, MeshIndex, MeshRange, TextureIndex};
    use crate::assets::chunk::{write_chunk, IDX0, IDX1, PNCT, STR0, TXTR};
    use crate::assets::glyph_records::{GeometryIndexEntry, GlyphVertex, TextureIndexEntry};
    use crate::render::TextureManager;
    use crate::scene::Scene;
    use crate::text::shaper::tests::{FakeEngine, FakeNames};
    use approx::assert_relative_eq;
    use std::io::Cursor;

    /// Assets for single-letter glyph names, each a 1x1 bitmap
    fn assets_for(letters: &str) -> GlyphAssets {
        let names: Vec<u8> = letters.bytes().collect();
        let vertices = vec![GlyphVertex::new([0.0; 3], [0.0; 2]); 6 * names.len()];
        let geometry: Vec<GeometryIndexEntry> = (0..names.len() as u32)
            .map(|i| GeometryIndexEntry { name_begin: i, name_end: i + 1, vertex_begin: 6 * i, vertex_end: 6 * i + 6 })
            .collect();
        let texture: Vec<TextureIndexEntry> = (0..names.len() as u32)
            .map(|i| TextureIndexEntry { name_begin: i, name_end: i + 1, tex_begin: i, tex_end: i + 1, width: 1, height: 1 })
            .collect();

        let mut mesh_file = Vec::new();
        write_chunk(&mut mesh_file, &PNCT, &vertices).unwrap();
        write_chunk(&mut mesh_file, &STR0, &names).unwrap();
        write_chunk(&mut mesh_file, &IDX0, &geometry).unwrap();

        let mut texture_file = Vec::new();
        write_chunk(&mut texture_file, &TXTR, &vec![0xffu8; names.len()]).unwrap();
        write_chunk(&mut texture_file, &STR0, &names).unwrap();
        write_chunk(&mut texture_file, &IDX1, &texture).unwrap();

        let mut manager = TextureManager::new();
        let meshes = MeshIndex::load(&mut Cursor::new(mesh_file)).unwrap();
        let textures = TextureIndex::load(&mut Cursor::new(texture_file), &mut manager).unwrap();
        GlyphAssets::new(meshes, &textures)
    }

    fn glyph_drawables(scene: &Scene) -> usize {
        scene
            .drawables()
            .iter()
            .filter(|d| d.role == DrawableRole::GlyphPlacement)
            .count()
    }

    #[test]
    fn test_create_line_builds_children_under_root() {
        let engine = FakeEngine::new("hi", 640);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);
        let assets = assets_for("hi");
        let mut scene = Scene::new();
        let mut compositor = LineCompositor::new(ProgramHandle(7));

        let handle = compositor.create_line(&shaper, &assets, &mut scene, "hi").unwrap();
        let line = compositor.line(handle).unwrap();

        assert_eq!(line.glyphs.len(), 2);
        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.children(handle.root()).len(), 2);
        assert_eq!(glyph_drawables(&scene), 2);

        let second = scene.node(line.glyphs[1]).unwrap();
        assert_eq!(second.parent, Some(handle.root()));
        assert_relative_eq!(second.transform.position, Vec3::new(0.1, 0.0, 0.0), epsilon = 1e-6);

        let drawable = scene.drawables_at(line.glyphs[1]).next().unwrap();
        assert_eq!(drawable.pipeline.program, ProgramHandle(7));
        assert_eq!(drawable.pipeline.mesh, assets.mesh_range("i").unwrap());
        assert_eq!(drawable.pipeline.texture, Some(assets.texture("i").unwrap()));
    }

    #[test]
    fn test_erase_line_leaves_other_lines() {
        let engine = FakeEngine::new("hiyo", 64);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);
        let assets = assets_for("hiyo");
        let mut scene = Scene::new();
        let mut compositor = LineCompositor::new(ProgramHandle(1));

        let first = compositor.create_line(&shaper, &assets, &mut scene, "hi").unwrap();
        let second = compositor.create_line(&shaper, &assets, &mut scene, "yo").unwrap();
        let second_nodes = compositor.line(second).unwrap().glyphs.clone();
        assert_eq!(scene.node_count(), 6);

        assert!(compositor.erase_line(&mut scene, first));
        assert_eq!(scene.node_count(), 3);
        assert!(scene.node(first.root()).is_none());
        assert_eq!(glyph_drawables(&scene), 2);
        for node in &second_nodes {
            assert!(scene.node(*node).is_some());
            assert_eq!(scene.drawables_at(*node).count(), 1);
        }

        assert!(!compositor.erase_line(&mut scene, first));
        assert_eq!(scene.node_count(), 3);
        assert_eq!(compositor.line_count(), 1);
    }

    #[test]
    fn test_missing_glyph_leaves_scene_untouched() {
        let engine = FakeEngine::new("hi", 64);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);
        let assets = assets_for("h");
        let mut scene = Scene::new();
        let mut compositor = LineCompositor::new(ProgramHandle(1));

        let err = compositor.create_line(&shaper, &assets, &mut scene, "hi").unwrap_err();
        assert_eq!(err, TextError::MissingGlyph("i".to_string()));
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.drawable_count(), 0);
        assert_eq!(compositor.line_count(), 0);
    }

    #[test]
    fn test_erase_keeps_model_drawables() {
        let engine = FakeEngine::new("h", 64);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);
        let assets = assets_for("h");
        let mut scene = Scene::new();
        let mut compositor = LineCompositor::new(ProgramHandle(1));

        let handle = compositor.create_line(&shaper, &assets, &mut scene, "h").unwrap();
        let glyph_node = compositor.line(handle).unwrap().glyphs[0];
        scene.add_drawable(Drawable {
            node: glyph_node,
            pipeline: Pipeline { program: ProgramHandle(2), mesh: MeshRange { begin: 0, end: 3 }, texture: None },
            role: DrawableRole::Model,
        });

        compositor.erase_line(&mut scene, handle);
        assert_eq!(scene.drawable_count(), 1);
        assert_eq!(scene.drawables()[0].role, DrawableRole::Model);
    }

    #[test]
    fn test_place_and_erase_single_glyph() {
        let assets = assets_for("A");
        let mut scene = Scene::new();
        let compositor = LineCompositor::new(ProgramHandle(3));
        let node = scene.create_named_node("Sign", None, Transform::identity());

        compositor.place_glyph(&assets, &mut scene, node, "A").unwrap();
        assert_eq!(scene.drawables_at(node).count(), 1);
        let texture: GlyphTexture = assets.get("A").unwrap().texture;
        assert_eq!(scene.drawables()[0].pipeline.texture, Some(texture.handle));

        assert!(matches!(
            compositor.place_glyph(&assets, &mut scene, node, "B"),
            Err(TextError::MissingGlyph(_))
        ));
        assert_eq!(compositor.erase_glyph(&mut scene, node), 1);
        assert_eq!(scene.drawable_count(), 0);
    }

    #[test]
    fn test_clear_erases_everything() {
        let engine = FakeEngine::new("ab", 64);
        let names = FakeNames::for_engine(&engine);
        let shaper = TextShaper::new(&engine, &names, 0.01);
        let assets = assets_for("ab");
        let mut scene = Scene::new();
        let mut compositor = LineCompositor::new(ProgramHandle(1));

        compositor.create_line(&shaper, &assets, &mut scene, "ab").unwrap();
        compositor.create_line(&shaper, &assets, &mut scene, "ba").unwrap();
        compositor.clear(&mut scene);

        assert_eq!(compositor.line_count(), 0);
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.drawable_count(), 0);
    }
}
