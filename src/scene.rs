//! Minimal scene graph
//!
//! Visual objects are opaque handles: a transform, a color, and a visibility
//! flag. Geometry and materials live behind the `Renderer` seam; the
//! simulation only positions nodes and toggles their attachment.

use glam::Vec3;

/// Handle to a node in the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// A single visual object: transform + color, no geometry
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub position: Vec3,
    /// Euler angles (radians)
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Packed 0xRRGGBB
    pub color: u32,
    pub visible: bool,
    /// Whether the node is part of the rendered scene
    pub attached: bool,
}

impl Node {
    fn new(id: NodeId, color: u32) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color,
            visible: true,
            attached: false,
        }
    }

    /// Restore the neutral transform pooled entities are parked with
    fn reset_transform(&mut self) {
        self.position = Vec3::ZERO;
        self.rotation = Vec3::ZERO;
        self.scale = Vec3::ONE;
    }
}

/// Flat scene graph: nodes, fog, and ambient light level
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    next_id: u32,
    pub fog_color: u32,
    pub ambient_intensity: f32,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 1,
            fog_color: 0xffffff,
            ambient_intensity: crate::consts::AMBIENT_REST,
        }
    }

    /// Create a detached node with a neutral transform
    pub fn create_node(&mut self, color: u32) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Node::new(id, color));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Attach a node to the rendered scene
    pub fn attach(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.attached = true;
        }
    }

    /// Detach a node and park it with a neutral transform
    pub fn detach(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.attached = false;
            node.reset_transform();
        }
    }

    /// Nodes currently part of the rendered scene
    pub fn attached_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.attached)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Perspective camera state
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Euler angles (radians)
    pub rotation: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: crate::consts::CAMERA_THIRD_PERSON,
            rotation: Vec3::ZERO,
            fov: 60.0,
            near: 1.0,
            far: 10000.0,
            aspect: 1.0,
        }
    }
}

/// Rendering backend seam: the simulation hands over a scene and a camera
/// once per frame and never looks at the result.
pub trait Renderer {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera);
}

/// Renderer that only counts frames; used by tests and the headless binary
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl Renderer for NullRenderer {
    fn render(&mut self, _scene: &SceneGraph, _camera: &Camera) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_detach() {
        let mut scene = SceneGraph::new();
        let id = scene.create_node(0xf25346);
        assert!(!scene.node(id).unwrap().attached);

        scene.attach(id);
        assert!(scene.node(id).unwrap().attached);
        assert_eq!(scene.attached_nodes().count(), 1);

        scene.node_mut(id).unwrap().position = Vec3::new(1.0, 2.0, 3.0);
        scene.detach(id);
        let node = scene.node(id).unwrap();
        assert!(!node.attached);
        assert_eq!(node.position, Vec3::ZERO);
        assert_eq!(node.scale, Vec3::ONE);
    }

    #[test]
    fn test_node_ids_are_distinct() {
        let mut scene = SceneGraph::new();
        let a = scene.create_node(0);
        let b = scene.create_node(0);
        assert_ne!(a, b);
        assert_eq!(scene.node_count(), 2);
    }
}
