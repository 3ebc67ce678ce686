//! Everything related to the scene graph.

pub use self::object3d::{Object3d, RenderFlags};
pub use self::scene_node3d::{euler_xyz, DrawItem, SceneNode3d, SceneNodeData3d};

mod object3d;
mod scene_node3d;
