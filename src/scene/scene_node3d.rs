use crate::light::{Light, LightCollection};
use crate::procedural::{self, RenderMesh};
use crate::resource::{CubeTexture, GpuMesh3d, Material3d};
use crate::scene::{Object3d, RenderFlags};
use glamx::{Mat4, Quat, Vec3};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

/// The data contained by a `SceneNode3d`.
pub struct SceneNodeData3d {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    visible: bool,
    children: Vec<SceneNode3d>,
    object: Option<Object3d>,
    light: Option<Light>,
    background: Option<Rc<RefCell<CubeTexture>>>,
    parent: Option<Weak<RefCell<SceneNodeData3d>>>,
}

/// An object to draw, with the world transform it was collected with.
pub struct DrawItem {
    /// The node holding the object.
    pub node: SceneNode3d,
    /// Its world transform.
    pub world: Mat4,
}

/// A node of the scene graph.
///
/// This may represent a group of other nodes, and/or contain an object that
/// can be rendered, and/or a light. Cloning a node clones a handle: both
/// handles see the same data.
///
/// Rotations are Euler angles in radians, applied in X, then Y, then Z order
/// (the matrix is `Rx * Ry * Rz`).
#[derive(Clone)]
pub struct SceneNode3d {
    data: Rc<RefCell<SceneNodeData3d>>,
}

impl SceneNodeData3d {
    fn remove(&mut self, o: &SceneNode3d) {
        if let Some(i) = self
            .children
            .iter()
            .rposition(|e| Rc::ptr_eq(&o.data, &e.data))
        {
            let _ = self.children.remove(i);
        }
    }

    /// Whether this node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn object(&self) -> Option<&Object3d> {
        self.object.as_ref()
    }

    #[inline]
    pub fn object_mut(&mut self) -> Option<&mut Object3d> {
        self.object.as_mut()
    }

    #[inline]
    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    #[inline]
    pub fn children(&self) -> &[SceneNode3d] {
        &self.children
    }

    fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, euler_xyz(self.rotation), self.position)
    }

    fn do_prepare(
        &self,
        parent_world: Mat4,
        lights: &mut LightCollection,
        draws: &mut Vec<DrawItem>,
        self_node: &SceneNode3d,
    ) {
        if !self.visible {
            return;
        }

        let world = parent_world * self.local_matrix();

        if let Some(ref light) = self.light {
            let _ = lights.add(light, world.transform_point3(Vec3::ZERO));
        }

        if self.object.is_some() {
            draws.push(DrawItem {
                node: self_node.clone(),
                world,
            });
        }

        for child in self.children.iter() {
            child.data().do_prepare(world, lights, draws, child);
        }
    }
}

/// The rotation of Euler angles applied in X, Y, Z order.
pub fn euler_xyz(angles: Vec3) -> Quat {
    Quat::from_rotation_x(angles.x) * Quat::from_rotation_y(angles.y) * Quat::from_rotation_z(angles.z)
}

impl Default for SceneNode3d {
    fn default() -> SceneNode3d {
        SceneNode3d::empty()
    }
}

impl SceneNode3d {
    /// Creates a new scene node that is not rooted.
    pub fn new(object: Option<Object3d>) -> SceneNode3d {
        let data = SceneNodeData3d {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            visible: true,
            children: Vec::new(),
            object,
            light: None,
            background: None,
            parent: None,
        };

        SceneNode3d {
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Creates a new empty, not rooted, node with identity transformations.
    pub fn empty() -> SceneNode3d {
        SceneNode3d::new(None)
    }

    /// Creates a node drawing `mesh` with `material`.
    pub fn mesh(mesh: Rc<RefCell<GpuMesh3d>>, material: Material3d) -> SceneNode3d {
        SceneNode3d::new(Some(Object3d::new(mesh, material)))
    }

    /// Creates a node drawing a CPU mesh, uploaded on first render.
    pub fn render_mesh(mesh: RenderMesh, material: Material3d) -> SceneNode3d {
        let mesh = Rc::new(RefCell::new(GpuMesh3d::from_render_mesh(mesh)));
        SceneNode3d::mesh(mesh, material)
    }

    /// An axis-aligned box centered at the origin.
    pub fn cube(wx: f32, wy: f32, wz: f32, material: Material3d) -> SceneNode3d {
        SceneNode3d::render_mesh(procedural::cuboid(Vec3::new(wx, wy, wz)), material)
    }

    /// A subdivided plane in the XY plane, facing `+Z`.
    pub fn plane(
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
        material: Material3d,
    ) -> SceneNode3d {
        SceneNode3d::render_mesh(
            procedural::plane(width, height, width_segments, height_segments),
            material,
        )
    }

    /// Creates a node carrying a light.
    pub fn new_light(light: Light) -> SceneNode3d {
        let node = SceneNode3d::empty();
        node.data.borrow_mut().light = Some(light);
        node
    }

    /// Removes this node from its parent in the scene graph.
    pub fn detach(&mut self) {
        let parent = self.data_mut().parent.take();
        if let Some(parent) = parent.and_then(|p| p.upgrade()) {
            parent.borrow_mut().remove(self);
        }
    }

    /// Returns an immutable reference to this node's internal data.
    pub fn data(&self) -> Ref<'_, SceneNodeData3d> {
        self.data.borrow()
    }

    /// Returns a mutable reference to this node's internal data.
    pub fn data_mut(&mut self) -> RefMut<'_, SceneNodeData3d> {
        self.data.borrow_mut()
    }

    /// Whether `self` and `other` are handles on the same node.
    pub fn same_node(&self, other: &SceneNode3d) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /*
     *
     * Methods to add children.
     *
     */
    /// Adds an empty group node as a child of this node.
    pub fn add_group(&mut self) -> SceneNode3d {
        let node = SceneNode3d::empty();
        self.add_child(node.clone());
        node
    }

    /// Adds an existing node as a child of this node.
    ///
    /// # Panics
    /// Panics if the node already has a parent.
    pub fn add_child(&mut self, node: SceneNode3d) {
        assert!(
            node.data().is_root(),
            "The added node must not have a parent yet."
        );

        let mut node = node;
        node.data_mut().parent = Some(Rc::downgrade(&self.data));
        self.data_mut().children.push(node)
    }

    /// Adds a cube as a child of this node. The cube is initially axis-aligned
    /// and centered at (0, 0, 0).
    pub fn add_cube(&mut self, wx: f32, wy: f32, wz: f32, material: Material3d) -> SceneNode3d {
        let node = SceneNode3d::cube(wx, wy, wz, material);
        self.add_child(node.clone());
        node
    }

    /// Adds a plane as a child of this node.
    pub fn add_plane(
        &mut self,
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
        material: Material3d,
    ) -> SceneNode3d {
        let node = SceneNode3d::plane(width, height, width_segments, height_segments, material);
        self.add_child(node.clone());
        node
    }

    /// Adds a light as a child of this node.
    pub fn add_light(&mut self, light: Light) -> SceneNode3d {
        let node = SceneNode3d::new_light(light);
        self.add_child(node.clone());
        node
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.data().children.len()
    }

    /// Whether `node` is a direct child of this node.
    pub fn has_child(&self, node: &SceneNode3d) -> bool {
        self.data().children.iter().any(|c| c.same_node(node))
    }

    /// Applies a closure to each object contained by this node and its children.
    pub fn apply_to_objects_mut<F: FnMut(&mut Object3d)>(&mut self, f: &mut F) {
        let mut data = self.data_mut();
        if let Some(ref mut o) = data.object {
            f(o)
        }

        for c in data.children.iter_mut() {
            c.apply_to_objects_mut(f)
        }
    }

    /// Applies a closure to each object contained by this node and its children.
    pub fn apply_to_objects<F: FnMut(&Object3d)>(&self, f: &mut F) {
        let data = self.data();
        if let Some(ref o) = data.object {
            f(o)
        }

        for c in data.children.iter() {
            c.apply_to_objects(f)
        }
    }

    /*
     *
     * Rendering state.
     *
     */
    /// Collects the lights and the objects to draw from the tree rooted here.
    ///
    /// Hidden nodes are skipped along with their whole subtree.
    pub fn prepare(&self, lights: &mut LightCollection, draws: &mut Vec<DrawItem>) {
        self.data().do_prepare(Mat4::IDENTITY, lights, draws, self);
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.data().visible
    }

    #[inline]
    pub fn set_visible(&mut self, visible: bool) -> Self {
        self.data_mut().visible = visible;
        self.clone()
    }

    /// Sets the material of this node's object, if any.
    pub fn set_material(&mut self, material: Material3d) -> Self {
        if let Some(o) = self.data_mut().object_mut() {
            o.set_material(material);
        }
        self.clone()
    }

    /// Sets whether this node's object is drawn into the shadow map.
    pub fn set_cast_shadow(&mut self, enabled: bool) -> Self {
        self.set_render_flag(RenderFlags::CAST_SHADOW, enabled)
    }

    /// Sets whether this node's object is darkened by shadows.
    pub fn set_receive_shadow(&mut self, enabled: bool) -> Self {
        self.set_render_flag(RenderFlags::RECEIVE_SHADOW, enabled)
    }

    fn set_render_flag(&mut self, flag: RenderFlags, enabled: bool) -> Self {
        if let Some(o) = self.data_mut().object_mut() {
            o.set_flag(flag, enabled);
        }
        self.clone()
    }

    /// Sets the cubemap drawn behind everything else.
    ///
    /// Only the background of the root node passed to the renderer is used.
    /// Transmissive materials refract it.
    pub fn set_background(&mut self, background: CubeTexture) -> Self {
        self.data_mut().background = Some(Rc::new(RefCell::new(background)));
        self.clone()
    }

    #[inline]
    pub fn background(&self) -> Option<Rc<RefCell<CubeTexture>>> {
        self.data().background.clone()
    }

    /*
     *
     * Transformations.
     *
     */
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.data().position
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) -> Self {
        self.data_mut().position = position;
        self.clone()
    }

    #[inline]
    pub fn translate(&mut self, t: Vec3) -> Self {
        self.data_mut().position += t;
        self.clone()
    }

    /// The Euler angles of this node, in radians.
    #[inline]
    pub fn rotation(&self) -> Vec3 {
        self.data().rotation
    }

    #[inline]
    pub fn set_rotation(&mut self, angles: Vec3) -> Self {
        self.data_mut().rotation = angles;
        self.clone()
    }

    /// Adds `angles` to the Euler angles of this node.
    #[inline]
    pub fn rotate(&mut self, angles: Vec3) -> Self {
        self.data_mut().rotation += angles;
        self.clone()
    }

    #[inline]
    pub fn local_scale(&self) -> Vec3 {
        self.data().scale
    }

    #[inline]
    pub fn set_local_scale(&mut self, sx: f32, sy: f32, sz: f32) -> Self {
        self.data_mut().scale = Vec3::new(sx, sy, sz);
        self.clone()
    }

    /// This node transformation relative to its parent.
    #[inline]
    pub fn local_transformation(&self) -> Mat4 {
        self.data().local_matrix()
    }

    /// This node transformation relative to the root of its tree.
    pub fn world_transformation(&self) -> Mat4 {
        let data = self.data();
        let local = data.local_matrix();

        match data.parent.as_ref().and_then(|p| p.upgrade()) {
            Some(parent) => SceneNode3d { data: parent }.world_transformation() * local,
            None => local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn children_inherit_their_parent_transform() {
        let mut root = SceneNode3d::empty();
        let mut group = root.add_group();
        group.set_position(Vec3::new(0.0, -1.0, 0.0));
        let cube = group.add_cube(1.0, 1.0, 1.0, Material3d::phong(color::WHITE));

        let world = cube.world_transformation();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn planes_are_laid_flat_by_a_negative_quarter_turn() {
        let mut plane = SceneNode3d::plane(3.0, 3.0, 1, 1, Material3d::default());
        plane.set_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0));
        let normal = plane.world_transformation().transform_vector3(Vec3::Z);
        assert_relative_eq!(normal.y, 1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn euler_angles_apply_x_first() {
        let q = euler_xyz(Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0));
        let expected = Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(FRAC_PI_2);
        assert_relative_eq!(q.dot(expected).abs(), 1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn prepare_collects_visible_lights_and_objects() {
        let mut root = SceneNode3d::empty();
        root.add_light(Light::ambient(color::WHITE));
        let mut sun = root.add_light(Light::directional(Vec3::NEG_Y));
        sun.set_position(Vec3::Y);
        root.add_cube(1.0, 1.0, 1.0, Material3d::default());
        let mut hidden = root.add_cube(1.0, 1.0, 1.0, Material3d::default());
        hidden.set_visible(false);

        let mut lights = LightCollection::new();
        let mut draws = Vec::new();
        root.prepare(&mut lights, &mut draws);

        assert_eq!(lights.len(), 1);
        assert_eq!(lights.lights[0].world_position, Vec3::Y);
        assert_eq!(lights.ambient, Vec3::ONE);
        assert_eq!(draws.len(), 1);
    }

    #[test]
    fn detached_nodes_leave_their_parent() {
        let mut root = SceneNode3d::empty();
        let mut child = root.add_group();
        assert!(root.has_child(&child));

        child.detach();
        assert!(!root.has_child(&child));
        assert!(child.data().is_root());
        assert_eq!(root.num_children(), 0);
    }

    #[test]
    fn shadow_flags_reach_the_object() {
        let mut cube = SceneNode3d::cube(1.0, 1.0, 1.0, Material3d::default());
        cube.set_cast_shadow(true).set_receive_shadow(false);
        let data = cube.data();
        let object = data.object().expect("cube object");
        assert!(object.casts_shadow());
        assert!(!object.receives_shadow());
    }
}
