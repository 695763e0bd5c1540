use std::collections::BTreeMap;

use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::{
    BodyKind, BodyTag, EntityId, MeshKind, PhysicsWorld, SimError, SimResult, TickHook,
    collider_for,
    constants::{DEFAULT_FRICTION, DEFAULT_RESTITUTION},
};

/// Linear RGBA color, components in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Upload/draw contract of the render collaborator.
///
/// An implementation binds whatever program it wraps; the core only feeds it a model matrix,
/// a color and the mesh to draw, in that order.
pub trait Shader {
    type Mesh;

    fn load_model_matrix(&mut self, model: &Matrix4<f32>);
    fn load_color(&mut self, color: Rgba);
    fn draw_mesh(&mut self, mesh: &Self::Mesh);
}

/// Shared render meshes, one per [`MeshKind`].
///
/// Loaded once at startup and reused by every entity of that shape; entities store only the
/// kind and look the handle up at draw time.
#[derive(Clone, Debug)]
pub struct MeshLibrary<M> {
    meshes: BTreeMap<MeshKind, M>,
}

impl<M> Default for MeshLibrary<M> {
    fn default() -> Self {
        Self {
            meshes: BTreeMap::new(),
        }
    }
}

impl<M> MeshLibrary<M> {
    pub fn insert(&mut self, kind: MeshKind, mesh: M) {
        self.meshes.insert(kind, mesh);
    }

    pub fn get(&self, kind: MeshKind) -> SimResult<&M> {
        self.meshes.get(&kind).ok_or(SimError::MissingMesh(kind))
    }

    /// Fail on the first kind in `kinds` with no loaded mesh.
    pub fn require(&self, kinds: &[MeshKind]) -> SimResult<()> {
        kinds.iter().try_for_each(|&kind| self.get(kind).map(|_| ()))
    }
}

/// Initial placement of an entity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpawnTransform {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// Render and collider scale; see [`MeshKind`] for how each shape interprets it.
    pub scale: Vector3<f32>,
}

impl SpawnTransform {
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation)
    }
}

/// Everything needed to spawn an entity.
#[derive(Clone, Debug)]
pub struct EntityDesc {
    pub name: String,
    pub kind: BodyKind,
    pub mesh: MeshKind,
    /// Kilograms. Zero makes the body fixed: infinite mass, unaffected by forces.
    pub mass: f32,
    pub color: Rgba,
    pub transform: SpawnTransform,
    pub linvel: Vector3<f32>,
    pub linear_damping: f32,
    /// Keep the body upright (used by the player capsule).
    pub lock_rotations: bool,
}

impl EntityDesc {
    pub fn new(
        name: impl Into<String>,
        kind: BodyKind,
        mesh: MeshKind,
        mass: f32,
        color: Rgba,
        transform: SpawnTransform,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            mesh,
            mass,
            color,
            transform,
            linvel: Vector3::zeros(),
            linear_damping: 0.0,
            lock_rotations: false,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

/// A render + physics pair.
///
/// The entity owns its rigid body (and the body's single collider) but not its mesh. Instances
/// live in the [`crate::EntityRegistry`]; removing one there is the only way its body leaves the
/// world, so a live `Entity` always names a live body.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    kind: BodyKind,
    mesh: MeshKind,
    color: Rgba,
    spawn: SpawnTransform,
    body: RigidBodyHandle,
}

impl Entity {
    pub(crate) fn spawn<H: TickHook>(
        world: &mut PhysicsWorld<H>,
        id: EntityId,
        desc: EntityDesc,
    ) -> Self {
        let builder = if desc.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linvel(desc.linvel)
                .linear_damping(desc.linear_damping)
        };
        let builder = builder.pose(desc.transform.isometry());
        let body = if desc.lock_rotations {
            builder.lock_rotations().build()
        } else {
            builder.build()
        };

        let mut collider = collider_for(desc.mesh, &desc.transform.scale)
            .restitution(DEFAULT_RESTITUTION)
            .friction(DEFAULT_FRICTION);
        if !desc.is_static() {
            collider = collider.mass(desc.mass);
        }

        let (body, _) = world.insert_body(body, collider.build(), BodyTag::new(desc.kind, id));

        Self {
            id,
            name: desc.name,
            kind: desc.kind,
            mesh: desc.mesh,
            color: desc.color,
            spawn: desc.transform,
            body,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn mesh(&self) -> MeshKind {
        self.mesh
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn tag(&self) -> BodyTag {
        BodyTag::new(self.kind, self.id)
    }

    fn rigid_body<'w, H: TickHook>(&self, world: &'w PhysicsWorld<H>) -> SimResult<&'w RigidBody> {
        world.body(self.body).ok_or(SimError::UnknownEntity(self.id))
    }

    /// Current world pose of the body.
    pub fn pose<H: TickHook>(&self, world: &PhysicsWorld<H>) -> SimResult<Isometry3<f32>> {
        let rb = self.rigid_body(world)?;
        Ok(Isometry3::from_parts(
            Translation3::from(*rb.translation()),
            *rb.rotation(),
        ))
    }

    pub fn position<H: TickHook>(&self, world: &PhysicsWorld<H>) -> SimResult<Point3<f32>> {
        Ok(Point3::from(*self.rigid_body(world)?.translation()))
    }

    pub fn rotation<H: TickHook>(
        &self,
        world: &PhysicsWorld<H>,
    ) -> SimResult<UnitQuaternion<f32>> {
        Ok(*self.rigid_body(world)?.rotation())
    }

    /// Model matrix: current body pose with the spawn scale applied.
    pub fn model_matrix<H: TickHook>(&self, world: &PhysicsWorld<H>) -> SimResult<Matrix4<f32>> {
        let pose = self.pose(world)?;
        Ok(pose.to_homogeneous() * Matrix4::new_nonuniform_scaling(&self.spawn.scale))
    }

    /// Upload model matrix and color, then draw the shared mesh. Reads physics state only.
    pub fn draw<H: TickHook, S: Shader>(
        &self,
        world: &PhysicsWorld<H>,
        meshes: &MeshLibrary<S::Mesh>,
        shader: &mut S,
    ) -> SimResult<()> {
        let mesh = meshes.get(self.mesh)?;
        let model = self.model_matrix(world)?;

        shader.load_model_matrix(&model);
        shader.load_color(self.color);
        shader.draw_mesh(mesh);
        Ok(())
    }

    /// Add a central force for the current step.
    pub fn apply_force<H: TickHook>(
        &self,
        world: &mut PhysicsWorld<H>,
        force: Vector3<f32>,
    ) -> SimResult<()> {
        let rb = world
            .body_mut(self.body)
            .ok_or(SimError::UnknownEntity(self.id))?;
        rb.add_force(force, true);
        Ok(())
    }

    /// Apply a central impulse; the velocity change is immediate.
    pub fn apply_impulse<H: TickHook>(
        &self,
        world: &mut PhysicsWorld<H>,
        impulse: Vector3<f32>,
    ) -> SimResult<()> {
        let rb = world
            .body_mut(self.body)
            .ok_or(SimError::UnknownEntity(self.id))?;
        rb.apply_impulse(impulse, true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct RecordingShader {
        calls: Vec<&'static str>,
        model: Option<Matrix4<f32>>,
        color: Option<Rgba>,
        drawn: Option<&'static str>,
    }

    impl Shader for RecordingShader {
        type Mesh = &'static str;

        fn load_model_matrix(&mut self, model: &Matrix4<f32>) {
            self.calls.push("model");
            self.model = Some(*model);
        }

        fn load_color(&mut self, color: Rgba) {
            self.calls.push("color");
            self.color = Some(color);
        }

        fn draw_mesh(&mut self, mesh: &&'static str) {
            self.calls.push("draw");
            self.drawn = Some(*mesh);
        }
    }

    fn world() -> PhysicsWorld<()> {
        PhysicsWorld::initialize(Vector3::zeros(), Duration::from_millis(16), ())
    }

    fn crate_desc(mass: f32) -> EntityDesc {
        EntityDesc::new(
            "crate",
            BodyKind::Box,
            MeshKind::Box,
            mass,
            [0.0, 1.0, 0.0, 1.0],
            SpawnTransform::at(Point3::new(1.0, 2.0, 3.0)).with_scale(Vector3::new(2.0, 4.0, 2.0)),
        )
    }

    #[test]
    fn spawn_tags_body_with_kind_and_id() {
        let mut w = world();
        let e = Entity::spawn(&mut w, 7, crate_desc(5.0));

        let rb = w.body(e.body()).expect("body");
        assert_eq!(BodyTag::unpack(rb.user_data), Some(BodyTag::new(BodyKind::Box, 7)));
        assert!(rb.is_dynamic());
    }

    #[test]
    fn zero_mass_spawns_fixed_body() {
        let mut w = world();
        let e = Entity::spawn(&mut w, 1, crate_desc(0.0));
        assert!(w.body(e.body()).expect("body").is_fixed());
    }

    #[test]
    fn draw_uploads_pose_times_scale_then_color_then_mesh() {
        let mut w = world();
        let e = Entity::spawn(&mut w, 1, crate_desc(5.0));

        let mut meshes = MeshLibrary::default();
        meshes.insert(MeshKind::Box, "cube");

        let mut shader = RecordingShader::default();
        e.draw(&w, &meshes, &mut shader).expect("draw");

        assert_eq!(shader.calls, vec!["model", "color", "draw"]);
        assert_eq!(shader.drawn, Some("cube"));
        assert_eq!(shader.color, Some([0.0, 1.0, 0.0, 1.0]));

        let model = shader.model.expect("model");
        let corner = model.transform_point(&Point3::new(0.5, 0.5, 0.5));
        assert!((corner - Point3::new(2.0, 4.0, 4.0)).norm() < 1.0e-5);
    }

    #[test]
    fn draw_without_mesh_is_an_error() {
        let mut w = world();
        let e = Entity::spawn(&mut w, 1, crate_desc(5.0));
        let meshes: MeshLibrary<&'static str> = MeshLibrary::default();

        let mut shader = RecordingShader::default();
        assert_eq!(
            e.draw(&w, &meshes, &mut shader),
            Err(SimError::MissingMesh(MeshKind::Box))
        );
        assert!(shader.calls.is_empty());
    }

    #[test]
    fn mesh_library_require_reports_first_missing_kind() {
        let mut meshes = MeshLibrary::default();
        meshes.insert(MeshKind::Box, ());
        meshes.insert(MeshKind::Sphere, ());

        assert!(meshes.require(&[MeshKind::Box, MeshKind::Sphere]).is_ok());
        assert_eq!(
            meshes.require(&MeshKind::ALL),
            Err(SimError::MissingMesh(MeshKind::Capsule))
        );
    }

    #[test]
    fn impulse_changes_velocity_after_mass_is_resolved() {
        let mut w = world();
        let e = Entity::spawn(&mut w, 1, crate_desc(5.0));
        w.step(&mut ());

        e.apply_impulse(&mut w, Vector3::new(0.0, 10.0, 0.0))
            .expect("impulse");
        let vy = w.body(e.body()).expect("body").linvel().y;
        assert!((vy - 2.0).abs() < 1.0e-3);
    }

    #[test]
    fn force_accelerates_for_one_step_then_clears() {
        let mut w = world();
        let e = Entity::spawn(&mut w, 1, crate_desc(5.0));
        w.step(&mut ());

        e.apply_force(&mut w, Vector3::new(10.0, 0.0, 0.0))
            .expect("force");
        w.step(&mut ());

        // dv = F / m * dt = 10 / 5 * 0.016
        let rb = w.body(e.body()).expect("body");
        assert!((rb.linvel().x - 0.032).abs() < 1.0e-3);
        assert_eq!(rb.user_force(), Vector3::zeros());

        w.step(&mut ());
        let vx = w.body(e.body()).expect("body").linvel().x;
        assert!((vx - 0.032).abs() < 1.0e-3, "force must not persist, vx = {vx}");
    }

    #[test]
    fn fixed_entity_ignores_force() {
        let mut w = world();
        let e = Entity::spawn(&mut w, 1, crate_desc(0.0));
        w.step(&mut ());

        e.apply_force(&mut w, Vector3::new(10.0, 0.0, 0.0))
            .expect("force");
        w.step(&mut ());

        assert_eq!(*w.body(e.body()).expect("body").linvel(), Vector3::zeros());
        let position = e.position(&w).expect("position");
        assert!((position - Point3::new(1.0, 2.0, 3.0)).norm() < 1.0e-6);
    }
}
