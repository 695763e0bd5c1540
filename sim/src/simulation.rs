//! The simulation context.
//!
//! [`Simulation`] owns the physics world, the entity registry, the fixed-step clock and the
//! per-tick state. One call to [`Simulation::frame`] runs the whole per-frame sequence:
//!
//! 1. Fold the frame's input into the tick state.
//! 2. Consume accumulated time in fixed steps; each step runs the player controller, then
//!    integrates.
//! 3. Probe for ground under the player once.
//! 4. Move the camera to the player's eye point.
//! 5. Handle frame-level actions (spawning projectiles, quitting).
//!
//! Teardown goes through [`Simulation::shutdown`], which removes every entity before the world
//! itself is released.

use std::{collections::VecDeque, time::Duration};

use log::info;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rapier3d::prelude::RigidBodyHandle;

use crate::{
    BodyKind, CameraRig, Entity, EntityDesc, EntityId, EntityRegistry, FrameSteps, InputState,
    MeshKind, MeshLibrary, PhysicsWorld, PlayerController, Rgba, Shader, SimConfig, SimResult,
    SimulationClock, SpawnTransform, TickState, constants::PLAYER_LINEAR_DAMPING, probe_ground,
};

const GROUND_COLOR: Rgba = [0.5, 0.5, 0.5, 1.0];
const SPHERE_COLOR: Rgba = [1.0, 0.0, 0.0, 1.0];
const CRATE_COLOR: Rgba = [0.0, 1.0, 0.0, 1.0];
const PICKABLE_COLOR: Rgba = [1.0, 0.85, 0.1, 1.0];
const PUZZLE_COLOR: Rgba = [0.45, 0.35, 0.6, 1.0];
const PLAYER_COLOR: Rgba = [0.0, 1.0, 1.0, 1.0];
const PROJECTILE_COLOR: Rgba = [0.2, 0.9, 0.3, 1.0];
const PROJECTILE_MESH: MeshKind = MeshKind::Box;

/// What happened during one [`Simulation::frame`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub steps: FrameSteps,
    pub grounded: bool,
    /// Entities created this frame, in spawn order.
    pub spawned: Vec<EntityId>,
    /// Entities removed this frame.
    pub despawned: Vec<EntityId>,
    pub quit_requested: bool,
}

pub struct Simulation {
    world: PhysicsWorld<PlayerController>,
    registry: EntityRegistry,
    clock: SimulationClock,
    tick: TickState,
    player: EntityId,
    projectiles: VecDeque<EntityId>,
    config: SimConfig,
}

impl Simulation {
    /// Create an empty world containing only the player.
    pub fn new(config: SimConfig, player: EntityDesc) -> Self {
        let controller = PlayerController::new(RigidBodyHandle::invalid(), config.controller);
        let mut world = PhysicsWorld::initialize(config.gravity, config.fixed_step, controller);
        let mut registry = EntityRegistry::new();

        let eye = player.transform.position;
        let player = registry.spawn(&mut world, player);
        if let Ok(entity) = registry.get(player) {
            world.hook_mut().set_body(entity.body());
        }

        let mut tick = TickState::default();
        tick.camera.follow(eye, config.camera_eye_height);

        Self {
            world,
            registry,
            clock: SimulationClock::new(config.fixed_step, config.max_catch_up_steps),
            tick,
            player,
            projectiles: VecDeque::new(),
            config,
        }
    }

    /// The playground: ground plane, a ball, a heavy crate, a pickable, a puzzle block and the
    /// capsule player.
    pub fn with_default_scene(config: SimConfig) -> Self {
        let mut sim = Self::new(config, default_player());

        sim.spawn(EntityDesc::new(
            "ground",
            BodyKind::Ground,
            MeshKind::Plane,
            0.0,
            GROUND_COLOR,
            SpawnTransform::at(Point3::origin()).with_scale(Vector3::new(200.0, 1.0, 200.0)),
        ));
        sim.spawn(EntityDesc::new(
            "ball",
            BodyKind::Sphere,
            MeshKind::Sphere,
            20.0,
            SPHERE_COLOR,
            SpawnTransform::at(Point3::new(8.0, 6.0, 0.0)).with_scale(Vector3::repeat(2.0)),
        ));
        sim.spawn(EntityDesc::new(
            "crate",
            BodyKind::Box,
            MeshKind::Box,
            1000.0,
            CRATE_COLOR,
            SpawnTransform::at(Point3::new(0.0, 10.0, -8.0))
                .with_scale(Vector3::new(2.0, 4.0, 2.0)),
        ));
        sim.spawn(EntityDesc::new(
            "pickable",
            BodyKind::Pickable,
            MeshKind::Box,
            2.0,
            PICKABLE_COLOR,
            SpawnTransform::at(Point3::new(-4.0, 0.5, 2.0)).with_scale(Vector3::repeat(0.5)),
        ));
        sim.spawn(EntityDesc::new(
            "puzzle",
            BodyKind::Puzzle,
            MeshKind::Box,
            0.0,
            PUZZLE_COLOR,
            SpawnTransform::at(Point3::new(-6.0, 1.0, -4.0))
                .with_scale(Vector3::new(2.0, 2.0, 2.0))
                .with_rotation(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.4)),
        ));

        sim
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld<PlayerController> {
        &self.world
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn camera(&self) -> &CameraRig {
        &self.tick.camera
    }

    pub fn grounded(&self) -> bool {
        self.tick.grounded
    }

    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn player_entity(&self) -> SimResult<&Entity> {
        self.registry.get(self.player)
    }

    pub fn spawn(&mut self, desc: EntityDesc) -> EntityId {
        self.registry.spawn(&mut self.world, desc)
    }

    /// Remove an entity. Removing the player makes every later frame fail with
    /// [`crate::SimError::UnknownEntity`].
    pub fn despawn(&mut self, id: EntityId) -> SimResult<()> {
        self.registry.despawn(&mut self.world, id)?;
        self.projectiles.retain(|&p| p != id);
        Ok(())
    }

    /// Advance the simulation by one render frame of `elapsed` time.
    pub fn frame(&mut self, elapsed: Duration, input: InputState) -> SimResult<FrameReport> {
        self.tick.input.merge_frame(input);

        let world = &mut self.world;
        let tick = &mut self.tick;
        let steps = self.clock.advance(elapsed, |_| world.step(tick));

        let player = self.registry.get(self.player)?;
        let position = player.position(&self.world)?;
        self.tick.grounded = probe_ground(
            &self.world,
            position,
            player.body(),
            &self.config.ground,
        );
        self.tick
            .camera
            .follow(position, self.config.camera_eye_height);

        let mut report = FrameReport {
            steps,
            grounded: self.tick.grounded,
            quit_requested: self.tick.input.quit_pressed,
            ..FrameReport::default()
        };

        if self.tick.input.spawn_pressed {
            if let Some((spawned, evicted)) = self.spawn_projectile() {
                report.spawned.push(spawned);
                report.despawned.extend(evicted);
            }
        }

        Ok(report)
    }

    /// Launch a box from just in front of the camera along its forward.
    ///
    /// Returns the new id and, if the live cap was hit, the id of the projectile it replaced.
    /// A cap of zero disables projectiles and returns `None`.
    pub fn spawn_projectile(&mut self) -> Option<(EntityId, Option<EntityId>)> {
        let tuning = self.config.projectile;
        if tuning.max_live == 0 {
            return None;
        }
        let camera = self.tick.camera;
        let forward = camera.forward();

        let evicted = if self.projectiles.len() >= tuning.max_live {
            self.projectiles.pop_front()
        } else {
            None
        };
        if let Some(old) = evicted {
            // Only projectiles are ever queued, and they are only removed through here or
            // `despawn`, which also drops them from the queue.
            let _ = self.registry.despawn(&mut self.world, old);
        }

        let mut desc = EntityDesc::new(
            "projectile",
            BodyKind::Box,
            PROJECTILE_MESH,
            tuning.mass,
            PROJECTILE_COLOR,
            SpawnTransform::at(camera.position + forward * tuning.spawn_distance)
                .with_scale(Vector3::repeat(tuning.size))
                .with_rotation(camera.orientation()),
        );
        desc.linvel = forward * tuning.speed;

        let id = self.spawn(desc);
        self.projectiles.push_back(id);
        Some((id, evicted))
    }

    /// Check that `meshes` can draw every live entity and any projectile.
    pub fn require_meshes<M>(&self, meshes: &MeshLibrary<M>) -> SimResult<()> {
        let kinds: Vec<MeshKind> = self
            .registry
            .iter()
            .map(Entity::mesh)
            .chain(std::iter::once(PROJECTILE_MESH))
            .collect();
        meshes.require(&kinds)
    }

    /// Draw every entity in id order.
    pub fn draw<S: Shader>(&self, meshes: &MeshLibrary<S::Mesh>, shader: &mut S) -> SimResult<()> {
        self.registry
            .iter()
            .try_for_each(|entity| entity.draw(&self.world, meshes, shader))
    }

    /// Remove every entity, then release the physics world.
    pub fn shutdown(self) -> SimResult<()> {
        let Self {
            mut world,
            mut registry,
            ..
        } = self;

        let count = registry.len();
        registry.clear(&mut world);
        world.shutdown()?;
        info!("simulation shut down; released {count} entities");
        Ok(())
    }
}

fn default_player() -> EntityDesc {
    let mut desc = EntityDesc::new(
        "player",
        BodyKind::Player,
        MeshKind::Capsule,
        30.0,
        PLAYER_COLOR,
        SpawnTransform::at(Point3::new(4.0, 1.0, 4.0)),
    );
    desc.lock_rotations = true;
    desc.linear_damping = PLAYER_LINEAR_DAMPING;
    desc
}
