//! Rapier-backed dynamics world.
//!
//! [`PhysicsWorld`] owns every Rapier structure needed to step a dynamic scene and answer ray
//! queries: integration parameters, narrow phase (contact dispatch), BVH broad phase, the
//! solver state (islands, joints, CCD) and the physics pipeline itself.
//!
//! Ordering
//! - Construction: configuration → narrow phase → broad phase → solver → pipeline.
//! - Teardown ([`PhysicsWorld::shutdown`]): the exact reverse, and only once every rigid body
//!   has been removed.
//!
//! Per-tick hook
//! - A [`TickHook`] is installed at construction. Each step calls it with typed access to its
//!   own state and the body set *before* the pipeline integrates, so forces it applies are part
//!   of that same step.
//! - Forces are cleared after every step. A force must be re-applied each tick to persist.

use std::time::Duration;

use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use rapier3d::prelude::*;

use crate::{BodyTag, SimError, SimResult};

/// Callback invoked once per physics step, before integration.
///
/// `State` is whatever the hook needs from outside the world (input, camera, contact flags).
/// It is handed in by the caller of each step rather than captured, so the hook never holds
/// references into the simulation.
pub trait TickHook {
    type State;

    fn on_tick(&mut self, state: &mut Self::State, bodies: &mut RigidBodySet, dt: f32);
}

/// No-op hook for worlds that only integrate.
impl TickHook for () {
    type State = ();

    fn on_tick(&mut self, _state: &mut (), _bodies: &mut RigidBodySet, _dt: f32) {}
}

/// Closest hit of a [`PhysicsWorld::ray_test`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Position of the hit along the ray, in `[0, 1]` of the cast direction's length.
    pub fraction: f32,
    /// Distance from the ray origin to the hit (meters).
    pub distance: f32,
    /// World-space hit point.
    pub point: Point3<f32>,
    /// Tag of the struck body.
    pub tag: BodyTag,
}

pub struct PhysicsWorld<H: TickHook> {
    integration_parameters: IntegrationParameters,
    narrow_phase: NarrowPhase,
    broad_phase: BroadPhaseBvh,
    islands: IslandManager,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    pipeline: PhysicsPipeline,

    bodies: RigidBodySet,
    colliders: ColliderSet,

    gravity: Vector3<f32>,
    fixed_step: Duration,
    hook: H,
    steps: u64,
}

impl<H: TickHook> PhysicsWorld<H> {
    /// Build an empty world that integrates in increments of `fixed_step`.
    pub fn initialize(gravity: Vector3<f32>, fixed_step: Duration, hook: H) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: fixed_step.as_secs_f32(),
            ..IntegrationParameters::default()
        };
        let narrow_phase = NarrowPhase::new();
        let broad_phase = BroadPhaseBvh::new();
        let islands = IslandManager::new();
        let impulse_joints = ImpulseJointSet::new();
        let multibody_joints = MultibodyJointSet::new();
        let ccd_solver = CCDSolver::new();
        let pipeline = PhysicsPipeline::new();

        info!(
            "physics world initialized: gravity={:?}, step={:?}",
            gravity, fixed_step
        );

        Self {
            integration_parameters,
            narrow_phase,
            broad_phase,
            islands,
            impulse_joints,
            multibody_joints,
            ccd_solver,
            pipeline,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            gravity,
            fixed_step,
            hook,
            steps: 0,
        }
    }

    pub fn fixed_step(&self) -> Duration {
        self.fixed_step
    }

    /// Total number of steps integrated since initialization.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Advance the world by exactly one fixed step.
    ///
    /// Only the accumulator calls this; there is no variable-dt entry point.
    pub(crate) fn step(&mut self, state: &mut H::State) {
        let dt = self.integration_parameters.dt;
        self.hook.on_tick(state, &mut self.bodies, dt);

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );

        self.clear_forces();
        self.steps += 1;
    }

    /// Reset accumulated user forces after a step.
    ///
    /// Only bodies carrying a force are touched, so resting bodies are not marked modified.
    fn clear_forces(&mut self) {
        let pushed: Vec<RigidBodyHandle> = self
            .bodies
            .iter()
            .filter(|(_, rb)| {
                rb.user_force().norm_squared() > 0.0 || rb.user_torque().norm_squared() > 0.0
            })
            .map(|(handle, _)| handle)
            .collect();

        for handle in pushed {
            if let Some(rb) = self.bodies.get_mut(handle) {
                rb.reset_forces(false);
                rb.reset_torques(false);
            }
        }
    }

    /// Insert a body with its single collider. Both carry the packed `tag` as user data.
    pub(crate) fn insert_body(
        &mut self,
        mut body: RigidBody,
        mut collider: Collider,
        tag: BodyTag,
    ) -> (RigidBodyHandle, ColliderHandle) {
        body.user_data = tag.pack();
        collider.user_data = tag.pack();

        let body_handle = self.bodies.insert(body);
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        debug!("inserted body {:?} for {:?}", body_handle, tag);
        (body_handle, collider_handle)
    }

    /// Detach a body and its colliders from the world and release it.
    ///
    /// Returns `false` if the handle was already gone.
    pub(crate) fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        let removed = self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if removed.is_some() {
            debug!("removed body {:?}", handle);
        }
        removed.is_some()
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub(crate) fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Number of rigid bodies currently attached.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Tags of every attached body, decoded.
    pub fn tags(&self) -> impl Iterator<Item = BodyTag> + '_ {
        self.bodies
            .iter()
            .filter_map(|(_, rb)| BodyTag::unpack(rb.user_data))
    }

    /// Closest-hit ray query.
    ///
    /// The ray runs from `origin` to `origin + direction`; the length of `direction` is the
    /// query range and [`RayHit::fraction`] is measured against it. `exclude` skips one body,
    /// typically the caster itself.
    ///
    /// Colliders join the broad phase when the world is stepped, so bodies inserted since the
    /// last step are not visible yet.
    pub fn ray_test(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RayHit> {
        let length = direction.norm();
        if length <= f32::EPSILON {
            return None;
        }

        let mut filter = QueryFilter::default();
        if let Some(handle) = exclude {
            filter = filter.exclude_rigid_body(handle);
        }

        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        );

        let ray = Ray::new(origin, direction);
        let (collider_handle, fraction) = query_pipeline.cast_ray(&ray, 1.0, true)?;

        let body_handle = self.colliders.get(collider_handle)?.parent()?;
        let Some(tag) = self
            .bodies
            .get(body_handle)
            .and_then(|rb| BodyTag::unpack(rb.user_data))
        else {
            warn!("ray hit untagged body {:?}", body_handle);
            return None;
        };

        Some(RayHit {
            fraction,
            distance: fraction * length,
            point: ray.point_at(fraction),
            tag,
        })
    }

    /// Tear the world down, returning the hook.
    ///
    /// Every body must have been removed first; otherwise this fails with
    /// [`SimError::BodiesStillAttached`] and the world is dropped as-is. Structures are released
    /// pipeline first, narrow phase last; the integration parameters are plain data and simply
    /// go out of scope.
    pub fn shutdown(self) -> SimResult<H> {
        if !self.bodies.is_empty() {
            return Err(SimError::BodiesStillAttached(self.bodies.len()));
        }

        let Self {
            narrow_phase,
            broad_phase,
            islands,
            impulse_joints,
            multibody_joints,
            ccd_solver,
            pipeline,
            bodies,
            colliders,
            hook,
            steps,
            ..
        } = self;

        drop(colliders);
        drop(bodies);
        drop(pipeline);
        drop(ccd_solver);
        drop(multibody_joints);
        drop(impulse_joints);
        drop(islands);
        drop(broad_phase);
        drop(narrow_phase);

        info!("physics world shut down after {steps} steps");
        Ok(hook)
    }
}
