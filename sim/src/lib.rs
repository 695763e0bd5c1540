pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod controller;
pub mod entity;
pub mod error;
pub mod ground;
pub mod input;
pub mod registry;
pub mod shape;
pub mod simulation;
pub mod tag;
pub mod world;

pub use camera::CameraRig;
pub use clock::{FrameSteps, SimulationClock};
pub use config::{ControllerTuning, GroundProbe, ProjectileTuning, SimConfig};
pub use controller::{ForceTarget, PlayerController, TickState};
pub use entity::{Entity, EntityDesc, MeshLibrary, Rgba, Shader, SpawnTransform};
pub use error::{SimError, SimResult};
pub use ground::{is_grounded, probe_ground};
pub use input::InputState;
pub use registry::EntityRegistry;
pub use shape::{MeshKind, collider_for};
pub use simulation::{FrameReport, Simulation};
pub use tag::{BodyKind, BodyTag, EntityId, PackedTag};
pub use world::{PhysicsWorld, RayHit, TickHook};
