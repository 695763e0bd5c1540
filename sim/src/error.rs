use thiserror::Error;

use crate::{EntityId, MeshKind};

/// Errors surfaced by the simulation core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A mesh kind required by the scene has no loaded handle.
    #[error("no mesh loaded for {0:?}")]
    MissingMesh(MeshKind),

    /// The entity id does not name a live entity.
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),

    /// The world was asked to shut down while rigid bodies were still attached.
    #[error("cannot shut down physics world: {0} rigid bodies still attached")]
    BodiesStillAttached(usize),
}

pub type SimResult<T> = Result<T, SimError>;
