//! Physics error types

use rapier3d::prelude::RigidBodyHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("no character body has been spawned")]
    NoCharacter,

    #[error("rigid body {0:?} is not in the world")]
    MissingBody(RigidBodyHandle),
}
