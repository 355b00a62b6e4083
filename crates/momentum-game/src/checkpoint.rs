//! Ordered respawn checkpoints

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Vec3,
    pub reached: bool,
}

/// Checkpoints in level order. The respawn point only ever moves forward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointTrack {
    checkpoints: Vec<Checkpoint>,
    index: usize,
}

impl CheckpointTrack {
    pub fn new(positions: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            checkpoints: positions
                .into_iter()
                .map(|position| Checkpoint {
                    position,
                    reached: false,
                })
                .collect(),
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Mark checkpoint `i` reached. Advances the respawn point by one the
    /// first time each checkpoint is reached.
    pub fn reach(&mut self, i: usize) -> bool {
        let Some(checkpoint) = self.checkpoints.get_mut(i) else {
            warn!(index = i, "unknown checkpoint");
            return false;
        };
        if checkpoint.reached {
            return false;
        }
        checkpoint.reached = true;
        self.index = (self.index + 1).min(self.checkpoints.len() - 1);
        debug!(index = self.index, "checkpoint reached");
        true
    }

    /// Where to respawn, if there is anywhere
    pub fn respawn_point(&self) -> Option<Vec3> {
        self.checkpoints.get(self.index).map(|c| c.position)
    }
}
