//! Startup cache of the door table.

use std::collections::HashMap;

use hanguard_core::DoorId;
use tracing::info;

use crate::error::StorageResult;
use crate::models::Door;
use crate::repository::AccessRepository;

/// Immutable snapshot of the door table.
///
/// Built once from [`AccessRepository::list_doors`] at process start and
/// handed to the dispatcher read-only; the store does not support hot
/// reload, so an added door requires a gateway restart.
#[derive(Debug, Clone, Default)]
pub struct DoorDirectory {
    doors: HashMap<DoorId, Door>,
}

impl DoorDirectory {
    /// Load the snapshot from the repository.
    pub async fn load<R: AccessRepository>(repo: &R) -> StorageResult<Self> {
        let doors = repo.list_doors().await?;
        info!(count = doors.len(), "loaded door directory");
        Ok(Self::from_doors(doors))
    }

    /// Build a directory from an explicit door list.
    #[must_use]
    pub fn from_doors(doors: Vec<Door>) -> Self {
        Self {
            doors: doors.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, door_id: DoorId) -> Option<&Door> {
        self.doors.get(&door_id)
    }

    #[must_use]
    pub fn contains(&self, door_id: DoorId) -> bool {
        self.doors.contains_key(&door_id)
    }

    /// Door name for log output, falling back to the raw id.
    #[must_use]
    pub fn display_name(&self, door_id: DoorId) -> String {
        match self.get(door_id) {
            Some(door) => door.to_string(),
            None => format!("unknown door {door_id}"),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }
}
