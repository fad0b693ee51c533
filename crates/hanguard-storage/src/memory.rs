//! In-memory rights store.
//!
//! Backs the gateway tests and suits small deployments where the door,
//! member and grant tables are short enough to declare in code or load from
//! a file at startup. Lookups never fail, mirroring the immutable-snapshot
//! model the gateway assumes.

use std::collections::{HashMap, HashSet};

use hanguard_core::{ChipId, DoorId, MemberId};

use crate::error::StorageResult;
use crate::models::{Door, Member};
use crate::repository::AccessRepository;

/// In-memory implementation of [`AccessRepository`].
#[derive(Debug, Default, Clone)]
pub struct MemoryAccessRepository {
    doors: HashMap<DoorId, Door>,
    members: HashMap<MemberId, Member>,
    chips: HashMap<ChipId, MemberId>,
    grants: HashSet<(MemberId, DoorId)>,
}

impl MemoryAccessRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a door, replacing any previous door with the same id.
    pub fn add_door(&mut self, door: Door) -> &mut Self {
        self.doors.insert(door.id, door);
        self
    }

    /// Add a member, replacing any previous member with the same id.
    pub fn add_member(&mut self, member: Member) -> &mut Self {
        self.members.insert(member.id, member);
        self
    }

    /// Map a chip to a member. Several chips may map to the same member.
    pub fn add_chip(&mut self, chip_id: ChipId, member_id: MemberId) -> &mut Self {
        self.chips.insert(chip_id, member_id);
        self
    }

    /// Authorize a member for a door.
    pub fn add_grant(&mut self, member_id: MemberId, door_id: DoorId) -> &mut Self {
        self.grants.insert((member_id, door_id));
        self
    }
}

impl AccessRepository for MemoryAccessRepository {
    async fn get_door(&self, door_id: DoorId) -> StorageResult<Option<Door>> {
        Ok(self.doors.get(&door_id).cloned())
    }

    async fn get_member_by_chip(&self, chip_id: &ChipId) -> StorageResult<Option<Member>> {
        Ok(self
            .chips
            .get(chip_id)
            .and_then(|member_id| self.members.get(member_id))
            .cloned())
    }

    async fn has_grant(&self, member_id: MemberId, door_id: DoorId) -> StorageResult<bool> {
        Ok(self.grants.contains(&(member_id, door_id)))
    }

    async fn list_doors(&self) -> StorageResult<Vec<Door>> {
        let mut doors: Vec<Door> = self.doors.values().cloned().collect();
        doors.sort_by_key(|d| d.id.as_u8());
        Ok(doors)
    }
}
