//! Entities of the rights store.

use hanguard_core::{DoorId, MemberId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A door on the bus.
///
/// Owned by the repository and cached read-only in the
/// [`DoorDirectory`](crate::DoorDirectory) for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub name: String,
}

impl fmt::Display for Door {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A member of the organization.
///
/// A member may carry several physical chips; the chip -> member mapping
/// lives in the repository, not on this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
