//! Fail-closed access decision engine.
//!
//! Given a chip id and a door id, resolves a grant/deny outcome against the
//! cached door directory and the repository.
//!
//! # Decision Flow
//!
//! 1. **Door lookup**: unknown door id -> `UnknownDoor` (the caller still
//!    answers the door unit with a deny, since it expects a reply)
//! 2. **Member lookup**: no member carries the chip -> `UnknownMember`
//! 3. **Grant lookup**: relation present -> `Granted`, absent -> `Denied`
//!
//! Any repository error at steps 2 or 3 is logged and treated exactly like
//! `Denied`: a lookup failure must never grant access.

use hanguard_core::{ChipId, DoorId};
use tracing::{debug, error, warn};

use crate::directory::DoorDirectory;
use crate::repository::AccessRepository;

/// Outcome of an access decision.
///
/// Everything except `Granted` answers the door with a deny; the variants
/// exist to let the dispatcher log the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Open the door for this many seconds.
    Granted { allow_secs: u8 },

    /// Member known, no grant for this door (or a failed lookup).
    Denied,

    /// Door id not present in the directory snapshot.
    UnknownDoor,

    /// No member carries the presented chip.
    UnknownMember,
}

impl AccessOutcome {
    #[must_use]
    pub fn is_grant(&self) -> bool {
        matches!(self, AccessOutcome::Granted { .. })
    }
}

/// Resolves open requests against the rights store.
pub struct DecisionEngine<R> {
    repo: R,
    doors: DoorDirectory,
    allow_secs: u8,
}

impl<R: AccessRepository> DecisionEngine<R> {
    /// Create an engine granting `allow_secs` of open time on success.
    pub fn new(repo: R, doors: DoorDirectory, allow_secs: u8) -> Self {
        Self {
            repo,
            doors,
            allow_secs,
        }
    }

    /// The door directory snapshot this engine decides against.
    pub fn doors(&self) -> &DoorDirectory {
        &self.doors
    }

    /// Decide whether the chip may open the door. Fail-closed throughout.
    pub async fn decide(&self, chip_id: &ChipId, door_id: DoorId) -> AccessOutcome {
        let Some(door) = self.doors.get(door_id) else {
            error!(
                %door_id,
                "open request from unknown door; update the store and restart"
            );
            return AccessOutcome::UnknownDoor;
        };

        let member = match self.repo.get_member_by_chip(chip_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                debug!(%chip_id, door = %door, "no member for chip");
                return AccessOutcome::UnknownMember;
            }
            Err(e) => {
                error!(%chip_id, error = %e, "member lookup failed, denying");
                return AccessOutcome::Denied;
            }
        };

        debug!(member = %member, door = %door, "open request");

        match self.repo.has_grant(member.id, door_id).await {
            Ok(true) => AccessOutcome::Granted {
                allow_secs: self.allow_secs,
            },
            Ok(false) => {
                warn!(member = %member, door = %door, "no grant, denying");
                AccessOutcome::Denied
            }
            Err(e) => {
                error!(member = %member, error = %e, "grant lookup failed, denying");
                AccessOutcome::Denied
            }
        }
    }
}
