#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::{Door, Member};
use hanguard_core::{ChipId, DoorId, MemberId};
use sqlx::SqlitePool;

/// Lookup interface the decision engine consumes.
///
/// Implementations are expected to be cheap or cached; the gateway does not
/// retry or back off around them — any error surfaces as a deny.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate.
pub trait AccessRepository: Send + Sync {
    /// Look up a door by its bus id.
    async fn get_door(&self, door_id: DoorId) -> StorageResult<Option<Door>>;

    /// Resolve the member carrying the given chip, if any.
    async fn get_member_by_chip(&self, chip_id: &ChipId) -> StorageResult<Option<Member>>;

    /// Whether the member is authorized for the door.
    async fn has_grant(&self, member_id: MemberId, door_id: DoorId) -> StorageResult<bool>;

    /// All doors, used once at startup to build the door directory.
    async fn list_doors(&self) -> StorageResult<Vec<Door>>;
}

#[derive(sqlx::FromRow)]
struct DoorRow {
    door_id: i64,
    name: String,
}

impl DoorRow {
    fn into_door(self) -> StorageResult<Door> {
        let id = u8::try_from(self.door_id)
            .ok()
            .and_then(|v| DoorId::new(v).ok())
            .ok_or_else(|| {
                StorageError::InvalidRecord(format!(
                    "door id {} outside the 4-bit wire range",
                    self.door_id
                ))
            })?;
        Ok(Door {
            id,
            name: self.name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    member_id: i64,
    name: String,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: MemberId::new(row.member_id),
            name: row.name,
        }
    }
}

/// SQLite implementation of [`AccessRepository`].
pub struct SqliteAccessRepository {
    pool: SqlitePool,
}

impl SqliteAccessRepository {
    /// Create a new SQLite access repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AccessRepository for SqliteAccessRepository {
    async fn get_door(&self, door_id: DoorId) -> StorageResult<Option<Door>> {
        let row = sqlx::query_as::<_, DoorRow>(
            r#"
            SELECT door_id, name
            FROM doors
            WHERE door_id = ?
            "#,
        )
        .bind(i64::from(door_id.as_u8()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(DoorRow::into_door).transpose()
    }

    async fn get_member_by_chip(&self, chip_id: &ChipId) -> StorageResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT m.member_id, m.name
            FROM members m
            JOIN chips c ON c.member_id = m.member_id
            WHERE c.chip_id = ?
            "#,
        )
        .bind(chip_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Member::from))
    }

    async fn has_grant(&self, member_id: MemberId, door_id: DoorId) -> StorageResult<bool> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM grants
            WHERE member_id = ? AND door_id = ?
            "#,
        )
        .bind(member_id.as_i64())
        .bind(i64::from(door_id.as_u8()))
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0 > 0)
    }

    async fn list_doors(&self) -> StorageResult<Vec<Door>> {
        let rows = sqlx::query_as::<_, DoorRow>(
            r#"
            SELECT door_id, name
            FROM doors
            ORDER BY door_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DoorRow::into_door).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;

    async fn seeded_db() -> Database {
        let db = Database::in_memory().await.unwrap();

        sqlx::raw_sql(
            r#"
            INSERT INTO doors (door_id, name) VALUES (5, 'Hangar West'), (6, 'Hangar East');
            INSERT INTO members (member_id, name) VALUES (42, 'Erika Muster');
            INSERT INTO chips (chip_id, member_id) VALUES ('0490AF22', 42), ('AA11BB22', 42);
            INSERT INTO grants (member_id, door_id) VALUES (42, 5);
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        db
    }

    #[tokio::test]
    async fn test_get_door() {
        let db = seeded_db().await;
        let repo = SqliteAccessRepository::new(db.pool().clone());

        let door = repo.get_door(DoorId::new(5).unwrap()).await.unwrap();
        assert_eq!(door.unwrap().name, "Hangar West");

        let missing = repo.get_door(DoorId::new(9).unwrap()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_any_chip_resolves_the_member() {
        let db = seeded_db().await;
        let repo = SqliteAccessRepository::new(db.pool().clone());

        for chip in ["0490AF22", "AA11BB22"] {
            let chip = ChipId::new(chip).unwrap();
            let member = repo.get_member_by_chip(&chip).await.unwrap().unwrap();
            assert_eq!(member.id.as_i64(), 42);
            assert_eq!(member.name, "Erika Muster");
        }
    }

    #[tokio::test]
    async fn test_unknown_chip_is_none() {
        let db = seeded_db().await;
        let repo = SqliteAccessRepository::new(db.pool().clone());

        let chip = ChipId::new("FFFFFFFF").unwrap();
        assert!(repo.get_member_by_chip(&chip).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_has_grant() {
        let db = seeded_db().await;
        let repo = SqliteAccessRepository::new(db.pool().clone());
        let member = MemberId::new(42);

        assert!(
            repo.has_grant(member, DoorId::new(5).unwrap())
                .await
                .unwrap()
        );
        assert!(
            !repo
                .has_grant(member, DoorId::new(6).unwrap())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_doors_ordered() {
        let db = seeded_db().await;
        let repo = SqliteAccessRepository::new(db.pool().clone());

        let doors = repo.list_doors().await.unwrap();
        assert_eq!(doors.len(), 2);
        assert_eq!(doors[0].id.as_u8(), 5);
        assert_eq!(doors[1].id.as_u8(), 6);
    }
}
