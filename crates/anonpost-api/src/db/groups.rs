//! Group registry persistence.
//!
//! All functions take a `&PgPool` and operate on the `groups` table.

use sqlx::PgPool;

use anonpost_core::{Group, GroupId, GroupType, MerkleRoot, PropId};

use super::{from_db, to_db};

/// Insert a group unless one exists for its `(prop_id, type_id)`.
/// Returns whether a row was written.
pub async fn insert(pool: &PgPool, group: &Group) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO groups (id, prop_id, type_id, root)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (prop_id, type_id) DO NOTHING",
    )
    .bind(group.id.value())
    .bind(to_db(group.prop_id.value())?)
    .bind(to_db(group.type_id.value())?)
    .bind(group.root.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch the group published for `(prop_id, group_type)`.
pub async fn find(
    pool: &PgPool,
    prop_id: PropId,
    group_type: GroupType,
) -> Result<Option<Group>, sqlx::Error> {
    // Pairs outside the column range cannot have been stored.
    let (Ok(prop_id), Ok(type_id)) = (
        i64::try_from(prop_id.value()),
        i64::try_from(group_type.value()),
    ) else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, GroupRow>(
        "SELECT id, prop_id, type_id, root FROM groups
         WHERE prop_id = $1 AND type_id = $2",
    )
    .bind(prop_id)
    .bind(type_id)
    .fetch_optional(pool)
    .await?;

    row.map(GroupRow::into_group).transpose()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    prop_id: i64,
    type_id: i64,
    root: String,
}

impl GroupRow {
    fn into_group(self) -> Result<Group, sqlx::Error> {
        Ok(Group {
            id: GroupId::new(self.id),
            prop_id: PropId::new(from_db(self.prop_id)?),
            type_id: GroupType::new(from_db(self.type_id)?),
            root: MerkleRoot::new(self.root).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        })
    }
}
