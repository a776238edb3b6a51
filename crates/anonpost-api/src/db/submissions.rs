//! Submission ledger persistence.
//!
//! All functions take a `&PgPool` and operate on the `submissions` table.
//! The `fingerprint` column carries a unique constraint; that constraint,
//! not application code, is what makes a commit happen once.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use anonpost_core::{
    GroupId, GroupType, NewSubmissionRecord, PropId, ProofFingerprint, SubmissionId,
    SubmissionRecord,
};

use super::{from_db, to_db};

/// Insert the record unless its fingerprint is already committed, then
/// read back whichever row holds the fingerprint.
///
/// Returns the stored record and whether this call inserted it.
pub async fn insert_or_get(
    pool: &PgPool,
    new: NewSubmissionRecord,
) -> Result<(SubmissionRecord, bool), sqlx::Error> {
    let fingerprint = new.fingerprint.to_hex();
    let result = sqlx::query(
        "INSERT INTO submissions (id, fingerprint, artifact_address, comment_msg,
         group_id, prop_id, group_type, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (fingerprint) DO NOTHING",
    )
    .bind(*SubmissionId::new().as_uuid())
    .bind(&fingerprint)
    .bind(&new.artifact_address)
    .bind(&new.comment_msg)
    .bind(new.group_id.value())
    .bind(to_db(new.prop_id.value())?)
    .bind(to_db(new.group_type.value())?)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    let created = result.rows_affected() > 0;

    let record = fetch(pool, &fingerprint)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok((record, created))
}

/// Fetch a record by fingerprint.
pub async fn find_by_fingerprint(
    pool: &PgPool,
    fingerprint: &ProofFingerprint,
) -> Result<Option<SubmissionRecord>, sqlx::Error> {
    fetch(pool, &fingerprint.to_hex()).await
}

async fn fetch(pool: &PgPool, fingerprint: &str) -> Result<Option<SubmissionRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, SubmissionRow>(
        "SELECT id, fingerprint, artifact_address, comment_msg,
         group_id, prop_id, group_type, created_at
         FROM submissions WHERE fingerprint = $1",
    )
    .bind(fingerprint)
    .fetch_optional(pool)
    .await?;

    row.map(SubmissionRow::into_record).transpose()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    fingerprint: String,
    artifact_address: String,
    comment_msg: String,
    group_id: i64,
    prop_id: i64,
    group_type: i64,
    created_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_record(self) -> Result<SubmissionRecord, sqlx::Error> {
        Ok(SubmissionRecord {
            id: SubmissionId::from_uuid(self.id),
            fingerprint: ProofFingerprint::from_hex(&self.fingerprint)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            artifact_address: self.artifact_address,
            comment_msg: self.comment_msg,
            group_id: GroupId::new(self.group_id),
            prop_id: PropId::new(from_db(self.prop_id)?),
            group_type: GroupType::new(from_db(self.group_type)?),
            created_at: self.created_at,
        })
    }
}
