use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JsonValue, QueryFilter, QuerySelect,
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::policy::Identified;

pub async fn row_id<E, C>(db: &C, uuid: Uuid) -> Result<Option<i64>, DbErr>
where
    E: Identified,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(E::id_column())
        .filter(E::uuid_column().eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

/// Resolves a stored foreign key back to the uuid it references.
pub async fn uuid_of<E, C>(db: &C, id: i64) -> Result<Uuid, DbErr>
where
    E: Identified,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(E::uuid_column())
        .filter(E::id_column().eq(id))
        .into_tuple()
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("{} {id} not found", E::NAME)))
}

pub async fn optional_uuid_of<E, C>(db: &C, id: Option<i64>) -> Result<Option<Uuid>, DbErr>
where
    E: Identified,
    C: ConnectionTrait,
{
    match id {
        Some(id) => uuid_of::<E, _>(db, id).await.map(Some),
        None => Ok(None),
    }
}

/// Splits a stored id array into uuids and the entries that are not uuids,
/// such as ids carried over from the legacy assignee column. Both keep their
/// stored order.
pub fn split_ids(value: &JsonValue) -> (Vec<Uuid>, Vec<String>) {
    let Some(items) = value.as_array() else {
        tracing::warn!(value = %value, "Expected a JSON array of ids");
        return (Vec::new(), Vec::new());
    };
    let mut uuids = Vec::with_capacity(items.len());
    let mut other = Vec::new();
    for item in items {
        match item.as_str() {
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => uuids.push(id),
                Err(_) => other.push(raw.to_string()),
            },
            None => other.push(item.to_string()),
        }
    }
    (uuids, other)
}

/// Reads a JSON array of member uuids, skipping anything else.
pub fn decode_uuids(value: &JsonValue) -> Vec<Uuid> {
    let (uuids, skipped) = split_ids(value);
    if !skipped.is_empty() {
        tracing::warn!(?skipped, "Skipping non-uuid member ids");
    }
    uuids
}

pub fn encode_uuids(ids: &[Uuid]) -> JsonValue {
    JsonValue::Array(
        ids.iter()
            .map(|id| JsonValue::String(id.to_string()))
            .collect(),
    )
}

/// Distinguishes an absent field from an explicit `null` in update payloads.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{entities::space, fixtures::{named_space, seed_workspace}};

    #[tokio::test]
    async fn row_ids_and_uuids_resolve_both_ways() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let created = named_space(&db, &ctx, "Ops").await;

        let row = row_id::<space::Entity, _>(&db, created.id)
            .await
            .unwrap()
            .expect("space row id");
        assert_eq!(uuid_of::<space::Entity, _>(&db, row).await.unwrap(), created.id);
        assert!(row_id::<space::Entity, _>(&db, Uuid::new_v4()).await.unwrap().is_none());
        assert!(matches!(
            uuid_of::<space::Entity, _>(&db, row + 100).await,
            Err(DbErr::RecordNotFound(_))
        ));
    }

    #[test]
    fn split_keeps_non_uuid_entries_in_order() {
        let id = Uuid::new_v4();
        let (uuids, other) = split_ids(&json!(["legacy-7", id.to_string(), 3, "b"]));
        assert_eq!(uuids, vec![id]);
        assert_eq!(other, vec!["legacy-7", "3", "b"]);
    }

    #[test]
    fn decoding_skips_foreign_entries() {
        let id = Uuid::new_v4();
        let decoded = decode_uuids(&json!([id.to_string(), "legacy-7", 3]));
        assert_eq!(decoded, vec![id]);
        assert!(decode_uuids(&json!({"not": "an array"})).is_empty());
        assert_eq!(decode_uuids(&encode_uuids(&[id])), vec![id]);
    }
}
