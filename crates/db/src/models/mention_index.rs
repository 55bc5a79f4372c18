use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, OnConflict, Query, SelectStatement};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::member::Member;
use crate::{
    entities::{member, mention_index},
    types::MentionSource,
};

/// Members mentioned by one document, resolved against the workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMentions {
    /// Member uuids, sorted.
    pub member_ids: Vec<Uuid>,
    pub member_row_ids: Vec<i64>,
}

pub struct MentionIndex;

impl MentionIndex {
    /// Extracts mentions from `body` and keeps those naming current members
    /// of the workspace. Unknown, removed or foreign ids are dropped.
    pub async fn resolve<C: ConnectionTrait>(
        db: &C,
        workspace_row_id: i64,
        body: Option<&str>,
    ) -> Result<ResolvedMentions, DbErr> {
        let Some(body) = body else {
            return Ok(ResolvedMentions::default());
        };
        let candidates: Vec<Uuid> = rich_text::extract_mentions(body)
            .iter()
            .filter_map(|raw| Uuid::parse_str(raw).ok())
            .collect();

        let members: Vec<member::Model> =
            Member::current_members(db, workspace_row_id, &candidates).await?;
        let mut resolved: Vec<(Uuid, i64)> =
            members.into_iter().map(|model| (model.uuid, model.id)).collect();
        resolved.sort();

        if resolved.len() < candidates.len() {
            tracing::debug!(
                extracted = candidates.len(),
                kept = resolved.len(),
                "Dropped mentions of non-members"
            );
        }

        Ok(ResolvedMentions {
            member_ids: resolved.iter().map(|(uuid, _)| *uuid).collect(),
            member_row_ids: resolved.iter().map(|(_, id)| *id).collect(),
        })
    }

    /// Replaces the index rows of one document. Run inside the transaction
    /// that writes the document body.
    pub async fn replace<C: ConnectionTrait>(
        db: &C,
        workspace_row_id: i64,
        source: MentionSource,
        source_id: i64,
        member_row_ids: &[i64],
    ) -> Result<(), DbErr> {
        mention_index::Entity::delete_many()
            .filter(mention_index::Column::SourceType.eq(source))
            .filter(mention_index::Column::SourceId.eq(source_id))
            .exec(db)
            .await?;

        if member_row_ids.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows = member_row_ids
            .iter()
            .map(|member_id| mention_index::ActiveModel {
                workspace_id: Set(workspace_row_id),
                source_type: Set(source),
                source_id: Set(source_id),
                member_id: Set(*member_id),
                created_at: Set(now),
                ..Default::default()
            });
        mention_index::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    mention_index::Column::SourceType,
                    mention_index::Column::SourceId,
                    mention_index::Column::MemberId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// Source row ids of documents of `source` that mention `member_row_id`,
    /// for use with `in_subquery`.
    pub fn sources_mentioning(source: MentionSource, member_row_id: i64) -> SelectStatement {
        Query::select()
            .column(mention_index::Column::SourceId)
            .from(mention_index::Entity)
            .and_where(Expr::col(mention_index::Column::SourceType).eq(source))
            .and_where(Expr::col(mention_index::Column::MemberId).eq(member_row_id))
            .to_owned()
    }

    pub async fn indexed_members<C: ConnectionTrait>(
        db: &C,
        source: MentionSource,
        source_id: i64,
    ) -> Result<Vec<i64>, DbErr> {
        let mut ids: Vec<i64> = mention_index::Entity::find()
            .filter(mention_index::Column::SourceType.eq(source))
            .filter(mention_index::Column::SourceId.eq(source_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.member_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
