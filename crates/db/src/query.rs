//! Paginated listing shared by every workspace resource.
//!
//! [`paginate`] turns a [`ListQuery`] into one filtered, ordered, windowed
//! select plus a count. Workspace scoping and the soft-delete filter are
//! always applied on top of the caller's condition.

use config::{DEFAULT_PAGE_LIMIT, PaginationConfig};
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, IdenStatic, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::policy::SoftDeletable;

/// Listing metadata an entity declares to take part in [`paginate`].
pub trait Listable: SoftDeletable {
    /// Columns matched by the free-text `search` term.
    fn search_columns() -> &'static [Self::Column];
    /// Columns a caller may sort on, matched by their snake_case name.
    fn sortable_columns() -> &'static [Self::Column];
    fn created_at_column() -> Self::Column;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    pub default_limit: u64,
    pub max_limit: Option<u64>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: None,
        }
    }
}

impl From<&PaginationConfig> for PageSettings {
    fn from(config: &PaginationConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }
}

/// Largest page or limit the store can bind as a signed 64-bit integer.
const MAX_BOUND: u64 = i64::MAX as u64;

fn in_bounds(number: &u64) -> bool {
    (1..=MAX_BOUND).contains(number)
}

/// Accepts numbers or numeric strings; anything else (including zero,
/// negatives and values past `i64::MAX`) is treated as absent.
fn lenient_positive<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| match value {
            Value::Number(number) => number.as_u64(),
            Value::String(raw) => raw.trim().parse::<u64>().ok(),
            _ => None,
        })
        .filter(in_bounds))
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct ListQuery {
    #[serde(default, deserialize_with = "lenient_positive")]
    #[ts(type = "number | string | null")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_positive")]
    #[ts(type = "number | string | null")]
    pub limit: Option<u64>,
    #[serde(default)]
    pub search: Option<String>,
    /// Field name, snake_case or camelCase, optionally prefixed with `-`.
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(skip)]
    #[ts(skip)]
    pub settings: PageSettings,
}

impl ListQuery {
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_settings(mut self, settings: PageSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn page_number(&self) -> u64 {
        self.page.filter(in_bounds).unwrap_or(1)
    }

    pub fn page_limit(&self) -> u64 {
        let default_limit = self.settings.default_limit.clamp(1, MAX_BOUND);
        let limit = self.limit.filter(in_bounds).unwrap_or(default_limit);
        match self.settings.max_limit {
            Some(max) if max > 0 => Ord::min(limit, max),
            _ => limit,
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// The requested sort field in snake_case and its direction.
    pub fn sort_field(&self) -> Option<(String, Order)> {
        let raw = self.sort.as_deref()?.trim();
        let (field, order) = match raw.strip_prefix('-') {
            Some(field) => (field.trim(), Order::Desc),
            None => (raw, Order::Asc),
        };
        if field.is_empty() {
            return None;
        }
        Some((snake_case(field), order))
    }
}

fn snake_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<u64>,
    pub prev_page: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(docs: Vec<T>, total_docs: u64, page: u64, limit: u64) -> Self {
        let limit = Ord::max(limit, 1);
        let page = Ord::max(page, 1);
        let total_pages = total_docs.div_ceil(limit);
        let has_next_page = page < total_pages;
        let has_prev_page = page > 1;
        Self {
            docs,
            total_docs,
            page,
            limit,
            total_pages,
            has_next_page,
            has_prev_page,
            next_page: has_next_page.then_some(page + 1),
            prev_page: has_prev_page.then_some(page - 1),
        }
    }

    /// Same page metadata over converted documents.
    pub fn with_docs<U>(self, docs: Vec<U>) -> Page<U> {
        Page {
            docs,
            total_docs: self.total_docs,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
            next_page: self.next_page,
            prev_page: self.prev_page,
        }
    }
}

fn sort_order<E: Listable>(query: &ListQuery) -> (E::Column, Order) {
    query
        .sort_field()
        .and_then(|(field, order)| {
            E::sortable_columns()
                .iter()
                .find(|column| column.as_str() == field)
                .map(|column| (*column, order))
        })
        .unwrap_or((E::created_at_column(), Order::Desc))
}

/// Lists live rows of `workspace_id` that match `filter` and `query`.
pub async fn paginate<E, C>(
    db: &C,
    workspace_id: i64,
    filter: Condition,
    query: &ListQuery,
) -> Result<Page<E::Model>, DbErr>
where
    E: Listable,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let page = query.page_number();
    let limit = query.page_limit();

    let mut condition = Condition::all()
        .add(filter)
        .add(E::workspace_column().eq(workspace_id))
        .add(E::deleted_column().eq(false));

    if let Some(term) = query.search_term() {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let mut any = Condition::any();
        for column in E::search_columns() {
            any = any.add(
                Expr::expr(Func::lower(Expr::col(*column)))
                    .like(LikeExpr::new(pattern.as_str()).escape('\\')),
            );
        }
        condition = condition.add(any);
    }

    let (sort_column, order) = sort_order::<E>(query);
    let select = E::find()
        .filter(condition)
        .order_by(sort_column, order.clone())
        .order_by(E::id_column(), order);

    let total_docs = select.clone().count(db).await?;
    let offset = (page - 1).checked_mul(limit).filter(|offset| *offset < total_docs);
    let docs = match offset {
        Some(offset) => select.offset(offset).limit(limit).all(db).await?,
        None => Vec::new(),
    };

    Ok(Page::new(docs, total_docs, page, limit))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        entities::space,
        fixtures::{seed_workspace, spaces},
    };

    #[test]
    fn page_metadata_follows_counts() {
        let page = Page::new(vec![(); 5], 15, 2, 10);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next_page);
        assert!(page.has_prev_page);
        assert_eq!(page.next_page, None);
        assert_eq!(page.prev_page, Some(1));

        let empty = Page::<()>::new(Vec::new(), 0, 1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_prev_page);
    }

    #[test]
    fn page_serializes_with_camel_case_fields_and_nulls() {
        let value = serde_json::to_value(Page::new(vec![1, 2], 2, 1, 10)).unwrap();
        assert_eq!(
            value,
            json!({
                "docs": [1, 2],
                "totalDocs": 2,
                "page": 1,
                "limit": 10,
                "totalPages": 1,
                "hasNextPage": false,
                "hasPrevPage": false,
                "nextPage": null,
                "prevPage": null
            })
        );
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let query: ListQuery =
            serde_json::from_value(json!({ "page": "abc", "limit": -4 })).unwrap();
        assert_eq!(query.page_number(), 1);
        assert_eq!(query.page_limit(), DEFAULT_PAGE_LIMIT);

        let query: ListQuery = serde_json::from_value(json!({ "page": "3", "limit": 0 })).unwrap();
        assert_eq!(query.page_number(), 3);
        assert_eq!(query.page_limit(), DEFAULT_PAGE_LIMIT);

        let query: ListQuery = serde_json::from_value(json!({ "page": [1], "limit": {} })).unwrap();
        assert_eq!(query.page_number(), 1);
    }

    #[test]
    fn max_limit_caps_requested_limit() {
        let query = ListQuery::default()
            .with_limit(500)
            .with_settings(PageSettings {
                default_limit: 10,
                max_limit: Some(100),
            });
        assert_eq!(query.page_limit(), 100);
    }

    #[test]
    fn out_of_range_numbers_fall_back_to_defaults() {
        let query: ListQuery = serde_json::from_value(json!({
            "page": "18446744073709551615",
            "limit": 9_223_372_036_854_775_808_u64
        }))
        .unwrap();
        assert_eq!(query.page_number(), 1);
        assert_eq!(query.page_limit(), DEFAULT_PAGE_LIMIT);

        let query = ListQuery::default().with_page(u64::MAX).with_limit(u64::MAX);
        assert_eq!(query.page_number(), 1);
        assert_eq!(query.page_limit(), DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn sort_accepts_camel_and_snake_case() {
        let query = ListQuery::default().with_sort("-createdAt");
        assert_eq!(query.sort_field(), Some(("created_at".to_string(), Order::Desc)));
        let query = ListQuery::default().with_sort("updated_at");
        assert_eq!(query.sort_field(), Some(("updated_at".to_string(), Order::Asc)));
        assert_eq!(ListQuery::default().with_sort(" - ").sort_field(), None);
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }

    #[tokio::test]
    async fn fifteen_rows_split_into_two_pages() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        spaces(&db, &ctx, 15).await;

        let query = ListQuery::default().with_page(2).with_limit(10);
        let page = paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
            .await
            .unwrap();
        assert_eq!(page.docs.len(), 5);
        assert_eq!(page.total_docs, 15);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next_page);
        assert!(page.has_prev_page);
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        spaces(&db, &ctx, 3).await;

        let largest = i64::MAX as u64;
        for query in [
            ListQuery::default().with_page(largest).with_limit(largest),
            ListQuery::default().with_page(largest).with_limit(2),
            ListQuery::default().with_page(3).with_limit(2),
        ] {
            let page =
                paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
                    .await
                    .unwrap();
            assert!(page.docs.is_empty());
            assert_eq!(page.total_docs, 3);
            assert!(!page.has_next_page);
            assert!(page.has_prev_page);
        }

        let query = ListQuery::default().with_limit(largest);
        let page = paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
            .await
            .unwrap();
        assert_eq!(page.docs.len(), 3);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn pages_cover_every_row_once() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        spaces(&db, &ctx, 23).await;

        let mut seen = Vec::new();
        let mut page_number = 1;
        loop {
            let query = ListQuery::default()
                .with_page(page_number)
                .with_limit(4)
                .with_sort("name");
            let page =
                paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
                    .await
                    .unwrap();
            assert_eq!(page.total_pages, 23_u64.div_ceil(4));
            seen.extend(page.docs.into_iter().map(|doc| doc.id));
            if !page.has_next_page {
                break;
            }
            page_number += 1;
        }
        assert_eq!(seen.len(), 23);
        let mut unique = seen.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 23);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        crate::fixtures::named_space(&db, &ctx, "Marketing").await;
        crate::fixtures::named_space(&db, &ctx, "100% Growth").await;
        crate::fixtures::named_space(&db, &ctx, "Engineering").await;

        let query = ListQuery::default().with_search("  MARKET ");
        let page = paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
            .await
            .unwrap();
        assert_eq!(page.total_docs, 1);
        assert_eq!(page.docs[0].name, "Marketing");

        let query = ListQuery::default().with_search("%");
        let page = paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
            .await
            .unwrap();
        assert_eq!(page.total_docs, 1);
        assert_eq!(page.docs[0].name, "100% Growth");

        let query = ListQuery::default().with_search("   ");
        let page = paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
            .await
            .unwrap();
        assert_eq!(page.total_docs, 3);
    }

    #[tokio::test]
    async fn unknown_sort_falls_back_to_newest_first() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        spaces(&db, &ctx, 3).await;

        let query = ListQuery::default().with_sort("favouriteColour");
        let page = paginate::<space::Entity, _>(&db, ctx.workspace_row_id, Condition::all(), &query)
            .await
            .unwrap();
        let ids: Vec<i64> = page.docs.iter().map(|doc| doc.id).collect();
        let mut expected = ids.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn deleted_and_foreign_rows_are_never_listed() {
        let db = test_support::memory_db().await;
        let ctx = seed_workspace(&db).await;
        let other = seed_workspace(&db).await;
        spaces(&db, &ctx, 2).await;
        spaces(&db, &other, 4).await;
        let trashed = crate::fixtures::named_space(&db, &ctx, "Old").await;
        crate::models::space::Space::trash(&db, ctx.workspace_id, trashed.id)
            .await
            .unwrap();

        // A caller filter cannot widen the scope back out.
        let filter = Condition::any()
            .add(space::Column::IsDeleted.eq(true))
            .add(space::Column::WorkspaceId.eq(other.workspace_row_id));
        let page = paginate::<space::Entity, _>(
            &db,
            ctx.workspace_row_id,
            Condition::all().add(filter),
            &ListQuery::default(),
        )
        .await
        .unwrap();
        assert_eq!(page.total_docs, 0);

        let page = paginate::<space::Entity, _>(
            &db,
            ctx.workspace_row_id,
            Condition::all(),
            &ListQuery::default(),
        )
        .await
        .unwrap();
        assert_eq!(page.total_docs, 2);
    }
}
