//! Conversions between the historical comma-joined `tasks.assignees` text
//! column and the `tasks.assignee_ids` JSON array.

use sea_orm_migration::prelude::DbErr;

pub const DELIMITER: char = ',';

/// Splits a legacy value into member ids. Segments are trimmed and empty
/// segments dropped, so `None`, `""` and `" , "` all yield an empty list.
pub fn split_legacy(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(DELIMITER)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Joins member ids back into the legacy representation. An empty list maps
/// to `NULL`.
pub fn join_legacy(ids: &[String]) -> Result<Option<String>, DbErr> {
    if let Some(bad) = ids.iter().find(|id| id.contains(DELIMITER)) {
        return Err(DbErr::Migration(format!(
            "assignee id {bad:?} contains '{DELIMITER}' and cannot be stored in the legacy column"
        )));
    }
    let kept: Vec<&str> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect();
    if kept.is_empty() {
        Ok(None)
    } else {
        Ok(Some(kept.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn splits_comma_joined_values() {
        assert_eq!(split_legacy(Some("a,b,c")), ids(&["a", "b", "c"]));
        assert_eq!(split_legacy(Some(" a , ,b,")), ids(&["a", "b"]));
    }

    #[test]
    fn empty_and_null_become_empty_arrays() {
        assert!(split_legacy(None).is_empty());
        assert!(split_legacy(Some("")).is_empty());
        assert!(split_legacy(Some(" ,  ,")).is_empty());
    }

    #[test]
    fn joins_arrays_and_maps_empty_to_null() {
        assert_eq!(
            join_legacy(&ids(&["a", "b", "c"])).unwrap(),
            Some("a,b,c".to_string())
        );
        assert_eq!(join_legacy(&[]).unwrap(), None);
    }

    #[test]
    fn ids_containing_the_delimiter_are_fatal() {
        let err = join_legacy(&ids(&["a", "b,c"])).unwrap_err();
        assert!(matches!(err, DbErr::Migration(message) if message.contains("b,c")));
    }
}
