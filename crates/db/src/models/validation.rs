use super::error::DomainError;

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trims optional free text, mapping blank values to `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Accepts `#rgb` and `#rrggbb` hex colors.
pub(crate) fn color(value: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(value) = optional_text(value) else {
        return Ok(None);
    };
    let valid = value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(DomainError::validation(
            "color",
            format!("{value:?} is not a #rgb or #rrggbb color"),
        ));
    }
    Ok(Some(value.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_accept_short_and_long_hex() {
        assert_eq!(color(Some("#ABC")).unwrap().as_deref(), Some("#abc"));
        assert_eq!(color(Some(" #00ff7f ")).unwrap().as_deref(), Some("#00ff7f"));
        assert_eq!(color(Some("  ")).unwrap(), None);
        assert!(color(Some("00ff7f")).is_err());
        assert!(color(Some("#12345")).is_err());
        assert!(color(Some("#ggg")).is_err());
    }

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(required_text("name", "  Roadmap ").unwrap(), "Roadmap");
        assert!(matches!(
            required_text("name", " \t"),
            Err(DomainError::ValidationFailed { field: "name", .. })
        ));
    }
}
