use crate::utils::error::{EnrollError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Trims `value` and rejects it when nothing is left.
pub fn required_text(field_name: &str, value: &str) -> Result<String> {
    validate_non_empty_string(field_name, value)?;
    Ok(value.trim().to_string())
}

/// Trims an optional value; blank input collapses to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EnrollError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(EnrollError::validation(
            field_name,
            format!("Value must be at least {}, got {}", min_value, value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("name", "  Ana  ").unwrap(), "Ana");
        assert!(required_text("name", "   ").is_err());
        assert!(required_text("name", "").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(" a@b.edu ")), Some("a@b.edu".to_string()));
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("total_seats", 25, 1).is_ok());
        assert!(validate_positive_number("total_seats", 0, 1).is_err());
    }
}
