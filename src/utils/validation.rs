use validator::ValidationError;

/// Phone numbers are digits and hyphens only.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !phone.is_empty() && phone.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Ok(());
    }
    let mut err = ValidationError::new("phone");
    err.message = Some("phone must contain only digits and hyphens".into());
    Err(err)
}

/// Treats blank text as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
