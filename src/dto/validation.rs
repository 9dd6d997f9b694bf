//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates the option labels of a question: 2 to 4 entries, each non-empty
/// after trimming, all distinct.
pub fn validate_choices(choices: &[String]) -> Result<(), ValidationError> {
    if !(2..=4).contains(&choices.len()) {
        let mut err = ValidationError::new("choices_count");
        err.message = Some(
            format!(
                "a question needs between 2 and 4 choices (got {})",
                choices.len()
            )
            .into(),
        );
        return Err(err);
    }

    if choices.iter().any(|choice| choice.trim().is_empty()) {
        let mut err = ValidationError::new("choices_empty");
        err.message = Some("choices must not be empty".into());
        return Err(err);
    }

    for (index, choice) in choices.iter().enumerate() {
        if choices[..index].contains(choice) {
            let mut err = ValidationError::new("choices_duplicate");
            err.message = Some(format!("duplicate choice `{choice}`").into());
            return Err(err);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn accepts_two_to_four_distinct_choices() {
        assert!(validate_choices(&labels(&["Coffee", "Tea"])).is_ok());
        assert!(validate_choices(&labels(&["A", "B", "C"])).is_ok());
        assert!(validate_choices(&labels(&["A", "B", "C", "D"])).is_ok());
    }

    #[test]
    fn rejects_wrong_count() {
        assert!(validate_choices(&labels(&[])).is_err());
        assert!(validate_choices(&labels(&["Only"])).is_err());
        assert!(validate_choices(&labels(&["A", "B", "C", "D", "E"])).is_err());
    }

    #[test]
    fn rejects_blank_choices() {
        assert!(validate_choices(&labels(&["Coffee", ""])).is_err());
        assert!(validate_choices(&labels(&["Coffee", "   "])).is_err());
    }

    #[test]
    fn rejects_duplicates() {
        assert!(validate_choices(&labels(&["Coffee", "Coffee"])).is_err());
        assert!(validate_choices(&labels(&["A", "B", "A"])).is_err());
    }
}
