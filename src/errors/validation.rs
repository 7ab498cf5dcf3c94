use validator::ValidationErrors;

use super::model::FieldError;

const FAILED_CHECK_PREFIX: &str = "Invalid field, failed validation check: ";

impl FieldError {
    /// Field error for a single failed validation check (`tag` is the rule name)
    pub fn failed_check(field: impl Into<String>, tag: &str) -> Self {
        Self::new(field, format!("{FAILED_CHECK_PREFIX}{tag}"))
    }
}

/// Map every failed `(field, rule)` pair from `validator` into a `FieldError`.
///
/// Fields are ordered by name; checks keep the order the validator reported.
/// Nested struct and list errors are not flattened.
pub fn field_errors_from_validation(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut by_field: Vec<_> = errors.field_errors().into_iter().collect();
    by_field.sort_by(|(a, _), (b, _)| a.cmp(b));

    by_field
        .into_iter()
        .flat_map(|(field, checks)| {
            checks
                .iter()
                .map(move |check| FieldError::failed_check(field.to_string(), &check.code))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    struct SignUp {
        #[validate(length(min = 1))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(range(min = 18))]
        age: u32,
    }

    #[test]
    fn test_failed_check_description() {
        let field = FieldError::failed_check("email", "required");
        assert_eq!(field.field, "email");
        assert_eq!(
            field.description,
            "Invalid field, failed validation check: required"
        );
    }

    #[test]
    fn test_maps_every_failure_in_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add("username", ValidationError::new("length"));
        errors.add("email", ValidationError::new("required"));
        errors.add("email", ValidationError::new("email"));

        let fields = field_errors_from_validation(&errors);
        assert_eq!(
            fields,
            vec![
                FieldError::failed_check("email", "required"),
                FieldError::failed_check("email", "email"),
                FieldError::failed_check("username", "length"),
            ]
        );
    }

    #[test]
    fn test_aggregates_derived_validation() {
        let input = SignUp {
            name: String::new(),
            email: "not-an-email".to_string(),
            age: 12,
        };
        let errors = input.validate().unwrap_err();
        let fields = field_errors_from_validation(&errors);

        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["age", "email", "name"]);
        assert_eq!(fields[0].description, "Invalid field, failed validation check: range");
        assert_eq!(fields[1].description, "Invalid field, failed validation check: email");
        assert_eq!(fields[2].description, "Invalid field, failed validation check: length");
    }

    #[test]
    fn test_valid_input_has_no_field_errors() {
        let errors = ValidationErrors::new();
        assert!(field_errors_from_validation(&errors).is_empty());
    }
}
