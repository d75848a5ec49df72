//! Field validation for request bodies.
//!
//! Bodies derive [`validator::Validate`]; failures become
//! [`ApiError::Validation`] with one entry per failed rule, sorted by field.

use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, FieldError};

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self {
    let mut fields: Vec<FieldError> = errors
      .field_errors()
      .into_iter()
      .flat_map(|(field, errs)| {
        errs.iter().map(move |e| {
          let msg = e
            .message
            .as_ref()
            .map_or_else(|| e.code.to_string(), ToString::to_string);
          FieldError::new(field.to_string(), msg)
        })
      })
      .collect();
    fields.sort_by(|a, b| a.param.cmp(&b.param));
    ApiError::Validation(fields)
  }
}

/// Run the body's rules, handing it back untouched when they pass.
pub fn validated<T: Validate>(body: T) -> Result<T, ApiError> {
  body.validate()?;
  Ok(body)
}
