use anyhow::anyhow;
use axum::{
    Form, Json,
    extract::{
        FromRequest, Request,
        rejection::{FormRejection, JsonRejection},
    },
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use schoolbook_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{} is invalid", field),
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join(", ")
}

/// Turns serde's "missing field `x`" into "x is required".
fn missing_field_message(error_msg: &str) -> Option<String> {
    error_msg
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
        .map(|field| format!("{} is required", field))
}

fn validate<T: Validate>(value: &T) -> Result<(), AppError> {
    value
        .validate()
        .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))
}

/// JSON body that has passed its `validator` rules.
///
/// Malformed bodies are `400`; rule violations are `422`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::bad_request(anyhow!(
                        "Missing 'Content-Type: application/json' header"
                    ));
                }

                let error_msg = rejection.body_text();
                if let Some(message) = missing_field_message(&error_msg) {
                    return AppError::bad_request(anyhow!(message));
                }
                if error_msg.contains("invalid type") || error_msg.contains("unknown variant") {
                    return AppError::bad_request(anyhow!("Invalid field type in request"));
                }

                AppError::bad_request(anyhow!("Invalid request body"))
            })?;

        validate(&value)?;
        Ok(ValidatedJson(value))
    }
}

/// `application/x-www-form-urlencoded` counterpart of [`ValidatedJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                if matches!(rejection, FormRejection::InvalidFormContentType(_)) {
                    return AppError::bad_request(anyhow!(
                        "Expected 'Content-Type: application/x-www-form-urlencoded'"
                    ));
                }

                match missing_field_message(&rejection.body_text()) {
                    Some(message) => AppError::bad_request(anyhow!(message)),
                    None => AppError::bad_request(anyhow!("Invalid form body")),
                }
            })?;

        validate(&value)?;
        Ok(ValidatedForm(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let msg = "Failed to deserialize the JSON body into the target type: missing field `guardian_name` at line 1 column 2";
        assert_eq!(
            missing_field_message(msg).as_deref(),
            Some("guardian_name is required")
        );
        assert_eq!(missing_field_message("expected value"), None);
    }
}
