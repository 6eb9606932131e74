use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    /// Expiry (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// The numeric user id, or `None` when the subject is not one.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "42".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"42""#));
    }

    #[test]
    fn test_user_id_parses_numeric_subject() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"17","exp":9999999999,"iat":9999999900}"#).unwrap();
        assert_eq!(claims.user_id(), Some(17));
    }

    #[test]
    fn test_user_id_rejects_non_numeric_subject() {
        let claims = Claims {
            sub: "admin".to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn test_missing_subject_fails_to_deserialize() {
        let result: Result<Claims, _> = serde_json::from_str(r#"{"exp":9999999999,"iat":1}"#);
        assert!(result.is_err());
    }
}
