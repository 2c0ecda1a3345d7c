//! The session token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

// Hours always have two digits, so tokens expiring at midnight still parse.
time::serde::format_description!(
    expiry_format,
    OffsetDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] \
    [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
);

/// Who is logged in and until when.
///
/// Serialized as JSON, e.g.
/// `{"user_id":1,"expires_at":"2025-12-21 03:54:00.0 +00:00:00"}`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod token_tests {
    use time::{UtcOffset, macros::datetime};

    use crate::auth::{Token, UserID};

    const MIDNIGHT_JSON: &str = r#"{"user_id":3,"expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

    #[test]
    fn serializes_expiry_with_offset() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC),
        };

        assert_eq!(
            serde_json::to_string(&token).unwrap(),
            r#"{"user_id":1,"expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#
        );
    }

    #[test]
    fn parses_non_utc_offset() {
        let json = r#"{"user_id":42,"expires_at":"2025-06-01 09:30:00.0 +12:00:00"}"#;

        let token: Token = serde_json::from_str(json).unwrap();

        assert_eq!(token.user_id, UserID::new(42));
        assert_eq!(
            token.expires_at,
            datetime!(2025-06-01 09:30:00).assume_offset(UtcOffset::from_hms(12, 0, 0).unwrap())
        );
    }

    #[test]
    fn midnight_expiry_survives_a_round_trip() {
        let token: Token = serde_json::from_str(MIDNIGHT_JSON).unwrap();

        assert_eq!(
            token.expires_at,
            datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC)
        );
        assert_eq!(serde_json::to_string(&token).unwrap(), MIDNIGHT_JSON);
    }

    #[test]
    fn rejects_token_without_expiry() {
        assert!(serde_json::from_str::<Token>(r#"{"user_id":1}"#).is_err());
    }
}
