use chrono::{DateTime, SecondsFormat, Utc};
use data_encoding::BASE64;
use eyre::{ensure, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::fields::{
    required_text, timestamp, FieldMap, TableConsumer, TableFields, TableIdentity,
};
use crate::error::Error;

pub const TABLE: &str = "sessions";

/// Column sessions are looked up by.
pub const UNIQUE_INDEX: &str = "user_id";

#[derive(Debug, Validate, Deserialize, Serialize)]
pub struct NewSession {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EndSession {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub public_id: String,
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: String, expires: DateTime<Utc>) -> Self {
        Session {
            user_id,
            public_id: Uuid::new_v4().to_string(),
            token: Uuid::new_v4().to_string(),
            expires,
        }
    }

    /// base64 of `<user_id>:<token>`, the credential handed to clients.
    pub fn session_token(&self) -> String {
        BASE64.encode(format!("{}:{}", self.user_id, self.token).as_bytes())
    }

    /// True when the composite token decodes to this session's user and token.
    pub fn validate_token(&self, composite: &str) -> bool {
        match parse_token(composite) {
            Ok((user_id, token)) => {
                user_id.as_bytes() == self.user_id.as_bytes()
                    && token.as_bytes() == self.token.as_bytes()
            }
            Err(_) => false,
        }
    }

    pub fn expired(&self) -> bool {
        Utc::now() > self.expires
    }

    /// What a client gets back from a login.
    pub fn session_fields(&self) -> FieldMap {
        FieldMap::from([
            ("type".to_string(), "Bearer".into()),
            ("token".to_string(), self.session_token().into()),
            (
                "expires".to_string(),
                self.expires
                    .to_rfc3339_opts(SecondsFormat::Secs, true)
                    .into(),
            ),
        ])
    }
}

/// Splits a composite token into `(user_id, token)`.
pub fn parse_token(value: &str) -> Result<(String, String)> {
    let decoded = BASE64
        .decode(value.as_bytes())
        .map_err(|_| Error::InvalidSessionToken)?;
    let decoded = String::from_utf8(decoded).map_err(|_| Error::InvalidSessionToken)?;

    let parts: Vec<&str> = decoded.split(':').collect();
    ensure!(parts.len() == 2, Error::InvalidSessionToken);
    Ok((parts[0].to_string(), parts[1].to_string()))
}

impl TableIdentity for Session {
    fn table(&self) -> &'static str {
        TABLE
    }
}

impl TableFields for Session {
    fn fields(&self) -> FieldMap {
        FieldMap::from([
            ("user_id".to_string(), self.user_id.as_str().into()),
            ("token".to_string(), self.token.as_str().into()),
            ("public_id".to_string(), self.public_id.as_str().into()),
            ("expires".to_string(), self.expires.into()),
        ])
    }
}

impl TableConsumer for Session {
    fn with_fields(&mut self, fields: &FieldMap) -> Result<()> {
        self.user_id = required_text(fields, "user_id")?;
        self.public_id = required_text(fields, "public_id")?;
        self.token = required_text(fields, "token")?;
        if let Some(expires) = timestamp(fields, "expires")? {
            self.expires = expires;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fields::{consume, FieldValue};
    use chrono::Duration;
    use rstest::rstest;

    fn session(expires: DateTime<Utc>) -> Session {
        Session::new("2332323-23220-Gu34433-23232232".to_string(), expires)
    }

    #[test]
    fn test_token_round_trip() -> Result<()> {
        let session = session(Utc::now() + Duration::hours(1));
        let (user_id, token) = parse_token(&session.session_token())?;
        assert_eq!(user_id, session.user_id);
        assert_eq!(token, session.token);
        Ok(())
    }

    #[test]
    fn test_validate_token() {
        let session = session(Utc::now() + Duration::hours(1));
        assert!(session.validate_token(&session.session_token()));

        let other = Session::new(session.user_id.clone(), session.expires);
        assert!(!session.validate_token(&other.session_token()));
        assert!(!session.validate_token(&session.token));
    }

    #[rstest]
    #[case("not base64!")]
    #[case("YWJj")] // "abc"
    #[case("YTpiOmM=")] // "a:b:c"
    #[case("")]
    fn test_parse_token_rejects(#[case] value: &str) {
        let err = parse_token(value).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidSessionToken)
        ));
    }

    #[test]
    fn test_expired() {
        assert!(session(Utc::now() - Duration::seconds(1)).expired());
        assert!(!session(Utc::now() + Duration::minutes(5)).expired());
    }

    #[test]
    fn test_session_fields() {
        let session = session(Utc::now() + Duration::hours(1));
        let fields = session.session_fields();
        assert_eq!(fields.get("type"), Some(&FieldValue::Text("Bearer".to_string())));
        assert_eq!(
            fields.get("token"),
            Some(&FieldValue::Text(session.session_token()))
        );
        assert!(fields.contains_key("expires"));
    }

    #[test]
    fn test_fields() {
        let fields = Session::default().fields();
        for key in ["public_id", "user_id", "token", "expires"] {
            assert!(fields.contains_key(key), "missing {}", key);
        }
    }

    #[test]
    fn test_with_fields() -> Result<()> {
        let fields = FieldMap::from([
            ("token".to_string(), "2332323-23220-Gu34433-23232232".into()),
            ("user_id".to_string(), "2332323-23220-Gu34433-23232232".into()),
            ("public_id".to_string(), "2332323-23220-Gu34433-23232232".into()),
            ("expires".to_string(), "2030-01-02T03:04:05Z".into()),
        ]);
        let session: Session = consume(&fields)?;
        assert_eq!(session.token, "2332323-23220-Gu34433-23232232");
        assert_eq!(session.expires.to_rfc3339(), "2030-01-02T03:04:05+00:00");
        Ok(())
    }
}
