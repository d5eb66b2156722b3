use serde::Serialize;

/// Protocol revision sent in every login command.
pub const PROTOCOL_VERSION: u8 = 1;

/// Body of the `login` command.
///
/// Serializes to exactly
/// `{"protocol":1,"client":"<name>","clientver":"<version>"[,"username":"<u>","password":"<p>"]}`;
/// the credential pair is omitted for anonymous sessions.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCommand {
    pub protocol: u8,
    pub client: String,
    pub clientver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_login_shape() {
        let command = LoginCommand {
            protocol: PROTOCOL_VERSION,
            client: "myapp".to_string(),
            clientver: "0.1".to_string(),
            username: None,
            password: None,
        };
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"protocol":1,"client":"myapp","clientver":"0.1"}"#
        );
    }

    #[test]
    fn test_account_login_shape() {
        let command = LoginCommand {
            protocol: PROTOCOL_VERSION,
            client: "myapp".to_string(),
            clientver: "0.1".to_string(),
            username: Some("alice".to_string()),
            password: Some("secret".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"protocol":1,"client":"myapp","clientver":"0.1","username":"alice","password":"secret"}"#
        );
    }
}
