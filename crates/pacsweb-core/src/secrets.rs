//! Connection secrets: where the API lives and how to authenticate

use pacsweb_config::Config;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets {
    pub host: Option<String>,
    pub token: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Secrets {
    pub fn new(host: Option<&str>, token: Option<&str>) -> Self {
        Self {
            host: non_blank(host),
            token: non_blank(token),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Some(&config.server.host), config.token())
    }

    pub fn with_token(self, token: &str) -> Self {
        Self {
            token: non_blank(Some(token)),
            ..self
        }
    }

    /// Both a token and a host are required
    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = vec![];
        if self.token.is_none() {
            errors.push("Missing token".to_string());
        }
        if self.host.is_none() {
            errors.push("Missing host".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation { messages: errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accumulates() {
        let err = Secrets::default().validate().unwrap_err();
        assert_eq!(err.messages(), vec!["Missing token", "Missing host"]);

        let err = Secrets::new(Some("http://host"), Some("  ")).validate().unwrap_err();
        assert_eq!(err.messages(), vec!["Missing token"]);

        assert!(Secrets::new(Some("http://host"), Some("abc")).validate().is_ok());
    }

    #[test]
    fn test_with_token() {
        let secrets = Secrets::new(Some("http://host"), None).with_token("abc");
        assert_eq!(secrets.token.as_deref(), Some("abc"));
        assert_eq!(secrets.host.as_deref(), Some("http://host"));
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_yaml("server:\n  host: http://api.example\nauth:\n  token: t0k\n").unwrap();
        let secrets = Secrets::from_config(&config);
        assert_eq!(secrets.host.as_deref(), Some("http://api.example"));
        assert_eq!(secrets.token.as_deref(), Some("t0k"));
    }
}
