use serde::{Deserialize, Serialize};
use std::fmt;

/// Third-party identity providers the service can complete a login against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Naver,
    Kakao,
}

impl Provider {
    /// Parses a provider tag case-insensitively, as it appears in URL paths.
    pub fn parse(s: &str) -> Option<Provider> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Some(Provider::Google),
            "naver" => Some(Provider::Naver),
            "kakao" => Some(Provider::Kakao),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Naver => "naver",
            Provider::Kakao => "kakao",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Provider;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Provider::parse("google"), Some(Provider::Google));
        assert_eq!(Provider::parse("KAKAO"), Some(Provider::Kakao));
        assert_eq!(Provider::parse("Naver"), Some(Provider::Naver));
    }

    #[test]
    fn parse_rejects_unknown_tags() {
        assert_eq!(Provider::parse("facebook"), None);
        assert_eq!(Provider::parse(""), None);
    }
}
