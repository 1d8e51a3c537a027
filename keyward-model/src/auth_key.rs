use std::fmt;
use std::str::FromStr;

/// Separator between publisher and token in the canonical text form.
pub const AUTH_KEY_SEPARATOR: char = '-';

/// Errors produced when constructing or parsing an [`AuthKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthKeyError {
    EmptyPublisher,
    EmptyToken,
    /// The publisher contains the separator, which would make the text form
    /// ambiguous (`"a-b" + "c"` vs `"a" + "b-c"`).
    SeparatorInPublisher(String),
    MissingSeparator(String),
}

impl fmt::Display for AuthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthKeyError::EmptyPublisher => {
                write!(f, "auth key publisher cannot be empty")
            }
            AuthKeyError::EmptyToken => {
                write!(f, "auth key token cannot be empty")
            }
            AuthKeyError::SeparatorInPublisher(publisher) => write!(
                f,
                "auth key publisher '{publisher}' must not contain '{AUTH_KEY_SEPARATOR}'"
            ),
            AuthKeyError::MissingSeparator(raw) => write!(
                f,
                "auth key '{raw}' is missing the '{AUTH_KEY_SEPARATOR}' separator"
            ),
        }
    }
}

impl std::error::Error for AuthKeyError {}

/// Composite identifier naming one authorization: the publisher that issued
/// the credential plus a token unique within that publisher.
///
/// Equality and hashing are structural over `(publisher, token)`. The text
/// form is `"{publisher}-{token}"` and is what serde emits, so keys stay
/// usable as JSON map keys. Publishers may not contain `-`; tokens may, so a
/// hyphenated UUID is a valid token and parsing splits on the first `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthKey {
    publisher: String,
    token: String,
}

impl AuthKey {
    pub fn new(
        publisher: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, AuthKeyError> {
        let publisher = publisher.into();
        let token = token.into();

        if publisher.is_empty() {
            return Err(AuthKeyError::EmptyPublisher);
        }
        if publisher.contains(AUTH_KEY_SEPARATOR) {
            return Err(AuthKeyError::SeparatorInPublisher(publisher));
        }
        if token.is_empty() {
            return Err(AuthKeyError::EmptyToken);
        }

        Ok(Self { publisher, token })
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Canonical `publisher-token` string.
    pub fn to_canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.publisher, AUTH_KEY_SEPARATOR, self.token)
    }
}

impl FromStr for AuthKey {
    type Err = AuthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (publisher, token) = s
            .split_once(AUTH_KEY_SEPARATOR)
            .ok_or_else(|| AuthKeyError::MissingSeparator(s.to_string()))?;
        Self::new(publisher, token)
    }
}

impl TryFrom<&str> for AuthKey {
    type Error = AuthKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AuthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AuthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
