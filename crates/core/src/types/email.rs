//! Customer email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty or whitespace.
    #[error("email cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain a single @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty or has no dot.
    #[error("email domain must look like example.com")]
    InvalidDomain,
    /// The address contains whitespace.
    #[error("email cannot contain spaces")]
    ContainsWhitespace,
}

/// A customer contact email address.
///
/// Checkout forms only require the email field to be non-empty; this type is
/// the stricter shape enforced where an order is written server-side.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed before validation
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol with a non-empty local part
/// - Domain contains a dot that is neither first nor last
///
/// ## Examples
///
/// ```
/// use sable_core::Email;
///
/// assert!(Email::parse("jane@example.com").is_ok());
/// assert_eq!(Email::parse("  jane@example.com ").unwrap().as_str(), "jane@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("jane").is_err());
/// assert!(Email::parse("jane@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first violated constraint.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::MissingAtSymbol);
        }

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        let dotted = domain
            .find('.')
            .is_some_and(|pos| pos > 0 && !domain.ends_with('.'));
        if !dotted {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Stored addresses were validated on the way in
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("jane@example.com").is_ok());
        assert!(Email::parse("jane.doe+orders@shop.example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let email = Email::parse("\t jane@example.com \n").unwrap();
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_at_symbol_rules() {
        assert_eq!(Email::parse("jane"), Err(EmailError::MissingAtSymbol));
        assert_eq!(
            Email::parse("jane@doe@example.com"),
            Err(EmailError::MissingAtSymbol)
        );
        assert_eq!(Email::parse("@example.com"), Err(EmailError::EmptyLocalPart));
    }

    #[test]
    fn test_parse_domain_rules() {
        assert_eq!(Email::parse("jane@"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("jane@localhost"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("jane@.com"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("jane@example."), Err(EmailError::InvalidDomain));
    }

    #[test]
    fn test_parse_inner_whitespace() {
        assert_eq!(
            Email::parse("jane doe@example.com"),
            Err(EmailError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_domain() {
        let email = Email::parse("jane@example.com").unwrap();
        assert_eq!(email.domain(), "example.com");
    }
}
