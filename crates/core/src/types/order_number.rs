//! Customer-facing order numbers.
//!
//! Format: `SO-<year>-<suffix>` where `year` is the four-digit placement year
//! and `suffix` is six characters drawn uniformly from `0-9A-Z`.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

const PREFIX: &str = "SO";
const SUFFIX_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Errors from [`OrderNumber::parse`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    #[error("order number must look like SO-2024-ABC123")]
    Malformed,
    #[error("order year must be four digits")]
    InvalidYear,
    #[error("order suffix must be {SUFFIX_LEN} characters of 0-9A-Z")]
    InvalidSuffix,
}

/// An order number such as `SO-2026-7KQ2ZD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a fresh order number for an order placed in `year`.
    ///
    /// Years outside `1000..=9999` are clamped so the year segment always has
    /// four digits.
    #[must_use]
    pub fn generate<R: Rng>(year: i32, rng: &mut R) -> Self {
        let year = year.clamp(1000, 9999);
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        Self(format!("{PREFIX}-{year}-{suffix}"))
    }

    /// Validate an order number received from a client or the database.
    ///
    /// # Errors
    ///
    /// Returns [`OrderNumberError`] if the input does not match the format.
    pub fn parse(input: &str) -> Result<Self, OrderNumberError> {
        let mut parts = input.split('-');
        let (Some(PREFIX), Some(year), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(OrderNumberError::Malformed);
        };

        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberError::InvalidYear);
        }

        if suffix.len() != SUFFIX_LEN
            || !suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        {
            return Err(OrderNumberError::InvalidSuffix);
        }

        Ok(Self(input.to_owned()))
    }

    /// The order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The four-digit year segment.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0
            .get(3..7)
            .and_then(|y| y.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
