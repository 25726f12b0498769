//! Bank-transfer details repository.

use sable_core::BankAccountId;
use serde::Deserialize;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::BankDetails;

#[derive(Debug, sqlx::FromRow)]
struct BankDetailsRow {
    id: BankAccountId,
    bank_name: String,
    account_holder: String,
    account_number: String,
    bank_address: String,
}

impl From<BankDetailsRow> for BankDetails {
    fn from(row: BankDetailsRow) -> Self {
        Self {
            id: row.id,
            bank_name: row.bank_name,
            account_holder: row.account_holder,
            account_number: row.account_number,
            bank_address: row.bank_address,
        }
    }
}

/// Input for replacing the active bank account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBankDetails {
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    pub bank_address: String,
}

/// Repository for the bank-transfer account.
pub struct BankDetailsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BankDetailsRepository<'a> {
    /// Create a new bank details repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the active bank account, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self) -> Result<Option<BankDetails>, RepositoryError> {
        let row = sqlx::query_as::<_, BankDetailsRow>(
            r"
            SELECT id, bank_name, account_holder, account_number, bank_address
            FROM storefront.bank_details
            WHERE is_active
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Deactivate the current account and make `details` the active one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either statement fails.
    pub async fn replace_active(
        &self,
        details: &NewBankDetails,
    ) -> Result<BankDetails, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE storefront.bank_details SET is_active = FALSE WHERE is_active")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, BankDetailsRow>(
            r"
            INSERT INTO storefront.bank_details (bank_name, account_holder, account_number, bank_address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, bank_name, account_holder, account_number, bank_address
            ",
        )
        .bind(&details.bank_name)
        .bind(&details.account_holder)
        .bind(&details.account_number)
        .bind(&details.bank_address)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }
}
