//! Credit ledger repository
//!
//! Encapsulates every mutation of the credit_balances table. The
//! check-balance-then-decrement sequence MUST be a single server-side
//! statement: two concurrent debits against the last remaining credit must
//! never both succeed. The orchestration layer never reads and writes the
//! balance separately.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by ledger operations.
///
/// Any store failure maps to the request-level CREDIT_ERROR: the
/// orchestrator must not generate content when the ledger state is unknown.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("credit ledger query failed: {0}")]
    Store(#[from] DbErr),
    #[error("debit amount must be positive, got {amount}")]
    NonPositiveAmount { amount: i64 },
}

/// Result of an atomic debit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebitOutcome {
    /// Whether the debit was applied
    pub success: bool,
    /// Balance after the operation (unchanged when `success` is false)
    pub new_balance: i64,
    /// Optional human-readable rejection reason
    pub message: Option<String>,
}

/// Repository for credit balance operations
#[derive(Debug, Clone)]
pub struct CreditLedger {
    db: Arc<DatabaseConnection>,
    default_balance: i64,
}

impl CreditLedger {
    /// Creates a new ledger over the given connection pool.
    ///
    /// `default_balance` is granted when a user's row is created implicitly
    /// on first use.
    pub fn new(db: Arc<DatabaseConnection>, default_balance: i64) -> Self {
        Self {
            db,
            default_balance,
        }
    }

    /// Atomically debit `amount` credits from the user's balance.
    ///
    /// The conditional update only applies when `balance >= amount`, so the
    /// database serializes concurrent debits against the same row and the
    /// balance can never go negative. Zero rows updated means insufficient
    /// credits and the balance is untouched.
    pub async fn debit(&self, user_id: Uuid, amount: i64) -> Result<DebitOutcome, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::NonPositiveAmount { amount });
        }

        self.ensure_row(user_id).await?;

        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => {
                "UPDATE credit_balances \
                 SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP \
                 WHERE user_id = $2 AND balance >= $1 \
                 RETURNING balance"
            }
            _ => {
                "UPDATE credit_balances \
                 SET balance = balance - ?1, updated_at = CURRENT_TIMESTAMP \
                 WHERE user_id = ?2 AND balance >= ?1 \
                 RETURNING balance"
            }
        };

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                backend,
                sql,
                [amount.into(), user_id.into()],
            ))
            .await?;

        match row {
            Some(row) => {
                let new_balance: i64 = row.try_get("", "balance")?;
                Ok(DebitOutcome {
                    success: true,
                    new_balance,
                    message: None,
                })
            }
            None => {
                let balance = self.balance_of(user_id).await?;
                Ok(DebitOutcome {
                    success: false,
                    new_balance: balance,
                    message: Some("Insufficient credits".to_string()),
                })
            }
        }
    }

    /// Atomically credit `amount` back to the user's balance.
    ///
    /// Used by the optional refund-on-total-failure policy and by billing
    /// top-ups.
    pub async fn credit(&self, user_id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::NonPositiveAmount { amount });
        }

        self.ensure_row(user_id).await?;

        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => {
                "UPDATE credit_balances \
                 SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP \
                 WHERE user_id = $2 \
                 RETURNING balance"
            }
            _ => {
                "UPDATE credit_balances \
                 SET balance = balance + ?1, updated_at = CURRENT_TIMESTAMP \
                 WHERE user_id = ?2 \
                 RETURNING balance"
            }
        };

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                backend,
                sql,
                [amount.into(), user_id.into()],
            ))
            .await?
            .ok_or_else(|| {
                LedgerError::Store(DbErr::RecordNotFound(format!(
                    "credit balance row for user {} disappeared",
                    user_id
                )))
            })?;

        Ok(row.try_get("", "balance")?)
    }

    /// Current balance for the user, creating the row on first use.
    pub async fn balance_of(&self, user_id: Uuid) -> Result<i64, LedgerError> {
        self.ensure_row(user_id).await?;

        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => "SELECT balance FROM credit_balances WHERE user_id = $1",
            _ => "SELECT balance FROM credit_balances WHERE user_id = ?1",
        };

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                backend,
                sql,
                [user_id.into()],
            ))
            .await?;

        match row {
            Some(row) => Ok(row.try_get("", "balance")?),
            None => Ok(self.default_balance),
        }
    }

    /// Create the user's balance row if it does not exist yet.
    async fn ensure_row(&self, user_id: Uuid) -> Result<(), LedgerError> {
        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => {
                "INSERT INTO credit_balances (user_id, balance) VALUES ($1, $2) \
                 ON CONFLICT (user_id) DO NOTHING"
            }
            _ => {
                "INSERT INTO credit_balances (user_id, balance) VALUES (?1, ?2) \
                 ON CONFLICT (user_id) DO NOTHING"
            }
        };

        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                sql,
                [user_id.into(), self.default_balance.into()],
            ))
            .await?;

        Ok(())
    }
}
