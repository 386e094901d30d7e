use crate::domain::transaction::{advance, Transaction, TransactionStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct NewTransaction {
    pub merchant_transaction_id: String,
    pub gateway_transaction_id: Option<String>,
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
}

#[derive(Clone)]
pub struct TransactionsRepo {
    pub pool: PgPool,
}

impl TransactionsRepo {
    pub async fn insert_pending(&self, data: &NewTransaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                merchant_transaction_id, gateway_transaction_id, order_id, amount_minor, currency,
                customer_name, customer_email, customer_phone, customer_address,
                product_name, product_category, status
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9,
                $10, $11, $12
            )
            "#,
        )
        .bind(&data.merchant_transaction_id)
        .bind(&data.gateway_transaction_id)
        .bind(&data.order_id)
        .bind(data.amount_minor)
        .bind(&data.currency)
        .bind(&data.customer_name)
        .bind(&data.customer_email)
        .bind(&data.customer_phone)
        .bind(&data.customer_address)
        .bind(&data.product_name)
        .bind(&data.product_category)
        .bind(TransactionStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find(&self, merchant_transaction_id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query(
            r#"
            SELECT merchant_transaction_id, gateway_transaction_id, order_id, amount_minor, currency,
                   customer_name, customer_email, customer_phone, customer_address,
                   product_name, product_category, status, payment_status, is_verified,
                   verification_attempts, created_at, completed_at
            FROM transactions
            WHERE merchant_transaction_id = $1
            "#,
        )
        .bind(merchant_transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_transaction))
    }

    /// Applies a forward-only transition. A disallowed transition is a no-op
    /// and returns None; the stored status is never moved backwards.
    pub async fn advance_status(
        &self,
        merchant_transaction_id: &str,
        next: TransactionStatus,
    ) -> Result<Option<TransactionStatus>> {
        let Some(current) = self.find(merchant_transaction_id).await? else {
            return Ok(None);
        };
        let Some(accepted) = advance(current.status, next) else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2,
                completed_at = CASE WHEN $3 AND completed_at IS NULL THEN now() ELSE completed_at END
            WHERE merchant_transaction_id = $1
            "#,
        )
        .bind(merchant_transaction_id)
        .bind(accepted.as_str())
        .bind(accepted.is_terminal())
        .execute(&self.pool)
        .await?;

        Ok(Some(accepted))
    }

    pub async fn record_verification(
        &self,
        merchant_transaction_id: &str,
        payment_status: &str,
        verified: bool,
        last_response: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE transactions
            SET verification_attempts = verification_attempts + 1,
                payment_status = $2,
                is_verified = is_verified OR $3,
                last_verify_response = $4
            WHERE merchant_transaction_id = $1
            "#,
        )
        .bind(merchant_transaction_id)
        .bind(payment_status)
        .bind(verified)
        .bind(last_response)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Transactions still in a non-terminal state that are old enough to be
    /// worth re-checking against the gateway.
    pub async fn list_unresolved(
        &self,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT merchant_transaction_id, gateway_transaction_id, order_id, amount_minor, currency,
                   customer_name, customer_email, customer_phone, customer_address,
                   product_name, product_category, status, payment_status, is_verified,
                   verification_attempts, created_at, completed_at
            FROM transactions
            WHERE status IN ('PENDING', 'PROCESSING') AND created_at < $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(created_before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_transaction).collect())
    }
}

fn row_to_transaction(row: PgRow) -> Transaction {
    let status: String = row.get("status");
    Transaction {
        merchant_transaction_id: row.get("merchant_transaction_id"),
        gateway_transaction_id: row.get("gateway_transaction_id"),
        order_id: row.get("order_id"),
        amount_minor: row.get("amount_minor"),
        currency: row.get("currency"),
        customer_name: row.get("customer_name"),
        customer_email: row.get("customer_email"),
        customer_phone: row.get("customer_phone"),
        customer_address: row.get("customer_address"),
        product_name: row.get("product_name"),
        product_category: row.get("product_category"),
        status: TransactionStatus::parse(&status),
        payment_status: row.get("payment_status"),
        is_verified: row.get("is_verified"),
        verification_attempts: row.get("verification_attempts"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    }
}
