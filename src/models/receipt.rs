use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Debit,
    Credit,
    Prepaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Pending,
    Completed,
    Failed,
}

/// A stored payment receipt. Immutable once the store has assigned
/// `transaction_id` and `transaction_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: u64,
    pub student_id: i64,
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub card_type: CardType,
    pub reference_number: String,
    pub status: ReceiptStatus,
}

/// Request body for recording a receipt; the store assigns id and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReceipt {
    pub student_id: i64,
    pub amount: Decimal,
    pub card_type: CardType,
    pub reference_number: String,
    pub status: ReceiptStatus,
}
