use crate::models::{CardType, Receipt, ReceiptStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity attributes returned by the student directory service.
/// Fetched per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub student_id: i64,
    pub student_name: String,
    pub grade: String,
}

/// Response-only composition of a student's identity with their most
/// recently recorded receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentReceiptView {
    pub student_id: i64,
    pub student_name: String,
    pub grade: String,
    pub transaction_id: u64,
    pub amount: Decimal,
    pub transaction_date: String,
    pub card_type: CardType,
    pub reference_number: String,
    pub status: ReceiptStatus,
}

impl StudentReceiptView {
    pub fn compose(identity: StudentIdentity, receipt: &Receipt) -> Self {
        Self {
            student_id: identity.student_id,
            student_name: identity.student_name,
            grade: identity.grade,
            transaction_id: receipt.transaction_id,
            amount: receipt.amount,
            transaction_date: receipt.transaction_date.to_rfc3339(),
            card_type: receipt.card_type,
            reference_number: receipt.reference_number.clone(),
            status: receipt.status,
        }
    }
}
