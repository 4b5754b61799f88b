use crate::error::PaydeskError;
use crate::models::{NewReceipt, Receipt};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Persistence contract for receipts. `insert` assigns the transaction id
/// and date; `find_by_student` returns receipts in the store's natural
/// (insertion) order, which the orchestrator relies on for "latest".
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn insert(&self, receipt: NewReceipt) -> Result<Receipt, PaydeskError>;
    async fn find_by_student(&self, student_id: i64) -> Result<Vec<Receipt>, PaydeskError>;
}

pub struct InMemoryReceiptStore {
    receipts: RwLock<Vec<Receipt>>,
    next_id: AtomicU64,
}

impl InMemoryReceiptStore {
    pub fn new() -> Self {
        Self {
            receipts: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn count(&self) -> u64 {
        self.receipts.read().await.len() as u64
    }
}

#[async_trait]
impl ReceiptStore for InMemoryReceiptStore {
    async fn insert(&self, receipt: NewReceipt) -> Result<Receipt, PaydeskError> {
        let stored = Receipt {
            transaction_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            student_id: receipt.student_id,
            amount: receipt.amount,
            transaction_date: Utc::now(),
            card_type: receipt.card_type,
            reference_number: receipt.reference_number,
            status: receipt.status,
        };

        self.receipts.write().await.push(stored.clone());
        tracing::debug!(
            transaction_id = stored.transaction_id,
            student_id = stored.student_id,
            "Receipt stored"
        );

        Ok(stored)
    }

    async fn find_by_student(&self, student_id: i64) -> Result<Vec<Receipt>, PaydeskError> {
        let receipts = self.receipts.read().await;
        Ok(receipts
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardType, ReceiptStatus};
    use rust_decimal::Decimal;

    fn sample(student_id: i64, reference: &str) -> NewReceipt {
        NewReceipt {
            student_id,
            amount: Decimal::new(15_000, 2),
            card_type: CardType::Debit,
            reference_number: reference.to_string(),
            status: ReceiptStatus::Completed,
        }
    }

    #[test]
    fn insert_assigns_sequential_ids_and_date() {
        tokio_test::block_on(async {
            let store = InMemoryReceiptStore::new();

            let first = store.insert(sample(1, "REF-1")).await.unwrap();
            let second = store.insert(sample(1, "REF-2")).await.unwrap();

            assert_eq!(first.transaction_id, 1);
            assert_eq!(second.transaction_id, 2);
            assert!(second.transaction_date >= first.transaction_date);
        });
    }

    #[test]
    fn find_by_student_preserves_insertion_order() {
        tokio_test::block_on(async {
            let store = InMemoryReceiptStore::new();

            store.insert(sample(1, "REF-A")).await.unwrap();
            store.insert(sample(2, "REF-B")).await.unwrap();
            store.insert(sample(1, "REF-C")).await.unwrap();

            let found = store.find_by_student(1).await.unwrap();
            let refs: Vec<_> = found.iter().map(|r| r.reference_number.as_str()).collect();
            assert_eq!(refs, vec!["REF-A", "REF-C"]);
        });
    }

    #[test]
    fn find_by_student_unknown_is_empty() {
        tokio_test::block_on(async {
            let store = InMemoryReceiptStore::new();
            store.insert(sample(1, "REF-A")).await.unwrap();

            assert!(store.find_by_student(99).await.unwrap().is_empty());
            assert_eq!(store.count().await, 1);
        });
    }
}
