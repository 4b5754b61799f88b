use crate::error::PaydeskError;
use crate::models::{NewReceipt, Receipt, StudentReceiptView};
use crate::services::{LookupOutcome, ReceiptStore, StudentDirectoryClient};
use std::sync::Arc;

/// Coordinates the receipt store with the student directory: a receipt is
/// only recorded for a student the directory confirmed, and the latest
/// receipt is only returned enriched with the student's identity.
pub struct ReceiptService {
    directory: Arc<StudentDirectoryClient>,
    store: Arc<dyn ReceiptStore>,
}

impl ReceiptService {
    pub fn new(directory: Arc<StudentDirectoryClient>, store: Arc<dyn ReceiptStore>) -> Self {
        Self { directory, store }
    }

    /// Record a receipt after confirming the student exists. Dependency
    /// unavailability on this path is deliberately surfaced as a not-found
    /// error to keep the caller-facing taxonomy small.
    pub async fn record_receipt(&self, receipt: NewReceipt) -> Result<Receipt, PaydeskError> {
        let student_id = receipt.student_id;

        match self.directory.lookup(student_id).await {
            LookupOutcome::Found(identity) => {
                tracing::info!(student_id = identity.student_id, "Student found, storing receipt");
                self.store.insert(receipt).await
            }
            LookupOutcome::NotFound => {
                tracing::error!(student_id, "Student not found, receipt rejected");
                Err(PaydeskError::ResourceNotFound(format!(
                    "Student not found with ID: {}",
                    student_id
                )))
            }
            LookupOutcome::Unavailable(cause) => {
                tracing::error!(student_id, %cause, "Student directory unavailable, receipt rejected");
                Err(PaydeskError::ResourceNotFound(format!(
                    "Student service is unavailable for ID: {}",
                    student_id
                )))
            }
        }
    }

    /// Fetch the student's identity and their most recent receipt, composed
    /// into a single view. The identity lookup and the store query are
    /// independent and run concurrently.
    pub async fn latest_receipt(
        &self,
        student_id: i64,
    ) -> Result<StudentReceiptView, PaydeskError> {
        let (lookup, receipts) = tokio::join!(
            self.directory.lookup(student_id),
            self.store.find_by_student(student_id)
        );

        let identity = match lookup {
            LookupOutcome::Found(identity) => identity,
            LookupOutcome::NotFound => {
                tracing::error!(student_id, "Student not found");
                return Err(PaydeskError::ResourceNotFound(format!(
                    "Student not found with ID: {}",
                    student_id
                )));
            }
            LookupOutcome::Unavailable(cause) => {
                tracing::error!(student_id, %cause, "Student directory unavailable");
                return Err(PaydeskError::ServiceUnavailable(
                    "Student service is unavailable. Please try again later.".to_string(),
                ));
            }
        };

        let receipts = receipts?;

        // Latest = last in store-return order, not max transaction date
        match receipts.last() {
            Some(latest) => {
                tracing::info!(student_id, transaction_id = latest.transaction_id, "Returning receipt");
                Ok(StudentReceiptView::compose(identity, latest))
            }
            None => {
                tracing::warn!(student_id, "No transactions found");
                Err(PaydeskError::ResourceNotFound(format!(
                    "No transactions found for student ID: {}",
                    student_id
                )))
            }
        }
    }
}
