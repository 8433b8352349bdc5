use async_trait::async_trait;
use jiff::Timestamp;
use uuid::Uuid;

use mp_core::models::assessment::{Assessment, AssessmentDetails};
use mp_core::models::friend_share::FriendAssessmentShare;
use mp_core::models::order::{Order, OrderStatus};
use mp_core::models::result::AssessmentResult;

use crate::error::StorageError;

/// Typed access to every persisted record.
///
/// Single-row updates return `StorageError::NotFound` when no row matched.
/// Orders are upserted keyed by checkout session id, so redelivered payment
/// events never create duplicates.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    // ── Assessments ──────────────────────────────────────────────────────

    async fn create_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError>;

    async fn get_assessment(&self, id: Uuid) -> Result<Assessment, StorageError>;

    /// Assessments shared by an advisor, newest first.
    async fn list_assessments(&self, advisor_email: &str) -> Result<Vec<Assessment>, StorageError>;

    /// Write only the advisor-editable columns set in `details`. Payment and
    /// completion columns are never touched.
    async fn update_assessment_details(
        &self,
        id: Uuid,
        details: &AssessmentDetails,
    ) -> Result<Assessment, StorageError>;

    /// Set `status = completed` and `completed_at`.
    async fn mark_assessment_completed(
        &self,
        id: Uuid,
        completed_at: Timestamp,
    ) -> Result<Assessment, StorageError>;

    async fn delete_assessment(&self, id: Uuid) -> Result<(), StorageError>;

    async fn mark_assessment_paid(&self, id: Uuid, paid_at: Timestamp) -> Result<(), StorageError>;

    async fn set_checkout_session(&self, id: Uuid, checkout_session_id: &str)
    -> Result<(), StorageError>;

    // ── Results ──────────────────────────────────────────────────────────

    async fn insert_result(&self, result: &AssessmentResult)
    -> Result<AssessmentResult, StorageError>;

    async fn get_result_by_assessment(
        &self,
        assessment_id: Uuid,
    ) -> Result<AssessmentResult, StorageError>;

    async fn unlock_result(
        &self,
        assessment_id: Uuid,
        checkout_session_id: &str,
        unlocked_at: Timestamp,
    ) -> Result<(), StorageError>;

    // ── Orders ───────────────────────────────────────────────────────────

    async fn upsert_order(&self, order: &Order) -> Result<(), StorageError>;

    async fn get_order(&self, checkout_session_id: &str) -> Result<Order, StorageError>;

    async fn list_orders(&self, assessment_id: Uuid) -> Result<Vec<Order>, StorageError>;

    async fn update_order_status(
        &self,
        checkout_session_id: &str,
        status: OrderStatus,
    ) -> Result<(), StorageError>;

    // ── Friend shares ────────────────────────────────────────────────────

    async fn create_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError>;

    async fn get_friend_share(&self, id: Uuid) -> Result<FriendAssessmentShare, StorageError>;

    async fn update_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError>;

    async fn list_friend_shares(
        &self,
        sender_email: &str,
    ) -> Result<Vec<FriendAssessmentShare>, StorageError>;
}
