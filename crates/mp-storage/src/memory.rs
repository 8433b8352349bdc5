use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Mutex;
use uuid::Uuid;

use mp_core::models::assessment::{Assessment, AssessmentDetails, AssessmentStatus};
use mp_core::models::friend_share::FriendAssessmentShare;
use mp_core::models::order::{Order, OrderStatus};
use mp_core::models::result::AssessmentResult;
use mp_core::tables;

use crate::error::StorageError;
use crate::repository::AssessmentRepository;

/// In-process repository with the same semantics as the PostgREST backend.
///
/// Used by tests and by local runs without a configured data store.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    assessments: HashMap<Uuid, Assessment>,
    /// Keyed by assessment id (1:1).
    results: HashMap<Uuid, AssessmentResult>,
    orders: HashMap<String, Order>,
    friend_shares: HashMap<Uuid, FriendAssessmentShare>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of order rows, across all assessments.
    pub async fn order_count(&self) -> usize {
        self.inner.lock().await.orders.len()
    }
}

#[async_trait]
impl AssessmentRepository for MemoryRepository {
    async fn create_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError> {
        let mut t = self.inner.lock().await;
        if t.assessments.contains_key(&assessment.id) {
            return Err(StorageError::conflict(tables::ASSESSMENTS, assessment.id));
        }
        t.assessments.insert(assessment.id, assessment.clone());
        Ok(assessment.clone())
    }

    async fn get_assessment(&self, id: Uuid) -> Result<Assessment, StorageError> {
        self.inner
            .lock()
            .await
            .assessments
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENTS, id))
    }

    async fn list_assessments(&self, advisor_email: &str) -> Result<Vec<Assessment>, StorageError> {
        let t = self.inner.lock().await;
        let mut found: Vec<Assessment> = t
            .assessments
            .values()
            .filter(|a| a.is_owned_by(advisor_email))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(found)
    }

    async fn update_assessment_details(
        &self,
        id: Uuid,
        details: &AssessmentDetails,
    ) -> Result<Assessment, StorageError> {
        let mut t = self.inner.lock().await;
        let assessment = t
            .assessments
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENTS, id))?;
        details.apply_to(assessment);
        Ok(assessment.clone())
    }

    async fn mark_assessment_completed(
        &self,
        id: Uuid,
        completed_at: Timestamp,
    ) -> Result<Assessment, StorageError> {
        let mut t = self.inner.lock().await;
        let assessment = t
            .assessments
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENTS, id))?;
        assessment.status = AssessmentStatus::Completed;
        assessment.completed_at = Some(completed_at);
        Ok(assessment.clone())
    }

    async fn delete_assessment(&self, id: Uuid) -> Result<(), StorageError> {
        let mut t = self.inner.lock().await;
        t.assessments
            .remove(&id)
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENTS, id))?;
        t.results.remove(&id);
        Ok(())
    }

    async fn mark_assessment_paid(&self, id: Uuid, paid_at: Timestamp) -> Result<(), StorageError> {
        let mut t = self.inner.lock().await;
        let assessment = t
            .assessments
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENTS, id))?;
        assessment.is_paid = true;
        assessment.paid_at = Some(paid_at);
        Ok(())
    }

    async fn set_checkout_session(
        &self,
        id: Uuid,
        checkout_session_id: &str,
    ) -> Result<(), StorageError> {
        let mut t = self.inner.lock().await;
        let assessment = t
            .assessments
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENTS, id))?;
        assessment.last_checkout_session_id = Some(checkout_session_id.to_string());
        Ok(())
    }

    async fn insert_result(
        &self,
        result: &AssessmentResult,
    ) -> Result<AssessmentResult, StorageError> {
        let mut t = self.inner.lock().await;
        if t.results.contains_key(&result.assessment_id) {
            return Err(StorageError::conflict(
                tables::ASSESSMENT_RESULTS,
                result.assessment_id,
            ));
        }
        t.results.insert(result.assessment_id, result.clone());
        Ok(result.clone())
    }

    async fn get_result_by_assessment(
        &self,
        assessment_id: Uuid,
    ) -> Result<AssessmentResult, StorageError> {
        self.inner
            .lock()
            .await
            .results
            .get(&assessment_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENT_RESULTS, assessment_id))
    }

    async fn unlock_result(
        &self,
        assessment_id: Uuid,
        checkout_session_id: &str,
        unlocked_at: Timestamp,
    ) -> Result<(), StorageError> {
        let mut t = self.inner.lock().await;
        let result = t
            .results
            .get_mut(&assessment_id)
            .ok_or_else(|| StorageError::not_found(tables::ASSESSMENT_RESULTS, assessment_id))?;
        result.is_unlocked = true;
        result.unlocked_at = Some(unlocked_at);
        result.checkout_session_id = Some(checkout_session_id.to_string());
        Ok(())
    }

    async fn upsert_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut t = self.inner.lock().await;
        let mut row = order.clone();
        if let Some(existing) = t.orders.get(&order.checkout_session_id) {
            row.created_at = existing.created_at;
        }
        t.orders.insert(order.checkout_session_id.clone(), row);
        Ok(())
    }

    async fn get_order(&self, checkout_session_id: &str) -> Result<Order, StorageError> {
        self.inner
            .lock()
            .await
            .orders
            .get(checkout_session_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(tables::ORDERS, checkout_session_id))
    }

    async fn list_orders(&self, assessment_id: Uuid) -> Result<Vec<Order>, StorageError> {
        let t = self.inner.lock().await;
        let mut found: Vec<Order> = t
            .orders
            .values()
            .filter(|o| o.assessment_id == assessment_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn update_order_status(
        &self,
        checkout_session_id: &str,
        status: OrderStatus,
    ) -> Result<(), StorageError> {
        let mut t = self.inner.lock().await;
        let order = t
            .orders
            .get_mut(checkout_session_id)
            .ok_or_else(|| StorageError::not_found(tables::ORDERS, checkout_session_id))?;
        order.status = status;
        order.updated_at = Timestamp::now();
        Ok(())
    }

    async fn create_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError> {
        let mut t = self.inner.lock().await;
        if t.friend_shares.contains_key(&share.id) {
            return Err(StorageError::conflict(tables::FRIEND_SHARES, share.id));
        }
        t.friend_shares.insert(share.id, share.clone());
        Ok(share.clone())
    }

    async fn get_friend_share(&self, id: Uuid) -> Result<FriendAssessmentShare, StorageError> {
        self.inner
            .lock()
            .await
            .friend_shares
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(tables::FRIEND_SHARES, id))
    }

    async fn update_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError> {
        let mut t = self.inner.lock().await;
        let slot = t
            .friend_shares
            .get_mut(&share.id)
            .ok_or_else(|| StorageError::not_found(tables::FRIEND_SHARES, share.id))?;
        *slot = share.clone();
        Ok(share.clone())
    }

    async fn list_friend_shares(
        &self,
        sender_email: &str,
    ) -> Result<Vec<FriendAssessmentShare>, StorageError> {
        let t = self.inner.lock().await;
        let mut found: Vec<FriendAssessmentShare> = t
            .friend_shares
            .values()
            .filter(|s| s.sender_email.eq_ignore_ascii_case(sender_email.trim()))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(found)
    }
}
