use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use mp_core::models::assessment::{Assessment, AssessmentDetails, AssessmentStatus};
use mp_core::models::friend_share::FriendAssessmentShare;
use mp_core::models::order::{Order, OrderStatus};
use mp_core::models::result::AssessmentResult;
use mp_core::tables;

use crate::error::StorageError;
use crate::repository::AssessmentRepository;

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// Repository over the Supabase PostgREST API, authenticated with the
/// service role key.
pub struct PostgrestRepository {
    http: reqwest::Client,
    base_url: String,
}

impl PostgrestRepository {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, StorageError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(service_key)
            .map_err(|e| StorageError::Config(format!("invalid service key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {service_key}"))
            .map_err(|e| StorageError::Config(format!("invalid service key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, tables::rest_path(table));
        self.http.request(method, url)
    }

    /// Fetch the single row where `column = value`.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<T, StorageError> {
        let resp = self
            .request(Method::GET, table)
            .query(&[("select", "*".to_string()), (column, tables::eq(value))])
            .query(&[("limit", "1")])
            .send()
            .await?;
        let mut rows: Vec<T> = check_status(resp).await?.json().await?;
        if rows.is_empty() {
            return Err(StorageError::not_found(table, value));
        }
        Ok(rows.swap_remove(0))
    }

    async fn select_many<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        order: &str,
    ) -> Result<Vec<T>, StorageError> {
        let resp = self
            .request(Method::GET, table)
            .query(&[
                ("select", "*".to_string()),
                (column, tables::eq(value)),
                ("order", order.to_string()),
            ])
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    async fn insert<T: Serialize + DeserializeOwned>(
        &self,
        table: &str,
        key: &str,
        row: &T,
    ) -> Result<T, StorageError> {
        let resp = self
            .request(Method::POST, table)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(row)
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Err(StorageError::conflict(table, key));
        }
        let mut rows: Vec<T> = check_status(resp).await?.json().await?;
        if rows.is_empty() {
            return Err(StorageError::Status {
                status: 200,
                message: format!("insert into {table} returned no rows"),
            });
        }
        Ok(rows.swap_remove(0))
    }

    /// `PATCH` where `column = value`, asking for the changed rows back.
    fn patch_request<B: Serialize>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        body: &B,
    ) -> RequestBuilder {
        self.request(Method::PATCH, table)
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&[(column, tables::eq(value))])
            .json(body)
    }

    /// Insert-or-merge an order row keyed by its checkout session id.
    fn upsert_order_request(&self, row: &serde_json::Value) -> RequestBuilder {
        self.request(Method::POST, tables::ORDERS)
            .header("Prefer", PREFER_UPSERT)
            .query(&[("on_conflict", tables::ORDER_CONFLICT_COLUMN)])
            .json(row)
    }

    /// `PATCH` rows where `column = value` and return the first updated row.
    /// Errors with `NotFound` when no row matched.
    async fn patch_one<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        body: &B,
    ) -> Result<T, StorageError> {
        let resp = self.patch_request(table, column, value, body).send().await?;
        let mut rows: Vec<T> = check_status(resp).await?.json().await?;
        debug!(table, column, value, rows = rows.len(), "patched rows");
        if rows.is_empty() {
            return Err(StorageError::not_found(table, value));
        }
        Ok(rows.swap_remove(0))
    }

    async fn patch<B: Serialize>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        body: &B,
    ) -> Result<(), StorageError> {
        self.patch_one::<B, serde_json::Value>(table, column, value, body)
            .await
            .map(drop)
    }
}

/// Serialized order without `created_at`, so the column default keeps the
/// first-seen time across redeliveries.
fn order_row(order: &Order) -> Result<serde_json::Value, StorageError> {
    let mut row = serde_json::to_value(order)?;
    if let Some(obj) = row.as_object_mut() {
        obj.remove("created_at");
    }
    Ok(row)
}

/// Turn a non-2xx response into `StorageError::Status` with the body text.
async fn check_status(resp: Response) -> Result<Response, StorageError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(StorageError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AssessmentRepository for PostgrestRepository {
    async fn create_assessment(&self, assessment: &Assessment) -> Result<Assessment, StorageError> {
        self.insert(tables::ASSESSMENTS, &assessment.id.to_string(), assessment)
            .await
    }

    async fn get_assessment(&self, id: Uuid) -> Result<Assessment, StorageError> {
        self.select_one(tables::ASSESSMENTS, "id", &id.to_string())
            .await
    }

    async fn list_assessments(&self, advisor_email: &str) -> Result<Vec<Assessment>, StorageError> {
        let email = advisor_email.trim().to_ascii_lowercase();
        self.select_many(tables::ASSESSMENTS, "advisor_email", &email, "sent_at.desc")
            .await
    }

    async fn update_assessment_details(
        &self,
        id: Uuid,
        details: &AssessmentDetails,
    ) -> Result<Assessment, StorageError> {
        if details.is_empty() {
            return self.get_assessment(id).await;
        }
        self.patch_one(tables::ASSESSMENTS, "id", &id.to_string(), details)
            .await
    }

    async fn mark_assessment_completed(
        &self,
        id: Uuid,
        completed_at: Timestamp,
    ) -> Result<Assessment, StorageError> {
        self.patch_one(
            tables::ASSESSMENTS,
            "id",
            &id.to_string(),
            &json!({ "status": AssessmentStatus::Completed, "completed_at": completed_at }),
        )
        .await
    }

    async fn delete_assessment(&self, id: Uuid) -> Result<(), StorageError> {
        let resp = self
            .request(Method::DELETE, tables::ASSESSMENTS)
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&[("id", tables::eq(id))])
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = check_status(resp).await?.json().await?;
        if rows.is_empty() {
            return Err(StorageError::not_found(tables::ASSESSMENTS, id));
        }
        Ok(())
    }

    async fn mark_assessment_paid(&self, id: Uuid, paid_at: Timestamp) -> Result<(), StorageError> {
        self.patch(
            tables::ASSESSMENTS,
            "id",
            &id.to_string(),
            &json!({ "is_paid": true, "paid_at": paid_at }),
        )
        .await
    }

    async fn set_checkout_session(
        &self,
        id: Uuid,
        checkout_session_id: &str,
    ) -> Result<(), StorageError> {
        self.patch(
            tables::ASSESSMENTS,
            "id",
            &id.to_string(),
            &json!({ "last_checkout_session_id": checkout_session_id }),
        )
        .await
    }

    async fn insert_result(
        &self,
        result: &AssessmentResult,
    ) -> Result<AssessmentResult, StorageError> {
        self.insert(
            tables::ASSESSMENT_RESULTS,
            &result.assessment_id.to_string(),
            result,
        )
        .await
    }

    async fn get_result_by_assessment(
        &self,
        assessment_id: Uuid,
    ) -> Result<AssessmentResult, StorageError> {
        self.select_one(
            tables::ASSESSMENT_RESULTS,
            "assessment_id",
            &assessment_id.to_string(),
        )
        .await
    }

    async fn unlock_result(
        &self,
        assessment_id: Uuid,
        checkout_session_id: &str,
        unlocked_at: Timestamp,
    ) -> Result<(), StorageError> {
        self.patch(
            tables::ASSESSMENT_RESULTS,
            "assessment_id",
            &assessment_id.to_string(),
            &json!({
                "is_unlocked": true,
                "unlocked_at": unlocked_at,
                "checkout_session_id": checkout_session_id,
            }),
        )
        .await
    }

    async fn upsert_order(&self, order: &Order) -> Result<(), StorageError> {
        let row = order_row(order)?;
        let resp = self.upsert_order_request(&row).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn get_order(&self, checkout_session_id: &str) -> Result<Order, StorageError> {
        self.select_one(
            tables::ORDERS,
            tables::ORDER_CONFLICT_COLUMN,
            checkout_session_id,
        )
        .await
    }

    async fn list_orders(&self, assessment_id: Uuid) -> Result<Vec<Order>, StorageError> {
        self.select_many(
            tables::ORDERS,
            "assessment_id",
            &assessment_id.to_string(),
            "created_at.asc",
        )
        .await
    }

    async fn update_order_status(
        &self,
        checkout_session_id: &str,
        status: OrderStatus,
    ) -> Result<(), StorageError> {
        self.patch(
            tables::ORDERS,
            tables::ORDER_CONFLICT_COLUMN,
            checkout_session_id,
            &json!({ "status": status, "updated_at": Timestamp::now() }),
        )
        .await
    }

    async fn create_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError> {
        self.insert(tables::FRIEND_SHARES, &share.id.to_string(), share)
            .await
    }

    async fn get_friend_share(&self, id: Uuid) -> Result<FriendAssessmentShare, StorageError> {
        self.select_one(tables::FRIEND_SHARES, "id", &id.to_string())
            .await
    }

    async fn update_friend_share(
        &self,
        share: &FriendAssessmentShare,
    ) -> Result<FriendAssessmentShare, StorageError> {
        self.patch_one(tables::FRIEND_SHARES, "id", &share.id.to_string(), share)
            .await
    }

    async fn list_friend_shares(
        &self,
        sender_email: &str,
    ) -> Result<Vec<FriendAssessmentShare>, StorageError> {
        let email = sender_email.trim().to_ascii_lowercase();
        self.select_many(tables::FRIEND_SHARES, "sender_email", &email, "sent_at.desc")
            .await
    }
}
