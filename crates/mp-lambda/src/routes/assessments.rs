use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use mp_core::models::assessment::{normalize_email, Assessment, AssessmentDetails};
use mp_core::models::result::{AssessmentResult, ResultPreview};
use mp_mail::address::is_valid_email;
use mp_mail::notifications;
use mp_scoring::calculate_profile;
use mp_storage::error::StorageError;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::routes::questionnaire::AnswersRequest;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewAssessment {
    #[serde(default)]
    pub advisor_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_name: String,
}

/// Fields an advisor may edit after sharing.
#[derive(Deserialize)]
pub struct AssessmentUpdate {
    pub advisor_name: Option<String>,
    pub client_email: Option<String>,
    pub client_name: Option<String>,
}

/// Full result once paid, otherwise the redacted preview.
#[derive(Serialize)]
#[serde(untagged)]
pub enum ResultView {
    Full(AssessmentResult),
    Preview(ResultPreview),
}

async fn load_owned(state: &AppState, id: Uuid, user: &AuthUser) -> Result<Assessment, ApiError> {
    let assessment = state.repo.get_assessment(id).await?;
    if !assessment.is_owned_by(&user.email) {
        return Err(ApiError::Forbidden(format!("assessment {id} belongs to another advisor")));
    }
    Ok(assessment)
}

pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Assessment>>, ApiError> {
    Ok(Json(state.repo.list_assessments(&user.email).await?))
}

pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Assessment>, ApiError> {
    Ok(Json(load_owned(&state, id, &user).await?))
}

pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<NewAssessment>,
) -> Result<(StatusCode, Json<Assessment>), ApiError> {
    let client_email = req.client_email.trim();
    if !is_valid_email(client_email) {
        return Err(ApiError::BadRequest(format!("invalid client_email: {client_email}")));
    }

    let assessment = Assessment::new_sent(
        user.email.as_str(),
        req.advisor_name.trim(),
        client_email,
        req.client_name.trim(),
    );
    let created = state.repo.create_assessment(&assessment).await?;
    info!(assessment_id = %created.id, "assessment shared");

    state.notify("assessment_invitation", |from, links| {
        notifications::assessment_invitation(from, links, &created)
    });

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(update): ApiJson<AssessmentUpdate>,
) -> Result<Json<Assessment>, ApiError> {
    let assessment = load_owned(&state, id, &user).await?;

    let mut details = AssessmentDetails {
        advisor_name: update.advisor_name.map(|n| n.trim().to_string()),
        client_name: update.client_name.map(|n| n.trim().to_string()),
        client_email: None,
    };
    if let Some(email) = update.client_email {
        if assessment.is_completed() {
            return Err(ApiError::Conflict(
                "client_email cannot change after completion".to_string(),
            ));
        }
        if !is_valid_email(email.trim()) {
            return Err(ApiError::BadRequest(format!("invalid client_email: {email}")));
        }
        details.client_email = Some(normalize_email(&email));
    }

    Ok(Json(state.repo.update_assessment_details(id, &details).await?))
}

pub async fn delete_assessment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    load_owned(&state, id, &user).await?;
    state.repo.delete_assessment(id).await?;
    info!(assessment_id = %id, "assessment deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultView>, ApiError> {
    let assessment = load_owned(&state, id, &user).await?;
    let result = state.repo.get_result_by_assessment(id).await?;

    if result.is_unlocked && assessment.is_paid {
        Ok(Json(ResultView::Full(result)))
    } else {
        Ok(Json(ResultView::Preview(result.preview())))
    }
}

/// Invitee submission: score the answers, store the locked result, mark the
/// assessment completed and tell the advisor.
///
/// A submission whose result was stored but whose status write failed is
/// finished by the next attempt instead of being rejected.
pub async fn complete_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<AnswersRequest>,
) -> Result<Json<ResultPreview>, ApiError> {
    let assessment = state.repo.get_assessment(id).await?;
    if assessment.is_completed() {
        return Err(ApiError::Conflict(format!("assessment {id} is already completed")));
    }

    let profile = calculate_profile(&req.answers)?;
    let result = AssessmentResult::new_locked(id, profile, req.answers);
    let result = match state.repo.insert_result(&result).await {
        Ok(r) => r,
        Err(StorageError::Conflict { .. }) => {
            warn!(assessment_id = %id, "result already stored, finishing completion");
            state.repo.get_result_by_assessment(id).await?
        }
        Err(e) => return Err(e.into()),
    };

    let assessment = state
        .repo
        .mark_assessment_completed(id, jiff::Timestamp::now())
        .await?;
    info!(assessment_id = %id, personalities = ?result.profile.personalities, "assessment completed");

    state.notify("completion_notice", |from, links| {
        notifications::completion_notice(from, links, &assessment)
    });

    Ok(Json(result.preview()))
}
