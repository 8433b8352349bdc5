use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use mp_core::models::friend_share::FriendAssessmentShare;
use mp_core::models::profile::Profile;
use mp_mail::address::is_valid_email;
use mp_mail::notifications;
use mp_scoring::calculate_profile;
use mp_scoring::compatibility::{compare_profiles, CompatibilityReport};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::routes::questionnaire::AnswersRequest;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewFriendShare {
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub friend_email: String,
    #[serde(default)]
    pub friend_name: String,
    /// Sender's own answers, scored here.
    pub sender_answers: Option<Vec<u8>>,
    /// Or a profile the sender already has.
    pub sender_profile: Option<Profile>,
}

pub async fn create_friend_share(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<NewFriendShare>,
) -> Result<(StatusCode, Json<FriendAssessmentShare>), ApiError> {
    let friend_email = req.friend_email.trim();
    if !is_valid_email(friend_email) {
        return Err(ApiError::BadRequest(format!("invalid friend_email: {friend_email}")));
    }

    let sender_profile = match (req.sender_answers, req.sender_profile) {
        (Some(answers), _) => Some(calculate_profile(&answers)?),
        (None, profile) => profile,
    };

    let share = FriendAssessmentShare::new_sent(
        user.email.as_str(),
        req.sender_name.trim(),
        friend_email,
        req.friend_name.trim(),
        sender_profile,
    );
    let created = state.repo.create_friend_share(&share).await?;
    info!(share_id = %created.id, "friend share created");

    state.notify("share_invitation", |from, links| {
        notifications::share_invitation(from, links, &created)
    });

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_friend_shares(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<FriendAssessmentShare>>, ApiError> {
    Ok(Json(state.repo.list_friend_shares(&user.email).await?))
}

pub async fn get_friend_share(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FriendAssessmentShare>, ApiError> {
    Ok(Json(state.repo.get_friend_share(id).await?))
}

/// Friend submission. Unlocks the comparison without payment.
pub async fn complete_friend_share(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<AnswersRequest>,
) -> Result<Json<FriendAssessmentShare>, ApiError> {
    let mut share = state.repo.get_friend_share(id).await?;
    if share.friend_profile.is_some() {
        return Err(ApiError::Conflict(format!("friend share {id} is already completed")));
    }

    share.complete(calculate_profile(&req.answers)?);
    let share = state.repo.update_friend_share(&share).await?;
    info!(share_id = %id, "friend share completed");

    state.notify("share_completed", |from, links| {
        notifications::share_completed(from, links, &share)
    });

    Ok(Json(share))
}

pub async fn get_compatibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompatibilityReport>, ApiError> {
    let share = state.repo.get_friend_share(id).await?;
    match (&share.sender_profile, &share.friend_profile) {
        (Some(sender), Some(friend)) if share.is_unlocked => {
            Ok(Json(compare_profiles(sender, friend)))
        }
        _ => Err(ApiError::Conflict(format!(
            "friend share {id} needs both profiles before comparing"
        ))),
    }
}
