use axum::Json;
use serde::{Deserialize, Serialize};

use mp_core::models::profile::Profile;
use mp_scoring::compatibility::{compare_profiles, CompatibilityReport};
use mp_scoring::questionnaire::MoneyPersonality;
use mp_scoring::scoring::{QuestionGroup, LIKERT_MAX, LIKERT_MIN};
use mp_scoring::{calculate_profile, Questionnaire};

use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Serialize)]
pub struct QuestionnaireDetail {
    id: String,
    name: String,
    question_count: usize,
    likert_min: u8,
    likert_max: u8,
    groups: Vec<QuestionGroup>,
}

#[derive(Deserialize)]
pub struct AnswersRequest {
    pub answers: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    pub profile_a: Profile,
    pub profile_b: Profile,
}

pub async fn get_questions() -> Json<QuestionnaireDetail> {
    let q = MoneyPersonality;
    Json(QuestionnaireDetail {
        id: q.id().to_string(),
        name: q.name().to_string(),
        question_count: q.question_count(),
        likert_min: LIKERT_MIN,
        likert_max: LIKERT_MAX,
        groups: q.groups().to_vec(),
    })
}

pub async fn score_profile(
    ApiJson(req): ApiJson<AnswersRequest>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(calculate_profile(&req.answers)?))
}

pub async fn compare(
    ApiJson(req): ApiJson<CompatibilityRequest>,
) -> Json<CompatibilityReport> {
    Json(compare_profiles(&req.profile_a, &req.profile_b))
}
