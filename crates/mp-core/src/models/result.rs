use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::profile::Profile;

/// The scored outcome of a completed assessment. 1:1 with its assessment.
///
/// Created locked; only a verified payment event unlocks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssessmentResult {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub profile: Profile,
    pub answers: Vec<u8>,
    pub advisor_summary: Option<String>,
    #[serde(default)]
    pub is_unlocked: bool,
    pub unlocked_at: Option<jiff::Timestamp>,
    pub checkout_session_id: Option<String>,
}

impl AssessmentResult {
    pub fn new_locked(assessment_id: Uuid, profile: Profile, answers: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessment_id,
            profile,
            answers,
            advisor_summary: None,
            is_unlocked: false,
            unlocked_at: None,
            checkout_session_id: None,
        }
    }

    /// What an advisor may see before paying: the personality tags only.
    pub fn preview(&self) -> ResultPreview {
        ResultPreview {
            assessment_id: self.assessment_id,
            personalities: self.profile.personalities.clone(),
            is_unlocked: self.is_unlocked,
        }
    }
}

/// Redacted view of a locked result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultPreview {
    pub assessment_id: Uuid,
    pub personalities: Vec<String>,
    pub is_unlocked: bool,
}
