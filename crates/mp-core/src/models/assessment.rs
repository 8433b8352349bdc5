use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// One invitee's questionnaire, shared by an advisor.
///
/// Owned by the advisor. Moves from `Sent` to `Completed` when the invitee
/// submits answers, and gains `is_paid` only through a verified payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Assessment {
    pub id: Uuid,
    pub advisor_email: String,
    pub advisor_name: String,
    pub client_email: String,
    pub client_name: String,
    pub status: AssessmentStatus,
    pub sent_at: jiff::Timestamp,
    pub completed_at: Option<jiff::Timestamp>,
    #[serde(default)]
    pub is_paid: bool,
    pub paid_at: Option<jiff::Timestamp>,
    pub last_checkout_session_id: Option<String>,
}

impl Assessment {
    /// A freshly shared assessment awaiting the invitee. Emails are stored
    /// trimmed and lowercased.
    pub fn new_sent(
        advisor_email: impl Into<String>,
        advisor_name: impl Into<String>,
        client_email: impl Into<String>,
        client_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            advisor_email: normalize_email(&advisor_email.into()),
            advisor_name: advisor_name.into(),
            client_email: normalize_email(&client_email.into()),
            client_name: client_name.into(),
            status: AssessmentStatus::Sent,
            sent_at: jiff::Timestamp::now(),
            completed_at: None,
            is_paid: false,
            paid_at: None,
            last_checkout_session_id: None,
        }
    }

    /// Case-insensitive ownership check against an advisor email.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.advisor_email.trim().eq_ignore_ascii_case(email.trim())
    }

    pub fn is_completed(&self) -> bool {
        self.status == AssessmentStatus::Completed
    }
}

/// Advisor-editable columns. Unset fields are left out of the serialized
/// form so a write touches only what changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
}

impl AssessmentDetails {
    pub fn is_empty(&self) -> bool {
        self.advisor_name.is_none() && self.client_name.is_none() && self.client_email.is_none()
    }

    /// Copy the set fields onto `assessment`.
    pub fn apply_to(&self, assessment: &mut Assessment) {
        if let Some(name) = &self.advisor_name {
            assessment.advisor_name = name.clone();
        }
        if let Some(name) = &self.client_name {
            assessment.client_name = name.clone();
        }
        if let Some(email) = &self.client_email {
            assessment.client_email = email.clone();
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AssessmentStatus {
    Sent,
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentStatus::Sent => "sent",
            AssessmentStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for AssessmentStatus {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(AssessmentStatus::Sent),
            "completed" => Ok(AssessmentStatus::Completed),
            other => Err(crate::error::CoreError::InvalidStatus(other.to_string())),
        }
    }
}
