use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::assessment::{normalize_email, AssessmentStatus};
use super::profile::Profile;

/// Peer-to-peer invitation: one user asks a friend to take the assessment
/// so the two profiles can be compared. No payment gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FriendAssessmentShare {
    pub id: Uuid,
    pub sender_email: String,
    pub sender_name: String,
    pub friend_email: String,
    pub friend_name: String,
    pub status: AssessmentStatus,
    pub sent_at: jiff::Timestamp,
    pub completed_at: Option<jiff::Timestamp>,
    pub sender_profile: Option<Profile>,
    pub friend_profile: Option<Profile>,
    #[serde(default)]
    pub is_unlocked: bool,
}

impl FriendAssessmentShare {
    pub fn new_sent(
        sender_email: impl Into<String>,
        sender_name: impl Into<String>,
        friend_email: impl Into<String>,
        friend_name: impl Into<String>,
        sender_profile: Option<Profile>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_email: normalize_email(&sender_email.into()),
            sender_name: sender_name.into(),
            friend_email: normalize_email(&friend_email.into()),
            friend_name: friend_name.into(),
            status: AssessmentStatus::Sent,
            sent_at: jiff::Timestamp::now(),
            completed_at: None,
            sender_profile,
            friend_profile: None,
            is_unlocked: false,
        }
    }

    /// Record the friend's profile. Completion unlocks unconditionally.
    pub fn complete(&mut self, friend_profile: Profile) {
        let now = jiff::Timestamp::now();
        self.friend_profile = Some(friend_profile);
        self.status = AssessmentStatus::Completed;
        self.completed_at = Some(now);
        self.is_unlocked = true;
    }
}
