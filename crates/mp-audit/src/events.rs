use serde::Serialize;
use tracing::info;

/// A structured audit event for a state-changing action.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    /// Email or subject of whoever caused the change.
    pub actor: String,
    pub occurred_at: jiff::Timestamp,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            actor: actor.into(),
            occurred_at: jiff::Timestamp::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        let details = self
            .details
            .as_ref()
            .map(serde_json::Value::to_string)
            .unwrap_or_default();
        info!(
            audit.action = %self.action,
            audit.resource_type = %self.resource_type,
            audit.resource_id = %self.resource_id,
            audit.actor = %self.actor,
            audit.details = %details,
            "audit event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_details() {
        let event = AuditEvent::new("assessment_unlocked", "assessment", "a-1", "adv@firm.com")
            .with_details(serde_json::json!({ "checkout_session_id": "cs_1" }));

        assert_eq!(event.action, "assessment_unlocked");
        assert_eq!(event.details.unwrap()["checkout_session_id"], "cs_1");
    }

    #[test]
    fn serializes_with_timestamp() {
        let event = AuditEvent::new("share_completed", "friend_share", "s-1", "pal@x.io");
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["occurred_at"].is_string());
        assert!(json["details"].is_null());
    }
}
