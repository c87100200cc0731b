use reqwest::Method;
use tokio_util::sync::CancellationToken;

use super::Gateway;
use crate::error::Result;
use crate::models::{Activity, ActivityDraft};

impl Gateway {
    pub async fn list_activities(
        &self,
        lead_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Activity>> {
        self.get_json(&format!("/api/leads/{}/activities", lead_id), &[], cancel)
            .await
    }

    pub async fn create_activity(&self, draft: &ActivityDraft) -> Result<Activity> {
        self.send_json(Method::POST, "/api/activities", draft).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::gateway_for;
    use super::*;
    use crate::models::ActivityType;

    #[tokio::test]
    async fn posts_activity_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/activities")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "lead_id": "l1",
                "activity_type": "call",
                "content": "Left voicemail",
                "outcome": "voicemail",
                "duration": 2
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": "a1", "lead_id": "l1", "activity_type": "call",
                    "content": "Left voicemail", "outcome": "voicemail", "duration": 2,
                    "created_at": "2024-05-02T10:00:00"}"#,
            )
            .create_async()
            .await;

        let gateway = gateway_for(&server).await;
        let activity = gateway
            .create_activity(&ActivityDraft {
                lead_id: "l1".to_string(),
                activity_type: ActivityType::Call,
                content: "Left voicemail".to_string(),
                outcome: Some("voicemail".to_string()),
                duration: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(activity.id, "a1");
        mock.assert_async().await;
    }
}
