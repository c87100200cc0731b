use reqwest::Method;
use tokio_util::sync::CancellationToken;

use super::{cancellable, Gateway};
use crate::error::{Result, StrikeError};
use crate::models::{BusinessCard, CardDraft};

impl Gateway {
    /// The signed-in user's card, `None` until one has been saved.
    pub async fn get_business_card(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<BusinessCard>> {
        let builder = self.authed(Method::GET, "/api/business-card")?;
        log::debug!("GET /api/business-card");
        let fetched = cancellable(cancel, Self::execute_json::<Option<BusinessCard>>(builder)).await;
        match fetched {
            Err(StrikeError::Api { status: 404, .. }) => Ok(None),
            other => other,
        }
    }

    /// Creates or replaces the card.
    pub async fn save_business_card(&self, draft: &CardDraft) -> Result<BusinessCard> {
        self.send_json(Method::POST, "/api/business-card", draft)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::gateway_for;
    use super::*;

    #[tokio::test]
    async fn missing_card_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/business-card")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Business card not found"}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server).await;
        let card = gateway
            .get_business_card(&CancellationToken::new())
            .await
            .unwrap();
        assert!(card.is_none());
    }

    #[tokio::test]
    async fn null_card_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/business-card")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("null")
            .create_async()
            .await;

        let gateway = gateway_for(&server).await;
        let card = gateway
            .get_business_card(&CancellationToken::new())
            .await
            .unwrap();
        assert!(card.is_none());
    }

    #[tokio::test]
    async fn decodes_saved_card() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/business-card")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": "c1", "name": "Amy Pond", "title": "CEO", "company": "Acme",
                    "phone": "+1 555 0100", "email": "amy@acme.test", "website": null,
                    "template": "professional", "qr_code": null, "user_id": "u1",
                    "created_at": "2024-05-01T09:00:00"}"#,
            )
            .create_async()
            .await;

        let gateway = gateway_for(&server).await;
        let card = gateway
            .get_business_card(&CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(card.full_name, "Amy Pond");
        assert_eq!(card.job_title.as_deref(), Some("CEO"));
        assert_eq!(card.template, crate::models::CardTemplate::Professional);
    }
}
