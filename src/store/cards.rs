use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::card::CardShare;
use crate::error::{Result, StrikeError};
use crate::gateway::Gateway;
use crate::models::{BusinessCard, CardDraft};

#[derive(Debug, Clone, Default)]
pub struct CardState {
    pub loaded: bool,
    pub card: Option<BusinessCard>,
}

/// The signed-in user's business card.
#[derive(Clone)]
pub struct CardStore {
    gateway: Gateway,
    state: Arc<watch::Sender<CardState>>,
}

impl CardStore {
    pub fn new(gateway: Gateway) -> Self {
        let (tx, _) = watch::channel(CardState::default());
        Self {
            gateway,
            state: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CardState> {
        self.state.subscribe()
    }

    pub fn cached(&self) -> Option<BusinessCard> {
        self.state.borrow().card.clone()
    }

    pub async fn get(&self, cancel: &CancellationToken) -> Result<Option<BusinessCard>> {
        if self.state.borrow().loaded {
            return Ok(self.cached());
        }
        self.refresh(cancel).await
    }

    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<Option<BusinessCard>> {
        let card = self.gateway.get_business_card(cancel).await?;
        self.state.send_replace(CardState {
            loaded: true,
            card: card.clone(),
        });
        Ok(card)
    }

    /// Saved only after the server confirms; the backend keeps one card per user.
    pub async fn save(&self, draft: CardDraft) -> Result<BusinessCard> {
        draft.validate()?;
        let card = self.gateway.save_business_card(&draft).await?;
        self.state.send_replace(CardState {
            loaded: true,
            card: Some(card.clone()),
        });
        log::info!("Business card saved ({})", card.template.as_str());
        Ok(card)
    }

    /// vCard payload and QR renderings of the current card.
    pub async fn share(&self, cancel: &CancellationToken) -> Result<CardShare> {
        let card = self
            .get(cancel)
            .await?
            .ok_or_else(|| StrikeError::NotFound("business card".to_string()))?;
        CardShare::for_card(&card)
    }

    pub fn clear(&self) {
        self.state.send_replace(CardState::default());
    }
}
