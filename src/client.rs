use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::error::Result;
use crate::gateway::Gateway;
use crate::models::{AuthResponse, Credentials, Registration, User};
use crate::store::{ActivityStore, CardStore, DashboardStore, LeadStore, TaskStore};

/// Everything a signed-in session shares: one gateway and one cache per
/// resource. Cloning is cheap and every clone sees the same state.
#[derive(Clone)]
pub struct CrmClient {
    gateway: Gateway,
    leads: LeadStore,
    activities: ActivityStore,
    tasks: TaskStore,
    dashboard: DashboardStore,
    cards: CardStore,
}

impl CrmClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self::with_gateway(Gateway::new(config)?))
    }

    /// Client configured from `config.json` in the per-user config
    /// directory, for use outside the app shell.
    pub fn from_default_config() -> Result<Self> {
        Self::new(&AppConfig::load_default())
    }

    pub fn with_gateway(gateway: Gateway) -> Self {
        let dashboard = DashboardStore::new(gateway.clone());
        let leads = LeadStore::new(gateway.clone(), dashboard.clone());
        Self {
            activities: ActivityStore::new(gateway.clone(), leads.clone(), dashboard.clone()),
            tasks: TaskStore::new(gateway.clone(), dashboard.clone()),
            cards: CardStore::new(gateway.clone()),
            leads,
            dashboard,
            gateway,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn leads(&self) -> &LeadStore {
        &self.leads
    }

    pub fn activities(&self) -> &ActivityStore {
        &self.activities
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn dashboard(&self) -> &DashboardStore {
        &self.dashboard
    }

    pub fn cards(&self) -> &CardStore {
        &self.cards
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.reset();
        self.gateway.login(credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        self.reset();
        self.gateway.register(registration).await
    }

    pub async fn me(&self, cancel: &CancellationToken) -> Result<User> {
        self.gateway.me(cancel).await
    }

    /// Drops the token and every cached record of the previous user.
    pub fn logout(&self) {
        self.gateway.logout();
        self.reset();
        log::info!("Signed out");
    }

    fn reset(&self) {
        self.leads.clear();
        self.activities.clear();
        self.tasks.clear();
        self.dashboard.clear();
        self.cards.clear();
    }

    /// First load after sign-in: leads and dashboard in parallel.
    pub async fn bootstrap(&self, cancel: &CancellationToken) -> Result<()> {
        let (leads, _) = futures::try_join!(
            self.leads.fetch(cancel),
            self.dashboard.refresh(cancel)
        )?;
        log::info!("Bootstrapped with {} leads", leads.len());
        Ok(())
    }
}
