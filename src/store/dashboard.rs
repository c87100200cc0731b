use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::models::DashboardStats;

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub stats: Option<Arc<DashboardStats>>,
    /// Invalidation generation the stats were fetched at.
    generation: u64,
}

/// Cached dashboard aggregate. Lead, activity and task mutations call
/// [`DashboardStore::invalidate`]; the next read refetches.
#[derive(Clone)]
pub struct DashboardStore {
    gateway: Gateway,
    state: Arc<watch::Sender<DashboardState>>,
    generation: Arc<AtomicU64>,
}

impl DashboardStore {
    pub fn new(gateway: Gateway) -> Self {
        let (tx, _) = watch::channel(DashboardState::default());
        Self {
            gateway,
            state: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn cached(&self) -> Option<Arc<DashboardStats>> {
        self.state.borrow().stats.clone()
    }

    pub fn is_fresh(&self) -> bool {
        let state = self.state.borrow();
        state.stats.is_some() && state.generation == self.generation.load(Ordering::SeqCst)
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Cached stats when fresh, otherwise a refetch.
    pub async fn stats(&self, cancel: &CancellationToken) -> Result<Arc<DashboardStats>> {
        if self.is_fresh() {
            if let Some(stats) = self.cached() {
                return Ok(stats);
            }
        }
        self.refresh(cancel).await
    }

    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<Arc<DashboardStats>> {
        // An invalidation that lands while the request is in flight leaves the result stale
        let generation = self.generation.load(Ordering::SeqCst);
        let stats = Arc::new(self.gateway.dashboard_stats(cancel).await?);
        self.state.send_replace(DashboardState {
            stats: Some(stats.clone()),
            generation,
        });
        Ok(stats)
    }

    pub fn clear(&self) {
        self.state.send_replace(DashboardState::default());
        self.invalidate();
    }
}
