//! Screen lifetimes. Every request a screen starts runs under that screen's
//! token; leaving the screen cancels them all.

use parking_lot::Mutex;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub struct ScopeRegistry {
    scopes: Mutex<HashMap<String, CancellationToken>>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live token for `scope`, created on first use.
    pub fn token(&self, scope: &str) -> CancellationToken {
        let mut scopes = self.scopes.lock();
        match scopes.get(scope) {
            Some(token) if !token.is_cancelled() => token.clone(),
            _ => {
                let token = CancellationToken::new();
                scopes.insert(scope.to_string(), token.clone());
                token
            }
        }
    }

    /// Cancels everything in flight for `scope`. Returns whether it existed.
    pub fn release(&self, scope: &str) -> bool {
        match self.scopes.lock().remove(scope) {
            Some(token) => {
                log::debug!("Releasing scope {}", scope);
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn release_all(&self) {
        for (_, token) in self.scopes.lock().drain() {
            token.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_scope_shares_a_token() {
        let registry = ScopeRegistry::new();
        let a = registry.token("leads");
        let b = registry.token("leads");
        let other = registry.token("tasks");
        registry.release("leads");
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert!(!other.is_cancelled());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn released_scope_gets_a_fresh_token() {
        let registry = ScopeRegistry::new();
        let first = registry.token("lead:abc");
        assert!(registry.release("lead:abc"));
        assert!(!registry.release("lead:abc"));
        let second = registry.token("lead:abc");
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn release_all_cancels_everything() {
        let registry = ScopeRegistry::new();
        let a = registry.token("a");
        let b = registry.token("b");
        registry.release_all();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn release_interrupts_a_waiting_request() {
        let registry = ScopeRegistry::new();
        let token = registry.token("dashboard");
        let waiter = tokio::spawn(async move {
            crate::gateway::cancellable(&token, std::future::pending::<crate::Result<()>>()).await
        });
        tokio::task::yield_now().await;
        registry.release("dashboard");
        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(crate::StrikeError::Cancelled)));
    }
}
