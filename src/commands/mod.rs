//! Tauri command surface. Thin wrappers: every command borrows the shared
//! [`CrmClient`], runs under its screen's cancellation scope and turns
//! errors into the message the UI shows.

pub mod activities;
pub mod auth;
pub mod card;
pub mod leads;
pub mod tasks;

use tauri::State;

use crate::models::DashboardStats;
use crate::scope::ScopeRegistry;
use crate::CrmClient;

#[tauri::command]
pub async fn dashboard_stats(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
    force: Option<bool>,
) -> Result<DashboardStats, String> {
    let cancel = scopes.token(&scope);
    let dashboard = client.dashboard();
    let result = if force.unwrap_or(false) {
        dashboard.refresh(&cancel).await
    } else {
        dashboard.stats(&cancel).await
    };
    result
        .map(|stats| stats.as_ref().clone())
        .map_err(|e| e.to_string())
}

/// Called when a screen goes away.
#[tauri::command]
pub fn release_scope(scopes: State<'_, ScopeRegistry>, scope: String) -> bool {
    scopes.release(&scope)
}
