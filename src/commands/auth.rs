use tauri::State;

use crate::models::{AuthResponse, Credentials, Registration, User};
use crate::scope::ScopeRegistry;
use crate::CrmClient;

#[tauri::command]
pub async fn login(
    client: State<'_, CrmClient>,
    credentials: Credentials,
) -> Result<AuthResponse, String> {
    client.login(&credentials).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn register(
    client: State<'_, CrmClient>,
    registration: Registration,
) -> Result<AuthResponse, String> {
    client
        .register(&registration)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn current_user(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
) -> Result<User, String> {
    let cancel = scopes.token(&scope);
    client.me(&cancel).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn bootstrap(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
) -> Result<(), String> {
    let cancel = scopes.token(&scope);
    client.bootstrap(&cancel).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub fn logout(client: State<'_, CrmClient>, scopes: State<'_, ScopeRegistry>) {
    scopes.release_all();
    client.logout();
}
