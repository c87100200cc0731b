use tauri::State;

use crate::models::{Activity, ActivityDraft};
use crate::scope::ScopeRegistry;
use crate::CrmClient;

#[tauri::command]
pub async fn list_activities(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
    lead_id: String,
) -> Result<Vec<Activity>, String> {
    let cancel = scopes.token(&scope);
    client
        .activities()
        .fetch(&lead_id, &cancel)
        .await
        .map(|items| items.to_vec())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn log_activity(
    client: State<'_, CrmClient>,
    draft: ActivityDraft,
) -> Result<Activity, String> {
    client.activities().log(draft).await.map_err(|e| e.to_string())
}
