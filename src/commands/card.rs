use tauri::State;

use crate::card::CardShare;
use crate::models::{BusinessCard, CardDraft};
use crate::scope::ScopeRegistry;
use crate::CrmClient;

#[tauri::command]
pub async fn get_business_card(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
) -> Result<Option<BusinessCard>, String> {
    let cancel = scopes.token(&scope);
    client.cards().get(&cancel).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_business_card(
    client: State<'_, CrmClient>,
    draft: CardDraft,
) -> Result<BusinessCard, String> {
    client.cards().save(draft).await.map_err(|e| e.to_string())
}

/// vCard text plus QR images, ready for the share sheet.
#[tauri::command]
pub async fn share_business_card(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
) -> Result<CardShare, String> {
    let cancel = scopes.token(&scope);
    client.cards().share(&cancel).await.map_err(|e| e.to_string())
}
