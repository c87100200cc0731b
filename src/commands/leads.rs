use chrono::Utc;
use serde::Serialize;
use tauri::State;

use crate::board::{
    self, Board, BoardMove, CompactCard, CompactView, DealOutcome, DetailCard, DetailView,
    PipelineBoard,
};
use crate::config::commands::ConfigState;
use crate::models::{Lead, LeadDraft, LeadPatch, LeadStage};
use crate::scope::ScopeRegistry;
use crate::views::{stage_counts, LeadQuery};
use crate::CrmClient;

#[tauri::command]
pub async fn list_leads(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
) -> Result<Vec<Lead>, String> {
    let cancel = scopes.token(&scope);
    let leads = client.leads().fetch(&cancel).await.map_err(|e| e.to_string())?;
    Ok(leads.to_vec())
}

/// The cached list through a filter and sort, without a round trip.
#[tauri::command]
pub fn query_leads(client: State<'_, CrmClient>, query: Option<LeadQuery>) -> Vec<Lead> {
    let snapshot = client.leads().snapshot();
    query
        .unwrap_or_default()
        .apply(&snapshot.items)
        .into_iter()
        .cloned()
        .collect()
}

#[derive(Serialize)]
pub struct StageCount {
    stage: LeadStage,
    count: usize,
}

#[tauri::command]
pub fn lead_stage_counts(client: State<'_, CrmClient>) -> Vec<StageCount> {
    stage_counts(&client.leads().snapshot().items)
        .into_iter()
        .map(|(stage, count)| StageCount { stage, count })
        .collect()
}

#[tauri::command]
pub async fn get_lead(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
    id: String,
) -> Result<Lead, String> {
    let cancel = scopes.token(&scope);
    client.leads().get(&id, &cancel).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn create_lead(client: State<'_, CrmClient>, draft: LeadDraft) -> Result<Lead, String> {
    client.leads().create(draft).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_lead(
    client: State<'_, CrmClient>,
    id: String,
    patch: LeadPatch,
) -> Result<Lead, String> {
    client
        .leads()
        .update(&id, patch)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_lead_stage(
    client: State<'_, CrmClient>,
    id: String,
    stage: LeadStage,
) -> Result<(), String> {
    client
        .leads()
        .update_stage(&id, stage)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_lead(client: State<'_, CrmClient>, id: String) -> Result<(), String> {
    client.leads().delete(&id).await.map_err(|e| e.to_string())
}

fn currency(config: &ConfigState) -> String {
    config.lock().default_currency.clone()
}

#[tauri::command]
pub fn compact_board(
    client: State<'_, CrmClient>,
    config: State<'_, ConfigState>,
    query: Option<LeadQuery>,
) -> Board<CompactView> {
    PipelineBoard::new(CompactCard, currency(&config))
        .with_query(query.unwrap_or_default())
        .build(&client.leads().snapshot().items)
}

#[tauri::command]
pub fn detail_board(
    client: State<'_, CrmClient>,
    config: State<'_, ConfigState>,
    query: Option<LeadQuery>,
) -> Board<DetailView> {
    let currency = currency(&config);
    PipelineBoard::new(DetailCard::at(currency.clone(), Utc::now()), currency)
        .with_query(query.unwrap_or_default())
        .build(&client.leads().snapshot().items)
}

#[tauri::command]
pub async fn move_lead(
    client: State<'_, CrmClient>,
    id: String,
    stage: LeadStage,
) -> Result<BoardMove, String> {
    board::move_lead(client.leads(), &id, stage)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn record_deal_outcome(
    client: State<'_, CrmClient>,
    id: String,
    outcome: DealOutcome,
) -> Result<Lead, String> {
    board::record_deal_outcome(client.leads(), &id, outcome)
        .await
        .map_err(|e| e.to_string())
}
