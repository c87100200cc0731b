pub mod board;
pub mod card;
mod client;
pub mod config;
pub mod contact;
pub mod error;
pub mod gateway;
pub mod models;
pub mod scope;
pub mod store;
pub mod views;

#[cfg(feature = "desktop")]
mod commands;

pub use client::CrmClient;
pub use error::{Result, StrikeError};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tauri::{Emitter, Manager};
    use tokio_stream::StreamExt;

    env_logger::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .setup(|app| {
            // ─── State Management ────────────────────────────────────────
            let app_data = app.path().app_data_dir()?;
            std::fs::create_dir_all(&app_data).ok();

            let app_config = config::AppConfig::load(&app_data);
            let client = CrmClient::new(&app_config)?;
            log::info!("Backend at {}", client.gateway().base_url());

            app.manage::<config::commands::ConfigState>(Arc::new(Mutex::new(app_config)));
            app.manage(scope::ScopeRegistry::new());
            app.manage(client.clone());

            // ─── Lead change feed ────────────────────────────────────────
            let handle = app.handle().clone();
            let mut snapshots = client.leads().collection().stream();
            tauri::async_runtime::spawn(async move {
                while let Some(snapshot) = snapshots.next().await {
                    if let Err(e) = handle.emit("leads-changed", snapshot.items.as_ref()) {
                        log::warn!("Failed to emit leads-changed: {}", e);
                    }
                }
            });

            log::info!("Strike initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Config
            config::commands::get_config,
            config::commands::update_config,
            // Session
            commands::auth::login,
            commands::auth::register,
            commands::auth::current_user,
            commands::auth::bootstrap,
            commands::auth::logout,
            // Leads
            commands::leads::list_leads,
            commands::leads::query_leads,
            commands::leads::lead_stage_counts,
            commands::leads::get_lead,
            commands::leads::create_lead,
            commands::leads::update_lead,
            commands::leads::update_lead_stage,
            commands::leads::delete_lead,
            // Pipeline board
            commands::leads::compact_board,
            commands::leads::detail_board,
            commands::leads::move_lead,
            commands::leads::record_deal_outcome,
            // Activities
            commands::activities::list_activities,
            commands::activities::log_activity,
            // Tasks
            commands::tasks::list_tasks,
            commands::tasks::list_lead_tasks,
            commands::tasks::overdue,
            commands::tasks::create_task,
            commands::tasks::update_task,
            commands::tasks::set_task_status,
            commands::tasks::delete_task,
            // Business card
            commands::card::get_business_card,
            commands::card::save_business_card,
            commands::card::share_business_card,
            // Dashboard
            commands::dashboard_stats,
            // Device
            contact::commands::dial,
            contact::commands::compose_email,
            commands::release_scope,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Strike");
}
