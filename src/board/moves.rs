use serde::{Deserialize, Serialize};

use crate::error::{Result, StrikeError};
use crate::models::{DealStatus, Lead, LeadPatch, LeadStage};
use crate::store::LeadStore;

/// What a drop onto a column turned into.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardMove {
    /// Dropped back on its own column.
    Unchanged { lead_id: String },
    Moved {
        lead_id: String,
        from: LeadStage,
        to: LeadStage,
    },
    /// Now in Closed; the caller should ask whether the deal was won or lost
    /// and pass the answer to [`record_deal_outcome`].
    NeedsDealOutcome { lead_id: String, from: LeadStage },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealOutcome {
    pub status: DealStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn move_lead(store: &LeadStore, lead_id: &str, to: LeadStage) -> Result<BoardMove> {
    if !to.is_known() {
        return Err(StrikeError::Invalid(format!("Unknown stage \"{}\"", to)));
    }
    let lead = store
        .local(lead_id)
        .ok_or_else(|| StrikeError::NotFound(format!("lead {}", lead_id)))?;
    if lead.stage == to {
        return Ok(BoardMove::Unchanged {
            lead_id: lead.id,
        });
    }

    store.update_stage(lead_id, to.clone()).await?;
    Ok(if to.is_terminal() {
        BoardMove::NeedsDealOutcome {
            lead_id: lead.id,
            from: lead.stage,
        }
    } else {
        BoardMove::Moved {
            lead_id: lead.id,
            from: lead.stage,
            to,
        }
    })
}

fn outcome_note(outcome: &DealOutcome) -> Option<String> {
    let text = outcome.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
    let verb = match outcome.status {
        DealStatus::Won => "won",
        DealStatus::Lost => "lost",
    };
    Some(format!("Deal {}: {}", verb, text))
}

/// Stores won/lost on a closed lead. Outcome notes are appended to the
/// lead's existing notes, never replacing them.
pub async fn record_deal_outcome(
    store: &LeadStore,
    lead_id: &str,
    outcome: DealOutcome,
) -> Result<Lead> {
    let lead = store
        .local(lead_id)
        .ok_or_else(|| StrikeError::NotFound(format!("lead {}", lead_id)))?;
    if !lead.stage.is_terminal() {
        return Err(StrikeError::Invalid(
            "Only closed leads can have a deal outcome".to_string(),
        ));
    }

    let notes = outcome_note(&outcome).map(|note| match lead.notes.as_deref() {
        Some(existing) if !existing.trim().is_empty() => format!("{}\n\n{}", existing, note),
        _ => note,
    });
    let patch = LeadPatch {
        deal_status: Some(outcome.status),
        notes,
        ..Default::default()
    };
    log::info!("Recording deal {:?} for lead {}", outcome.status, lead_id);
    store.update(lead_id, patch).await
}
