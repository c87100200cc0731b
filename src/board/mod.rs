//! The pipeline board: five stage columns of rendered lead cards.
//!
//! One board, many looks. How a lead turns into a card is the
//! [`CardRenderer`]'s business; the board only groups, filters, sorts and
//! totals.

pub mod format;
pub mod moves;
pub mod renderers;

use serde::Serialize;

use crate::models::{Lead, LeadStage};
use crate::views::{aggregate_value, group_by_stage, ungrouped, LeadQuery};

pub use moves::{move_lead, record_deal_outcome, BoardMove, DealOutcome};
pub use renderers::{CompactCard, CompactView, DetailCard, DetailView};

/// Turns a lead into whatever a board column displays for it.
pub trait CardRenderer {
    type Card: Serialize;

    fn render(&self, lead: &Lead) -> Self::Card;
}

#[derive(Debug, Clone, Serialize)]
pub struct StageColumn<C> {
    pub stage: LeadStage,
    pub title: String,
    pub count: usize,
    pub total_value: f64,
    pub value_label: String,
    pub cards: Vec<C>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Board<C> {
    pub columns: Vec<StageColumn<C>>,
    /// Ids of matching leads whose stage is not one of the five.
    pub hidden: Vec<String>,
    pub total_value: f64,
}

impl<C> Board<C> {
    pub fn column(&self, stage: &LeadStage) -> Option<&StageColumn<C>> {
        self.columns.iter().find(|c| &c.stage == stage)
    }
}

pub struct PipelineBoard<R> {
    renderer: R,
    currency: String,
    query: LeadQuery,
}

impl<R: CardRenderer> PipelineBoard<R> {
    pub fn new(renderer: R, currency: impl Into<String>) -> Self {
        Self {
            renderer,
            currency: currency.into(),
            query: LeadQuery::default(),
        }
    }

    pub fn with_query(mut self, query: LeadQuery) -> Self {
        self.query = query;
        self
    }

    pub fn build(&self, leads: &[Lead]) -> Board<R::Card> {
        let visible = self.query.apply(leads);
        let hidden = ungrouped(visible.iter().copied())
            .into_iter()
            .map(|l| l.id.clone())
            .collect();

        let columns: Vec<StageColumn<R::Card>> = group_by_stage(visible.iter().copied())
            .into_iter()
            .map(|bucket| {
                let total_value = aggregate_value(bucket.leads.iter().copied());
                StageColumn {
                    title: bucket.stage.label().to_string(),
                    count: bucket.leads.len(),
                    value_label: format::money(total_value, &self.currency),
                    cards: bucket.leads.iter().map(|l| self.renderer.render(l)).collect(),
                    total_value,
                    stage: bucket.stage,
                }
            })
            .collect();

        let total_value = columns.iter().map(|c| c.total_value).sum();
        Board {
            columns,
            hidden,
            total_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::views::{LeadFilter, SortKey};
    use chrono::{TimeZone, Utc};

    fn lead(id: &str, name: &str, stage: &str, value: Option<f64>) -> Lead {
        Lead {
            id: id.to_string(),
            name: name.to_string(),
            company: Some("Acme".to_string()),
            phone: Some("555-0100".to_string()),
            email: None,
            address: None,
            stage: LeadStage::from(stage),
            priority: Priority::Medium,
            order_value: value,
            currency: None,
            deal_status: None,
            notes: None,
            owner_id: "u1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            last_interaction: None,
        }
    }

    fn leads() -> Vec<Lead> {
        vec![
            lead("1", "Amy", "New Leads", Some(1200.0)),
            lead("2", "Zoe", "Closed", None),
            lead("3", "Bob", "New Leads", Some(300.0)),
            lead("4", "Eve", "Archived", Some(99.0)),
        ]
    }

    #[test]
    fn builds_five_columns_with_totals() {
        let board = PipelineBoard::new(CompactCard, "USD").build(&leads());
        assert_eq!(board.columns.len(), 5);

        let new = board.column(&LeadStage::NewLeads).unwrap();
        assert_eq!(new.title, "New Leads");
        assert_eq!(new.count, 2);
        assert_eq!(new.total_value, 1500.0);
        assert_eq!(new.value_label, "$1,500");

        let closed = board.column(&LeadStage::Closed).unwrap();
        assert_eq!(closed.count, 1);
        assert_eq!(closed.total_value, 0.0);

        assert_eq!(board.hidden, vec!["4"]);
        assert_eq!(board.total_value, 1500.0);
    }

    #[test]
    fn query_narrows_and_orders_cards() {
        let query = LeadQuery {
            filter: LeadFilter::default(),
            sort: Some(SortKey::Name),
        };
        let board = PipelineBoard::new(CompactCard, "USD")
            .with_query(query)
            .build(&leads());
        let names: Vec<&str> = board.columns[0]
            .cards
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Amy", "Bob"]);

        let board = PipelineBoard::new(CompactCard, "USD")
            .with_query(LeadQuery {
                filter: LeadFilter::query("zoe"),
                sort: None,
            })
            .build(&leads());
        assert_eq!(board.columns[0].count, 0);
        assert_eq!(board.columns[4].count, 1);
        assert!(board.hidden.is_empty());
    }

    #[test]
    fn same_board_renders_detail_cards() {
        let now = Utc.with_ymd_and_hms(2024, 5, 3, 9, 0, 0).unwrap();
        let board = PipelineBoard::new(DetailCard::at("EUR", now), "EUR").build(&leads());
        let amy = &board.columns[0].cards[0];
        assert_eq!(amy.value_label.as_deref(), Some("€1,200"));
        assert_eq!(amy.phone.as_deref(), Some("555-0100"));
        assert_eq!(board.columns[0].value_label, "€1,500");
    }
}
