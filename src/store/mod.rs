pub mod activities;
pub mod cards;
pub mod collection;
pub mod dashboard;
pub mod leads;
pub mod tasks;

pub use activities::ActivityStore;
pub use cards::CardStore;
pub use collection::{Collection, MutationId, MutationState, Record, Snapshot};
pub use dashboard::DashboardStore;
pub use leads::LeadStore;
pub use tasks::{TaskScope, TaskStore};

use crate::models::{Activity, Lead, Task};

impl Record for Lead {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Activity {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Task {
    fn key(&self) -> &str {
        &self.id
    }
}
