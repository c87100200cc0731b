pub mod activity;
pub mod card;
pub mod dashboard;
pub mod lead;
pub mod task;
pub mod timestamp;
pub mod user;

pub use activity::{Activity, ActivityDraft, ActivityType};
pub use card::{BusinessCard, CardDraft, CardTemplate};
pub use dashboard::DashboardStats;
pub use lead::{DealStatus, Lead, LeadDraft, LeadPatch, LeadStage, LeadUpdate, Priority};
pub use task::{Task, TaskDraft, TaskPatch, TaskStatus, TaskType};
pub use user::{AuthResponse, Credentials, Registration, User};
