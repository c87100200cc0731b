use chrono::{DateTime, Utc};

use crate::models::{Task, TaskStatus};

/// Pending tasks whose due date has passed, earliest due first.
pub fn overdue_tasks(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    let mut out: Vec<&Task> = tasks.iter().filter(|t| t.is_overdue(now)).collect();
    out.sort_by_key(|t| t.due_date);
    out
}

pub fn tasks_with_status(tasks: &[Task], status: TaskStatus) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

/// Tasks attached to a lead, in list order.
pub fn tasks_for_lead<'a>(tasks: &'a [Task], lead_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.lead_id.as_deref() == Some(lead_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskType};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn task(id: &str, status: TaskStatus, due: Option<DateTime<Utc>>) -> Task {
        Task {
            id: id.to_string(),
            lead_id: Some("l1".to_string()),
            title: format!("Task {}", id),
            description: None,
            task_type: TaskType::Call,
            status,
            priority: Priority::Medium,
            due_date: due,
            completed_at: None,
            created_at: now() - Duration::days(10),
        }
    }

    #[test]
    fn overdue_needs_pending_and_past_due() {
        let tasks = vec![
            task("late", TaskStatus::Pending, Some(now() - Duration::hours(1))),
            task("later", TaskStatus::Pending, Some(now() - Duration::days(2))),
            task("done", TaskStatus::Completed, Some(now() - Duration::days(1))),
            task("future", TaskStatus::Pending, Some(now() + Duration::hours(1))),
            task("undated", TaskStatus::Pending, None),
        ];
        let ids: Vec<&str> = overdue_tasks(&tasks, now())
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["later", "late"]);
    }

    #[test]
    fn status_and_lead_filters() {
        let mut tasks = vec![
            task("a", TaskStatus::Pending, None),
            task("b", TaskStatus::Completed, None),
            task("c", TaskStatus::Pending, None),
        ];
        tasks[2].lead_id = Some("l2".to_string());
        assert_eq!(tasks_with_status(&tasks, TaskStatus::Pending).len(), 2);
        assert_eq!(tasks_with_status(&tasks, TaskStatus::Cancelled).len(), 0);
        let ids: Vec<&str> = tasks_for_lead(&tasks, "l1")
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
