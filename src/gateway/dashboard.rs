use tokio_util::sync::CancellationToken;

use super::Gateway;
use crate::error::Result;
use crate::models::DashboardStats;

impl Gateway {
    pub async fn dashboard_stats(&self, cancel: &CancellationToken) -> Result<DashboardStats> {
        self.get_json("/api/dashboard/stats", &[], cancel).await
    }
}
