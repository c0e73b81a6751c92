// src/services/dashboard_service.rs

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, DashboardRepository, OrderRepository},
    models::dashboard::{DashboardSummary, HomeStats},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    catalog_repo: CatalogRepository,
    order_repo: OrderRepository,
    pool: PgPool,
    // Fuso do restaurante; define onde começa o "hoje"
    offset: FixedOffset,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        catalog_repo: CatalogRepository,
        order_repo: OrderRepository,
        pool: PgPool,
        offset: FixedOffset,
    ) -> Self {
        Self {
            repo,
            catalog_repo,
            order_repo,
            pool,
            offset,
        }
    }

    pub async fn summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary, AppError> {
        let (day_start, day_end) = day_bounds(now, self.offset);
        self.repo.get_summary(&self.pool, day_start, day_end).await
    }

    pub async fn home_stats(&self) -> Result<HomeStats, AppError> {
        Ok(HomeStats {
            category_count: self.catalog_repo.count_categories().await?,
            menu_item_count: self.catalog_repo.count_available_items().await?,
            active_tables: self.repo.count_tables_in_use().await?,
            open_orders: self.order_repo.count_open().await?,
        })
    }
}

/// Início e fim (exclusivo) do dia civil de `now` no fuso `offset`, em UTC.
pub fn day_bounds(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_time(NaiveTime::default());
    let start = local_midnight.and_utc() - Duration::seconds(offset.local_minus_utc() as i64);
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn utc_day_starts_at_midnight() {
        let (start, end) = day_bounds(at("2026-10-17T13:45:00Z"), FixedOffset::east_opt(0).unwrap());
        assert_eq!(start, at("2026-10-17T00:00:00Z"));
        assert_eq!(end, at("2026-10-18T00:00:00Z"));
    }

    #[test]
    fn positive_offset_can_already_be_tomorrow() {
        // 20:00 UTC = 01:30 do dia seguinte em +05:30
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let (start, end) = day_bounds(at("2026-10-17T20:00:00Z"), offset);
        assert_eq!(start, at("2026-10-17T18:30:00Z"));
        assert_eq!(end, at("2026-10-18T18:30:00Z"));
    }

    #[test]
    fn negative_offset_can_still_be_yesterday() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let (start, _) = day_bounds(at("2026-10-17T02:00:00Z"), offset);
        assert_eq!(start, at("2026-10-16T03:00:00Z"));
    }
}
