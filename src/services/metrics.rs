//! Brew metrics aggregation for equipment quick stats and dashboard charts.
//!
//! Rows are loaded once per request and aggregated here. Averages and
//! ratios over an empty set are `None` so charts show "no data", not zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::brew::{brew_ratio, BrewPoint},
    repository::Repository,
};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;
pub const CONSUMPTION_WEEKS: u32 = 8;

/// Most recent brew made with a piece of equipment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LastBrew {
    pub brew_id: Uuid,
    pub brewed_at: DateTime<Utc>,
    pub bean_name: Option<String>,
    pub rating: Option<i16>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentQuickStats {
    pub total_brews: i64,
    pub avg_rating: Option<f64>,
    pub brews_today: i64,
    pub last_brew: Option<LastBrew>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingBucket {
    pub rating: i16,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeeklyConsumption {
    /// Monday of the week, local time
    pub week_start: NaiveDate,
    pub brew_count: i64,
    pub dose_grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MethodRating {
    pub method: String,
    pub brew_count: i64,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AccountSummary {
    pub total_brews: i64,
    pub avg_rating: Option<f64>,
    /// Mean water/dose ratio over brews with both figures
    pub avg_ratio: Option<f64>,
    pub total_dose_grams: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub window_days: u32,
    pub summary: AccountSummary,
    pub brews_per_day: Vec<DailyCount>,
    pub rating_distribution: Vec<RatingBucket>,
    pub weekly_consumption: Vec<WeeklyConsumption>,
    pub rating_by_method: Vec<MethodRating>,
}

/// Mean of the present values
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

/// Mean of non-null ratings
pub fn average_rating<'a, I>(points: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a BrewPoint>,
{
    mean(points.into_iter().map(|p| p.rating.map(f64::from)))
}

/// Start of the local calendar day containing `date`, as UTC
pub fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))))
}

pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Offset from a `utc_offset_minutes` parameter
pub fn offset_from_minutes(minutes: Option<i32>) -> AppResult<FixedOffset> {
    let minutes = minutes.unwrap_or(0);
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| AppError::Validation(format!("Invalid UTC offset: {} minutes", minutes)))
}

/// Quick stats from an equipment's brews (any order)
pub fn equipment_quick_stats(points: &[BrewPoint], now: DateTime<Utc>, offset: FixedOffset) -> EquipmentQuickStats {
    let today = local_date(now, offset);
    let day_start = local_midnight(today, offset);
    let day_end = day_start + Duration::days(1);

    let last_brew = points.iter().max_by_key(|p| p.brewed_at).map(|p| LastBrew {
        brew_id: p.id,
        brewed_at: p.brewed_at,
        bean_name: p.bean_name.clone(),
        rating: p.rating,
    });

    EquipmentQuickStats {
        total_brews: points.len() as i64,
        avg_rating: average_rating(points),
        brews_today: points
            .iter()
            .filter(|p| p.brewed_at >= day_start && p.brewed_at < day_end)
            .count() as i64,
        last_brew,
    }
}

/// One entry per local day of the window ending today, oldest first
pub fn brews_per_day(points: &[BrewPoint], now: DateTime<Utc>, offset: FixedOffset, days: u32) -> Vec<DailyCount> {
    let today = local_date(now, offset);
    let first = today - Duration::days(i64::from(days.max(1)) - 1);

    let mut counts: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for p in points {
        let date = local_date(p.brewed_at, offset);
        if date >= first && date <= today {
            *counts.entry(date).or_default() += 1;
        }
    }

    first
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|date| DailyCount {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Count of brews per rating, always five buckets
pub fn rating_distribution(points: &[BrewPoint]) -> Vec<RatingBucket> {
    (1..=5)
        .map(|rating| RatingBucket {
            rating,
            count: points.iter().filter(|p| p.rating == Some(rating)).count() as i64,
        })
        .collect()
}

/// Dose grams per local week (Monday start), `weeks` entries oldest first
pub fn weekly_consumption(
    points: &[BrewPoint],
    now: DateTime<Utc>,
    offset: FixedOffset,
    weeks: u32,
) -> Vec<WeeklyConsumption> {
    let today = local_date(now, offset);
    let this_week = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let first_week = this_week - Duration::weeks(i64::from(weeks.max(1)) - 1);

    let mut buckets: Vec<WeeklyConsumption> = (0..weeks.max(1))
        .map(|i| WeeklyConsumption {
            week_start: first_week + Duration::weeks(i64::from(i)),
            brew_count: 0,
            dose_grams: 0.0,
        })
        .collect();

    for p in points {
        let date = local_date(p.brewed_at, offset);
        if date < first_week || date > today {
            continue;
        }
        let index = ((date - first_week).num_days() / 7) as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.brew_count += 1;
            bucket.dose_grams += p.dose_grams.unwrap_or(0.0);
        }
    }
    buckets
}

/// Average rating per brew method, most brewed first
pub fn rating_by_method(points: &[BrewPoint]) -> Vec<MethodRating> {
    let mut groups: BTreeMap<String, Vec<&BrewPoint>> = BTreeMap::new();
    for p in points {
        let method = p.method.clone().unwrap_or_else(|| "unknown".to_string());
        groups.entry(method).or_default().push(p);
    }

    let mut result: Vec<MethodRating> = groups
        .into_iter()
        .map(|(method, group)| MethodRating {
            method,
            brew_count: group.len() as i64,
            avg_rating: average_rating(group.iter().copied()),
        })
        .collect();
    result.sort_by(|a, b| b.brew_count.cmp(&a.brew_count).then_with(|| a.method.cmp(&b.method)));
    result
}

pub fn account_summary(points: &[BrewPoint]) -> AccountSummary {
    AccountSummary {
        total_brews: points.len() as i64,
        avg_rating: average_rating(points),
        avg_ratio: mean(points.iter().map(|p| brew_ratio(p.dose_grams, p.water_grams))),
        total_dose_grams: points.iter().filter_map(|p| p.dose_grams).sum(),
    }
}

#[derive(Clone)]
pub struct MetricsService {
    repository: Repository,
}

impl MetricsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn equipment_stats(
        &self,
        account_id: Uuid,
        equipment_id: Uuid,
        offset: FixedOffset,
    ) -> AppResult<EquipmentQuickStats> {
        // Ownership check: unknown or foreign equipment is a 404
        self.repository.equipment.get_by_id(account_id, equipment_id).await?;
        let points = self
            .repository
            .brews
            .points_for_equipment(account_id, equipment_id)
            .await?;
        Ok(equipment_quick_stats(&points, Utc::now(), offset))
    }

    pub async fn dashboard(&self, account_id: Uuid, days: u32, offset: FixedOffset) -> AppResult<Dashboard> {
        if days == 0 || days > MAX_WINDOW_DAYS {
            return Err(AppError::Validation(format!(
                "days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }

        let now = Utc::now();
        let today = local_date(now, offset);
        let window_start = today - Duration::days(i64::from(days) - 1);
        let weeks_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            - Duration::weeks(i64::from(CONSUMPTION_WEEKS) - 1);
        let since = local_midnight(window_start.min(weeks_start), offset);

        let points = self.repository.brews.points_since(account_id, since).await?;
        let window_from = local_midnight(window_start, offset);
        let in_window: Vec<BrewPoint> = points
            .iter()
            .filter(|p| p.brewed_at >= window_from)
            .cloned()
            .collect();

        Ok(Dashboard {
            window_days: days,
            summary: account_summary(&in_window),
            brews_per_day: brews_per_day(&in_window, now, offset, days),
            rating_distribution: rating_distribution(&in_window),
            weekly_consumption: weekly_consumption(&points, now, offset, CONSUMPTION_WEEKS),
            rating_by_method: rating_by_method(&in_window),
        })
    }
}
