//! Admin dashboard aggregates computed from stored assessment records.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use super::repository::AssessmentRecord;
use super::result::{ResultSource, RiskLevel};
use super::session::SessionId;

/// Widest trend window served; longer requests are refused at the route.
pub const MAX_TREND_WEEKS: u32 = 52;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_assessments: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub high_risk_percentage: f64,
    pub medium_risk_percentage: f64,
    pub low_risk_percentage: f64,
    pub average_risk_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskDistribution {
    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub week: String,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorTrend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactorSummary {
    pub name: String,
    pub occurrences: usize,
    pub percentage: f64,
    pub trend: FactorTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentAssessment {
    pub session_id: SessionId,
    pub submitted_at: DateTime<Utc>,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub source: ResultSource,
    pub label: String,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn risk_distribution(records: &[AssessmentRecord]) -> RiskDistribution {
    let mut distribution = RiskDistribution::default();
    for record in records {
        distribution.record(record.result.risk_level);
    }
    distribution
}

pub fn dashboard_stats(records: &[AssessmentRecord]) -> DashboardStats {
    let total = records.len();
    let distribution = risk_distribution(records);
    let score_sum: u64 = records
        .iter()
        .map(|record| u64::from(record.result.risk_score))
        .sum();
    let average = if total == 0 {
        0.0
    } else {
        score_sum as f64 / total as f64
    };

    DashboardStats {
        total_assessments: total,
        high_risk_count: distribution.high,
        medium_risk_count: distribution.medium,
        low_risk_count: distribution.low,
        high_risk_percentage: round_to(percentage(distribution.high, total), 2),
        medium_risk_percentage: round_to(percentage(distribution.medium, total), 2),
        low_risk_percentage: round_to(percentage(distribution.low, total), 2),
        average_risk_score: round_to(average, 1),
    }
}

/// Per-week tier counts for the `weeks` ISO weeks ending with the week of `now`,
/// oldest first. Weeks without submissions are reported with zero counts.
/// The window is capped at [`MAX_TREND_WEEKS`].
pub fn weekly_trends(records: &[AssessmentRecord], weeks: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), RiskDistribution> = BTreeMap::new();
    for offset in 0..weeks.min(MAX_TREND_WEEKS) {
        let Some(start) = now.checked_sub_signed(Duration::weeks(i64::from(offset))) else {
            break;
        };
        let week = start.iso_week();
        buckets.insert((week.year(), week.week()), RiskDistribution::default());
    }

    for record in records {
        let week = record.submitted_at.iso_week();
        if let Some(bucket) = buckets.get_mut(&(week.year(), week.week())) {
            bucket.record(record.result.risk_level);
        }
    }

    buckets
        .into_iter()
        .map(|((year, week), counts)| TrendPoint {
            week: format!("{year}-W{week:02}"),
            high_risk: counts.high,
            medium_risk: counts.medium,
            low_risk: counts.low,
        })
        .collect()
}

/// Risk-factor categories ranked by how many assessments report them, with the
/// share of all assessments and a week-over-week trend. A category counts once
/// per assessment.
pub fn top_risk_factors(
    records: &[AssessmentRecord],
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<RiskFactorSummary> {
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let mut counts: HashMap<&str, (usize, usize, usize)> = HashMap::new();
    for record in records {
        let categories: BTreeSet<&str> = record
            .result
            .risk_factors
            .iter()
            .map(|factor| factor.category.as_str())
            .collect();
        for category in categories {
            let entry = counts.entry(category).or_insert((0, 0, 0));
            entry.0 += 1;
            if record.submitted_at >= week_ago {
                entry.1 += 1;
            } else if record.submitted_at >= two_weeks_ago {
                entry.2 += 1;
            }
        }
    }

    let total = records.len();
    let mut summaries: Vec<RiskFactorSummary> = counts
        .into_iter()
        .map(|(name, (occurrences, current, previous))| RiskFactorSummary {
            name: name.to_string(),
            occurrences,
            percentage: round_to(percentage(occurrences, total), 1),
            trend: match current.cmp(&previous) {
                std::cmp::Ordering::Greater => FactorTrend::Up,
                std::cmp::Ordering::Less => FactorTrend::Down,
                std::cmp::Ordering::Equal => FactorTrend::Stable,
            },
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries.truncate(limit);
    summaries
}

pub fn recent_assessments(records: &[AssessmentRecord], limit: usize) -> Vec<RecentAssessment> {
    let mut recent: Vec<&AssessmentRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    recent
        .into_iter()
        .take(limit)
        .map(|record| {
            let year = record
                .request
                .as_ref()
                .map(|request| request.academic_year.label())
                .unwrap_or("N/A");
            RecentAssessment {
                session_id: record.session_id.clone(),
                submitted_at: record.submitted_at,
                risk_level: record.result.risk_level,
                risk_score: record.result.risk_score,
                source: record.result.source,
                label: format!("Year {year} Review"),
            }
        })
        .collect()
}
