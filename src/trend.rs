use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{LongestGap, StatsSummary};

pub const NO_DATA_LABEL: &str = "Ei tietoja";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub current: usize,
    pub previous: usize,
    pub percent: i64,
    pub direction: Direction,
}

impl Delta {
    pub fn new(previous: usize, current: usize) -> Self {
        let percent = percent_change(previous, current);
        let direction = match percent {
            p if p > 0 => Direction::Increase,
            p if p < 0 => Direction::Decrease,
            _ => Direction::NoChange,
        };
        Self {
            current,
            previous,
            percent,
            direction,
        }
    }

    /// `+25%`, `-10%` or `0%`.
    pub fn signed_label(&self) -> String {
        if self.percent > 0 {
            format!("+{}%", self.percent)
        } else {
            format!("{}%", self.percent)
        }
    }

    pub fn caption(&self, period: Period) -> &'static str {
        match (self.direction, period) {
            (Direction::Increase, Period::Month) => "Kasvua viime kuusta",
            (Direction::Decrease, Period::Month) => "Laskua viime kuusta",
            (Direction::NoChange, Period::Month) => "Ei muutosta viime kuusta",
            (Direction::Increase, Period::Year) => "Kasvua viime vuodesta",
            (Direction::Decrease, Period::Year) => "Laskua viime vuodesta",
            (Direction::NoChange, Period::Year) => "Ei muutosta viime vuodesta",
        }
    }
}

/// 0 over 0 is no change and N over 0 is a 100% increase. Halves round
/// towards positive infinity.
pub fn percent_change(previous: usize, current: usize) -> i64 {
    if previous == 0 {
        return if current == 0 { 0 } else { 100 };
    }
    let raw = (current as f64 - previous as f64) / previous as f64 * 100.0;
    (raw + 0.5).floor() as i64
}

/// Compares `month0` (0 = January) against the month before it in the same
/// trend series. January wraps to that series' December.
pub fn month_over_month(summary: &StatsSummary, month0: usize) -> Delta {
    let count_at = |index: usize| {
        summary
            .monthly_trend
            .get(index)
            .map(|month| month.reclamations)
            .unwrap_or(0)
    };
    let current = count_at(month0 % 12);
    let previous = count_at((month0 + 11) % 12);
    Delta::new(previous, current)
}

pub fn year_over_year(summary: &StatsSummary) -> Delta {
    Delta::new(summary.previous_year_total, summary.year_total)
}

pub fn streak_progress(summary: &StatsSummary) -> f64 {
    let record = summary.longest_gap.days;
    if record <= 0 {
        return 0.0;
    }
    let ratio = summary.days_since_previous as f64 / record as f64;
    ratio.clamp(0.0, 1.0) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    Under10,
    Days10,
    Days20,
    Days30,
    Days60,
    Days90,
    Days120,
}

impl StreakTier {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 10 => Self::Under10,
            d if d < 20 => Self::Days10,
            d if d < 30 => Self::Days20,
            d if d < 60 => Self::Days30,
            d if d < 90 => Self::Days60,
            d if d < 120 => Self::Days90,
            _ => Self::Days120,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Under10 => "Alle 10 päivää",
            Self::Days10 => "10+ päivää",
            Self::Days20 => "20+ päivää",
            Self::Days30 => "30+ päivää",
            Self::Days60 => "60+ päivää",
            Self::Days90 => "90+ päivää",
            Self::Days120 => "120+ päivää",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::Under10 => "Vakaannutaan ja palataan raiteille.",
            Self::Days10 => "Hyvä vauhti, pidetään se tasaisena!",
            Self::Days20 => "Hyvässä suunnassa, pysytään johdonmukaisina!",
            Self::Days30 => "Vahva kuukausi takana, hienoa yhteistyötä!",
            Self::Days60 => "Palkintokorokkeelle asti!",
            Self::Days90 => "Poikkeuksellista suoritusta!",
            Self::Days120 => "Kruunun arvoinen saavutus!",
        }
    }
}

// "Quality Issue - Minor defect" -> "Quality Issue"
pub fn short_reason(reason: &str) -> &str {
    let head = reason.split('-').next().unwrap_or_default().trim();
    if head.is_empty() {
        reason
    } else {
        head
    }
}

pub fn format_fi_date(date: NaiveDate) -> String {
    format!("{}.{}.{}", date.day(), date.month(), date.year())
}

pub fn gap_range_label(gap: &LongestGap) -> String {
    match (gap.start, gap.end) {
        (Some(start), Some(end)) => format!("{} - {}", format_fi_date(start), format_fi_date(end)),
        _ => NO_DATA_LABEL.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub month: Delta,
    pub year: Delta,
    pub streak_progress: f64,
    pub streak_tier: StreakTier,
    pub longest_streak_range: String,
}

pub fn dashboard_metrics(summary: &StatsSummary, today: NaiveDate) -> DashboardMetrics {
    DashboardMetrics {
        month: month_over_month(summary, today.month0() as usize),
        year: year_over_year(summary),
        streak_progress: streak_progress(summary),
        streak_tier: StreakTier::from_days(summary.days_since_previous),
        longest_streak_range: gap_range_label(&summary.longest_gap),
    }
}
