use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A reclamation as delivered by the upstream API. The date stays as text
/// until the stats engine validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclamationRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub reason: String,
}

// A missing or null date becomes "" and is rejected by the stats engine with its index.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReclamationRecord {
    pub fn new(date: &str, product: &str, customer: &str, reason: &str) -> Self {
        Self {
            date: date.to_string(),
            product: product.to_string(),
            customer: customer.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewestReclamation {
    pub date: NaiveDate,
    pub product: String,
    pub customer: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LongestGap {
    pub days: i64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: &'static str,
    pub reclamations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub newest: Option<NewestReclamation>,
    pub days_since_previous: i64,
    pub longest_gap: LongestGap,
    pub current_streak: i64,
    pub year: i32,
    pub monthly_trend: Vec<MonthlyCount>,
    pub year_total: usize,
    pub previous_year_total: usize,
}
