use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Case-insensitive. Anything unrecognised is treated as monthly.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            other => {
                tracing::debug!(frequency = other, "unrecognised frequency, using monthly");
                Frequency::Monthly
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub savings_amount: f64,
    pub frequency: Frequency,
    /// Display label only. Amounts are never converted between currencies.
    pub currency: String,
    pub age: i32,
    pub goals: String,
    pub risk_tolerance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub monthly_amount: f64,
    pub horizon_years: u32,
    pub risk_profile: RiskProfile,
    pub recommended_fund_ids: Vec<String>,
    /// Annual rate in percent, e.g. 12.0.
    pub expected_return_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub nav: f64,
    pub expense_ratio: f64,
    pub risk_level: String,
    pub historical_return: f64,
    pub min_investment: f64,
    pub fund_manager: String,
}

/// Display figures, rounded to the cent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub invested_amount: f64,
    pub expected_returns: f64,
    pub maturity_value: f64,
}

/// One month of the growth curve. Values keep full precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub month_index: u32,
    pub invested: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub mime_type: &'static str,
    /// Base64 of the rendered chart.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorResponse {
    pub plan: Plan,
    pub currency: String,
    pub adjusted_monthly_amount: f64,
    pub fund_details: Vec<FundRecord>,
    pub projection: ProjectionResult,
    pub chart_series: Vec<SeriesPoint>,
    pub visualization: Option<Visualization>,
}

/// Display rounding only: `value * 100` rounded half away from zero. It works
/// on the binary value, as Python's `round(x, 2)` does, so 1.005 (stored as
/// 1.00499...) gives 1.0. Intentional; do not swap in decimal rounding.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
