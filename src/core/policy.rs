//! Versioned recommendation rules.
//!
//! Fund lists, return rates, age bands and risk keywords live here as data so
//! they can be swapped (e.g. from a JSON file) without touching the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::normalize_fund_id;
use super::error::PlanError;
use super::projection::MAX_HORIZON_YEARS;
use super::types::RiskProfile;

pub const BUILTIN_POLICY_VERSION: &str = "2024.1";

/// Substring rule for free-text risk tolerance. Rules are tried in order and
/// the first hit wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskKeywordRule {
    pub contains: String,
    pub profile: RiskProfile,
}

/// Applies to ages strictly below `below_age`. `None` is the open-ended last
/// band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBand<T> {
    pub below_age: Option<i32>,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRule {
    pub funds: Vec<String>,
    /// Annual percent.
    pub expected_return_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPolicy {
    pub version: String,
    pub risk_keywords: Vec<RiskKeywordRule>,
    /// Used when a supplied tolerance matches no keyword.
    pub unmatched_tolerance_profile: RiskProfile,
    pub profile_age_bands: Vec<AgeBand<RiskProfile>>,
    pub horizon_age_bands: Vec<AgeBand<u32>>,
    pub profiles: BTreeMap<RiskProfile, ProfileRule>,
    pub default_funds: Vec<String>,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        let funds = |ids: &[&str]| ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
        let mut profiles = BTreeMap::new();
        profiles.insert(
            RiskProfile::Conservative,
            ProfileRule {
                funds: funds(&["ADITYA_CORPORATE_BOND", "SBI_DEBT", "HDFC_HYBRID"]),
                expected_return_rate: 8.0,
            },
        );
        profiles.insert(
            RiskProfile::Moderate,
            ProfileRule {
                funds: funds(&["ICICI_BALANCED", "HDFC_HYBRID", "KOTAK_STANDARD"]),
                expected_return_rate: 12.0,
            },
        );
        profiles.insert(
            RiskProfile::Aggressive,
            ProfileRule {
                funds: funds(&["SBI_SMALLCAP", "AXIS_MIDCAP", "HDFC_EQUITY"]),
                expected_return_rate: 15.0,
            },
        );

        Self {
            version: BUILTIN_POLICY_VERSION.to_string(),
            risk_keywords: vec![
                RiskKeywordRule {
                    contains: "conserv".to_string(),
                    profile: RiskProfile::Conservative,
                },
                RiskKeywordRule {
                    contains: "aggress".to_string(),
                    profile: RiskProfile::Aggressive,
                },
                RiskKeywordRule {
                    contains: "high".to_string(),
                    profile: RiskProfile::Aggressive,
                },
            ],
            unmatched_tolerance_profile: RiskProfile::Moderate,
            profile_age_bands: vec![
                AgeBand {
                    below_age: Some(30),
                    value: RiskProfile::Aggressive,
                },
                AgeBand {
                    below_age: Some(50),
                    value: RiskProfile::Moderate,
                },
                AgeBand {
                    below_age: None,
                    value: RiskProfile::Conservative,
                },
            ],
            horizon_age_bands: vec![
                AgeBand {
                    below_age: Some(30),
                    value: 30,
                },
                AgeBand {
                    below_age: Some(40),
                    value: 20,
                },
                AgeBand {
                    below_age: Some(50),
                    value: 15,
                },
                AgeBand {
                    below_age: None,
                    value: 10,
                },
            ],
            profiles,
            default_funds: funds(&["ICICI_BLUECHIP", "HDFC_HYBRID", "ADITYA_CORPORATE_BOND"]),
        }
    }
}

impl RecommendationPolicy {
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let policy: RecommendationPolicy = serde_json::from_str(json)
            .map_err(|e| PlanError::InvalidPolicy(format!("unreadable policy JSON: {e}")))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.version.trim().is_empty() {
            return Err(PlanError::InvalidPolicy("version must not be empty".to_string()));
        }

        for rule in &self.risk_keywords {
            if rule.contains.is_empty() {
                return Err(PlanError::InvalidPolicy(
                    "risk keyword rules must not match the empty string".to_string(),
                ));
            }
        }

        validate_bands("profileAgeBands", &self.profile_age_bands)?;
        validate_bands("horizonAgeBands", &self.horizon_age_bands)?;
        if let Some(band) = self
            .horizon_age_bands
            .iter()
            .find(|band| !(1..=MAX_HORIZON_YEARS).contains(&band.value))
        {
            return Err(PlanError::InvalidPolicy(format!(
                "horizonAgeBands values must be between 1 and {MAX_HORIZON_YEARS}, got {}",
                band.value
            )));
        }

        for profile in RiskProfile::ALL {
            let Some(rule) = self.profiles.get(&profile) else {
                return Err(PlanError::InvalidPolicy(format!(
                    "missing rule for {profile} profile"
                )));
            };
            if rule.funds.is_empty() {
                return Err(PlanError::InvalidPolicy(format!(
                    "{profile} profile must list at least one fund"
                )));
            }
            if !rule.expected_return_rate.is_finite() || rule.expected_return_rate <= 0.0 {
                return Err(PlanError::InvalidPolicy(format!(
                    "{profile} expectedReturnRate must be > 0, got {}",
                    rule.expected_return_rate
                )));
            }
        }

        if self.default_funds.is_empty() {
            return Err(PlanError::InvalidPolicy(
                "defaultFunds must list at least one fund".to_string(),
            ));
        }

        Ok(())
    }

    /// Ordered keyword match, case-insensitive.
    pub fn classify_tolerance(&self, tolerance: &str) -> RiskProfile {
        let text = tolerance.to_lowercase();
        self.risk_keywords
            .iter()
            .find(|rule| text.contains(&rule.contains.to_lowercase()))
            .map(|rule| rule.profile)
            .unwrap_or(self.unmatched_tolerance_profile)
    }

    pub fn profile_for_age(&self, age: i32) -> RiskProfile {
        band_value(&self.profile_age_bands, age)
            .copied()
            .unwrap_or(self.unmatched_tolerance_profile)
    }

    pub fn horizon_for_age(&self, age: i32) -> u32 {
        band_value(&self.horizon_age_bands, age).copied().unwrap_or(1)
    }

    pub fn rule_for(&self, profile: RiskProfile) -> Option<&ProfileRule> {
        self.profiles.get(&profile)
    }

    /// Canonical profile names map to their table entry; any other label gets
    /// the neutral default set.
    pub fn funds_for_label(&self, label: &str) -> Vec<String> {
        let wanted = label.trim().to_lowercase();
        RiskProfile::ALL
            .into_iter()
            .find(|profile| profile.as_str() == wanted)
            .and_then(|profile| self.rule_for(profile))
            .map(|rule| rule.funds.clone())
            .unwrap_or_else(|| self.default_funds.clone())
            .iter()
            .map(|id| normalize_fund_id(id))
            .collect()
    }
}

fn band_value<T>(bands: &[AgeBand<T>], age: i32) -> Option<&T> {
    bands
        .iter()
        .find(|band| band.below_age.is_none_or(|limit| age < limit))
        .map(|band| &band.value)
}

fn validate_bands<T>(name: &str, bands: &[AgeBand<T>]) -> Result<(), PlanError> {
    let Some(last) = bands.last() else {
        return Err(PlanError::InvalidPolicy(format!("{name} must not be empty")));
    };
    if last.below_age.is_some() {
        return Err(PlanError::InvalidPolicy(format!(
            "{name} must end with an open-ended band"
        )));
    }

    let mut previous: Option<i32> = None;
    for band in &bands[..bands.len() - 1] {
        let Some(limit) = band.below_age else {
            return Err(PlanError::InvalidPolicy(format!(
                "{name} may only have one open-ended band, and it must be last"
            )));
        };
        if previous.is_some_and(|p| limit <= p) {
            return Err(PlanError::InvalidPolicy(format!(
                "{name} limits must be strictly ascending"
            )));
        }
        previous = Some(limit);
    }
    Ok(())
}
