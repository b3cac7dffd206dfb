use super::conversion::to_monthly;
use super::error::PlanError;
use super::policy::RecommendationPolicy;
use super::types::{Plan, PlanRequest, RiskProfile};

pub const MAX_AGE: i32 = 120;

pub fn validate_request(request: &PlanRequest) -> Result<(), PlanError> {
    if !request.savings_amount.is_finite() || request.savings_amount <= 0.0 {
        return Err(PlanError::InvalidSavingsAmount {
            value: request.savings_amount,
        });
    }

    if !(0..=MAX_AGE).contains(&request.age) {
        return Err(PlanError::InvalidAge {
            value: i64::from(request.age),
        });
    }

    Ok(())
}

/// A supplied tolerance is classified by keyword; a missing or blank one is
/// inferred from age.
pub fn resolve_risk_profile(
    policy: &RecommendationPolicy,
    age: i32,
    risk_tolerance: Option<&str>,
) -> RiskProfile {
    match risk_tolerance.map(str::trim).filter(|t| !t.is_empty()) {
        Some(tolerance) => policy.classify_tolerance(tolerance),
        None => policy.profile_for_age(age),
    }
}

/// Deterministic rule-based plan. Only fails on invalid input.
pub fn recommend_plan(
    request: &PlanRequest,
    policy: &RecommendationPolicy,
) -> Result<Plan, PlanError> {
    validate_request(request)?;

    let monthly_amount = to_monthly(request.savings_amount, request.frequency);
    if !monthly_amount.is_finite() {
        return Err(PlanError::InvalidSavingsAmount {
            value: request.savings_amount,
        });
    }

    let risk_profile =
        resolve_risk_profile(policy, request.age, request.risk_tolerance.as_deref());
    let horizon_years = policy.horizon_for_age(request.age);
    let recommended_fund_ids = policy.funds_for_label(risk_profile.as_str());
    let expected_return_rate = policy
        .rule_for(risk_profile)
        .map(|rule| rule.expected_return_rate)
        .ok_or_else(|| {
            PlanError::InvalidPolicy(format!("missing rule for {risk_profile} profile"))
        })?;

    tracing::debug!(
        policy_version = %policy.version,
        age = request.age,
        frequency = request.frequency.as_str(),
        goals = %request.goals,
        %risk_profile,
        horizon_years,
        "rule-based plan selected"
    );

    Ok(Plan {
        monthly_amount,
        horizon_years,
        risk_profile,
        recommended_fund_ids,
        expected_return_rate,
    })
}
