//! Closed-form SIP growth: future value of an annuity due, compounded monthly
//! with each contribution made at the start of its month.

use super::error::PlanError;
use super::types::{Plan, ProjectionResult, SeriesPoint, round_to_cents};

/// Upper bound on projected years, which also caps the chart series length.
pub const MAX_HORIZON_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInputs {
    pub monthly_amount: f64,
    pub horizon_years: u32,
    /// Annual percent.
    pub annual_rate: f64,
}

impl ProjectionInputs {
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            monthly_amount: plan.monthly_amount,
            horizon_years: plan.horizon_years,
            annual_rate: plan.expected_return_rate,
        }
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.monthly_amount.is_finite() || self.monthly_amount < 0.0 {
            return Err(PlanError::InvalidMonthlyAmount {
                value: self.monthly_amount,
            });
        }
        if !(1..=MAX_HORIZON_YEARS).contains(&self.horizon_years) {
            return Err(PlanError::InvalidHorizon {
                value: i64::from(self.horizon_years),
            });
        }
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(PlanError::InvalidReturnRate {
                value: self.annual_rate,
            });
        }

        // The series peaks at the last month, so a finite maturity bounds
        // every figure we report.
        let months = self.months();
        if !annuity_due_value(1.0, self.monthly_rate(), months).is_finite() {
            return Err(PlanError::InvalidReturnRate {
                value: self.annual_rate,
            });
        }
        let invested = self.monthly_amount * f64::from(months);
        let maturity = annuity_due_value(self.monthly_amount, self.monthly_rate(), months);
        if !invested.is_finite() || !maturity.is_finite() {
            return Err(PlanError::InvalidMonthlyAmount {
                value: self.monthly_amount,
            });
        }
        Ok(())
    }

    pub fn months(&self) -> u32 {
        self.horizon_years * 12
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0 / 100.0
    }
}

/// Value after `months` contributions. A zero rate has no growth.
///
/// `(1 + r)^n - 1` is taken as `expm1(n * ln_1p(r))` so rates far below a
/// basis point keep their precision instead of cancelling to zero.
pub fn annuity_due_value(monthly_amount: f64, monthly_rate: f64, months: u32) -> f64 {
    let invested = monthly_amount * f64::from(months);
    if monthly_rate == 0.0 {
        return invested;
    }
    let growth_minus_one = (f64::from(months) * monthly_rate.ln_1p()).exp_m1();
    let value = monthly_amount * (growth_minus_one / monthly_rate) * (1.0 + monthly_rate);
    // Compounding at a non-negative rate never loses money; clamp the last ulp.
    if monthly_rate > 0.0 { value.max(invested) } else { value }
}

pub fn project(inputs: &ProjectionInputs) -> Result<ProjectionResult, PlanError> {
    inputs.validate()?;

    let months = inputs.months();
    let invested = inputs.monthly_amount * f64::from(months);
    let maturity = annuity_due_value(inputs.monthly_amount, inputs.monthly_rate(), months);

    Ok(ProjectionResult {
        invested_amount: round_to_cents(invested),
        expected_returns: round_to_cents(maturity - invested),
        maturity_value: round_to_cents(maturity),
    })
}

/// Months 1..=horizon, unrounded.
pub fn growth_series(inputs: &ProjectionInputs) -> Result<Vec<SeriesPoint>, PlanError> {
    inputs.validate()?;

    let monthly_rate = inputs.monthly_rate();
    Ok((1..=inputs.months())
        .map(|month| SeriesPoint {
            month_index: month,
            invested: inputs.monthly_amount * f64::from(month),
            value: annuity_due_value(inputs.monthly_amount, monthly_rate, month),
        })
        .collect())
}
