use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("savingsAmount must be a finite number > 0, got {value}")]
    InvalidSavingsAmount { value: f64 },

    #[error("age must be between 0 and 120, got {value}")]
    InvalidAge { value: i64 },

    #[error("horizonYears must be between 1 and 100, got {value}")]
    InvalidHorizon { value: i64 },

    #[error("expectedReturnRate must be a finite percentage >= 0, got {value}")]
    InvalidReturnRate { value: f64 },

    #[error("monthlyAmount must be a finite number >= 0, got {value}")]
    InvalidMonthlyAmount { value: f64 },

    #[error("invalid recommendation policy: {0}")]
    InvalidPolicy(String),

    #[error("recommender failed: {0}")]
    Recommender(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),
}

impl PlanError {
    /// Errors caused by the caller's input, as opposed to configuration or
    /// strategy failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlanError::InvalidSavingsAmount { .. }
                | PlanError::InvalidAge { .. }
                | PlanError::InvalidHorizon { .. }
                | PlanError::InvalidReturnRate { .. }
                | PlanError::InvalidMonthlyAmount { .. }
        )
    }
}
