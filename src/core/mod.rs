mod advisor;
mod catalog;
mod chart;
mod conversion;
mod engine;
mod error;
mod policy;
mod projection;
mod types;

pub use advisor::{Advisor, FallbackRecommender, Recommender, RuleBasedRecommender};
pub use catalog::{FundCatalog, normalize_fund_id};
pub use chart::{ChartRenderer, SvgChartRenderer};
pub use conversion::{daily_to_monthly, to_monthly, weekly_to_monthly};
pub use engine::{MAX_AGE, recommend_plan, resolve_risk_profile, validate_request};
pub use error::PlanError;
pub use policy::{
    AgeBand, BUILTIN_POLICY_VERSION, ProfileRule, RecommendationPolicy, RiskKeywordRule,
};
pub use projection::{
    MAX_HORIZON_YEARS, ProjectionInputs, annuity_due_value, growth_series, project,
};
pub use types::{
    AdvisorResponse, Frequency, FundRecord, Plan, PlanRequest, ProjectionResult, RiskProfile,
    SeriesPoint, Visualization, round_to_cents,
};
