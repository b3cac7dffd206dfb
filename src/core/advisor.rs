use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::catalog::{FundCatalog, normalize_fund_id};
use super::chart::{ChartRenderer, SvgChartRenderer};
use super::conversion::to_monthly;
use super::engine::{recommend_plan, validate_request};
use super::error::PlanError;
use super::policy::RecommendationPolicy;
use super::projection::{MAX_HORIZON_YEARS, ProjectionInputs, growth_series, project};
use super::types::{
    AdvisorResponse, Plan, PlanRequest, SeriesPoint, Visualization, round_to_cents,
};

/// Anything that can turn a request into a plan.
pub trait Recommender: Send + Sync {
    fn name(&self) -> &str;

    fn recommend(&self, request: &PlanRequest) -> Result<Plan, PlanError>;
}

#[derive(Debug, Clone, Default)]
pub struct RuleBasedRecommender {
    policy: RecommendationPolicy,
}

impl RuleBasedRecommender {
    pub fn new(policy: RecommendationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        &self.policy
    }
}

impl Recommender for RuleBasedRecommender {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn recommend(&self, request: &PlanRequest) -> Result<Plan, PlanError> {
        recommend_plan(request, &self.policy)
    }
}

/// Runs an optional alternate strategy first and always falls back to the
/// rule-based plan when it errors or returns something unusable.
pub struct FallbackRecommender {
    primary: Option<Box<dyn Recommender>>,
    rules: RuleBasedRecommender,
}

impl FallbackRecommender {
    pub fn new(rules: RuleBasedRecommender) -> Self {
        Self {
            primary: None,
            rules,
        }
    }

    pub fn with_primary(mut self, primary: Box<dyn Recommender>) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn rules(&self) -> &RuleBasedRecommender {
        &self.rules
    }

    fn try_primary(&self, primary: &dyn Recommender, request: &PlanRequest) -> Option<Plan> {
        match primary.recommend(request) {
            Ok(plan) => match sanitize_alternate_plan(plan) {
                Ok(plan) => Some(plan),
                Err(reason) => {
                    tracing::warn!(
                        recommender = primary.name(),
                        %reason,
                        "alternate plan rejected, using rule-based plan"
                    );
                    None
                }
            },
            Err(err) => {
                tracing::warn!(
                    recommender = primary.name(),
                    error = %err,
                    "alternate recommender failed, using rule-based plan"
                );
                None
            }
        }
    }
}

impl Recommender for FallbackRecommender {
    fn name(&self) -> &str {
        self.primary
            .as_deref()
            .map(|primary| primary.name())
            .unwrap_or_else(|| self.rules.name())
    }

    fn recommend(&self, request: &PlanRequest) -> Result<Plan, PlanError> {
        validate_request(request)?;

        let alternate = self
            .primary
            .as_deref()
            .and_then(|primary| self.try_primary(primary, request));
        let mut plan = match alternate {
            Some(plan) => plan,
            None => self.rules.recommend(request)?,
        };

        // The user's own savings figure always wins over a suggested amount.
        plan.monthly_amount = to_monthly(request.savings_amount, request.frequency);
        Ok(plan)
    }
}

fn sanitize_alternate_plan(mut plan: Plan) -> Result<Plan, String> {
    plan.recommended_fund_ids = plan
        .recommended_fund_ids
        .iter()
        .map(|id| normalize_fund_id(id.trim()))
        .filter(|id| !id.is_empty())
        .collect();
    if plan.recommended_fund_ids.is_empty() {
        return Err("no funds recommended".to_string());
    }
    if !(1..=MAX_HORIZON_YEARS).contains(&plan.horizon_years) {
        return Err(format!("horizon {} out of range", plan.horizon_years));
    }
    if !plan.expected_return_rate.is_finite() || plan.expected_return_rate <= 0.0 {
        return Err(format!(
            "expected return rate {} must be > 0",
            plan.expected_return_rate
        ));
    }
    Ok(plan)
}

// A broken chart never costs the caller their plan.
fn render_visualization(
    renderer: &dyn ChartRenderer,
    series: &[SeriesPoint],
) -> Option<Visualization> {
    match renderer.render(series) {
        Ok(bytes) => Some(Visualization {
            mime_type: renderer.mime_type(),
            data: STANDARD.encode(bytes),
        }),
        Err(err) => {
            tracing::warn!(error = %err, "chart rendering failed, omitting visualization");
            None
        }
    }
}

/// Request in, complete response out: plan, fund details, projection and
/// chart.
pub struct Advisor {
    recommender: FallbackRecommender,
    catalog: FundCatalog,
    chart: Option<Box<dyn ChartRenderer>>,
}

impl Default for Advisor {
    fn default() -> Self {
        Self::new(RecommendationPolicy::default())
    }
}

impl Advisor {
    pub fn new(policy: RecommendationPolicy) -> Self {
        Self {
            recommender: FallbackRecommender::new(RuleBasedRecommender::new(policy)),
            catalog: FundCatalog::builtin().clone(),
            chart: Some(Box::new(SvgChartRenderer::default())),
        }
    }

    pub fn with_alternate(mut self, alternate: Box<dyn Recommender>) -> Self {
        self.recommender = self.recommender.with_primary(alternate);
        self
    }

    pub fn with_catalog(mut self, catalog: FundCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_chart_renderer(mut self, renderer: Option<Box<dyn ChartRenderer>>) -> Self {
        self.chart = renderer;
        self
    }

    pub fn catalog(&self) -> &FundCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        self.recommender.rules().policy()
    }

    pub fn advise(&self, request: &PlanRequest) -> Result<AdvisorResponse, PlanError> {
        let plan = self.recommender.recommend(request)?;

        let inputs = ProjectionInputs::from_plan(&plan);
        let projection = project(&inputs)?;
        let chart_series = growth_series(&inputs)?;

        let fund_details = plan
            .recommended_fund_ids
            .iter()
            .map(|id| self.catalog.lookup(id))
            .collect();

        let visualization = self
            .chart
            .as_deref()
            .and_then(|renderer| render_visualization(renderer, &chart_series));

        Ok(AdvisorResponse {
            adjusted_monthly_amount: round_to_cents(plan.monthly_amount),
            currency: request.currency.clone(),
            plan,
            fund_details,
            projection,
            chart_series,
            visualization,
        })
    }
}
