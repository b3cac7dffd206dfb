use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    Advisor, AdvisorResponse, Frequency, FundRecord, PlanError, PlanRequest,
    RecommendationPolicy,
};

const ADVISE_PATH: &str = "/api/sip_advisor";

#[derive(Parser, Debug)]
#[command(
    name = "sip-advisor",
    about = "Recurring investment (SIP) recommender and growth projector"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "SIP_LOG_LEVEL",
        default_value = "info",
        help = "Log filter used when RUST_LOG is not set"
    )]
    pub log_level: String,
    #[arg(
        long,
        global = true,
        env = "SIP_POLICY_PATH",
        help = "JSON recommendation policy; the built-in policy is used when absent"
    )]
    pub policy: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeArgs),
    /// Print a single recommendation as JSON
    Plan(PlanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "SIP_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "SIP_PORT", default_value_t = 8000)]
    pub port: u16,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid --host/--port {}:{}: {e}", self.host, self.port))
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, help = "Amount saved per period")]
    pub amount: f64,
    #[arg(
        long,
        default_value = "monthly",
        help = "daily, weekly or monthly; anything else is treated as monthly"
    )]
    pub frequency: String,
    #[arg(long, default_value = "INR", help = "Currency label, never converted")]
    pub currency: String,
    #[arg(long, allow_hyphen_values = true)]
    pub age: i64,
    #[arg(long, default_value = "")]
    pub goals: String,
    #[arg(long, help = "Free text, e.g. \"conservative\"; inferred from age when absent")]
    pub risk_tolerance: Option<String>,
    #[arg(long, help = "Skip chart rendering")]
    pub no_chart: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AdvisePayload {
    #[serde(alias = "savings_amount", alias = "savings_capacity", alias = "savingsCapacity")]
    savings_amount: Option<f64>,
    frequency: Option<String>,
    currency: Option<String>,
    age: Option<i64>,
    goals: Option<String>,
    #[serde(alias = "risk_tolerance")]
    risk_tolerance: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInfo {
    message: &'static str,
    policy_version: String,
    api_endpoint: &'static str,
    funds_endpoint: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FundsResponse<'a> {
    funds: Vec<&'a FundRecord>,
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "advisor request failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to build recommendation",
                )
            }
        }
    }
}

pub fn load_policy(path: Option<&Path>) -> Result<RecommendationPolicy, String> {
    let Some(path) = path else {
        return Ok(RecommendationPolicy::default());
    };
    let json = fs::read_to_string(path)
        .map_err(|e| format!("cannot read policy file {}: {e}", path.display()))?;
    let policy = RecommendationPolicy::from_json(&json)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), version = %policy.version, "loaded recommendation policy");
    Ok(policy)
}

pub fn plan_request_from_args(args: &PlanArgs) -> Result<PlanRequest, PlanError> {
    Ok(PlanRequest {
        savings_amount: args.amount,
        frequency: Frequency::from_label(&args.frequency),
        currency: args.currency.clone(),
        age: age_from_i64(args.age)?,
        goals: args.goals.clone(),
        risk_tolerance: args.risk_tolerance.clone(),
    })
}

fn age_from_i64(age: i64) -> Result<i32, PlanError> {
    i32::try_from(age).map_err(|_| PlanError::InvalidAge { value: age })
}

fn plan_request_from_payload(payload: AdvisePayload) -> Result<PlanRequest, ApiError> {
    let Some(savings_amount) = payload.savings_amount else {
        return Err(ApiError::BadRequest("savingsAmount is required".to_string()));
    };
    let Some(frequency) = payload.frequency else {
        return Err(ApiError::BadRequest("frequency is required".to_string()));
    };
    let Some(age) = payload.age else {
        return Err(ApiError::BadRequest("age is required".to_string()));
    };

    Ok(PlanRequest {
        savings_amount,
        frequency: Frequency::from_label(&frequency),
        currency: payload.currency.unwrap_or_else(|| "INR".to_string()),
        age: age_from_i64(age)?,
        goals: payload.goals.unwrap_or_default(),
        risk_tolerance: payload.risk_tolerance,
    })
}

#[cfg(test)]
fn plan_request_from_json(json: &str) -> Result<PlanRequest, String> {
    let payload = serde_json::from_str::<AdvisePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    plan_request_from_payload(payload).map_err(|e| match e {
        ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
    })
}

pub fn router(advisor: Arc<Advisor>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/funds", get(funds_handler))
        .route(ADVISE_PATH, post(advise_handler))
        .fallback(not_found_handler)
        .with_state(advisor)
}

pub async fn run_http_server(addr: SocketAddr, advisor: Advisor) -> std::io::Result<()> {
    let app = router(Arc::new(advisor));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "SIP advisor API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl+C, shutting down");
}

async fn index_handler(State(advisor): State<Arc<Advisor>>) -> Response {
    json_response(
        StatusCode::OK,
        ServiceInfo {
            message: "Welcome to the Micro-SIP Investment Advisor API",
            policy_version: advisor.policy().version.clone(),
            api_endpoint: ADVISE_PATH,
            funds_endpoint: "/api/funds",
        },
    )
}

async fn funds_handler(State(advisor): State<Arc<Advisor>>) -> Response {
    json_response(
        StatusCode::OK,
        FundsResponse {
            funds: advisor.catalog().records().collect(),
        },
    )
}

async fn advise_handler(
    State(advisor): State<Arc<Advisor>>,
    Json(payload): Json<AdvisePayload>,
) -> Response {
    match advise(&advisor, payload) {
        Ok(response) => {
            tracing::info!(
                risk_profile = %response.plan.risk_profile,
                horizon_years = response.plan.horizon_years,
                funds = response.plan.recommended_fund_ids.len(),
                "recommendation served"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => err.into_response(),
    }
}

fn advise(advisor: &Advisor, payload: AdvisePayload) -> Result<AdvisorResponse, ApiError> {
    let request = plan_request_from_payload(payload)?;
    Ok(advisor.advise(&request)?)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Recommender, RiskProfile};

    fn sample_json() -> &'static str {
        r#"{
          "savingsAmount": 100,
          "frequency": "Daily",
          "currency": "USD",
          "age": 25,
          "goals": "Retirement planning"
        }"#
    }

    #[test]
    fn plan_request_from_json_parses_web_keys() {
        let request = plan_request_from_json(sample_json()).expect("json should parse");
        assert_eq!(request.savings_amount, 100.0);
        assert_eq!(request.frequency, Frequency::Daily);
        assert_eq!(request.currency, "USD");
        assert_eq!(request.age, 25);
        assert_eq!(request.goals, "Retirement planning");
        assert_eq!(request.risk_tolerance, None);
    }

    #[test]
    fn plan_request_from_json_accepts_snake_case_keys() {
        let json = r#"{
          "savings_capacity": 500,
          "frequency": "weekly",
          "age": 41,
          "goals": "House",
          "risk_tolerance": "Aggressive"
        }"#;
        let request = plan_request_from_json(json).expect("json should parse");
        assert_eq!(request.savings_amount, 500.0);
        assert_eq!(request.frequency, Frequency::Weekly);
        assert_eq!(request.currency, "INR");
        assert_eq!(request.risk_tolerance.as_deref(), Some("Aggressive"));
    }

    #[test]
    fn plan_request_from_json_requires_core_fields() {
        let err = plan_request_from_json(r#"{"frequency": "daily", "age": 30}"#)
            .expect_err("must require amount");
        assert!(err.contains("savingsAmount"));

        let err = plan_request_from_json(r#"{"savingsAmount": 10, "age": 30}"#)
            .expect_err("must require frequency");
        assert!(err.contains("frequency"));

        let err = plan_request_from_json(r#"{"savingsAmount": 10, "frequency": "daily"}"#)
            .expect_err("must require age");
        assert!(err.contains("age"));
    }

    #[test]
    fn huge_age_is_a_validation_error() {
        let err = plan_request_from_json(
            r#"{"savingsAmount": 10, "frequency": "daily", "age": 99999999999}"#,
        )
        .expect_err("must reject age");
        assert!(err.contains("age must be between 0 and 120"));
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let payload = AdvisePayload {
            savings_amount: Some(-5.0),
            frequency: Some("monthly".to_string()),
            age: Some(30),
            ..AdvisePayload::default()
        };
        let err = advise(&Advisor::default(), payload).expect_err("must reject");
        let msg = match err {
            ApiError::BadRequest(msg) => msg,
            other => panic!("expected bad request, got {other:?}"),
        };
        assert!(msg.contains("savingsAmount"));
        assert_eq!(
            ApiError::BadRequest(msg).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn non_validation_errors_map_to_internal_error() {
        let err = ApiError::from(PlanError::InvalidPolicy("broken".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&header::HeaderValue::from_static("no-store"))
        );
    }

    #[test]
    fn advise_response_serialization_contains_expected_fields() {
        let payload = serde_json::from_str::<AdvisePayload>(sample_json()).expect("payload");
        let response = advise(&Advisor::default(), payload).expect("valid request");
        assert_eq!(response.plan.risk_profile, RiskProfile::Aggressive);

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"plan\""));
        assert!(json.contains("\"monthlyAmount\":3000.0"));
        assert!(json.contains("\"horizonYears\":30"));
        assert!(json.contains("\"riskProfile\":\"aggressive\""));
        assert!(json.contains("\"recommendedFundIds\":[\"SBI_SMALLCAP\",\"AXIS_MIDCAP\",\"HDFC_EQUITY\"]"));
        assert!(json.contains("\"expectedReturnRate\":15.0"));
        assert!(json.contains("\"adjustedMonthlyAmount\":3000.0"));
        assert!(json.contains("\"fundDetails\""));
        assert!(json.contains("\"fundManager\""));
        assert!(json.contains("\"investedAmount\":1080000.0"));
        assert!(json.contains("\"expectedReturns\""));
        assert!(json.contains("\"maturityValue\""));
        assert!(json.contains("\"chartSeries\""));
        assert!(json.contains("\"monthIndex\":1"));
        assert!(json.contains("\"mimeType\":\"image/svg+xml\""));
    }

    #[test]
    fn plan_args_convert_to_request() {
        let cli = Cli::try_parse_from([
            "sip-advisor",
            "plan",
            "--amount",
            "250",
            "--frequency",
            "WEEKLY",
            "--age",
            "52",
            "--risk-tolerance",
            "low risk",
        ])
        .expect("cli should parse");
        let Command::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        let request = plan_request_from_args(&args).expect("valid args");
        assert_eq!(request.frequency, Frequency::Weekly);
        assert_eq!(request.age, 52);
        assert_eq!(request.currency, "INR");

        let plan = crate::core::RuleBasedRecommender::default()
            .recommend(&request)
            .expect("valid request");
        assert_eq!(plan.risk_profile, RiskProfile::Moderate);
        assert_eq!(plan.horizon_years, 10);
    }

    #[test]
    fn serve_args_defaults() {
        let cli = Cli::try_parse_from(["sip-advisor", "serve", "--port", "9000"])
            .expect("cli should parse");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.port, 9000);
        let addr = args.socket_addr().expect("valid address");
        assert_eq!(addr.port(), 9000);
        assert!(cli.policy.is_none());
    }

    #[test]
    fn load_policy_defaults_and_reports_bad_files() {
        let policy = load_policy(None).expect("builtin policy");
        assert_eq!(policy, RecommendationPolicy::default());

        let err = load_policy(Some(Path::new("/nonexistent/policy.json")))
            .expect_err("missing file must fail");
        assert!(err.contains("cannot read policy file"));
    }

    #[tokio::test]
    async fn advise_handler_returns_ok_json() {
        let payload = serde_json::from_str::<AdvisePayload>(sample_json()).expect("payload");
        let response = advise_handler(State(Arc::new(Advisor::default())), Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&header::HeaderValue::from_static("application/json"))
        );
    }

    #[tokio::test]
    async fn advise_handler_rejects_amounts_that_overflow_the_projection() {
        let payload = serde_json::from_str::<AdvisePayload>(
            r#"{"savingsAmount": 1e306, "frequency": "monthly", "age": 25}"#,
        )
        .expect("payload");
        let response = advise_handler(State(Arc::new(Advisor::default())), Json(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_handler_returns_json_error() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
