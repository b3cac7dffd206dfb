use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sip_advisor::api::{
    Cli, Command, load_policy, plan_request_from_args, run_http_server,
};
use sip_advisor::core::Advisor;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "sip-advisor failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let policy = load_policy(cli.policy.as_deref())?;
    let advisor = Advisor::new(policy);

    match cli.command {
        Command::Serve(args) => {
            let addr = args.socket_addr()?;
            run_http_server(addr, advisor)
                .await
                .map_err(|e| format!("server error: {e}"))
        }
        Command::Plan(args) => {
            let advisor = if args.no_chart {
                advisor.with_chart_renderer(None)
            } else {
                advisor
            };
            let request = plan_request_from_args(&args).map_err(|e| e.to_string())?;
            let response = advisor.advise(&request).map_err(|e| e.to_string())?;
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| format!("cannot serialize response: {e}"))?;
            println!("{json}");
            Ok(())
        }
    }
}

// Logs go to stderr so `plan` output stays pipeable.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
