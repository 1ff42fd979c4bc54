use crate::demo::{run_demo, DemoArgs};
use crate::infra::{assessment_service, run_questionnaire, OfflinePredictionClient};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dropout_risk::assessment::{
    AssessmentRequest, HttpPredictionClient, PredictionClient, RiskResult,
};
use dropout_risk::config::AppConfig;
use dropout_risk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Dropout Risk Assessment",
    about = "Run the student dropout-risk assessment service or score questionnaires from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a questionnaire stored as a JSON request file
    Assess(AssessArgs),
    /// Check whether the prediction service is reachable
    Health,
    /// Run scripted sessions end to end and print the dashboard summary
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file with the snake_case questionnaire fields
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Skip the prediction service and score locally
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args).await,
        Command::Health => run_health().await,
        Command::Demo(args) => run_demo(args).await,
    }
}

async fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.answers)?;
    let request: AssessmentRequest = serde_json::from_str(&raw)?;

    let result = if args.offline {
        assess_with(&config, OfflinePredictionClient, &request).await?
    } else {
        let client = HttpPredictionClient::new(&config.predictor)?;
        assess_with(&config, client, &request).await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn assess_with<C>(
    config: &AppConfig,
    client: C,
    request: &AssessmentRequest,
) -> Result<RiskResult, AppError>
where
    C: PredictionClient + 'static,
{
    let service = assessment_service(config, client);
    let (_, result) = run_questionnaire(&*service, request).await?;
    Ok(result)
}

async fn run_health() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let client = HttpPredictionClient::new(&config.predictor)?;
    let status = if client.health().await {
        "available"
    } else {
        "unavailable"
    };
    println!("Prediction service at {}: {status}", client.base_url());
    Ok(())
}
