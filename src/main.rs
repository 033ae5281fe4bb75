use std::process;

use clap::Parser;
use mm_rating_processor::{
    args::Args,
    database::db::DbClient,
    error::ProcessorError,
    model::constants::RatingConstants,
    processor::{load_constants, process_event},
    submissions::read_submissions
};
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // A missing .env is fine, the environment may already be set
    let _ = dotenv::dotenv();
    let args = Args::parse();

    init_logging(&args.log_level);

    if let Err(e) = run(args).await {
        error!("{}", e);
        process::exit(1);
    }
}

fn init_logging(log_level: &str) {
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .init();
}

async fn run(args: Args) -> Result<(), ProcessorError> {
    if args.rollback {
        let mut client = DbClient::connect(&args.connection_string).await?;
        let restored = client.rollback_event(args.event_id, args.rating_type).await?;
        info!("Restored {} members", restored);
        return Ok(());
    }

    let Some(path) = args.submissions.as_deref() else {
        return Err(ProcessorError::InvalidInput("a submissions file is required".to_string()));
    };

    // Bad input fails before touching the database
    let constants = match args.constants.as_deref() {
        Some(path) => load_constants(path)?,
        None => RatingConstants::for_rating_type(args.rating_type)
    };
    let submissions = read_submissions(path)?;

    let mut client = DbClient::connect(&args.connection_string).await?;
    let processed = process_event(
        &mut client,
        args.event_id,
        args.rating_type,
        &submissions,
        &constants,
        args.dry_run
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&processed.outcome)?);
    Ok(())
}
