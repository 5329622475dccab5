use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_core::analysis::analyze_deal;
use pulse_core::config::Settings;
use pulse_core::storage::{seed, Repositories};

mod deal;

#[derive(Debug, Parser)]
#[command(name = "pulse", about = "Analyze real-estate deals from the command line")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a deal analysis against a sample listing or explicit figures.
    Analyze(deal::AnalyzeArgs),
    /// Print the sample listings.
    Listings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Err(err) = run(args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let repos = Repositories::in_memory();
    seed::seed(&repos).await?;

    match args.command {
        Command::Analyze(analyze) => {
            let input = deal::resolve_input(&analyze, &repos).await?;
            let analysis = analyze_deal(&input, &settings.assumptions())?;
            if analyze.json {
                let out = serde_json::json!({
                    "analysis": analysis.report(),
                    "recommendations": analysis.recommendations,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", deal::render(&analysis));
            }
        }
        Command::Listings => {
            for p in repos.properties.list().await? {
                println!(
                    "{:<28} {:<12} {:<16} {:>12.0}",
                    p.title,
                    p.property_type.as_str(),
                    p.city,
                    p.price
                );
            }
        }
    }

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
