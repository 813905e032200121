use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use storage::services::settlement::{self, SettlementResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "pool-settle")]
#[command(about = "Settle finished games for prediction pool groups", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Settle one game, for a single group or every group tracking it
    Game {
        #[arg(long)]
        game_id: Uuid,

        #[arg(long)]
        group_id: Option<Uuid>,
    },
    /// Re-settle every finished game
    All {
        #[arg(long)]
        season: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pool_settle={},storage={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Game { game_id, group_id } => match group_id {
            Some(group_id) => {
                let result = settlement::recompute_and_store(&pool, game_id, group_id).await?;
                log_result(&result);
            }
            None => {
                let outcome = settlement::resettle_game(&pool, game_id).await?;
                if outcome.settled.is_empty() && outcome.failed.is_empty() && outcome.deferred.is_empty() {
                    tracing::warn!(%game_id, "No group tracks this game");
                }
                for result in &outcome.settled {
                    log_result(result);
                }
                if !outcome.deferred.is_empty() {
                    tracing::warn!(%game_id, "Game is not finished; {} group(s) deferred", outcome.deferred.len());
                }
                if !outcome.failed.is_empty() {
                    anyhow::bail!("{} group settlement(s) failed", outcome.failed.len());
                }
            }
        },
        Commands::All { season } => {
            let summary = settlement::resettle_all(&pool, season).await?;
            tracing::info!(
                "Summary: {} settled, {} deferred, {} failed",
                summary.settled,
                summary.deferred,
                summary.failed
            );

            if summary.failed > 0 {
                anyhow::bail!("{} settlement(s) failed", summary.failed);
            }
        }
    }

    Ok(())
}

fn log_result(result: &SettlementResult) {
    tracing::info!(
        game_id = %result.game_id,
        group_id = %result.group_id,
        "Final score {}-{}, {} prediction(s) ranked",
        result.final_score.home,
        result.final_score.away,
        result.entries.len()
    );

    if let Some(winner) = result.overall_winner() {
        tracing::info!("  Best prediction: user {} ({} off)", winner.user_id, winner.delta);
    }
    match result.wager_winner() {
        Some(winner) => tracing::info!("  Wager won by user {}", winner.user_id),
        None => tracing::info!("  No wager winner"),
    }
}
