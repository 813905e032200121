use std::sync::Arc;

use sqlx::PgPool;
use storage::{
    models::Game,
    repository::membership::MembershipRepository,
    services::{
        notifications::{self, ResultNotifier},
        settlement::SettlementResult,
    },
};

/// Result notification dispatch shared by every handler that settles games
#[derive(Clone)]
pub struct Notifications {
    notifier: Arc<dyn ResultNotifier>,
    enabled: bool,
}

impl Notifications {
    pub fn new(notifier: Arc<dyn ResultNotifier>, enabled: bool) -> Self {
        Self { notifier, enabled }
    }

    /// Sends result messages in the background. Failures are logged only;
    /// the settlement is already committed.
    pub fn spawn(&self, pool: PgPool, game: Game, results: Vec<SettlementResult>) {
        if !self.enabled || results.is_empty() {
            return;
        }

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            for result in results {
                let repo = MembershipRepository::new(&pool);
                let recipients = match repo
                    .list_result_recipients(result.game_id, result.group_id)
                    .await
                {
                    Ok(recipients) => recipients,
                    Err(e) => {
                        tracing::error!(
                            game_id = %result.game_id,
                            group_id = %result.group_id,
                            "Failed to load result recipients: {}",
                            e
                        );
                        continue;
                    }
                };

                let messages = notifications::compose_result_messages(&game, &result, &recipients);
                let report = notifications::dispatch(notifier.as_ref(), &messages).await;
                tracing::info!(
                    game_id = %result.game_id,
                    group_id = %result.group_id,
                    sent = report.sent,
                    failed = report.errors.len(),
                    "Result notifications dispatched"
                );
            }
        });
    }
}
