use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::settlement::{SettledPrediction, SettlementResult};
use crate::models::Game;

/// Ordinal suffix for a rank: 1st, 2nd, 3rd, 4th, 11th, 21st...
pub fn rank_display(rank: u32) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{rank}{suffix}")
}

pub fn format_delta(delta: Option<u64>) -> String {
    match delta {
        None => "-".to_string(),
        Some(0) => "Perfect!".to_string(),
        Some(d) => format!("{d} off"),
    }
}

/// A member who predicted the game, with their delivery preferences.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipient {
    pub user_id: Uuid,
    pub name: String,
    pub wager_opt_in: bool,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "lowercase")]
pub enum Channel {
    Email(String),
    Sms(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub user_id: Uuid,
    pub channel: Channel,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
#[error("Delivery to {recipient} failed: {reason}")]
pub struct NotifyError {
    pub recipient: Uuid,
    pub reason: String,
}

/// Outbound delivery of result messages. Email and SMS providers live
/// outside this crate.
#[async_trait]
pub trait ResultNotifier: Send + Sync {
    async fn deliver(&self, message: &ResultMessage) -> Result<(), NotifyError>;
}

/// Writes every message to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl ResultNotifier for TracingNotifier {
    async fn deliver(&self, message: &ResultMessage) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = %message.user_id,
            channel = ?message.channel,
            subject = %message.subject,
            "{}",
            message.body
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub errors: Vec<String>,
}

fn personal_text(
    entry: &SettledPrediction,
    recipient: &Recipient,
    result: &SettlementResult,
    names: &HashMap<Uuid, &str>,
) -> String {
    let name_of = |p: &SettledPrediction| names.get(&p.user_id).copied().unwrap_or("Someone");
    let own = format_delta(Some(entry.delta));

    let Some(winner) = result.overall_winner() else {
        return format!("You finished {} ({}).", rank_display(entry.rank), own);
    };
    let coffee = result.wager_winner();
    let winner_line = format!("{} wins ({})", name_of(winner), format_delta(Some(winner.delta)));

    if entry.prediction_id == winner.prediction_id {
        if entry.won_wager {
            return format!("Collect your coffee! You win with the best prediction ({own}).");
        }
        return format!("Congrats! You win with the best prediction ({own}).");
    }

    if entry.won_wager {
        return format!("{winner_line}, but you win coffee ({own}).");
    }

    let placing = format!("You finished {} ({}).", rank_display(entry.rank), own);
    match coffee {
        Some(c) if recipient.wager_opt_in => format!(
            "{winner_line}. You owe {} coffee ({}). {placing}",
            name_of(c),
            format_delta(Some(c.delta))
        ),
        _ => format!("{winner_line}. {placing}"),
    }
}

/// Builds one message per channel for every recipient who has a settled
/// prediction in `result`. Recipients without a prediction get nothing.
pub fn compose_result_messages(
    game: &Game,
    result: &SettlementResult,
    recipients: &[Recipient],
) -> Vec<ResultMessage> {
    let names: HashMap<Uuid, &str> = recipients
        .iter()
        .map(|r| (r.user_id, r.name.as_str()))
        .collect();
    let by_user: HashMap<Uuid, &Recipient> = recipients.iter().map(|r| (r.user_id, r)).collect();

    let subject = format!(
        "Game Results: {} {} - {} {}",
        game.home_team, result.final_score.home, result.final_score.away, game.away_team
    );

    let mut messages = Vec::new();
    for entry in &result.entries {
        let Some(recipient) = by_user.get(&entry.user_id) else {
            continue;
        };
        let body = personal_text(entry, recipient, result, &names);

        let channels = [
            recipient.email.clone().map(Channel::Email),
            recipient.phone_number.clone().map(Channel::Sms),
        ];
        for channel in channels.into_iter().flatten() {
            messages.push(ResultMessage {
                user_id: entry.user_id,
                channel,
                subject: subject.clone(),
                body: body.clone(),
            });
        }
    }

    messages
}

/// Best-effort delivery: failures are collected and logged, never raised.
pub async fn dispatch(notifier: &dyn ResultNotifier, messages: &[ResultMessage]) -> DispatchReport {
    let mut report = DispatchReport::default();

    for message in messages {
        match notifier.deliver(message).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::warn!("Result notification failed: {}", e);
                report.errors.push(e.to_string());
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameStatus, Score};
    use crate::services::wager::WagerOutcome;
    use std::sync::Mutex;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn game() -> Game {
        let now = chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc();
        Game {
            game_id: id(7),
            home_team: "OSU".to_string(),
            away_team: "Michigan".to_string(),
            game_time: now,
            season: 2024,
            home_score: Some(24),
            away_score: Some(17),
            status: GameStatus::Finished,
            created_at: now,
            updated_at: now,
        }
    }

    fn entry(n: u128, rank: u32, delta: u64, won_wager: bool) -> SettledPrediction {
        SettledPrediction {
            prediction_id: id(n),
            user_id: id(100 + n),
            delta,
            rank,
            picked_winner: true,
            won_wager,
        }
    }

    fn recipient(n: u128, name: &str, wager_opt_in: bool) -> Recipient {
        Recipient {
            user_id: id(100 + n),
            name: name.to_string(),
            wager_opt_in,
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone_number: None,
        }
    }

    fn result(entries: Vec<SettledPrediction>) -> SettlementResult {
        let wager = entries
            .iter()
            .find(|e| e.won_wager)
            .map_or(WagerOutcome::NoWinner, |e| WagerOutcome::Winner {
                prediction_id: e.prediction_id,
                user_id: e.user_id,
            });
        SettlementResult {
            game_id: id(7),
            group_id: id(9),
            final_score: Score::new(24, 17),
            wager,
            entries,
        }
    }

    fn body_for(messages: &[ResultMessage], user: Uuid) -> &str {
        &messages.iter().find(|m| m.user_id == user).unwrap().body
    }

    #[test]
    fn test_rank_display() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (111, "111th"),
            (101, "101st"),
        ];
        for (rank, expected) in cases {
            assert_eq!(rank_display(rank), expected);
        }
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(None), "-");
        assert_eq!(format_delta(Some(0)), "Perfect!");
        assert_eq!(format_delta(Some(6)), "6 off");
    }

    #[test]
    fn test_split_winners_wording() {
        let result = result(vec![
            entry(1, 1, 0, false),
            entry(2, 2, 6, true),
            entry(3, 3, 14, false),
            entry(4, 4, 20, false),
        ]);
        let recipients = [
            recipient(1, "Ann", false),
            recipient(2, "Ben", true),
            recipient(3, "Cal", true),
            recipient(4, "Dee", false),
        ];

        let messages = compose_result_messages(&game(), &result, &recipients);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].subject, "Game Results: OSU 24 - 17 Michigan");

        assert_eq!(
            body_for(&messages, id(101)),
            "Congrats! You win with the best prediction (Perfect!)."
        );
        assert_eq!(
            body_for(&messages, id(102)),
            "Ann wins (Perfect!), but you win coffee (6 off)."
        );
        assert_eq!(
            body_for(&messages, id(103)),
            "Ann wins (Perfect!). You owe Ben coffee (6 off). You finished 3rd (14 off)."
        );
        assert_eq!(
            body_for(&messages, id(104)),
            "Ann wins (Perfect!). You finished 4th (20 off)."
        );
    }

    #[test]
    fn test_same_winner_collects_coffee() {
        let result = result(vec![entry(1, 1, 3, true), entry(2, 2, 5, false)]);
        let recipients = [recipient(1, "Ann", true), recipient(2, "Ben", true)];

        let messages = compose_result_messages(&game(), &result, &recipients);
        assert_eq!(
            body_for(&messages, id(101)),
            "Collect your coffee! You win with the best prediction (3 off)."
        );
        assert_eq!(
            body_for(&messages, id(102)),
            "Ann wins (3 off). You owe Ann coffee (3 off). You finished 2nd (5 off)."
        );
    }

    #[test]
    fn test_channels_follow_contact_details() {
        let result = result(vec![entry(1, 1, 0, false)]);
        let mut both = recipient(1, "Ann", false);
        both.phone_number = Some("+15555550100".to_string());

        let messages = compose_result_messages(&game(), &result, &[both]);
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0].channel, Channel::Email(_)));
        assert_eq!(messages[1].channel, Channel::Sms("+15555550100".to_string()));
    }

    #[test]
    fn test_members_without_contact_are_skipped() {
        let result = result(vec![entry(1, 1, 0, false), entry(2, 2, 1, false)]);
        let messages = compose_result_messages(&game(), &result, &[recipient(2, "Ben", false)]);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].user_id, id(102));
        assert_eq!(messages[0].body, "Someone wins (Perfect!). You finished 2nd (1 off).");
    }

    struct FlakyNotifier {
        delivered: Mutex<Vec<Uuid>>,
        reject: Uuid,
    }

    #[async_trait]
    impl ResultNotifier for FlakyNotifier {
        async fn deliver(&self, message: &ResultMessage) -> Result<(), NotifyError> {
            if message.user_id == self.reject {
                return Err(NotifyError {
                    recipient: message.user_id,
                    reason: "mailbox full".to_string(),
                });
            }
            self.delivered.lock().unwrap().push(message.user_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_collects_failures() {
        let result = result(vec![entry(1, 1, 0, false), entry(2, 2, 1, false)]);
        let recipients = [recipient(1, "Ann", false), recipient(2, "Ben", false)];
        let messages = compose_result_messages(&game(), &result, &recipients);

        let notifier = FlakyNotifier {
            delivered: Mutex::new(Vec::new()),
            reject: id(101),
        };
        let report = dispatch(&notifier, &messages).await;

        assert_eq!(report.sent, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("mailbox full"));
        assert_eq!(*notifier.delivered.lock().unwrap(), vec![id(102)]);
    }

    #[tokio::test]
    async fn test_tracing_notifier_always_succeeds() {
        let result = result(vec![entry(1, 1, 0, false)]);
        let messages = compose_result_messages(&game(), &result, &[recipient(1, "Ann", false)]);

        let report = dispatch(&TracingNotifier, &messages).await;
        assert_eq!(report.sent, 1);
        assert!(report.errors.is_empty());
    }
}
