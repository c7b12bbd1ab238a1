//! Messages posted by hosted games.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Recognised message from a hosted game.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameMessage {
    /// Progress report: `{ "type": "gameScore", "score": … }`.
    GameScore(ScoreReport),
}

/// Score reported by the running game.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    /// Reported score.
    pub score: f64,
    /// When the portal received the report.
    pub received_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawMessage {
    #[serde(rename = "gameScore")]
    GameScore { score: f64 },
}

impl FrameMessage {
    /// Parse a posted payload. Unknown or malformed payloads yield `None`.
    pub fn parse(payload: &Value) -> Option<Self> {
        match RawMessage::deserialize(payload).ok()? {
            RawMessage::GameScore { score } => Some(FrameMessage::GameScore(ScoreReport {
                score,
                received_at: Utc::now(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognises_game_score() {
        let message = FrameMessage::parse(&json!({"type": "gameScore", "score": 1200}));
        match message {
            Some(FrameMessage::GameScore(report)) => assert_eq!(report.score, 1200.0),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn ignores_other_payloads() {
        assert!(FrameMessage::parse(&json!({"type": "ready"})).is_none());
        assert!(FrameMessage::parse(&json!({"type": "gameScore"})).is_none());
        assert!(FrameMessage::parse(&json!("gameScore")).is_none());
    }
}
