//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{Direction, GameState, MatchId, Side};

/// Opaque per-socket handle
pub type ConnectionId = Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMsg {
    /// Ask to be paired with an opponent
    RequestMatch,

    /// Update the held paddle direction
    PaddleMove {
        direction: Direction,
        /// Match the client believes it is playing in
        match_id: MatchId,
    },

    /// Forfeit the current match
    LeaveMatch,
}

/// Why a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    Completed,
    OpponentLeft,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMsg {
    /// Sent once after the socket is accepted
    Connected {
        connection_id: ConnectionId,
    },

    /// Paired with an opponent
    MatchFound {
        match_id: MatchId,
        side: Side,
    },

    /// Full authoritative state
    StateSnapshot(GameState),

    WaitingForOpponent {
        message: String,
    },

    OpponentDisconnected {
        message: String,
    },

    MatchEnd {
        winner: Option<Side>,
        reason: EndReason,
        message: String,
    },

    /// Non-fatal protocol error
    Error {
        message: String,
    },
}

impl ServerMsg {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::simulation::Simulation;
    use crate::game::GameConfig;
    use serde_json::json;

    #[test]
    fn test_parse_client_messages() {
        let match_id = Uuid::new_v4();

        let msg: ClientMsg = serde_json::from_value(json!({ "type": "request-match" })).unwrap();
        assert_eq!(msg, ClientMsg::RequestMatch);

        let msg: ClientMsg = serde_json::from_value(json!({
            "type": "paddle-move",
            "direction": "up",
            "matchId": match_id,
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMsg::PaddleMove {
                direction: Direction::Up,
                match_id
            }
        );

        let msg: ClientMsg = serde_json::from_str(r#"{"type":"leave-match"}"#).unwrap();
        assert_eq!(msg, ClientMsg::LeaveMatch);
    }

    #[test]
    fn test_reject_unknown_direction() {
        let result = serde_json::from_value::<ClientMsg>(json!({
            "type": "paddle-move",
            "direction": "sideways",
            "matchId": Uuid::new_v4(),
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_shapes() {
        let match_id = Uuid::new_v4();
        let value = serde_json::to_value(ServerMsg::MatchFound {
            match_id,
            side: Side::Left,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({ "type": "match-found", "matchId": match_id.to_string(), "side": "left" })
        );

        let value = serde_json::to_value(ServerMsg::MatchEnd {
            winner: None,
            reason: EndReason::OpponentLeft,
            message: "Opponent left".to_string(),
        })
        .unwrap();
        assert_eq!(value["type"], "match-end");
        assert_eq!(value["winner"], serde_json::Value::Null);
        assert_eq!(value["reason"], "opponent-left");

        let value = serde_json::to_value(ServerMsg::error("nope")).unwrap();
        assert_eq!(value, json!({ "type": "error", "message": "nope" }));
    }

    #[test]
    fn test_snapshot_is_flattened() {
        let sim = Simulation::new(GameConfig::default(), 5);
        let value = serde_json::to_value(ServerMsg::StateSnapshot(sim.snapshot())).unwrap();

        assert_eq!(value["type"], "state-snapshot");
        assert_eq!(value["status"], "waiting");
        assert_eq!(value["boardWidth"], 800.0);
        assert!(value["ball"]["vx"].is_number());

        let back: ServerMsg = serde_json::from_value(value).unwrap();
        assert_eq!(back, ServerMsg::StateSnapshot(sim.snapshot()));
    }
}
