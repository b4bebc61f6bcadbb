use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;
use super::game::{Ballot, GameResult, PollBallot, PollChoice};
use super::player::{ConnectionId, PlayerId};
use super::role::Role;
use super::room::{RoomView, SettingsPatch};

/// Frames sent by clients over the room WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientCommand {
    CreateRoom {
        name: String,
    },
    JoinRoom {
        room_id: String,
        name: String,
    },
    Rejoin {
        room_id: String,
        player_id: PlayerId,
        #[serde(default)]
        token: String,
    },
    LeaveRoom {
        room_id: String,
    },
    StartGame {
        room_id: String,
    },
    UpdateSettings {
        room_id: String,
        settings: SettingsPatch,
    },
    KickPlayer {
        room_id: String,
        player_id: PlayerId,
    },
    SubmitWord {
        room_id: String,
        word: String,
    },
    SkipTurn {
        room_id: String,
    },
    RequestVote {
        room_id: String,
    },
    PollChoice {
        room_id: String,
        choice: PollChoice,
    },
    ContinueRound {
        room_id: String,
    },
    CastVote {
        room_id: String,
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    VoteIntent {
        room_id: String,
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    ChatMessage {
        room_id: String,
        text: String,
    },
}

/// Notifications produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    RoomCreated {
        room_id: String,
    },
    JoinedRoom {
        room_id: String,
        player_id: PlayerId,
        /// Secret needed to take the seat back from another connection.
        rejoin_token: String,
        state: RoomView,
    },
    /// The seat in `room_id` was taken over by a rejoining connection.
    SessionReplaced {
        room_id: String,
    },
    GameState {
        state: RoomView,
    },
    PrivateSecret {
        word: String,
        category: String,
    },
    PlayerInfo {
        player_id: PlayerId,
        role: Role,
        word: Option<String>,
        category: Option<String>,
    },
    CurrentTurn {
        player_id: PlayerId,
    },
    WordSubmitted {
        player_id: PlayerId,
        word: String,
    },
    ChatMessage {
        message: ChatMessage,
    },
    RoundEnded {
        room_id: String,
    },
    StartVoting,
    VoteProgress {
        votes: Vec<Ballot>,
    },
    VoteIntentState {
        intents: Vec<Ballot>,
    },
    PollState {
        vote_now_count: usize,
        another_round_count: usize,
        total_eligible: usize,
        votes: Vec<PollBallot>,
    },
    VoteResult {
        eliminated_id: Option<PlayerId>,
    },
    GameOver {
        winner: GameResult,
        impostor_ids: Vec<PlayerId>,
        word: String,
        category: String,
    },
    Kicked {
        by: Option<PlayerId>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerEvent {
    pub fn error(err: &super::error::GameError) -> Self {
        ServerEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    /// Every connected participant of the room.
    Room,
    /// One participant, wherever they are currently connected.
    Player(PlayerId),
    /// One connection, whether or not it is still bound to a participant.
    Connection(ConnectionId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: Recipient,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn room(event: ServerEvent) -> Self {
        Self {
            to: Recipient::Room,
            event,
        }
    }

    pub fn player(player_id: &str, event: ServerEvent) -> Self {
        Self {
            to: Recipient::Player(player_id.to_string()),
            event,
        }
    }

    pub fn connection(connection: &str, event: ServerEvent) -> Self {
        Self {
            to: Recipient::Connection(connection.to_string()),
            event,
        }
    }
}
