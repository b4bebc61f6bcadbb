use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure a room command can produce. Each variant maps to the symbolic
/// code sent back to the caller in an `ERROR` frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("room not found")]
    RoomNotFound,
    #[error("action not allowed")]
    NotAllowed,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("at least 3 players are needed to start")]
    NeedMinPlayers,
    #[error("impostor count must be lower than the player count")]
    TooManyImpostors,
    #[error("eliminated players cannot vote")]
    NotAllowedToVote,
    #[error("voting is not open")]
    VoteNotAvailable,
    #[error("the round-end poll is not open")]
    PollNotAvailable,
    #[error("the round cannot be continued now")]
    ContinueNotAvailable,
    #[error("players can only be kicked in the lobby")]
    CannotKickAfterStart,
    #[error("player not found")]
    PlayerNotFound,
    #[error("the game has already started")]
    GameAlreadyStarted,
    #[error("the room is full")]
    RoomFull,
    #[error("names must be between 1 and {0} characters")]
    InvalidName(usize),
    #[error("words must be between 1 and {0} characters")]
    InvalidWord(usize),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("no words available for the selected categories")]
    NoWordsAvailable,
    #[error("malformed message: {0}")]
    InvalidMessage(String),
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::RoomNotFound => "ROOM_NOT_FOUND",
            GameError::NotAllowed => "NOT_ALLOWED",
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::NeedMinPlayers => "NEED_MIN_PLAYERS",
            GameError::TooManyImpostors => "TOO_MANY_IMPOSTORS",
            GameError::NotAllowedToVote => "NOT_ALLOWED_TO_VOTE",
            GameError::VoteNotAvailable => "VOTE_NOT_AVAILABLE",
            GameError::PollNotAvailable => "POLL_NOT_AVAILABLE",
            GameError::ContinueNotAvailable => "CONTINUE_NOT_AVAILABLE",
            GameError::CannotKickAfterStart => "CANNOT_KICK_AFTER_START",
            GameError::PlayerNotFound => "PLAYER_NOT_FOUND",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::RoomFull => "ROOM_FULL",
            GameError::InvalidName(_) => "INVALID_NAME",
            GameError::InvalidWord(_) => "INVALID_WORD",
            GameError::InvalidSettings(_) => "INVALID_SETTINGS",
            GameError::NoWordsAvailable => "NO_WORDS_AVAILABLE",
            GameError::InvalidMessage(_) => "INVALID_MESSAGE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GameError::RoomNotFound | GameError::PlayerNotFound => StatusCode::NOT_FOUND,
            GameError::NotAllowed | GameError::NotAllowedToVote => StatusCode::FORBIDDEN,
            GameError::NotYourTurn
            | GameError::VoteNotAvailable
            | GameError::PollNotAvailable
            | GameError::ContinueNotAvailable
            | GameError::CannotKickAfterStart
            | GameError::GameAlreadyStarted
            | GameError::RoomFull => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "code": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
