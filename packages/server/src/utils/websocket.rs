use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::error::GameError;
use crate::models::message::{ClientCommand, ServerEvent};
use crate::models::player::PlayerId;
use crate::models::room::normalize_room_code;
use crate::services::{connection_service, game_service, room_service};
use crate::state::AppState;

pub async fn handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Room code → participant this connection plays as.
#[derive(Debug, Default)]
pub struct Session {
    pub connection: String,
    bindings: HashMap<String, PlayerId>,
}

impl Session {
    pub fn new(connection: String) -> Self {
        Self {
            connection,
            bindings: HashMap::new(),
        }
    }

    fn bind(&mut self, room_id: &str, player_id: PlayerId) {
        self.bindings.insert(normalize_room_code(room_id), player_id);
    }

    fn unbind(&mut self, room_id: &str) {
        self.bindings.remove(&normalize_room_code(room_id));
    }

    /// Identity of the caller in `room_id`. A binding whose seat moved to
    /// another connection is dropped. Unbound callers get `NotAllowed` for
    /// rooms that exist and `RoomNotFound` otherwise.
    async fn caller(&mut self, state: &AppState, room_id: &str) -> Result<PlayerId, GameError> {
        let code = normalize_room_code(room_id);
        if let Some(player_id) = self.bindings.get(&code).cloned() {
            if room_service::holds_seat(state, room_id, &player_id, &self.connection).await {
                return Ok(player_id);
            }
            self.bindings.remove(&code);
        }
        if room_service::room_exists(state, room_id).await {
            Err(GameError::NotAllowed)
        } else {
            Err(GameError::RoomNotFound)
        }
    }
}

pub async fn handle_socket(ws: WebSocket, state: AppState) {
    let connection = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", connection);

    let mut outbox = state.connections.register(&connection).await;
    let (mut sender, mut receiver) = ws.split();

    let writer_connection = connection.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to encode event: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                debug!("Error sending to {}: {}", writer_connection, e);
                break;
            }
        }
    });

    let reader_state = state.clone();
    let reader_connection = connection.clone();
    let mut receive_task = tokio::spawn(async move {
        let mut session = Session::new(reader_connection);
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_text(&reader_state, &mut session, &text).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // whichever side finishes first tears the other down
    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }

    let departures = connection_service::disconnect(&state, &connection).await;
    info!(
        "WebSocket connection {} closed, left {} room(s)",
        connection, departures
    );
}

/// Parses one frame and answers failures privately.
pub async fn handle_text(state: &AppState, session: &mut Session, text: &str) {
    let result = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => handle_command(state, session, command).await,
        Err(e) => Err(GameError::InvalidMessage(e.to_string())),
    };
    if let Err(err) = result {
        debug!("Command from {} rejected: {}", session.connection, err);
        state
            .connections
            .send(&session.connection, ServerEvent::error(&err))
            .await;
    }
}

pub async fn handle_command(
    state: &AppState,
    session: &mut Session,
    command: ClientCommand,
) -> Result<(), GameError> {
    let connection = session.connection.clone();
    match command {
        ClientCommand::CreateRoom { name } => {
            let (room_id, player_id) = room_service::create_room(state, &connection, &name).await?;
            session.bind(&room_id, player_id);
        }
        ClientCommand::JoinRoom { room_id, name } => {
            let (room_id, player_id) =
                room_service::join_room(state, &connection, &room_id, &name).await?;
            session.bind(&room_id, player_id);
        }
        ClientCommand::Rejoin {
            room_id,
            player_id,
            token,
        } => {
            let room_id =
                room_service::rejoin_room(state, &connection, &room_id, &player_id, &token)
                    .await?;
            session.bind(&room_id, player_id);
        }
        ClientCommand::LeaveRoom { room_id } => {
            let caller = session.caller(state, &room_id).await?;
            room_service::leave_room(state, &room_id, &caller).await?;
            session.unbind(&room_id);
        }
        ClientCommand::StartGame { room_id } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::start_game(state, &room_id, &caller).await?;
        }
        ClientCommand::UpdateSettings { room_id, settings } => {
            let caller = session.caller(state, &room_id).await?;
            room_service::update_settings(state, &room_id, &caller, settings).await?;
        }
        ClientCommand::KickPlayer { room_id, player_id } => {
            let caller = session.caller(state, &room_id).await?;
            room_service::kick_player(state, &room_id, &caller, &player_id).await?;
        }
        ClientCommand::SubmitWord { room_id, word } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::submit_word(state, &room_id, &caller, &word).await?;
        }
        ClientCommand::SkipTurn { room_id } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::skip_turn(state, &room_id, &caller).await?;
        }
        ClientCommand::RequestVote { room_id } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::request_vote(state, &room_id, &caller).await?;
        }
        ClientCommand::PollChoice { room_id, choice } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::poll_choice(state, &room_id, &caller, choice).await?;
        }
        ClientCommand::ContinueRound { room_id } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::continue_round(state, &room_id, &caller).await?;
        }
        ClientCommand::CastVote { room_id, target_id } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::cast_vote(state, &room_id, &caller, target_id).await?;
        }
        ClientCommand::VoteIntent { room_id, target_id } => {
            let caller = session.caller(state, &room_id).await?;
            game_service::set_vote_intent(state, &room_id, &caller, target_id).await?;
        }
        ClientCommand::ChatMessage { room_id, text } => {
            let caller = session.caller(state, &room_id).await?;
            room_service::send_chat(state, &room_id, &caller, &text).await?;
        }
    }
    Ok(())
}
