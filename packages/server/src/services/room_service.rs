use tracing::info;

use super::{commit, with_room};
use crate::{
    models::{
        chat::ChatMessage,
        error::GameError,
        message::{Outbound, ServerEvent},
        player::{normalize_name, Player, PlayerId, MAX_NAME_LEN},
        room::{Room, RoomView, SettingsPatch},
    },
    state::AppState,
};

/// Opens a room owned by the caller. Returns the room code and the owner id.
pub async fn create_room(
    state: &AppState,
    connection: &str,
    name: &str,
) -> Result<(String, PlayerId), GameError> {
    let name = normalize_name(name).ok_or(GameError::InvalidName(MAX_NAME_LEN))?;
    let owner = Player::new(name, Some(connection.to_string()));
    let owner_id = owner.id.clone();
    let config = state.config.clone();
    let (room_id, shared) = state
        .registry
        .create(config.room_code_length, |code| Room::new(code, owner, &config))
        .await;
    info!("Room {} created by {}", room_id, owner_id);

    let mut room = shared.lock().await;
    let out = vec![
        Outbound::connection(
            connection,
            ServerEvent::RoomCreated {
                room_id: room_id.clone(),
            },
        ),
        room.joined_event(connection, &owner_id),
        room.state_event(),
    ];
    commit(state, &mut room, out).await;
    Ok((room_id, owner_id))
}

pub async fn join_room(
    state: &AppState,
    connection: &str,
    room_id: &str,
    name: &str,
) -> Result<(String, PlayerId), GameError> {
    let shared = state.registry.find(room_id).await?;
    let mut room = shared.lock().await;
    let (player_id, out) = room.add_player(name, connection)?;
    info!("Player {} joined room {}", player_id, room.room_id);
    let room_id = room.room_id.clone();
    commit(state, &mut room, out).await;
    Ok((room_id, player_id))
}

/// Rebinds an existing participant to a new connection. `token` is the one
/// delivered privately in `JoinedRoom`.
pub async fn rejoin_room(
    state: &AppState,
    connection: &str,
    room_id: &str,
    player_id: &str,
    token: &str,
) -> Result<String, GameError> {
    let shared = state.registry.find(room_id).await?;
    let mut room = shared.lock().await;
    let out = room.rejoin(player_id, token, connection)?;
    info!("Player {} rejoined room {}", player_id, room.room_id);
    let room_id = room.room_id.clone();
    commit(state, &mut room, out).await;
    Ok(room_id)
}

pub async fn leave_room(state: &AppState, room_id: &str, caller: &str) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.leave(caller)).await
}

pub async fn update_settings(
    state: &AppState,
    room_id: &str,
    caller: &str,
    patch: SettingsPatch,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.update_settings(caller, patch)).await
}

pub async fn kick_player(
    state: &AppState,
    room_id: &str,
    caller: &str,
    target: &str,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.kick(caller, target)).await
}

pub async fn send_chat(
    state: &AppState,
    room_id: &str,
    caller: &str,
    text: &str,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.send_chat(caller, text)).await
}

pub async fn get_rooms(state: &AppState) -> Vec<RoomView> {
    let mut views = Vec::new();
    for shared in state.registry.snapshot().await {
        let room = shared.lock().await;
        if !room.is_closed() {
            views.push(room.view());
        }
    }
    views.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    views
}

pub async fn get_room_info(state: &AppState, room_id: &str) -> Result<RoomView, GameError> {
    let shared = state.registry.find(room_id).await?;
    let room = shared.lock().await;
    room.ensure_open()?;
    Ok(room.view())
}

pub async fn get_chat(state: &AppState, room_id: &str) -> Result<Vec<ChatMessage>, GameError> {
    let shared = state.registry.find(room_id).await?;
    let room = shared.lock().await;
    room.ensure_open()?;
    Ok(room.chat_log.messages.iter().cloned().collect())
}

/// Whether `connection` still holds `player_id`'s seat in the room.
pub async fn holds_seat(
    state: &AppState,
    room_id: &str,
    player_id: &str,
    connection: &str,
) -> bool {
    let Ok(shared) = state.registry.find(room_id).await else {
        return false;
    };
    let room = shared.lock().await;
    room.find_player(player_id)
        .is_some_and(|p| p.connection.as_deref() == Some(connection))
}

/// Whether a room with this code is open.
pub async fn room_exists(state: &AppState, room_id: &str) -> bool {
    state.registry.find(room_id).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::room::RoomPhase;

    #[tokio::test]
    async fn create_then_join() {
        let state = AppState::new();
        let mut owner_rx = state.connections.register("c1").await;
        let (room_id, owner_id) = create_room(&state, "c1", "Ana").await.unwrap();
        assert_eq!(
            owner_rx.recv().await,
            Some(ServerEvent::RoomCreated {
                room_id: room_id.clone()
            })
        );

        let (joined, player_id) = join_room(&state, "c2", &room_id.to_lowercase(), "Beto")
            .await
            .unwrap();
        assert_eq!(joined, room_id);
        assert_ne!(player_id, owner_id);

        let view = get_room_info(&state, &room_id).await.unwrap();
        assert_eq!(view.players.len(), 2);
        assert_eq!(view.owner_id, Some(owner_id));
        assert_eq!(view.phase, RoomPhase::Lobby);
    }

    #[tokio::test]
    async fn unknown_room_is_reported() {
        let state = AppState::new();
        assert_eq!(
            join_room(&state, "c1", "ZZZZ", "Ana").await.unwrap_err(),
            GameError::RoomNotFound
        );
        assert!(!room_exists(&state, "ZZZZ").await);
    }

    #[tokio::test]
    async fn last_leave_removes_room() {
        let state = AppState::new();
        let (room_id, owner_id) = create_room(&state, "c1", "Ana").await.unwrap();
        leave_room(&state, &room_id, &owner_id).await.unwrap();
        assert_eq!(
            get_room_info(&state, &room_id).await.unwrap_err(),
            GameError::RoomNotFound
        );
        assert!(state.registry.is_empty().await);
    }

    #[tokio::test]
    async fn blank_owner_name_is_rejected() {
        let state = AppState::new();
        assert_eq!(
            create_room(&state, "c1", "  ").await.unwrap_err(),
            GameError::InvalidName(MAX_NAME_LEN)
        );
        assert!(state.registry.is_empty().await);
    }
}
