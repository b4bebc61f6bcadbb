use crate::models::error::GameError;
use crate::models::message::Outbound;
use crate::models::room::Room;
use crate::state::AppState;

pub mod connection_service;
pub mod game_service;
pub mod room_service;

/// Runs one command against a room under its lock, then publishes the result.
pub(crate) async fn with_room<F>(state: &AppState, room_id: &str, op: F) -> Result<(), GameError>
where
    F: FnOnce(&mut Room) -> Result<Vec<Outbound>, GameError>,
{
    let shared = state.registry.find(room_id).await?;
    let mut room = shared.lock().await;
    let out = op(&mut room)?;
    commit(state, &mut room, out).await;
    Ok(())
}

/// Delivers notifications, drops rooms that closed, and arms the turn timer
/// for a new speaker. The caller holds the room lock.
pub(crate) async fn commit(state: &AppState, room: &mut Room, out: Vec<Outbound>) {
    state.dispatch(room, out).await;
    if room.is_closed() {
        state.registry.remove(&room.room_id).await;
        return;
    }
    if state.config.auto_skip_turns {
        if let Some((serial, seconds)) = room.arm_turn_timer() {
            game_service::schedule_turn_timer(state.clone(), room.room_id.clone(), serial, seconds);
        }
    }
}
