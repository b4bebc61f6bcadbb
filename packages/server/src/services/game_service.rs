use std::time::Duration;
use tracing::debug;

use super::{commit, with_room};
use crate::{
    models::{
        error::GameError,
        game::PollChoice,
        player::PlayerId,
        words::CategorySummary,
    },
    state::AppState,
};

pub async fn start_game(state: &AppState, room_id: &str, caller: &str) -> Result<(), GameError> {
    let words = state.words.clone();
    with_room(state, room_id, |room| {
        room.start_game(caller, &words, &mut rand::thread_rng())
    })
    .await
}

pub async fn submit_word(
    state: &AppState,
    room_id: &str,
    caller: &str,
    word: &str,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.submit_word(caller, word)).await
}

pub async fn skip_turn(state: &AppState, room_id: &str, caller: &str) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.skip_turn(caller)).await
}

pub async fn request_vote(state: &AppState, room_id: &str, caller: &str) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.request_vote(caller)).await
}

pub async fn poll_choice(
    state: &AppState,
    room_id: &str,
    caller: &str,
    choice: PollChoice,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.poll_choice(caller, choice)).await
}

pub async fn continue_round(
    state: &AppState,
    room_id: &str,
    caller: &str,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.continue_round(caller)).await
}

pub async fn cast_vote(
    state: &AppState,
    room_id: &str,
    caller: &str,
    target: Option<PlayerId>,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.cast_vote(caller, target)).await
}

pub async fn set_vote_intent(
    state: &AppState,
    room_id: &str,
    caller: &str,
    target: Option<PlayerId>,
) -> Result<(), GameError> {
    with_room(state, room_id, |room| room.set_vote_intent(caller, target)).await
}

pub fn categories(state: &AppState) -> Vec<CategorySummary> {
    state.words.summaries()
}

/// Re-enters the room after `seconds` as a synthetic skip for turn `serial`.
pub fn schedule_turn_timer(state: AppState, room_id: String, serial: u64, seconds: u32) {
    debug!(
        "Room {}: turn {} expires in {}s",
        room_id, serial, seconds
    );
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(u64::from(seconds))).await;
        expire_turn(&state, &room_id, serial).await;
    });
}

/// Goes through the same room lock as player commands. A room that is gone or
/// a turn that already moved on is a no-op.
pub async fn expire_turn(state: &AppState, room_id: &str, serial: u64) {
    let Ok(shared) = state.registry.find(room_id).await else {
        return;
    };
    let mut room = shared.lock().await;
    let out = room.expire_turn(serial);
    if out.is_empty() {
        return;
    }
    commit(state, &mut room, out).await;
}
