use tracing::info;

use super::commit;
use crate::state::AppState;

/// A closed transport is a departure from every room it was bound in.
/// Returns how many rooms it left.
pub async fn disconnect(state: &AppState, connection: &str) -> usize {
    let mut departures = 0;
    for shared in state.registry.snapshot().await {
        let mut room = shared.lock().await;
        if let Some(out) = room.disconnect(connection) {
            departures += 1;
            info!("Connection {} left room {}", connection, room.room_id);
            commit(state, &mut room, out).await;
        }
    }
    state.connections.unregister(connection).await;
    departures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::ServerEvent;
    use crate::services::room_service;

    #[tokio::test]
    async fn disconnect_promotes_next_owner() {
        let state = AppState::new();
        let (room_id, _) = room_service::create_room(&state, "c1", "Ana").await.unwrap();
        let mut beto_rx = state.connections.register("c2").await;
        let (_, beto) = room_service::join_room(&state, "c2", &room_id, "Beto")
            .await
            .unwrap();
        while beto_rx.try_recv().is_ok() {}

        assert_eq!(disconnect(&state, "c1").await, 1);
        let view = room_service::get_room_info(&state, &room_id).await.unwrap();
        assert_eq!(view.owner_id, Some(beto));
        assert!(matches!(
            beto_rx.recv().await,
            Some(ServerEvent::GameState { state: view }) if view.players.len() == 1
        ));
    }

    #[tokio::test]
    async fn disconnect_of_sole_member_destroys_room() {
        let state = AppState::new();
        room_service::create_room(&state, "c1", "Ana").await.unwrap();
        disconnect(&state, "c1").await;
        assert!(state.registry.is_empty().await);
        assert_eq!(disconnect(&state, "c1").await, 0);
    }
}
