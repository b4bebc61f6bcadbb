use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::{models::error::GameError, services::room_service, state::AppState, utils::websocket};

pub fn routes(state: AppState) -> Router {
    Router::new()
        // ルーム一覧取得
        // curl http://localhost:8080/api/room/rooms
        .route("/rooms", get(get_rooms))
        // WebSocket接続 (ゲームの操作はすべてこちら)
        // websocat ws://localhost:8080/api/room/ws
        .route("/ws", get(websocket::handler))
        // 特定のルーム情報取得
        // curl http://localhost:8080/api/room/{roomid}
        .route("/:roomid", get(get_room_info))
        // チャット履歴
        // curl http://localhost:8080/api/room/{roomid}/chat
        .route("/:roomid/chat", get(get_chat))
        .with_state(state)
}

async fn get_rooms(State(state): State<AppState>) -> impl IntoResponse {
    let rooms = room_service::get_rooms(&state).await;
    (StatusCode::OK, Json(rooms))
}

async fn get_room_info(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    let room = room_service::get_room_info(&state, &room_id).await?;
    Ok((StatusCode::OK, Json(room)))
}

async fn get_chat(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, GameError> {
    let messages = room_service::get_chat(&state, &room_id).await?;
    Ok((StatusCode::OK, Json(messages)))
}
