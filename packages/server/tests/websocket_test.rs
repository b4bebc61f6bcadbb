use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use server::app;
use server::state::AppState;
use server::utils::test_setup::setup_test_env;
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app::create_app_with_state(AppState::new());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{}/api/room/ws", addr)
}

async fn send(ws: &mut WsStream, frame: Value) {
    ws.send(Message::Text(frame.to_string())).await.unwrap();
}

/// Reads frames until one of the given type shows up.
async fn expect(ws: &mut WsStream, kind: &str) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream closed")
            .unwrap();
        if let Message::Text(text) = msg {
            let value: Value = serde_json::from_str(&text).unwrap();
            if value["type"] == kind {
                return value;
            }
        }
    }
}

#[tokio::test]
async fn test_lobby_over_websocket() {
    setup_test_env();
    let url = spawn_server().await;
    let (mut owner, _) = connect_async(url.as_str()).await.unwrap();
    let (mut guest, _) = connect_async(url.as_str()).await.unwrap();

    send(&mut owner, json!({ "type": "CREATE_ROOM", "name": "Ana" })).await;
    let created = expect(&mut owner, "ROOM_CREATED").await;
    let room_id = created["roomId"].as_str().unwrap().to_string();
    let joined = expect(&mut owner, "JOINED_ROOM").await;
    assert_eq!(joined["state"]["phase"], "LOBBY");

    send(
        &mut guest,
        json!({ "type": "JOIN_ROOM", "roomId": room_id.to_lowercase(), "name": "Beto" }),
    )
    .await;
    let joined = expect(&mut guest, "JOINED_ROOM").await;
    assert_eq!(joined["state"]["players"].as_array().unwrap().len(), 2);

    // the owner first sees the single-player state from creation
    let state = expect(&mut owner, "GAME_STATE").await;
    assert_eq!(state["state"]["players"].as_array().unwrap().len(), 1);
    let state = expect(&mut owner, "GAME_STATE").await;
    assert_eq!(state["state"]["players"].as_array().unwrap().len(), 2);

    // only the owner can start, and two players are not enough anyway
    send(&mut guest, json!({ "type": "START_GAME", "roomId": room_id })).await;
    let error = expect(&mut guest, "ERROR").await;
    assert_eq!(error["code"], "NOT_ALLOWED");

    send(&mut owner, json!({ "type": "START_GAME", "roomId": room_id })).await;
    let error = expect(&mut owner, "ERROR").await;
    assert_eq!(error["code"], "NEED_MIN_PLAYERS");

    send(
        &mut guest,
        json!({ "type": "CHAT_MESSAGE", "roomId": room_id, "text": "hola" }),
    )
    .await;
    let chat = expect(&mut owner, "CHAT_MESSAGE").await;
    assert_eq!(chat["message"]["content"], "hola");
}

#[tokio::test]
async fn test_malformed_frame_is_rejected() {
    setup_test_env();
    let url = spawn_server().await;
    let (mut ws, _) = connect_async(url.as_str()).await.unwrap();

    ws.send(Message::Text("hello".to_string())).await.unwrap();
    let error = expect(&mut ws, "ERROR").await;
    assert_eq!(error["code"], "INVALID_MESSAGE");
}

#[tokio::test]
async fn test_closing_socket_leaves_room() {
    setup_test_env();
    let url = spawn_server().await;
    let (mut owner, _) = connect_async(url.as_str()).await.unwrap();
    let (mut guest, _) = connect_async(url.as_str()).await.unwrap();

    send(&mut owner, json!({ "type": "CREATE_ROOM", "name": "Ana" })).await;
    let room_id = expect(&mut owner, "ROOM_CREATED").await["roomId"]
        .as_str()
        .unwrap()
        .to_string();
    send(
        &mut guest,
        json!({ "type": "JOIN_ROOM", "roomId": room_id, "name": "Beto" }),
    )
    .await;
    let guest_id = expect(&mut guest, "JOINED_ROOM").await["playerId"]
        .as_str()
        .unwrap()
        .to_string();

    owner.close(None).await.unwrap();

    // the guest inherits the room
    loop {
        let state = expect(&mut guest, "GAME_STATE").await;
        if state["state"]["players"].as_array().unwrap().len() == 1 {
            assert_eq!(state["state"]["ownerId"], guest_id);
            break;
        }
    }
}
