use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, warn};

use crate::models::config::GameConfig;
use crate::models::error::GameError;
use crate::models::message::{Outbound, Recipient, ServerEvent};
use crate::models::player::ConnectionId;
use crate::models::room::{generate_room_code, normalize_room_code, Room};
use crate::models::words::WordPool;

pub type SharedRoom = Arc<Mutex<Room>>;

/// Collisions tolerated before codes grow by one character.
const MAX_CODE_ATTEMPTS: usize = 32;

#[derive(Clone)]
pub struct AppState {
    pub registry: RoomRegistry,
    pub connections: ConnectionHub,
    pub words: Arc<WordPool>,
    pub config: Arc<GameConfig>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default(), WordPool::default())
    }

    pub fn with_config(config: GameConfig, words: WordPool) -> Self {
        let words = words.with_default_category(&config.default_category);
        AppState {
            registry: RoomRegistry::default(),
            connections: ConnectionHub::default(),
            words: Arc::new(words),
            config: Arc::new(config),
        }
    }

    /// Delivers engine output to the connections currently bound in `room`.
    /// Called with the room lock held so per-room ordering is preserved.
    pub async fn dispatch(&self, room: &Room, out: Vec<Outbound>) {
        if out.is_empty() {
            return;
        }
        let senders = self.connections.senders.read().await;
        for Outbound { to, event } in out {
            match to {
                Recipient::Room => {
                    for connection in room.connections() {
                        deliver(&senders, connection, event.clone());
                    }
                }
                Recipient::Player(player_id) => {
                    if let Some(connection) =
                        room.find_player(&player_id).and_then(|p| p.connection.as_ref())
                    {
                        deliver(&senders, connection, event);
                    }
                }
                Recipient::Connection(connection) => deliver(&senders, &connection, event),
            }
        }
    }
}

fn deliver(
    senders: &HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    connection: &str,
    event: ServerEvent,
) {
    match senders.get(connection) {
        Some(tx) => {
            if tx.send(event).is_err() {
                debug!("Connection {} already closed", connection);
            }
        }
        None => debug!("No outbox for connection {}", connection),
    }
}

/// Room code → room. The map lock is only held for lookups and edits, never
/// while waiting on a room.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<String, SharedRoom>>>,
}

impl RoomRegistry {
    /// Reserves a fresh code and stores the room built for it.
    pub async fn create(
        &self,
        code_length: usize,
        build: impl FnOnce(String) -> Room,
    ) -> (String, SharedRoom) {
        let mut rooms = self.rooms.lock().await;
        let code = unique_code(&rooms, code_length);
        let room = Arc::new(Mutex::new(build(code.clone())));
        rooms.insert(code.clone(), room.clone());
        (code, room)
    }

    pub async fn find(&self, code: &str) -> Result<SharedRoom, GameError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(&normalize_room_code(code))
            .cloned()
            .ok_or(GameError::RoomNotFound)
    }

    pub async fn remove(&self, code: &str) -> bool {
        let removed = self
            .rooms
            .lock()
            .await
            .remove(&normalize_room_code(code))
            .is_some();
        if removed {
            debug!("Room {} removed from registry", code);
        }
        removed
    }

    /// Every live room, for fan-out work such as disconnect handling.
    pub async fn snapshot(&self) -> Vec<SharedRoom> {
        self.rooms.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut rooms = self.rooms.lock().await;
        if !rooms.is_empty() {
            warn!("Dropping {} open room(s)", rooms.len());
        }
        rooms.clear();
    }
}

fn unique_code(rooms: &HashMap<String, SharedRoom>, base_length: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut length = base_length.max(1);
    loop {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_room_code(length, &mut rng);
            if !rooms.contains_key(&code) {
                return code;
            }
        }
        length += 1;
    }
}

/// Outboxes of every open WebSocket connection.
#[derive(Clone, Default)]
pub struct ConnectionHub {
    senders: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>>,
}

impl ConnectionHub {
    pub async fn register(&self, connection: &str) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .write()
            .await
            .insert(connection.to_string(), tx);
        rx
    }

    pub async fn unregister(&self, connection: &str) {
        self.senders.write().await.remove(connection);
    }

    pub async fn send(&self, connection: &str, event: ServerEvent) {
        let senders = self.senders.read().await;
        deliver(&senders, connection, event);
    }

    pub async fn len(&self) -> usize {
        self.senders.read().await.len()
    }
}
