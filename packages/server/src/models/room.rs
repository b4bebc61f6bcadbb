use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::chat::{ChatLog, ChatMessage, ChatMessageType, MAX_MESSAGE_LEN};
use super::config::GameConfig;
use super::error::GameError;
use super::game::{GameResult, RoundMeta, SubmittedWord};
use super::message::{Outbound, ServerEvent};
use super::player::{normalize_name, ConnectionId, Player, PlayerId, PlayerView, MAX_NAME_LEN};

pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const MAX_PHASE_SECONDS: u32 = 600;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomPhase {
    Lobby,      // waiting for the owner to start
    InGame,     // players take turns giving words
    RoundEnd,   // everyone spoke; poll between voting and another round
    Discussion, // reserved for a timed talk period, never entered
    Voting,     // ballots are being collected
    Ended,      // terminal, the room is torn down right after
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomSettings {
    pub impostor_count: usize,
    pub turn_time_seconds: u32,
    pub vote_time_seconds: u32,
    pub discussion_time_seconds: u32,
    pub categories: Vec<String>,
    pub hidden_impostor: bool,
    pub reveal_category_to_impostor: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            impostor_count: 1,
            turn_time_seconds: 20,
            vote_time_seconds: 30,
            discussion_time_seconds: 20,
            categories: Vec::new(),
            hidden_impostor: false,
            reveal_category_to_impostor: true,
        }
    }
}

/// Partial settings update sent by the owner. Absent fields are left as is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub impostor_count: Option<usize>,
    pub turn_time_seconds: Option<u32>,
    pub vote_time_seconds: Option<u32>,
    pub discussion_time_seconds: Option<u32>,
    pub category: Option<String>,
    pub categories: Option<Vec<String>>,
    pub hidden_impostor: Option<bool>,
    pub reveal_category_to_impostor: Option<bool>,
}

impl RoomSettings {
    pub fn apply(&mut self, patch: SettingsPatch) -> Result<(), GameError> {
        let mut next = self.clone();
        if let Some(count) = patch.impostor_count {
            if count == 0 {
                return Err(GameError::InvalidSettings(
                    "impostorCount must be at least 1".to_string(),
                ));
            }
            next.impostor_count = count;
        }
        for (field, value, target) in [
            ("turnTimeSeconds", patch.turn_time_seconds, &mut next.turn_time_seconds),
            ("voteTimeSeconds", patch.vote_time_seconds, &mut next.vote_time_seconds),
            (
                "discussionTimeSeconds",
                patch.discussion_time_seconds,
                &mut next.discussion_time_seconds,
            ),
        ] {
            if let Some(seconds) = value {
                if seconds > MAX_PHASE_SECONDS {
                    return Err(GameError::InvalidSettings(format!(
                        "{field} must not exceed {MAX_PHASE_SECONDS}"
                    )));
                }
                *target = seconds;
            }
        }
        if let Some(categories) = patch.categories {
            next.categories = categories;
        } else if let Some(category) = patch.category {
            next.categories = vec![category];
        }
        if let Some(hidden) = patch.hidden_impostor {
            next.hidden_impostor = hidden;
        }
        if let Some(reveal) = patch.reveal_category_to_impostor {
            next.reveal_category_to_impostor = reveal;
        }
        *self = next;
        Ok(())
    }
}

/// Sanitized room state broadcast to everyone. Holds no roles and no word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: String,
    pub players: Vec<PlayerView>,
    pub owner_id: Option<PlayerId>,
    pub settings: RoomSettings,
    pub phase: RoomPhase,
    pub round_number: u32,
    pub created_at: DateTime<Utc>,
    pub current_turn: Option<PlayerId>,
    /// Clues given so far this round, in order.
    pub words: Vec<SubmittedWord>,
    pub winner: Option<GameResult>,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub room_id: String,
    pub players: Vec<Player>,
    pub owner_id: Option<PlayerId>,
    pub settings: RoomSettings,
    pub phase: RoomPhase,
    pub round_number: u32,
    pub created_at: DateTime<Utc>,
    pub max_players: usize,
    pub chat_log: ChatLog,
    pub winner: Option<GameResult>,
    pub(crate) round: Option<RoundMeta>,
    closed: bool,
}

impl Room {
    pub fn new(room_id: String, owner: Player, config: &GameConfig) -> Self {
        Room {
            chat_log: ChatLog::new(room_id.clone(), config.max_chat_history),
            room_id,
            owner_id: Some(owner.id.clone()),
            players: vec![owner],
            settings: config.default_settings.clone(),
            phase: RoomPhase::Lobby,
            round_number: 0,
            created_at: Utc::now(),
            max_players: config.max_players,
            winner: None,
            round: None,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    pub fn ensure_open(&self) -> Result<(), GameError> {
        if self.closed {
            Err(GameError::RoomNotFound)
        } else {
            Ok(())
        }
    }

    pub fn round(&self) -> Option<&RoundMeta> {
        self.round.as_ref()
    }

    /// Looks a participant up by persistent id.
    pub fn find_player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn find_player_by_connection(&self, connection: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.connection.as_deref() == Some(connection))
    }

    pub(crate) fn member(&self, player_id: &str) -> Result<&Player, GameError> {
        self.find_player(player_id).ok_or(GameError::NotAllowed)
    }

    pub fn is_owner(&self, player_id: &str) -> bool {
        self.owner_id.as_deref() == Some(player_id)
    }

    pub(crate) fn ensure_owner(&self, player_id: &str) -> Result<(), GameError> {
        if self.find_player(player_id).is_some() && self.is_owner(player_id) {
            Ok(())
        } else {
            Err(GameError::NotAllowed)
        }
    }

    pub fn is_alive(&self, player_id: &str) -> bool {
        self.find_player(player_id).map_or(false, |p| p.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn in_progress(&self) -> bool {
        matches!(
            self.phase,
            RoomPhase::InGame | RoomPhase::RoundEnd | RoomPhase::Discussion | RoomPhase::Voting
        )
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionId> {
        self.players.iter().filter_map(|p| p.connection.as_ref())
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            room_id: self.room_id.clone(),
            players: self.players.iter().map(Player::view).collect(),
            owner_id: self.owner_id.clone(),
            settings: self.settings.clone(),
            phase: self.phase,
            round_number: self.round_number,
            created_at: self.created_at,
            current_turn: self.current_speaker(),
            words: self
                .round
                .as_ref()
                .map(|meta| meta.words.clone())
                .unwrap_or_default(),
            winner: self.winner,
        }
    }

    pub(crate) fn state_event(&self) -> Outbound {
        Outbound::room(ServerEvent::GameState { state: self.view() })
    }

    pub(crate) fn joined_event(&self, connection: &str, player_id: &str) -> Outbound {
        let rejoin_token = self
            .find_player(player_id)
            .map(|p| p.rejoin_token.clone())
            .unwrap_or_default();
        Outbound::connection(
            connection,
            ServerEvent::JoinedRoom {
                room_id: self.room_id.clone(),
                player_id: player_id.to_string(),
                rejoin_token,
                state: self.view(),
            },
        )
    }

    pub fn add_player(
        &mut self,
        name: &str,
        connection: &str,
    ) -> Result<(PlayerId, Vec<Outbound>), GameError> {
        self.ensure_open()?;
        if self.phase != RoomPhase::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() >= self.max_players {
            return Err(GameError::RoomFull);
        }
        let name = normalize_name(name).ok_or(GameError::InvalidName(MAX_NAME_LEN))?;
        let player = Player::new(name, Some(connection.to_string()));
        let player_id = player.id.clone();
        self.chat_log
            .add_system_message(format!("{} joined the room", player.name));
        self.players.push(player);

        let out = vec![self.joined_event(connection, &player_id), self.state_event()];
        Ok((player_id, out))
    }

    /// Binds an existing participant to a new connection. The token handed
    /// out in `JoinedRoom` must match; the connection that held the seat
    /// before is told it was replaced.
    pub fn rejoin(
        &mut self,
        player_id: &str,
        token: &str,
        connection: &str,
    ) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if token.is_empty() || player.rejoin_token != token {
            return Err(GameError::NotAllowed);
        }
        let displaced = player
            .connection
            .replace(connection.to_string())
            .filter(|old| old != connection);

        let mut out = Vec::new();
        if let Some(old) = displaced {
            info!("Room {}: {} moved to a new connection", self.room_id, player_id);
            out.push(Outbound::connection(
                &old,
                ServerEvent::SessionReplaced {
                    room_id: self.room_id.clone(),
                },
            ));
        }
        out.push(self.joined_event(connection, player_id));
        if let Some(player) = self.find_player(player_id) {
            out.extend(self.briefing(player));
        }
        out.push(self.state_event());
        if let Some(speaker) = self.current_speaker() {
            out.push(Outbound::connection(
                connection,
                ServerEvent::CurrentTurn { player_id: speaker },
            ));
        }
        Ok(out)
    }

    pub fn update_settings(
        &mut self,
        caller: &str,
        patch: SettingsPatch,
    ) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        self.ensure_owner(caller)?;
        self.settings.apply(patch)?;
        Ok(vec![self.state_event()])
    }

    pub fn kick(&mut self, caller: &str, target: &str) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        self.ensure_owner(caller)?;
        if self.phase != RoomPhase::Lobby {
            return Err(GameError::CannotKickAfterStart);
        }
        if caller == target {
            return Err(GameError::NotAllowed);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == target)
            .ok_or(GameError::PlayerNotFound)?;
        let removed = self.players.remove(idx);
        self.chat_log
            .add_system_message(format!("{} was kicked", removed.name));

        let mut out = Vec::new();
        if let Some(connection) = &removed.connection {
            out.push(Outbound::connection(
                connection,
                ServerEvent::Kicked {
                    by: self.owner_id.clone(),
                },
            ));
        }
        out.push(self.state_event());
        Ok(out)
    }

    pub fn leave(&mut self, caller: &str) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        self.member(caller)?;
        Ok(self.depart(caller))
    }

    /// Removes whoever is bound to `connection`. `None` when nobody is.
    pub fn disconnect(&mut self, connection: &str) -> Option<Vec<Outbound>> {
        if self.closed {
            return None;
        }
        let player_id = self.find_player_by_connection(connection)?.id.clone();
        Some(self.depart(&player_id))
    }

    /// Departure is removal, never suspension. Empties close the room, owners
    /// are replaced by the earliest-joined remaining player.
    fn depart(&mut self, player_id: &str) -> Vec<Outbound> {
        let Some(pos) = self.players.iter().position(|p| p.id == player_id) else {
            return Vec::new();
        };
        let departed = self.players.remove(pos);
        self.chat_log
            .add_system_message(format!("{} left the room", departed.name));

        if self.players.is_empty() {
            self.owner_id = None;
            self.closed = true;
            return Vec::new();
        }
        if self.is_owner(player_id) {
            let next_owner = self.players[0].id.clone();
            info!(
                "Room {}: owner {} left, promoting {}",
                self.room_id, player_id, next_owner
            );
            self.owner_id = Some(next_owner);
        }

        let mut out = Vec::new();
        if self.in_progress() {
            self.reconcile_departure(player_id, &mut out);
        }
        if !self.closed {
            out.insert(0, self.state_event());
        }
        out
    }

    fn reconcile_departure(&mut self, departed: &str, out: &mut Vec<Outbound>) {
        let Some(meta) = self.round.as_mut() else {
            return;
        };
        let held_turn = meta.forget(departed);

        if let Some(winner) = self.check_winner() {
            self.finish_game(winner, out);
            return;
        }
        match self.phase {
            RoomPhase::InGame => {
                if self.round_complete() {
                    self.end_round(out);
                } else if held_turn {
                    self.pass_turn_from_current();
                    self.announce_speaker(out);
                }
            }
            RoomPhase::RoundEnd => {
                out.push(self.poll_state_event());
                self.resolve_poll(out);
            }
            RoomPhase::Voting => {
                if self.votes_complete() {
                    self.resolve_votes(out);
                }
            }
            _ => {}
        }
    }

    pub fn send_chat(&mut self, caller: &str, text: &str) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        let player = self.member(caller)?;
        let content = text.trim();
        if content.is_empty() {
            return Ok(Vec::new());
        }
        if content.chars().count() > MAX_MESSAGE_LEN {
            return Err(GameError::InvalidMessage(format!(
                "chat messages are limited to {MAX_MESSAGE_LEN} characters"
            )));
        }
        let message = ChatMessage::new(
            player.id.clone(),
            player.name.clone(),
            content.to_string(),
            ChatMessageType::Public,
        );
        self.chat_log.add_message(message.clone());
        Ok(vec![Outbound::room(ServerEvent::ChatMessage { message })])
    }
}

pub fn generate_room_code<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Room codes are typed by humans: ignore surrounding space and case.
pub fn normalize_room_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Recipient;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lobby(names: &[&str]) -> (Room, Vec<PlayerId>) {
        let config = GameConfig::default();
        let owner = Player::new(names[0].to_string(), Some("conn-0".to_string()));
        let mut ids = vec![owner.id.clone()];
        let mut room = Room::new("ABCD".to_string(), owner, &config);
        for (i, name) in names.iter().enumerate().skip(1) {
            let (id, _) = room.add_player(name, &format!("conn-{i}")).unwrap();
            ids.push(id);
        }
        (room, ids)
    }

    #[test]
    fn codes_use_the_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        let code = generate_room_code(4, &mut rng);
        assert_eq!(code.len(), 4);
        assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        assert_eq!(normalize_room_code(" abcd "), "ABCD");
    }

    #[test]
    fn join_sends_private_confirmation_then_broadcast() {
        let (mut room, _) = lobby(&["Ana"]);
        let (id, out) = room.add_player("Beto", "conn-1").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].to, Recipient::Connection("conn-1".to_string()));
        assert!(matches!(
            &out[0].event,
            ServerEvent::JoinedRoom { player_id, .. } if *player_id == id
        ));
        assert_eq!(out[1].to, Recipient::Room);
    }

    #[test]
    fn rejoin_needs_the_private_token() {
        let (mut room, ids) = lobby(&["Ana", "Beto"]);
        assert_eq!(
            room.rejoin(&ids[1], "", "conn-x").unwrap_err(),
            GameError::NotAllowed
        );
        assert_eq!(
            room.rejoin(&ids[1], &ids[1], "conn-x").unwrap_err(),
            GameError::NotAllowed
        );
        assert_eq!(
            room.find_player(&ids[1]).unwrap().connection.as_deref(),
            Some("conn-1")
        );

        let token = room.find_player(&ids[1]).unwrap().rejoin_token.clone();
        let out = room.rejoin(&ids[1], &token, "conn-x").unwrap();
        assert_eq!(
            out[0],
            Outbound::connection(
                "conn-1",
                ServerEvent::SessionReplaced {
                    room_id: "ABCD".to_string()
                }
            )
        );
        assert!(matches!(
            &out[1].event,
            ServerEvent::JoinedRoom { rejoin_token, .. } if *rejoin_token == token
        ));
        assert_eq!(
            room.find_player_by_connection("conn-x").map(|p| p.id.clone()),
            Some(ids[1].clone())
        );
        assert!(room.find_player_by_connection("conn-1").is_none());
    }

    #[test]
    fn join_validates_name_and_capacity() {
        let (mut room, _) = lobby(&["Ana"]);
        assert_eq!(
            room.add_player("  ", "c").unwrap_err(),
            GameError::InvalidName(MAX_NAME_LEN)
        );
        room.max_players = 1;
        assert_eq!(room.add_player("Beto", "c").unwrap_err(), GameError::RoomFull);
    }

    #[test]
    fn only_owner_updates_settings() {
        let (mut room, ids) = lobby(&["Ana", "Beto"]);
        let patch = SettingsPatch {
            impostor_count: Some(2),
            category: Some("Animales".to_string()),
            ..Default::default()
        };
        assert_eq!(
            room.update_settings(&ids[1], patch.clone()).unwrap_err(),
            GameError::NotAllowed
        );
        room.update_settings(&ids[0], patch).unwrap();
        assert_eq!(room.settings.impostor_count, 2);
        assert_eq!(room.settings.categories, vec!["Animales".to_string()]);

        let bad = SettingsPatch {
            impostor_count: Some(0),
            turn_time_seconds: Some(5),
            ..Default::default()
        };
        assert!(matches!(
            room.update_settings(&ids[0], bad),
            Err(GameError::InvalidSettings(_))
        ));
        // rejected patches leave everything untouched
        assert_eq!(room.settings.turn_time_seconds, 20);
    }

    #[test]
    fn kick_notifies_target_before_broadcast() {
        let (mut room, ids) = lobby(&["Ana", "Beto", "Caro"]);
        assert_eq!(room.kick(&ids[1], &ids[2]).unwrap_err(), GameError::NotAllowed);
        assert_eq!(room.kick(&ids[0], &ids[0]).unwrap_err(), GameError::NotAllowed);
        assert_eq!(
            room.kick(&ids[0], "ghost").unwrap_err(),
            GameError::PlayerNotFound
        );

        let out = room.kick(&ids[0], &ids[2]).unwrap();
        assert_eq!(out[0].to, Recipient::Connection("conn-2".to_string()));
        assert_eq!(
            out[0].event,
            ServerEvent::Kicked {
                by: Some(ids[0].clone())
            }
        );
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn kick_is_lobby_only() {
        let (mut room, ids) = lobby(&["Ana", "Beto", "Caro"]);
        room.phase = RoomPhase::InGame;
        assert_eq!(
            room.kick(&ids[0], &ids[1]).unwrap_err(),
            GameError::CannotKickAfterStart
        );
    }

    #[test]
    fn owner_departure_promotes_earliest_joined() {
        let (mut room, ids) = lobby(&["Ana", "Beto", "Caro"]);
        let out = room.disconnect("conn-0").unwrap();
        assert_eq!(room.owner_id.as_deref(), Some(ids[1].as_str()));
        assert!(room.find_player(&room.owner_id.clone().unwrap()).is_some());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, Recipient::Room);
    }

    #[test]
    fn last_departure_closes_room() {
        let (mut room, _) = lobby(&["Ana"]);
        assert!(room.disconnect("conn-0").unwrap().is_empty());
        assert!(room.is_closed());
        assert_eq!(room.owner_id, None);
        assert_eq!(room.ensure_open(), Err(GameError::RoomNotFound));
        assert!(room.disconnect("conn-0").is_none());
    }

    #[test]
    fn unknown_connection_is_ignored() {
        let (mut room, _) = lobby(&["Ana"]);
        assert!(room.disconnect("nobody").is_none());
    }

    #[test]
    fn chat_requires_membership_and_skips_blank_text() {
        let (mut room, ids) = lobby(&["Ana", "Beto"]);
        assert_eq!(room.send_chat("ghost", "hola").unwrap_err(), GameError::NotAllowed);
        assert!(room.send_chat(&ids[1], "   ").unwrap().is_empty());
        let out = room.send_chat(&ids[1], " hola ").unwrap();
        assert!(matches!(
            &out[0].event,
            ServerEvent::ChatMessage { message } if message.content == "hola"
        ));
        assert!(room.send_chat(&ids[1], &"a".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }
}
