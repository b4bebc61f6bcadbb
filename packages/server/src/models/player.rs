use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Persistent participant identity, stable across reconnects.
pub type PlayerId = String;
/// Identity of one live transport connection.
pub type ConnectionId = String;

pub const MAX_NAME_LEN: usize = 24;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub connection: Option<ConnectionId>,
    pub role: Option<Role>,
    pub alive: bool,
    pub joined_at: DateTime<Utc>,
    /// Handed only to the connection that joined; proves the seat on rejoin.
    #[serde(skip)]
    pub rejoin_token: String,
}

impl Player {
    pub fn new(name: String, connection: Option<ConnectionId>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            connection,
            role: None,
            alive: true,
            joined_at: Utc::now(),
            rejoin_token: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn is_impostor(&self) -> bool {
        self.role == Some(Role::Impostor)
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            name: self.name.clone(),
            alive: self.alive,
        }
    }
}

/// Public projection of a player. Never carries the role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
}

/// Trims a display name and checks its length.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(normalize_name("  Ana "), Some("Ana".to_string()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(normalize_name(&"x".repeat(MAX_NAME_LEN + 1)), None);
        assert!(normalize_name(&"ñ".repeat(MAX_NAME_LEN)).is_some());
    }

    #[test]
    fn rejoin_tokens_are_unique_and_never_serialized() {
        let a = Player::new("Ana".to_string(), None);
        let b = Player::new("Beto".to_string(), None);
        assert_ne!(a.rejoin_token, b.rejoin_token);
        let json = serde_json::to_string(&a).unwrap();
        assert!(!json.contains(&a.rejoin_token));
    }

    #[test]
    fn view_hides_role() {
        let mut player = Player::new("Ana".to_string(), None);
        player.role = Some(Role::Impostor);
        let json = serde_json::to_value(player.view()).unwrap();
        assert!(json.get("role").is_none());
        assert!(json.get("rejoinToken").is_none());
    }
}
