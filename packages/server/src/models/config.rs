use std::env;

use super::room::RoomSettings;
use super::words::DEFAULT_CATEGORY;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub max_players: usize,
    pub room_code_length: usize,
    // settings every new room starts from
    pub default_settings: RoomSettings,
    // サーバ側でターンの持ち時間を計測するかどうか
    pub auto_skip_turns: bool,
    pub max_chat_history: usize,
    pub default_category: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: 12,
            room_code_length: 4,
            default_settings: RoomSettings::default(),
            auto_skip_turns: false,
            max_chat_history: 200,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_players = env::var("MAX_PLAYERS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n >= 3)
            .unwrap_or(defaults.max_players);
        let room_code_length = env::var("ROOM_CODE_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.room_code_length);
        let auto_skip_turns = env::var("AUTO_SKIP_TURNS")
            .map(|v| v == "true")
            .unwrap_or(defaults.auto_skip_turns);
        let max_chat_history = env::var("MAX_CHAT_HISTORY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.max_chat_history);
        let default_category = env::var("DEFAULT_CATEGORY").unwrap_or(defaults.default_category);

        Self {
            max_players,
            room_code_length,
            default_settings: defaults.default_settings,
            auto_skip_turns,
            max_chat_history,
            default_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_playable() {
        let config = GameConfig::default();
        assert!(config.max_players >= 3);
        assert_eq!(config.room_code_length, 4);
        assert_eq!(config.default_settings.impostor_count, 1);
        assert!(!config.auto_skip_turns);
    }
}
