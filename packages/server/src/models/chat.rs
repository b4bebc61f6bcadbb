use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MAX_MESSAGE_LEN: usize = 280;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLog {
    pub room_id: String,
    pub capacity: usize,
    pub messages: VecDeque<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: String,
    pub player_id: String,
    pub player_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub message_type: ChatMessageType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatMessageType {
    Public, // player chat
    System, // joins, departures, eliminations
}

impl ChatLog {
    pub fn new(room_id: String, capacity: usize) -> Self {
        ChatLog {
            room_id,
            capacity,
            messages: VecDeque::new(),
        }
    }

    /// Appends a message, dropping the oldest once the log is full.
    pub fn add_message(&mut self, message: ChatMessage) {
        if self.capacity == 0 {
            return;
        }
        while self.messages.len() >= self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn add_system_message(&mut self, content: String) {
        let system_message = ChatMessage::new(
            "system".to_string(),
            "System".to_string(),
            content,
            ChatMessageType::System,
        );
        self.add_message(system_message);
    }
}

impl ChatMessage {
    pub fn new(
        player_id: String,
        player_name: String,
        content: String,
        message_type: ChatMessageType,
    ) -> Self {
        ChatMessage {
            message_id: uuid::Uuid::new_v4().to_string(),
            player_id,
            player_name,
            content,
            timestamp: Utc::now(),
            message_type,
        }
    }
}
