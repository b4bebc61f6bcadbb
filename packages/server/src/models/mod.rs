pub mod chat;
pub mod config;
pub mod error;
pub mod game;
pub mod message;
pub mod player;
pub mod poll;
pub mod role;
pub mod room;
pub mod turn;
pub mod voting;
mod word_data;
pub mod words;
