use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use super::error::GameError;
use super::message::{Outbound, ServerEvent};
use super::player::{Player, PlayerId};
use super::role::Role;
use super::room::{Room, RoomPhase};
use super::words::{SecretWord, WordPool};

pub const MIN_PLAYERS: usize = 3;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameResult {
    CrewmateWin, // every impostor was voted out
    ImpostorWin, // tie vote or parity reached
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollChoice {
    #[serde(alias = "START")]
    VoteNow,
    #[serde(alias = "DISCUSS")]
    AnotherRound,
}

/// One voter's current ballot; `None` target is an abstention.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub voter_id: PlayerId,
    pub target_id: Option<PlayerId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollBallot {
    pub player_id: PlayerId,
    pub choice: PollChoice,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedWord {
    pub player_id: PlayerId,
    pub word: String,
}

/// Engine-private bookkeeping for a running game. Never sent verbatim.
#[derive(Clone, Debug)]
pub struct RoundMeta {
    pub secret: SecretWord,
    /// Word handed to impostors in hidden mode.
    pub decoy: Option<SecretWord>,
    pub impostor_ids: Vec<PlayerId>,
    pub turn_order: Vec<PlayerId>,
    pub current_turn_index: usize,
    /// Bumped on every speaker change so stale turn timers can be discarded.
    pub turn_serial: u64,
    /// Serial a turn timer is already running for.
    pub(crate) armed_serial: Option<u64>,
    pub submitted_this_round: HashSet<PlayerId>,
    pub words: Vec<SubmittedWord>,
    pub votes: HashMap<PlayerId, Option<PlayerId>>,
    pub vote_intents: HashMap<PlayerId, Option<PlayerId>>,
    pub poll_votes: Option<HashMap<PlayerId, PollChoice>>,
}

impl RoundMeta {
    pub fn primary_impostor(&self) -> Option<&PlayerId> {
        self.impostor_ids.first()
    }

    pub fn current_speaker(&self) -> Option<&PlayerId> {
        self.turn_order.get(self.current_turn_index)
    }

    pub(crate) fn reset_round(&mut self) {
        self.submitted_this_round.clear();
        self.words.clear();
        self.votes.clear();
        self.vote_intents.clear();
        self.poll_votes = None;
    }

    /// Drops every trace of a departed player. Returns whether they held the turn.
    pub(crate) fn forget(&mut self, player_id: &str) -> bool {
        self.submitted_this_round.remove(player_id);
        self.votes.remove(player_id);
        self.vote_intents.remove(player_id);
        if let Some(poll) = self.poll_votes.as_mut() {
            poll.remove(player_id);
        }
        let Some(pos) = self.turn_order.iter().position(|id| id == player_id) else {
            return false;
        };
        let held_turn = pos == self.current_turn_index;
        self.turn_order.remove(pos);
        if pos < self.current_turn_index {
            self.current_turn_index -= 1;
        }
        if self.current_turn_index >= self.turn_order.len() {
            self.current_turn_index = 0;
        }
        held_turn
    }
}

impl Room {
    /// Assigns roles and the secret word, then opens the first round.
    pub fn start_game<R: Rng + ?Sized>(
        &mut self,
        caller: &str,
        words: &WordPool,
        rng: &mut R,
    ) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        self.ensure_owner(caller)?;
        if self.phase != RoomPhase::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        let player_count = self.players.len();
        if player_count < MIN_PLAYERS {
            return Err(GameError::NeedMinPlayers);
        }
        let impostor_count = self.settings.impostor_count;
        if impostor_count == 0 {
            return Err(GameError::InvalidSettings(
                "impostorCount must be at least 1".to_string(),
            ));
        }
        if impostor_count >= player_count {
            return Err(GameError::TooManyImpostors);
        }

        let secret = words
            .draw(&self.settings.categories, rng)
            .ok_or(GameError::NoWordsAvailable)?;
        let decoy = if self.settings.hidden_impostor {
            words.draw_decoy(&secret, rng)
        } else {
            None
        };

        let mut shuffled: Vec<PlayerId> = self.players.iter().map(|p| p.id.clone()).collect();
        shuffled.shuffle(rng);
        let impostor_ids: Vec<PlayerId> = shuffled.into_iter().take(impostor_count).collect();
        for player in self.players.iter_mut() {
            player.alive = true;
            player.role = Some(if impostor_ids.contains(&player.id) {
                Role::Impostor
            } else {
                Role::Crewmate
            });
        }

        let mut turn_order: Vec<PlayerId> = self.players.iter().map(|p| p.id.clone()).collect();
        turn_order.shuffle(rng);
        let current_turn_index = rng.gen_range(0..turn_order.len());

        debug!(
            "Room {}: word drawn from category {}, {} impostor(s)",
            self.room_id,
            secret.category,
            impostor_ids.len()
        );
        self.round = Some(RoundMeta {
            secret,
            decoy,
            impostor_ids,
            turn_order,
            current_turn_index,
            turn_serial: 0,
            armed_serial: None,
            submitted_this_round: HashSet::new(),
            words: Vec::new(),
            votes: HashMap::new(),
            vote_intents: HashMap::new(),
            poll_votes: None,
        });
        self.phase = RoomPhase::InGame;
        self.round_number = 1;
        self.winner = None;
        info!(
            "Room {}: game started with {} players",
            self.room_id, player_count
        );

        let mut out = Vec::new();
        for player in &self.players {
            out.extend(self.briefing(player));
        }
        out.push(self.state_event());
        self.announce_speaker(&mut out);
        Ok(out)
    }

    /// Private role/word notifications for one player. Impostors never get
    /// the real word.
    pub(crate) fn briefing(&self, player: &Player) -> Vec<Outbound> {
        let (Some(meta), Some(role)) = (self.round.as_ref(), player.role) else {
            return Vec::new();
        };
        let told = match role {
            Role::Crewmate => Some((Role::Crewmate, &meta.secret)),
            Role::Impostor => meta.decoy.as_ref().map(|decoy| (Role::Crewmate, decoy)),
        };
        match told {
            Some((shown_role, secret)) => vec![
                Outbound::player(
                    &player.id,
                    ServerEvent::PrivateSecret {
                        word: secret.word.clone(),
                        category: secret.category.clone(),
                    },
                ),
                Outbound::player(
                    &player.id,
                    ServerEvent::PlayerInfo {
                        player_id: player.id.clone(),
                        role: shown_role,
                        word: Some(secret.word.clone()),
                        category: Some(secret.category.clone()),
                    },
                ),
            ],
            None => vec![Outbound::player(
                &player.id,
                ServerEvent::PlayerInfo {
                    player_id: player.id.clone(),
                    role: Role::Impostor,
                    word: None,
                    category: self
                        .settings
                        .reveal_category_to_impostor
                        .then(|| meta.secret.category.clone()),
                },
            )],
        }
    }

    /// Crewmates win once no impostor is alive; impostors win at parity.
    pub(crate) fn check_winner(&self) -> Option<GameResult> {
        let impostors = self
            .players
            .iter()
            .filter(|p| p.alive && p.is_impostor())
            .count();
        let crewmates = self
            .players
            .iter()
            .filter(|p| p.alive && !p.is_impostor())
            .count();
        if impostors == 0 {
            Some(GameResult::CrewmateWin)
        } else if crewmates <= impostors {
            Some(GameResult::ImpostorWin)
        } else {
            None
        }
    }

    /// Terminal transition. The room is closed and must be removed from the
    /// registry once the notifications are delivered.
    pub(crate) fn finish_game(&mut self, winner: GameResult, out: &mut Vec<Outbound>) {
        self.phase = RoomPhase::Ended;
        self.winner = Some(winner);
        self.close();
        info!("Room {}: game ended, {:?}", self.room_id, winner);

        out.push(self.state_event());
        if let Some(meta) = self.round.as_ref() {
            out.push(Outbound::room(ServerEvent::GameOver {
                winner,
                impostor_ids: meta.impostor_ids.clone(),
                word: meta.secret.word.clone(),
                category: meta.secret.category.clone(),
            }));
        }
    }
}
