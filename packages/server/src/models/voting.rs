use std::collections::HashMap;
use tracing::info;

use super::error::GameError;
use super::game::{Ballot, GameResult};
use super::message::{Outbound, ServerEvent};
use super::player::PlayerId;
use super::room::{Room, RoomPhase};

/// Plurality winner among non-abstaining ballots. A shared maximum, or no
/// ballots at all, yields `None`.
pub fn tally_votes<'a>(targets: impl IntoIterator<Item = &'a PlayerId>) -> Option<PlayerId> {
    let mut counts: HashMap<&PlayerId, usize> = HashMap::new();
    for target in targets {
        *counts.entry(target).or_default() += 1;
    }
    let max = counts.values().copied().max()?;
    let mut leaders = counts.into_iter().filter(|(_, count)| *count == max);
    let (leader, _) = leaders.next()?;
    if leaders.next().is_some() {
        None
    } else {
        Some(leader.clone())
    }
}

impl Room {
    /// Non-binding preview of a ballot, shown to the room.
    pub fn set_vote_intent(
        &mut self,
        caller: &str,
        target: Option<PlayerId>,
    ) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        let alive = self.member(caller)?.alive;
        if self.phase != RoomPhase::Voting {
            return Err(GameError::VoteNotAvailable);
        }
        if !alive {
            return Err(GameError::NotAllowed);
        }
        self.ensure_votable(target.as_deref())?;
        if let Some(meta) = self.round.as_mut() {
            meta.vote_intents.insert(caller.to_string(), target);
        }
        Ok(vec![self.intent_state_event()])
    }

    pub fn cast_vote(
        &mut self,
        caller: &str,
        target: Option<PlayerId>,
    ) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        let alive = self.member(caller)?.alive;
        if self.phase != RoomPhase::Voting {
            return Err(GameError::VoteNotAvailable);
        }
        if !alive {
            return Err(GameError::NotAllowedToVote);
        }
        self.ensure_votable(target.as_deref())?;
        if let Some(meta) = self.round.as_mut() {
            meta.votes.insert(caller.to_string(), target.clone());
            meta.vote_intents.insert(caller.to_string(), target);
        }

        let mut out = vec![
            Outbound::room(ServerEvent::VoteProgress {
                votes: self.ballots(|meta| &meta.votes),
            }),
            self.intent_state_event(),
        ];
        if self.votes_complete() {
            self.resolve_votes(&mut out);
        }
        Ok(out)
    }

    fn ensure_votable(&self, target: Option<&str>) -> Result<(), GameError> {
        match target {
            Some(target) if !self.is_alive(target) => Err(GameError::PlayerNotFound),
            _ => Ok(()),
        }
    }

    /// Ballots of living players, in join order.
    fn ballots(
        &self,
        pick: impl Fn(&super::game::RoundMeta) -> &HashMap<PlayerId, Option<PlayerId>>,
    ) -> Vec<Ballot> {
        let Some(map) = self.round.as_ref().map(pick) else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|p| p.alive)
            .filter_map(|p| {
                map.get(&p.id).map(|target| Ballot {
                    voter_id: p.id.clone(),
                    target_id: target.clone(),
                })
            })
            .collect()
    }

    fn intent_state_event(&self) -> Outbound {
        Outbound::room(ServerEvent::VoteIntentState {
            intents: self.ballots(|meta| &meta.vote_intents),
        })
    }

    /// Every living player has a binding ballot in.
    pub(crate) fn votes_complete(&self) -> bool {
        let Some(meta) = self.round.as_ref() else {
            return false;
        };
        let cast = self
            .players
            .iter()
            .filter(|p| p.alive && meta.votes.contains_key(&p.id))
            .count();
        cast >= self.alive_count()
    }

    /// Tallies the ballots and either ends the game or starts the next round
    /// after the eliminated player's slot.
    pub(crate) fn resolve_votes(&mut self, out: &mut Vec<Outbound>) {
        if self.phase != RoomPhase::Voting {
            return;
        }
        let ballots = self.ballots(|meta| &meta.votes);
        // ballots against players who died or left count as abstentions
        let eliminated = tally_votes(
            ballots
                .iter()
                .filter_map(|b| b.target_id.as_ref())
                .filter(|target| self.is_alive(target)),
        );
        out.push(Outbound::room(ServerEvent::VoteResult {
            eliminated_id: eliminated.clone(),
        }));

        let Some(eliminated) = eliminated else {
            info!("Room {}: vote tied, nobody eliminated", self.room_id);
            self.finish_game(GameResult::ImpostorWin, out);
            return;
        };
        if let Some(player) = self.players.iter_mut().find(|p| p.id == eliminated) {
            player.alive = false;
            let name = player.name.clone();
            self.chat_log
                .add_system_message(format!("{name} was voted out"));
            info!("Room {}: {} eliminated", self.room_id, eliminated);
        }

        if let Some(winner) = self.check_winner() {
            self.finish_game(winner, out);
            return;
        }
        let slot = self
            .round
            .as_ref()
            .and_then(|meta| meta.turn_order.iter().position(|id| *id == eliminated))
            .map_or(0, |pos| pos + 1);
        self.start_next_round(slot, out);
    }
}
