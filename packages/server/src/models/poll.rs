use tracing::info;

use super::error::GameError;
use super::game::{PollBallot, PollChoice};
use super::message::{Outbound, ServerEvent};
use super::room::{Room, RoomPhase};

/// Snapshot of the round-end poll over living players.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollTally {
    pub vote_now: usize,
    pub another_round: usize,
    pub total_eligible: usize,
    pub votes: Vec<PollBallot>,
}

/// Strict majority of `eligible`.
pub fn majority(eligible: usize) -> usize {
    eligible / 2 + 1
}

impl Room {
    pub fn poll_choice(&mut self, caller: &str, choice: PollChoice) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        let alive = self.member(caller)?.alive;
        if self.phase != RoomPhase::RoundEnd {
            return Err(GameError::PollNotAvailable);
        }
        if !alive {
            return Err(GameError::NotAllowed);
        }
        let Some(poll) = self.round.as_mut().and_then(|m| m.poll_votes.as_mut()) else {
            return Err(GameError::PollNotAvailable);
        };
        poll.insert(caller.to_string(), choice);

        let mut out = vec![self.poll_state_event()];
        self.resolve_poll(&mut out);
        Ok(out)
    }

    /// Owner override: skip the poll and open voting now.
    pub fn request_vote(&mut self, caller: &str) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        self.ensure_owner(caller)?;
        if self.phase != RoomPhase::RoundEnd {
            return Err(GameError::VoteNotAvailable);
        }
        let mut out = Vec::new();
        self.open_voting(&mut out);
        Ok(out)
    }

    /// Owner override: skip the poll and play another round.
    pub fn continue_round(&mut self, caller: &str) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        self.ensure_owner(caller)?;
        if self.phase != RoomPhase::RoundEnd {
            return Err(GameError::ContinueNotAvailable);
        }
        let mut out = Vec::new();
        self.start_next_round(0, &mut out);
        Ok(out)
    }

    pub fn poll_tally(&self) -> PollTally {
        let poll = self.round.as_ref().and_then(|m| m.poll_votes.as_ref());
        let votes: Vec<PollBallot> = self
            .players
            .iter()
            .filter(|p| p.alive)
            .filter_map(|p| {
                poll.and_then(|poll| poll.get(&p.id)).map(|choice| PollBallot {
                    player_id: p.id.clone(),
                    choice: *choice,
                })
            })
            .collect();
        let count = |wanted: PollChoice| votes.iter().filter(|b| b.choice == wanted).count();
        PollTally {
            vote_now: count(PollChoice::VoteNow),
            another_round: count(PollChoice::AnotherRound),
            total_eligible: self.alive_count(),
            votes,
        }
    }

    pub(crate) fn poll_state_event(&self) -> Outbound {
        let tally = self.poll_tally();
        Outbound::room(ServerEvent::PollState {
            vote_now_count: tally.vote_now,
            another_round_count: tally.another_round,
            total_eligible: tally.total_eligible,
            votes: tally.votes,
        })
    }

    /// Fires at most one branch. Both majorities cannot hold at once.
    pub(crate) fn resolve_poll(&mut self, out: &mut Vec<Outbound>) {
        if self.phase != RoomPhase::RoundEnd {
            return;
        }
        let tally = self.poll_tally();
        let needed = majority(tally.total_eligible);
        if tally.vote_now >= needed {
            self.open_voting(out);
        } else if tally.another_round >= needed {
            self.start_next_round(0, out);
        }
    }

    fn open_voting(&mut self, out: &mut Vec<Outbound>) {
        if let Some(meta) = self.round.as_mut() {
            meta.votes.clear();
            meta.vote_intents.clear();
            meta.poll_votes = None;
        }
        self.phase = RoomPhase::Voting;
        info!("Room {}: voting opened", self.room_id);
        out.push(self.state_event());
        out.push(Outbound::room(ServerEvent::StartVoting));
    }
}
