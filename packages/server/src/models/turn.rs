use tracing::{debug, info};

use super::error::GameError;
use super::game::SubmittedWord;
use super::message::{Outbound, ServerEvent};
use super::player::PlayerId;
use super::room::{Room, RoomPhase};

pub const MAX_WORD_LEN: usize = 40;

impl Room {
    pub fn submit_word(&mut self, caller: &str, word: &str) -> Result<Vec<Outbound>, GameError> {
        let word = word.trim();
        self.take_turn(caller, Some(word))
    }

    pub fn skip_turn(&mut self, caller: &str) -> Result<Vec<Outbound>, GameError> {
        self.take_turn(caller, None)
    }

    /// Fired by the turn timer. Skips on behalf of the speaker the timer was
    /// armed for; a stale serial means the turn already moved on.
    pub fn expire_turn(&mut self, serial: u64) -> Vec<Outbound> {
        if self.is_closed() || self.phase != RoomPhase::InGame {
            return Vec::new();
        }
        let Some(meta) = self.round.as_ref() else {
            return Vec::new();
        };
        if meta.turn_serial != serial {
            return Vec::new();
        }
        let Some(speaker) = meta.current_speaker().cloned() else {
            return Vec::new();
        };
        info!("Room {}: turn of {} timed out", self.room_id, speaker);
        self.take_turn(&speaker, None).unwrap_or_default()
    }

    /// Serial and length of the turn that is running now, if any.
    pub fn turn_deadline(&self) -> Option<(u64, u32)> {
        if self.is_closed() || self.phase != RoomPhase::InGame {
            return None;
        }
        let seconds = self.settings.turn_time_seconds;
        if seconds == 0 {
            return None;
        }
        self.round.as_ref().map(|meta| (meta.turn_serial, seconds))
    }

    /// Like [`Room::turn_deadline`], but yields each turn only once so a
    /// single timer runs per speaker.
    pub fn arm_turn_timer(&mut self) -> Option<(u64, u32)> {
        let (serial, seconds) = self.turn_deadline()?;
        let meta = self.round.as_mut()?;
        if meta.armed_serial == Some(serial) {
            return None;
        }
        meta.armed_serial = Some(serial);
        Some((serial, seconds))
    }

    /// Nobody holds the turn outside `InGame`.
    pub fn current_speaker(&self) -> Option<PlayerId> {
        if self.phase != RoomPhase::InGame {
            return None;
        }
        self.round.as_ref()?.current_speaker().cloned()
    }

    fn take_turn(&mut self, caller: &str, word: Option<&str>) -> Result<Vec<Outbound>, GameError> {
        self.ensure_open()?;
        self.member(caller)?;
        if self.current_speaker().as_deref() != Some(caller) {
            return Err(GameError::NotYourTurn);
        }
        if let Some(word) = word {
            let len = word.chars().count();
            if len == 0 || len > MAX_WORD_LEN {
                return Err(GameError::InvalidWord(MAX_WORD_LEN));
            }
        }

        let mut out = Vec::new();
        let Some(meta) = self.round.as_mut() else {
            return Err(GameError::NotYourTurn);
        };
        meta.submitted_this_round.insert(caller.to_string());
        match word {
            Some(word) => {
                meta.words.push(SubmittedWord {
                    player_id: caller.to_string(),
                    word: word.to_string(),
                });
                out.push(Outbound::room(ServerEvent::WordSubmitted {
                    player_id: caller.to_string(),
                    word: word.to_string(),
                }));
            }
            None => debug!("Room {}: {} skipped", self.room_id, caller),
        }

        if self.round_complete() {
            self.end_round(&mut out);
        } else {
            self.advance_turn();
            self.announce_speaker(&mut out);
        }
        Ok(out)
    }

    /// Everyone alive has spoken or skipped.
    pub(crate) fn round_complete(&self) -> bool {
        let Some(meta) = self.round.as_ref() else {
            return false;
        };
        let acted = self
            .players
            .iter()
            .filter(|p| p.alive && meta.submitted_this_round.contains(&p.id))
            .count();
        acted >= self.alive_count()
    }

    pub(crate) fn announce_speaker(&self, out: &mut Vec<Outbound>) {
        if let Some(player_id) = self.current_speaker() {
            out.push(Outbound::room(ServerEvent::CurrentTurn { player_id }));
        }
    }

    fn advance_turn(&mut self) {
        let Some(current) = self.round.as_ref().map(|m| m.current_turn_index) else {
            return;
        };
        if let Some(next) = self.pending_index_from(current + 1) {
            self.set_speaker(next);
        }
    }

    /// After the speaker left, hands the turn to whoever now sits at their slot
    /// or the next one still waiting to speak.
    pub(crate) fn pass_turn_from_current(&mut self) {
        let Some(current) = self.round.as_ref().map(|m| m.current_turn_index) else {
            return;
        };
        if let Some(next) = self.pending_index_from(current) {
            self.set_speaker(next);
        }
    }

    fn set_speaker(&mut self, index: usize) {
        if let Some(meta) = self.round.as_mut() {
            meta.current_turn_index = index;
            meta.turn_serial += 1;
        }
    }

    /// First index at or after `start` (wrapping) whose player is alive and
    /// has not acted this round.
    fn pending_index_from(&self, start: usize) -> Option<usize> {
        let meta = self.round.as_ref()?;
        self.scan_living(start, |id| !meta.submitted_this_round.contains(id))
    }

    /// First index at or after `start` (wrapping) whose player is alive.
    pub(crate) fn living_index_from(&self, start: usize) -> Option<usize> {
        self.scan_living(start, |_| true)
    }

    fn scan_living(&self, start: usize, accept: impl Fn(&PlayerId) -> bool) -> Option<usize> {
        let order = &self.round.as_ref()?.turn_order;
        let len = order.len();
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&idx| self.is_alive(&order[idx]) && accept(&order[idx]))
    }

    /// Closes the speaking phase and opens the poll.
    pub(crate) fn end_round(&mut self, out: &mut Vec<Outbound>) {
        self.phase = RoomPhase::RoundEnd;
        if let Some(meta) = self.round.as_mut() {
            meta.poll_votes = Some(Default::default());
            meta.turn_serial += 1;
        }
        info!("Room {}: round {} ended", self.room_id, self.round_number);
        out.push(Outbound::room(ServerEvent::RoundEnded {
            room_id: self.room_id.clone(),
        }));
        out.push(self.state_event());
        out.push(self.poll_state_event());
    }

    /// Resets the per-round bookkeeping and hands the turn to the first living
    /// player at or after `start`.
    pub(crate) fn start_next_round(&mut self, start: usize, out: &mut Vec<Outbound>) {
        let Some(meta) = self.round.as_mut() else {
            return;
        };
        meta.reset_round();
        self.round_number += 1;
        self.phase = RoomPhase::InGame;
        if let Some(first) = self.living_index_from(start) {
            self.set_speaker(first);
        }
        info!("Room {}: round {} started", self.room_id, self.round_number);
        out.push(self.state_event());
        self.announce_speaker(out);
    }
}

#[cfg(test)]
mod tests {
    use crate::models::error::GameError;
    use crate::models::game::tests::started;
    use crate::models::message::{Recipient, ServerEvent};
    use crate::models::room::RoomPhase;

    fn speaker(room: &crate::models::room::Room) -> String {
        room.current_speaker().unwrap()
    }

    #[test]
    fn only_the_speaker_may_act() {
        let (mut room, ids) = started(4, 1, 21);
        let current = speaker(&room);
        let other = ids.iter().find(|id| **id != current).unwrap();
        assert_eq!(room.submit_word(other, "sol").unwrap_err(), GameError::NotYourTurn);
        assert_eq!(room.submit_word("ghost", "sol").unwrap_err(), GameError::NotAllowed);
        assert_eq!(
            room.submit_word(&current, "   ").unwrap_err(),
            GameError::InvalidWord(super::MAX_WORD_LEN)
        );
        assert_eq!(speaker(&room), current);
    }

    #[test]
    fn submission_advances_in_turn_order() {
        let (mut room, _) = started(4, 1, 3);
        let meta = room.round().unwrap().clone();
        let first = speaker(&room);
        let out = room.submit_word(&first, " luna ").unwrap();

        assert_eq!(
            out[0].event,
            ServerEvent::WordSubmitted {
                player_id: first.clone(),
                word: "luna".to_string()
            }
        );
        let expected = meta.turn_order[(meta.current_turn_index + 1) % 4].clone();
        assert_eq!(speaker(&room), expected);
        assert_eq!(
            out.last().unwrap().event,
            ServerEvent::CurrentTurn { player_id: expected }
        );
        assert_eq!(out.last().unwrap().to, Recipient::Room);
        assert_eq!(room.view().words.len(), 1);
    }

    #[test]
    fn round_ends_after_every_living_player_acts() {
        let (mut room, _) = started(3, 1, 5);
        let first = speaker(&room);
        room.submit_word(&first, "uno").unwrap();
        let second = speaker(&room);
        room.skip_turn(&second).unwrap();
        let third = speaker(&room);
        let out = room.submit_word(&third, "tres").unwrap();

        assert_eq!(room.phase, RoomPhase::RoundEnd);
        assert_eq!(room.current_speaker(), None);
        assert!(out.iter().any(|o| matches!(o.event, ServerEvent::RoundEnded { .. })));
        assert!(out.iter().any(|o| o.event
            == ServerEvent::PollState {
                vote_now_count: 0,
                another_round_count: 0,
                total_eligible: 3,
                votes: vec![],
            }));
        assert_eq!(room.skip_turn(&first).unwrap_err(), GameError::NotYourTurn);
    }

    #[test]
    fn dead_players_are_skipped() {
        let (mut room, _) = started(4, 1, 13);
        let meta = room.round().unwrap().clone();
        let next_slot = (meta.current_turn_index + 1) % 4;
        let dead = meta.turn_order[next_slot].clone();
        room.players.iter_mut().find(|p| p.id == dead).unwrap().alive = false;

        let first = speaker(&room);
        room.skip_turn(&first).unwrap();
        assert_eq!(speaker(&room), meta.turn_order[(next_slot + 1) % 4]);
    }

    #[test]
    fn stale_timer_is_ignored() {
        let (mut room, _) = started(3, 1, 17);
        let (serial, seconds) = room.turn_deadline().unwrap();
        assert_eq!(seconds, 20);
        let first = speaker(&room);
        room.submit_word(&first, "uno").unwrap();

        assert!(room.expire_turn(serial).is_empty());
        let second = speaker(&room);
        let (serial, _) = room.turn_deadline().unwrap();
        let out = room.expire_turn(serial);
        assert!(!out.is_empty());
        assert_ne!(speaker(&room), second);
    }

    #[test]
    fn timer_is_armed_once_per_turn() {
        let (mut room, _) = started(3, 1, 19);
        assert!(room.arm_turn_timer().is_some());
        assert!(room.arm_turn_timer().is_none());
        let first = speaker(&room);
        room.skip_turn(&first).unwrap();
        assert!(room.arm_turn_timer().is_some());

        room.settings.turn_time_seconds = 0;
        let second = speaker(&room);
        room.skip_turn(&second).unwrap();
        assert!(room.arm_turn_timer().is_none());
    }

    #[test]
    fn speaker_departure_passes_the_turn() {
        let (mut room, _) = started(4, 1, 29);
        let mut current = speaker(&room);
        // a departing impostor would end the game instead
        if room.find_player(&current).unwrap().is_impostor() {
            room.skip_turn(&current).unwrap();
            current = speaker(&room);
        }
        let connection = room
            .find_player(&current)
            .and_then(|p| p.connection.clone())
            .unwrap();
        let out = room.disconnect(&connection).unwrap();

        assert_eq!(room.phase, RoomPhase::InGame);
        let next = speaker(&room);
        assert_ne!(next, current);
        assert!(out
            .iter()
            .any(|o| o.event == ServerEvent::CurrentTurn { player_id: next.clone() }));
    }
}
