//! A single word hunt: phrase, countdown and leaderboard.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use phrasehunt_protocol::Standing;

use crate::{
    DuplicateWords, GamePhase, GameView, Player, RoomCode, RoomError, Scorer, WordValidator,
};

static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique game identifier.
///
/// Countdown tasks carry the id of the game they were started for, so a
/// tick that arrives after its game ended (or was replaced) is recognized
/// as stale instead of advancing the wrong game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameId(u64);

impl GameId {
    fn next() -> Self {
        Self(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// One player's tally within a game.
#[derive(Debug)]
pub struct Record {
    player: Arc<Player>,
    words: Vec<String>,
    score: u64,
}

impl Record {
    fn new(player: Arc<Player>) -> Self {
        Self {
            player,
            words: Vec::new(),
            score: 0,
        }
    }

    /// Accepted words in submission order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    fn standing(&self) -> Standing {
        Standing {
            name: self.player.name(),
            score: self.score,
            words: self.words.clone(),
        }
    }
}

/// Result of a submission that reached a running game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The word counted. `total` is the record's new score.
    Accepted { points: u32, total: u64 },
    Rejected(Rejection),
}

/// Why a word did not count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The validator turned it down.
    NotInPhrase,
    /// The player already scored it and repeats are not allowed.
    Duplicate,
}

/// A word hunt bound to one room.
///
/// The game never touches the room itself: the room holds the game under
/// its lock and does all broadcasting.
#[derive(Debug)]
pub struct Game {
    id: GameId,
    room: RoomCode,
    phrase: String,
    time_left: u32,
    phase: GamePhase,
    records: Vec<Record>,
    duplicate_words: DuplicateWords,
}

impl Game {
    pub fn new(
        room: RoomCode,
        phrase: String,
        duration: u32,
        duplicate_words: DuplicateWords,
    ) -> Self {
        Self {
            id: GameId::next(),
            room,
            phrase,
            time_left: duration,
            phase: GamePhase::NotStarted,
            records: Vec::new(),
            duplicate_words,
        }
    }

    /// Seeds one record per player and starts the countdown.
    pub fn start(&mut self, players: &[Arc<Player>]) -> Result<(), RoomError> {
        self.transition(GamePhase::Running)?;
        self.records = players.iter().cloned().map(Record::new).collect();
        Ok(())
    }

    fn transition(&mut self, to: GamePhase) -> Result<(), RoomError> {
        if !self.phase.can_transition_to(to) {
            return Err(RoomError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!(room = %self.room, game_id = %self.id, from = %self.phase, %to, "game phase change");
        self.phase = to;
        Ok(())
    }

    /// Scores `word` for `player` if the validator accepts it.
    ///
    /// On acceptance the word is appended to the player's record, both the
    /// record and the player's running score grow by the scorer's points,
    /// and the leaderboard is re-sorted. Equal scores keep their previous
    /// relative order.
    pub fn submit_word(
        &mut self,
        word: &str,
        player: &Player,
        validator: &dyn WordValidator,
        scorer: &dyn Scorer,
    ) -> Result<SubmitOutcome, RoomError> {
        if !self.phase.is_running() {
            return Err(RoomError::GameNotRunning(self.phase));
        }
        let idx = self
            .records
            .iter()
            .position(|r| r.player.id() == player.id())
            .ok_or(RoomError::NoRecord(player.id()))?;

        if !validator.is_acceptable(word, &self.phrase) {
            return Ok(SubmitOutcome::Rejected(Rejection::NotInPhrase));
        }
        let record = &mut self.records[idx];
        if self.duplicate_words == DuplicateWords::Reject && record.words.iter().any(|w| w == word)
        {
            return Ok(SubmitOutcome::Rejected(Rejection::Duplicate));
        }

        let points = scorer.points_for(word);
        record.words.push(word.to_owned());
        record.score += u64::from(points);
        record.player.add_score(u64::from(points));
        let total = record.score;

        // `sort_by` is stable.
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(SubmitOutcome::Accepted { points, total })
    }

    /// Advances the countdown by one unit and returns the phase afterwards.
    /// Ticks outside `Running` change nothing.
    pub fn tick(&mut self) -> GamePhase {
        if !self.phase.is_running() {
            return self.phase;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.phase = GamePhase::Ended;
        }
        self.phase
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The leaderboard, highest score first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.records.iter().map(Record::standing).collect()
    }

    pub fn view(&self) -> GameView {
        GameView {
            room: self.room,
            phrase: self.phrase.clone(),
            seconds_left: self.time_left,
            finished: self.phase == GamePhase::Ended,
            standings: self.standings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use phrasehunt_protocol::PlayerId;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{AcceptAll, FixedPoints, PhraseSubstring};

    fn player(id: u64, name: &str) -> Arc<Player> {
        let (tx, _rx) = mpsc::channel(1);
        let p = Player::new(PlayerId(id), tx);
        p.set_name(name);
        p
    }

    fn running_game(players: &[Arc<Player>], policy: DuplicateWords) -> Game {
        let mut game = Game::new(
            RoomCode::parse("TEST").unwrap(),
            "the cat in the hat is back".into(),
            3,
            policy,
        );
        game.start(players).unwrap();
        game
    }

    #[test]
    fn test_game_ids_are_unique() {
        let code = RoomCode::parse("AAAA").unwrap();
        let a = Game::new(code, String::new(), 1, DuplicateWords::Allow);
        let b = Game::new(code, String::new(), 1, DuplicateWords::Allow);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_submit_word_before_start_is_rejected() {
        let p = player(1, "a");
        let mut game = Game::new(
            RoomCode::parse("AAAA").unwrap(),
            "x".into(),
            3,
            DuplicateWords::Allow,
        );
        let err = game
            .submit_word("x", &p, &AcceptAll, &FixedPoints(100))
            .unwrap_err();
        assert!(matches!(err, RoomError::GameNotRunning(GamePhase::NotStarted)));
    }

    #[test]
    fn test_start_twice_is_invalid_transition() {
        let p = player(1, "a");
        let mut game = running_game(&[p.clone()], DuplicateWords::Allow);
        let err = game.start(&[p]).unwrap_err();
        assert!(matches!(
            err,
            RoomError::InvalidTransition {
                from: GamePhase::Running,
                to: GamePhase::Running
            }
        ));
    }

    #[test]
    fn test_submit_word_scores_record_and_player() {
        let p = player(1, "a");
        let mut game = running_game(&[p.clone()], DuplicateWords::Allow);
        let outcome = game
            .submit_word("cat", &p, &PhraseSubstring, &FixedPoints(100))
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Accepted { points: 100, total: 100 });
        assert_eq!(game.records()[0].words(), ["cat"]);
        assert_eq!(p.score(), 100);
    }

    #[test]
    fn test_submit_word_rejected_changes_nothing() {
        let p = player(1, "a");
        let mut game = running_game(&[p.clone()], DuplicateWords::Allow);
        let outcome = game
            .submit_word("dog", &p, &PhraseSubstring, &FixedPoints(100))
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected(Rejection::NotInPhrase));
        assert_eq!(game.records()[0].score(), 0);
        assert!(game.records()[0].words().is_empty());
        assert_eq!(p.score(), 0);
    }

    #[test]
    fn test_submit_word_duplicates_count_twice_when_allowed() {
        let p = player(1, "a");
        let mut game = running_game(&[p.clone()], DuplicateWords::Allow);
        for _ in 0..2 {
            game.submit_word("cat", &p, &AcceptAll, &FixedPoints(100))
                .unwrap();
        }
        assert_eq!(game.records()[0].words(), ["cat", "cat"]);
        assert_eq!(game.records()[0].score(), 200);
    }

    #[test]
    fn test_submit_word_duplicates_rejected_by_policy() {
        let p = player(1, "a");
        let mut game = running_game(&[p.clone()], DuplicateWords::Reject);
        game.submit_word("cat", &p, &AcceptAll, &FixedPoints(100))
            .unwrap();
        let outcome = game
            .submit_word("cat", &p, &AcceptAll, &FixedPoints(100))
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected(Rejection::Duplicate));
        assert_eq!(game.records()[0].score(), 100);
    }

    #[test]
    fn test_submit_word_without_record_is_rejected() {
        let p1 = player(1, "a");
        let late = player(2, "late");
        let mut game = running_game(&[p1], DuplicateWords::Allow);
        let err = game
            .submit_word("cat", &late, &AcceptAll, &FixedPoints(100))
            .unwrap_err();
        assert!(matches!(err, RoomError::NoRecord(PlayerId(2))));
    }

    #[test]
    fn test_leaderboard_sort_is_stable_on_ties() {
        let a = player(1, "a");
        let b = player(2, "b");
        let c = player(3, "c");
        let mut game = running_game(&[a.clone(), b.clone(), c.clone()], DuplicateWords::Allow);

        // c overtakes, then a and b tie behind it in their original order.
        game.submit_word("x", &c, &AcceptAll, &FixedPoints(10)).unwrap();
        game.submit_word("x", &b, &AcceptAll, &FixedPoints(5)).unwrap();
        game.submit_word("x", &a, &AcceptAll, &FixedPoints(5)).unwrap();

        let names: Vec<_> = game.standings().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["c", "b", "a"]);
    }

    #[test]
    fn test_tick_counts_down_then_ends() {
        let p = player(1, "a");
        let mut game = running_game(&[p.clone()], DuplicateWords::Allow);
        assert_eq!(game.tick(), GamePhase::Running);
        assert_eq!(game.tick(), GamePhase::Running);
        assert_eq!(game.time_left(), 1);
        assert_eq!(game.tick(), GamePhase::Ended);
        assert_eq!(game.time_left(), 0);

        // Further ticks and submissions are inert.
        assert_eq!(game.tick(), GamePhase::Ended);
        let err = game
            .submit_word("cat", &p, &AcceptAll, &FixedPoints(100))
            .unwrap_err();
        assert!(matches!(err, RoomError::GameNotRunning(GamePhase::Ended)));
    }

    #[test]
    fn test_tick_before_start_is_ignored() {
        let mut game = Game::new(
            RoomCode::parse("AAAA").unwrap(),
            "x".into(),
            1,
            DuplicateWords::Allow,
        );
        assert_eq!(game.tick(), GamePhase::NotStarted);
        assert_eq!(game.time_left(), 1);
    }

    #[test]
    fn test_view_reflects_finished_state() {
        let p = player(1, "a");
        let mut game = running_game(&[p], DuplicateWords::Allow);
        assert!(!game.view().finished);
        for _ in 0..3 {
            game.tick();
        }
        let view = game.view();
        assert!(view.finished);
        assert_eq!(view.seconds_left, 0);
        assert_eq!(view.phrase, "the cat in the hat is back");
    }
}
