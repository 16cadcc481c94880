//! Score, high score, play count, and milestone achievements
//!
//! Persisted through the key/value store, one namespace per game mode.
//! Every mutation is written immediately; a failed write is logged and the
//! in-memory values carry on.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};
use crate::sim::GameMode;

/// What an achievement measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementKind {
    /// Best single-run score
    Score,
    /// Sessions started
    Plays,
    /// Lifetime hazards cleared
    Cumulative,
}

/// Static achievement definition
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: AchievementKind,
    pub milestone: u64,
}

const fn def(id: &'static str, title: &'static str, kind: AchievementKind, milestone: u64) -> AchievementDef {
    AchievementDef {
        id,
        title,
        kind,
        milestone,
    }
}

pub const FLAP_ACHIEVEMENTS: &[AchievementDef] = &[
    def("flap_first_gap", "First Flight", AchievementKind::Score, 1),
    def("flap_score_10", "Getting the Hang of It", AchievementKind::Score, 10),
    def("flap_score_25", "Sky Dancer", AchievementKind::Score, 25),
    def("flap_score_50", "Ace", AchievementKind::Score, 50),
    def("flap_plays_10", "Frequent Flyer", AchievementKind::Plays, 10),
    def("flap_plays_50", "Cleared for Takeoff", AchievementKind::Plays, 50),
    def("flap_total_100", "Hundred Gaps", AchievementKind::Cumulative, 100),
    def("flap_total_1000", "Thousand Gaps", AchievementKind::Cumulative, 1000),
];

pub const RUNNER_ACHIEVEMENTS: &[AchievementDef] = &[
    def("runner_first_jump", "First Hurdle", AchievementKind::Score, 1),
    def("runner_score_10", "Warmed Up", AchievementKind::Score, 10),
    def("runner_score_30", "Sprinter", AchievementKind::Score, 30),
    def("runner_score_75", "Unstoppable", AchievementKind::Score, 75),
    def("runner_plays_10", "Regular", AchievementKind::Plays, 10),
    def("runner_plays_50", "Marathoner", AchievementKind::Plays, 50),
    def("runner_total_100", "Hundred Hurdles", AchievementKind::Cumulative, 100),
    def("runner_total_1000", "Thousand Hurdles", AchievementKind::Cumulative, 1000),
];

/// Definitions for a game mode
pub fn definitions(mode: GameMode) -> &'static [AchievementDef] {
    match mode {
        GameMode::Flap => FLAP_ACHIEVEMENTS,
        GameMode::Runner => RUNNER_ACHIEVEMENTS,
    }
}

/// Persisted progress toward one achievement.
/// `unlocked` becomes true once `progress >= milestone` and never reverts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub id: String,
    pub milestone: u64,
    pub progress: u64,
    pub unlocked: bool,
}

impl AchievementRecord {
    fn from_def(def: &AchievementDef) -> Self {
        Self {
            id: def.id.to_string(),
            milestone: def.milestone,
            progress: 0,
            unlocked: false,
        }
    }

    /// Raise progress (never lowers it). Returns true on the unlocking call only.
    pub fn record_progress(&mut self, value: u64) -> bool {
        self.progress = self.progress.max(value);
        if !self.unlocked && self.progress >= self.milestone {
            self.unlocked = true;
            return true;
        }
        false
    }
}

/// Read-only view of persisted progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub high_score: u64,
    pub play_count: u64,
    pub cumulative_clears: u64,
    pub achievements: Vec<AchievementRecord>,
}

/// Result of closing a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub final_score: u64,
    pub high_score: u64,
    pub new_high_score: bool,
    /// Ids unlocked by this call
    pub newly_unlocked: Vec<String>,
}

/// Tracks the running score and persisted milestones for one game mode
#[derive(Debug)]
pub struct ScoreAchievementTracker<S: KeyValueStore> {
    store: S,
    mode: GameMode,
    defs: &'static [AchievementDef],
    score: u64,
    high_score: u64,
    play_count: u64,
    cumulative_clears: u64,
    /// Same order as `defs`
    achievements: Vec<AchievementRecord>,
}

impl<S: KeyValueStore> ScoreAchievementTracker<S> {
    /// Load persisted progress; anything missing or corrupted starts at zero
    pub fn load(store: S, mode: GameMode) -> Self {
        let defs = definitions(mode);
        let mut tracker = Self {
            store,
            mode,
            defs,
            score: 0,
            high_score: 0,
            play_count: 0,
            cumulative_clears: 0,
            achievements: Vec::new(),
        };

        tracker.high_score = persistence::load_parsed(&tracker.store, &tracker.key("high_score"));
        tracker.play_count = persistence::load_parsed(&tracker.store, &tracker.key("play_count"));
        tracker.cumulative_clears =
            persistence::load_parsed(&tracker.store, &tracker.key("cumulative_clears"));

        let stored: Vec<AchievementRecord> =
            persistence::load_json(&tracker.store, &tracker.key("achievements"));
        tracker.achievements = merge_records(defs, stored);

        log::info!(
            "Loaded {} progress: high score {}, {} plays, {}/{} achievements",
            mode.as_str(),
            tracker.high_score,
            tracker.play_count,
            tracker.unlocked_count(),
            tracker.achievements.len()
        );
        tracker
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Running score of the current session
    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.unlocked).count()
    }

    /// Title for an achievement id (for toasts)
    pub fn title(&self, id: &str) -> Option<&'static str> {
        self.defs.iter().find(|d| d.id == id).map(|d| d.title)
    }

    /// Counts an attempt and zeroes the running score
    pub fn on_session_start(&mut self) {
        self.score = 0;
        self.play_count += 1;
        persistence::store_or_log(&self.store, &self.key("play_count"), &self.play_count.to_string());
    }

    /// One hazard cleared. Returns the new running score.
    pub fn on_clear_event(&mut self) -> u64 {
        self.score += 1;
        self.cumulative_clears += 1;
        persistence::store_or_log(
            &self.store,
            &self.key("cumulative_clears"),
            &self.cumulative_clears.to_string(),
        );
        self.score
    }

    /// Settle the high score and re-evaluate every achievement
    pub fn on_session_end(&mut self, final_score: u64) -> SessionSummary {
        let new_high_score = final_score > self.high_score;
        if new_high_score {
            log::info!("New {} high score: {} (was {})", self.mode.as_str(), final_score, self.high_score);
            self.high_score = final_score;
            persistence::store_or_log(&self.store, &self.key("high_score"), &self.high_score.to_string());
        }

        let mut newly_unlocked = Vec::new();
        for (def, record) in self.defs.iter().zip(self.achievements.iter_mut()) {
            let value = match def.kind {
                AchievementKind::Score => final_score,
                AchievementKind::Plays => self.play_count,
                AchievementKind::Cumulative => self.cumulative_clears,
            };
            if record.record_progress(value) {
                log::info!("Achievement unlocked: {} ({})", def.title, def.id);
                newly_unlocked.push(record.id.clone());
            }
        }
        persistence::store_json_or_log(&self.store, &self.key("achievements"), &self.achievements);

        SessionSummary {
            final_score,
            high_score: self.high_score,
            new_high_score,
            newly_unlocked,
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            high_score: self.high_score,
            play_count: self.play_count,
            cumulative_clears: self.cumulative_clears,
            achievements: self.achievements.clone(),
        }
    }

    fn key(&self, suffix: &str) -> String {
        format!("avatar_arcade_{}_{}", self.mode.storage_prefix(), suffix)
    }
}

/// Align stored records with the current definitions. Unknown ids are
/// dropped, missing ones start at zero, and unlocks are never downgraded
/// (a stored unlock lifts progress to the milestone).
fn merge_records(defs: &[AchievementDef], stored: Vec<AchievementRecord>) -> Vec<AchievementRecord> {
    defs.iter()
        .map(|def| {
            let mut record = AchievementRecord::from_def(def);
            if let Some(saved) = stored.iter().find(|r| r.id == def.id) {
                record.progress = if saved.unlocked {
                    saved.progress.max(def.milestone)
                } else {
                    saved.progress
                };
                record.unlocked = record.progress >= def.milestone;
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::persistence::tests::BrokenStore;
    use proptest::prelude::*;

    fn tracker(store: &MemoryStore) -> ScoreAchievementTracker<&MemoryStore> {
        ScoreAchievementTracker::load(store, GameMode::Flap)
    }

    fn play(t: &mut ScoreAchievementTracker<&MemoryStore>, clears: u64) -> SessionSummary {
        t.on_session_start();
        for _ in 0..clears {
            t.on_clear_event();
        }
        let score = t.score();
        t.on_session_end(score)
    }

    #[test]
    fn test_score_counts_clear_events() {
        let store = MemoryStore::new();
        let mut t = tracker(&store);
        t.on_session_start();
        for _ in 0..7 {
            t.on_clear_event();
        }
        assert_eq!(t.score(), 7);
        t.on_session_start();
        assert_eq!(t.score(), 0);
    }

    #[test]
    fn test_play_count_counts_attempts() {
        let store = MemoryStore::new();
        let mut t = tracker(&store);
        t.on_session_start();
        t.on_session_start();
        assert_eq!(t.snapshot().play_count, 2);
        assert_eq!(store.get("avatar_arcade_flap_play_count").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_high_score_and_unlocks() {
        let store = MemoryStore::new();
        let mut t = tracker(&store);
        let summary = play(&mut t, 12);
        assert!(summary.new_high_score);
        assert_eq!(summary.high_score, 12);
        assert_eq!(summary.newly_unlocked, vec!["flap_first_gap", "flap_score_10"]);

        let summary = play(&mut t, 3);
        assert!(!summary.new_high_score);
        assert_eq!(summary.high_score, 12);
        assert!(summary.newly_unlocked.is_empty());

        // Score achievements keep the best run as progress
        let snap = t.snapshot();
        let score_25 = snap.achievements.iter().find(|a| a.id == "flap_score_25").unwrap();
        assert_eq!(score_25.progress, 12);
        assert!(!score_25.unlocked);
        assert_eq!(snap.cumulative_clears, 15);
    }

    #[test]
    fn test_session_end_is_idempotent() {
        let store = MemoryStore::new();
        let mut t = tracker(&store);
        t.on_session_start();
        let first = t.on_session_end(30);
        let second = t.on_session_end(30);
        assert!(first.new_high_score);
        assert!(!second.new_high_score);
        assert_eq!(second.high_score, 30);
        assert!(second.newly_unlocked.is_empty());
        assert_eq!(t.unlocked_count(), first.newly_unlocked.len());
    }

    #[test]
    fn test_progress_survives_reload() {
        let store = MemoryStore::new();
        {
            let mut t = tracker(&store);
            play(&mut t, 11);
        }
        let t = tracker(&store);
        let snap = t.snapshot();
        assert_eq!(snap.high_score, 11);
        assert_eq!(snap.play_count, 1);
        assert_eq!(snap.cumulative_clears, 11);
        assert_eq!(t.unlocked_count(), 2);
    }

    #[test]
    fn test_modes_do_not_share_records() {
        let store = MemoryStore::new();
        let mut flap = tracker(&store);
        play(&mut flap, 5);
        let runner = ScoreAchievementTracker::load(&store, GameMode::Runner);
        assert_eq!(runner.high_score(), 0);
        assert_eq!(runner.snapshot().play_count, 0);
    }

    #[test]
    fn test_corrupted_storage_falls_back() {
        let store = MemoryStore::new();
        store.set("avatar_arcade_flap_high_score", "lots").unwrap();
        store.set("avatar_arcade_flap_achievements", "{not json").unwrap();
        let t = tracker(&store);
        let snap = t.snapshot();
        assert_eq!(snap.high_score, 0);
        assert_eq!(snap.achievements.len(), FLAP_ACHIEVEMENTS.len());
        assert!(snap.achievements.iter().all(|a| a.progress == 0 && !a.unlocked));
    }

    #[test]
    fn test_merge_keeps_unlocks_and_drops_unknown() {
        let stored = vec![
            AchievementRecord { id: "flap_score_50".into(), milestone: 50, progress: 3, unlocked: true },
            AchievementRecord { id: "retired".into(), milestone: 1, progress: 1, unlocked: true },
            AchievementRecord { id: "flap_plays_10".into(), milestone: 99, progress: 10, unlocked: false },
        ];
        let merged = merge_records(FLAP_ACHIEVEMENTS, stored);
        assert_eq!(merged.len(), FLAP_ACHIEVEMENTS.len());
        assert!(merged.iter().all(|r| r.id != "retired"));
        let ace = merged.iter().find(|r| r.id == "flap_score_50").unwrap();
        assert!(ace.unlocked);
        assert_eq!(ace.progress, 50);
        assert!(merged.iter().all(|r| r.unlocked == (r.progress >= r.milestone)));
        // Milestone comes from the definition
        let plays = merged.iter().find(|r| r.id == "flap_plays_10").unwrap();
        assert_eq!(plays.milestone, 10);
        assert!(plays.unlocked);
    }

    #[test]
    fn test_records_round_trip() {
        let store = MemoryStore::new();
        let mut t = tracker(&store);
        play(&mut t, 26);
        let before = t.snapshot().achievements;
        let json = serde_json::to_string(&before).unwrap();
        let after: Vec<AchievementRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_broken_store_keeps_session_alive() {
        let mut t = ScoreAchievementTracker::load(BrokenStore, GameMode::Runner);
        t.on_session_start();
        t.on_clear_event();
        let summary = t.on_session_end(t.score());
        assert_eq!(summary.final_score, 1);
        assert!(summary.new_high_score);
        assert_eq!(summary.newly_unlocked, vec!["runner_first_jump"]);
    }

    proptest! {
        #[test]
        fn prop_unlocks_are_monotonic(scores in prop::collection::vec(0u64..80, 1..30)) {
            let store = MemoryStore::new();
            let mut t = tracker(&store);
            let mut unlocked_before: Vec<bool> = t.snapshot().achievements.iter().map(|a| a.unlocked).collect();
            for score in scores {
                t.on_session_start();
                t.on_session_end(score);
                let now: Vec<bool> = t.snapshot().achievements.iter().map(|a| a.unlocked).collect();
                for (was, is) in unlocked_before.iter().zip(&now) {
                    prop_assert!(!*was || *is);
                }
                for a in t.snapshot().achievements {
                    prop_assert_eq!(a.unlocked, a.progress >= a.milestone);
                }
                unlocked_before = now;
            }
        }
    }
}
