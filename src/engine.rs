//! Loop driver
//!
//! [`Engine`] owns the authoritative run, the persisted records and the
//! background music. A host pushes [`Intent`]s as input arrives and calls
//! [`Engine::tick`] once per rendered frame; everything else is read-only
//! snapshots and draw intents.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::achievements::{self, Achievement};
use crate::assets::AssetSet;
use crate::audio::{self, MusicNote, MusicScheduler, SoundCue};
use crate::characters::{self, Character};
use crate::error::EngineError;
use crate::highscores::HighScores;
use crate::notifications::NotificationQueue;
use crate::persistence::Storage;
use crate::render::{self, DrawCommand};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, Particle, RunPhase, RunSnapshot, RunState, TickInput};
use crate::stats::{self, GameStats, RunSummary};
use crate::tuning::Tuning;

/// Discrete player input, applied at the start of the next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intent {
    AscentStart,
    AscentStop,
    TogglePause,
    ToggleMute,
    /// New run with the current character
    Restart,
    /// New run with the given character
    SelectCharacter(u32),
}

/// What happened during one engine tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Sound effects to play now, in order
    pub cues: Vec<SoundCue>,
    /// Starting tone gain for `cues`, from the sfx volume and mute setting
    pub cue_gain: f32,
    /// The run ended on this tick
    pub run_over: bool,
    pub newly_unlocked: Vec<Achievement>,
}

pub struct Engine<S: Storage> {
    storage: S,
    tuning: Tuning,
    assets: AssetSet,
    /// Shared by every run of this engine
    ambient: Vec<Particle>,
    run: Option<RunState>,
    character_id: u32,

    stats: GameStats,
    achievements: Vec<Achievement>,
    high_scores: HighScores,
    settings: Settings,
    /// Score of the last finished run, while it may still enter the board
    pending_score: Option<u64>,

    notifications: NotificationQueue,
    music: MusicScheduler,

    intents: VecDeque<Intent>,
    input: TickInput,
    seed: u64,
    runs_started: u64,
    running: bool,
    faulted: Option<String>,
}

impl<S: Storage> Engine<S> {
    pub fn new(storage: S, assets: AssetSet, tuning: Tuning, seed: u64) -> Self {
        let settings = storage.load_settings();
        let mut rng = Pcg32::seed_from_u64(seed);
        let ambient = sim::spawn_ambient(tuning.ambient_particles, &mut rng);

        let music = MusicScheduler::new(seed.wrapping_add(1), settings.music_gain());

        log::info!("Engine initialized with seed: {seed}");

        Self {
            stats: storage.load_game_stats(),
            achievements: storage.load_achievements(),
            high_scores: storage.load_high_scores(),
            character_id: characters::find_or_default(settings.last_character).id,
            settings,
            storage,
            tuning,
            assets,
            ambient,
            run: None,
            pending_score: None,
            notifications: NotificationQueue::new(),
            music,
            intents: VecDeque::new(),
            input: TickInput::default(),
            seed,
            runs_started: 0,
            running: true,
            faulted: None,
        }
    }

    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push_back(intent);
    }

    /// Advance one frame
    pub fn tick(&mut self, now_ms: f64) -> Result<TickReport, EngineError> {
        if let Some(reason) = &self.faulted {
            return Err(EngineError::Halted(reason.clone()));
        }
        let mut report = TickReport::default();
        if !self.running {
            return Ok(report);
        }

        self.apply_intents(now_ms);

        let Some(run) = self.run.as_mut() else {
            self.input = TickInput::default();
            return Ok(report);
        };
        if run.is_over() {
            self.input = TickInput::default();
            return Ok(report);
        }

        let phase_before = run.phase;
        let input = std::mem::take(&mut self.input);
        report.events = sim::tick(run, &input, now_ms);

        if let Err(e) = validate(run) {
            log::error!("Halting engine: {e}");
            self.faulted = Some(e.to_string());
            self.music.stop();
            return Err(e);
        }

        match (phase_before, run.phase) {
            (RunPhase::Playing, RunPhase::Paused) => self.music.stop(),
            (RunPhase::Paused, RunPhase::Playing) if !self.settings.muted => {
                self.music.start(now_ms)
            }
            _ => {}
        }
        self.music.set_tempo(run.speed_multiplier * run.speed_boost);

        report.cues = report
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Collision { .. } => Some(SoundCue::Collision),
                GameEvent::PowerUpCollected(_) => Some(SoundCue::PowerUp),
                _ => None,
            })
            .collect();
        report.cue_gain = audio::cue_gain(self.settings.sfx_gain());

        if report.events.contains(&GameEvent::RunOver) {
            report.run_over = true;
            report.newly_unlocked = self.finish_run(now_ms);
            report
                .cues
                .extend(report.newly_unlocked.iter().map(|_| SoundCue::Achievement));
            report.cues.push(SoundCue::GameOver);
        }

        Ok(report)
    }

    fn apply_intents(&mut self, now_ms: f64) {
        while let Some(intent) = self.intents.pop_front() {
            match intent {
                Intent::AscentStart => self.input.ascending = Some(true),
                Intent::AscentStop => self.input.ascending = Some(false),
                Intent::TogglePause => self.input.toggle_pause = !self.input.toggle_pause,
                Intent::ToggleMute => self.toggle_mute(),
                Intent::Restart | Intent::SelectCharacter(_) if self.is_paused() => {
                    log::debug!("Ignoring {intent:?} while paused");
                }
                Intent::Restart => self.start_run(self.character_id, now_ms),
                Intent::SelectCharacter(id) => self.start_run(id, now_ms),
            }
        }
    }

    fn is_paused(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.phase == RunPhase::Paused)
    }

    fn toggle_mute(&mut self) {
        self.settings.muted = !self.settings.muted;
        self.music.set_volume(self.settings.music_gain());
        self.storage.save_settings(&self.settings);
        log::info!("Sound {}", if self.settings.muted { "muted" } else { "on" });
    }

    /// Change and persist the music and sound effect volumes (0.0 - 1.0)
    pub fn set_volumes(&mut self, music: f32, sfx: f32) {
        self.settings.music_volume = music.clamp(0.0, 1.0);
        self.settings.sfx_volume = sfx.clamp(0.0, 1.0);
        self.music.set_volume(self.settings.music_gain());
        self.storage.save_settings(&self.settings);
    }

    /// Fresh run; ambient particles and assets carry over
    fn start_run(&mut self, character_id: u32, now_ms: f64) {
        let character = characters::find_or_default(character_id);
        if self.settings.last_character != character.id {
            self.settings.last_character = character.id;
            self.storage.save_settings(&self.settings);
        }
        self.character_id = character.id;

        self.stats = self.storage.load_game_stats();
        self.achievements = self.storage.load_achievements();
        self.high_scores = self.storage.load_high_scores();
        self.pending_score = None;

        if let Some(previous) = self.run.take() {
            self.ambient = previous.ambient;
        }
        self.runs_started += 1;
        let seed = self.seed.wrapping_add(self.runs_started);
        self.run = Some(RunState::new(
            self.tuning.clone(),
            character.id,
            self.ambient.clone(),
            seed,
            now_ms,
        ));
        self.input = TickInput::default();

        self.music.stop();
        if !self.settings.muted {
            self.music.start(now_ms);
        }
        log::info!("Started run as {} with seed: {seed}", character.name);
    }

    /// Fold the finished run into the persisted records
    fn finish_run(&mut self, now_ms: f64) -> Vec<Achievement> {
        let Some(run) = self.run.as_ref() else {
            return Vec::new();
        };
        let summary = RunSummary::from_run(run, now_ms);

        self.stats = stats::update_game_stats(&self.stats, &summary);
        self.storage.save_game_stats(&self.stats);

        let after = achievements::evaluate(&self.achievements, &self.stats);
        let newly = achievements::diff_newly_unlocked(&self.achievements, &after);
        self.achievements = after;
        self.storage.save_achievements(&self.achievements);
        for achievement in &newly {
            self.notifications.push(achievement.clone());
        }

        self.music.stop();
        if self.high_scores.qualifies(summary.score) {
            self.pending_score = Some(summary.score);
        }
        log::info!(
            "Run finished: score {} in {}s, {} new achievements",
            summary.score,
            summary.seconds,
            newly.len()
        );
        newly
    }

    /// Enter the last run's score on the board; returns the 1-indexed rank
    pub fn submit_high_score(&mut self, name: &str) -> Option<usize> {
        let score = self.pending_score.take()?;
        let rank = self.high_scores.potential_rank(score);
        self.high_scores = self.storage.save_high_score(score, name);

        let name = name.trim();
        if !name.is_empty() && self.settings.last_player_name != name {
            self.settings.last_player_name = name.to_string();
            self.storage.save_settings(&self.settings);
        }
        rank
    }

    /// Score waiting for a name, if the last run made the board
    pub fn pending_high_score(&self) -> Option<u64> {
        self.pending_score
    }

    pub fn snapshot(&self, now_ms: f64) -> Option<RunSnapshot> {
        self.run.as_ref().map(|run| run.snapshot(now_ms))
    }

    /// Draw intents for the current frame, achievement toast on top
    pub fn frame(&mut self, now_ms: f64) -> Vec<DrawCommand> {
        let mut out = match &self.run {
            Some(run) => render::build_frame(&run.snapshot(now_ms), self.character(), now_ms),
            None => Vec::new(),
        };
        if let Some(toast) = self.notifications.update(now_ms) {
            out.extend(render::build_toast(&toast));
        }
        out
    }

    pub fn poll_music(&mut self, now_ms: f64) -> Option<MusicNote> {
        self.music.poll(now_ms)
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    /// Stop ticking and silence the music
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.music.stop();
            log::info!("Engine stopped");
        }
    }

    /// False once stopped or faulted; hosts stop requesting frames
    pub fn is_running(&self) -> bool {
        self.running && self.faulted.is_none()
    }

    pub fn fault(&self) -> Option<&str> {
        self.faulted.as_deref()
    }

    pub fn character(&self) -> &'static Character {
        characters::find_or_default(self.character_id)
    }

    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Post-tick consistency check
fn validate(run: &RunState) -> Result<(), EngineError> {
    if !run.player.pos.is_finite() || !run.player.vel_y.is_finite() {
        return Err(EngineError::CorruptState(format!(
            "player position {:?} velocity {}",
            run.player.pos, run.player.vel_y
        )));
    }
    if let Some(o) = run.obstacles.iter().find(|o| !o.pos.is_finite()) {
        return Err(EngineError::CorruptState(format!("obstacle at {:?}", o.pos)));
    }
    if let Some(p) = run.power_ups.iter().find(|p| !p.pos.is_finite()) {
        return Err(EngineError::CorruptState(format!("power-up at {:?}", p.pos)));
    }
    if run.lives > run.tuning.max_lives {
        return Err(EngineError::CorruptState(format!(
            "{} lives exceeds maximum {}",
            run.lives, run.tuning.max_lives
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{GameStorage, MemoryStore};
    use crate::sim::{Obstacle, ObstacleVariant};

    type TestEngine = Engine<GameStorage<MemoryStore>>;

    fn quiet_tuning() -> Tuning {
        Tuning {
            initial_obstacles: 0,
            powerup_spawn_chance: 0.0,
            obstacle_spawn_interval: 1_000_000,
            ..Tuning::default()
        }
    }

    fn engine() -> TestEngine {
        let storage = GameStorage::new(MemoryStore::default());
        Engine::new(storage, AssetSet::default(), quiet_tuning(), 42)
    }

    fn started(now: f64) -> TestEngine {
        let mut engine = engine();
        engine.push_intent(Intent::SelectCharacter(1));
        engine.tick(now).unwrap();
        engine
    }

    fn place_obstacle_on_player(engine: &mut TestEngine) {
        let run = engine.run.as_mut().unwrap();
        let pos = run.player.pos;
        run.obstacles.push(Obstacle {
            pos,
            variant: ObstacleVariant::Tree(0),
        });
    }

    #[test]
    fn test_idle_until_character_selected() {
        let mut engine = engine();
        let report = engine.tick(0.0).unwrap();
        assert_eq!(report, TickReport::default());
        assert!(engine.snapshot(0.0).is_none());

        engine.push_intent(Intent::SelectCharacter(3));
        engine.tick(16.0).unwrap();
        assert_eq!(engine.character().name, "Sunset");
        assert_eq!(engine.settings().last_character, 3);
        assert!(engine.snapshot(16.0).is_some());
    }

    #[test]
    fn test_three_hits_finish_run_and_update_records() {
        let mut engine = started(0.0);
        let mut now = 0.0;
        let mut last = TickReport::default();

        for hit in 0..3 {
            now += 2_500.0;
            place_obstacle_on_player(&mut engine);
            last = engine.tick(now).unwrap();
            assert!(last.cues.contains(&SoundCue::Collision), "hit {hit}");
        }

        assert!(last.run_over);
        assert_eq!(last.cues.last(), Some(&SoundCue::GameOver));
        assert!(last.newly_unlocked.iter().any(|a| a.id == "first_game"));
        assert!(last.cues.contains(&SoundCue::Achievement));

        let snapshot = engine.snapshot(now).unwrap();
        assert_eq!(snapshot.lives, 0);
        assert_eq!(engine.stats().total_games_played, 1);
        assert_eq!(engine.stats().high_score, snapshot.score);
        assert_eq!(engine.storage().load_game_stats().total_games_played, 1);
        assert_eq!(engine.notifications_mut().len(), last.newly_unlocked.len());

        // Over is terminal until restart
        let frozen = engine.tick(now + 16.0).unwrap();
        assert!(frozen.events.is_empty());
    }

    #[test]
    fn test_high_score_keeps_existing_best() {
        let mut engine = started(0.0);
        engine.stats.high_score = 5_000;
        engine.run.as_mut().unwrap().lives = 1;
        place_obstacle_on_player(&mut engine);
        let report = engine.tick(100.0).unwrap();
        assert!(report.run_over);
        assert_eq!(engine.stats().high_score, 5_000);
    }

    #[test]
    fn test_submit_high_score() {
        let mut engine = started(0.0);
        engine.run.as_mut().unwrap().lives = 1;
        place_obstacle_on_player(&mut engine);
        engine.tick(100.0).unwrap();

        assert!(engine.pending_high_score().is_some());
        assert_eq!(engine.submit_high_score("  Ada "), Some(1));
        assert_eq!(engine.high_scores().entries[0].name, "Ada");
        assert_eq!(engine.settings().last_player_name, "Ada");
        assert_eq!(engine.submit_high_score("again"), None);
        assert_eq!(engine.storage().load_high_scores().entries.len(), 1);
    }

    #[test]
    fn test_corrupt_state_halts_engine() {
        let mut engine = started(0.0);
        engine.run.as_mut().unwrap().player.pos.y = f32::NAN;

        let err = engine.tick(16.0).unwrap_err();
        assert!(matches!(err, EngineError::CorruptState(_)));
        assert!(!engine.is_running());
        assert!(engine.fault().is_some());
        assert!(matches!(engine.tick(32.0), Err(EngineError::Halted(_))));
    }

    #[test]
    fn test_lives_above_maximum_is_corrupt() {
        let mut engine = started(0.0);
        engine.run.as_mut().unwrap().lives = 9;
        assert!(matches!(engine.tick(16.0), Err(EngineError::CorruptState(_))));
    }

    #[test]
    fn test_restart_keeps_ambient_pool() {
        let mut engine = started(0.0);
        engine.run.as_mut().unwrap().lives = 1;
        place_obstacle_on_player(&mut engine);
        engine.tick(100.0).unwrap();

        engine.push_intent(Intent::Restart);
        engine.tick(200.0).unwrap();
        let snapshot = engine.snapshot(200.0).unwrap();
        assert_eq!(snapshot.phase, RunPhase::Playing);
        assert_eq!(snapshot.lives, engine.tuning.max_lives);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.ambient.len(), engine.tuning.ambient_particles);
        assert_eq!(engine.character().id, 1);
        assert!(engine.pending_high_score().is_none());
    }

    #[test]
    fn test_pause_stops_music_and_freezes_run() {
        let mut engine = started(0.0);
        assert!(engine.music.is_playing());

        engine.push_intent(Intent::TogglePause);
        engine.tick(16.0).unwrap();
        let frame = engine.snapshot(16.0).unwrap().frame;
        assert!(!engine.music.is_playing());

        engine.tick(32.0).unwrap();
        assert_eq!(engine.snapshot(32.0).unwrap().frame, frame);

        engine.push_intent(Intent::TogglePause);
        engine.tick(48.0).unwrap();
        assert_eq!(engine.snapshot(48.0).unwrap().frame, frame + 1);
        assert!(engine.music.is_playing());
    }

    #[test]
    fn test_mute_persists() {
        let mut engine = started(0.0);
        engine.push_intent(Intent::ToggleMute);
        engine.tick(16.0).unwrap();
        assert!(engine.settings().muted);
        assert!(engine.storage().load_settings().muted);
        assert_eq!(engine.poll_music(16.0).map(|n| n.volume), Some(0.0));

        place_obstacle_on_player(&mut engine);
        let report = engine.tick(32.0).unwrap();
        assert!(report.cues.contains(&SoundCue::Collision));
        assert_eq!(report.cue_gain, 0.0);
    }

    #[test]
    fn test_volumes_follow_settings() {
        let mut engine = started(0.0);
        let defaults = Settings::default();
        assert_eq!(engine.poll_music(0.0).map(|n| n.volume), Some(defaults.music_volume));
        assert_eq!(
            engine.tick(16.0).unwrap().cue_gain,
            audio::cue_gain(defaults.sfx_volume)
        );

        engine.set_volumes(0.5, 0.5);
        assert_eq!(engine.storage().load_settings().music_volume, 0.5);
        assert_eq!(engine.tick(32.0).unwrap().cue_gain, audio::cue_gain(0.5));
        let note = (1..200)
            .find_map(|i| engine.poll_music(f64::from(i) * 10.0))
            .unwrap();
        assert_eq!(note.volume, 0.5);

        // Saved volumes are picked up by the next engine
        let restored = Engine::new(
            GameStorage::new(engine.storage().backend().clone()),
            AssetSet::default(),
            quiet_tuning(),
            1,
        );
        assert_eq!(restored.settings().sfx_volume, 0.5);
        assert_eq!(restored.music.volume(), 0.5);
    }

    #[test]
    fn test_ascent_release_during_pause_is_kept() {
        let mut engine = started(0.0);
        engine.push_intent(Intent::AscentStart);
        engine.tick(16.0).unwrap();
        engine.push_intent(Intent::TogglePause);
        engine.tick(32.0).unwrap();
        engine.push_intent(Intent::AscentStop);
        engine.tick(48.0).unwrap();
        engine.push_intent(Intent::TogglePause);

        let mut now = 64.0;
        for _ in 0..30 {
            engine.tick(now).unwrap();
            now += 16.0;
        }
        let run = engine.run.as_ref().unwrap();
        assert_eq!(run.phase, RunPhase::Playing);
        assert!(!run.player.ascending);
        assert!(run.player.vel_y >= 0.0);
    }

    #[test]
    fn test_restart_ignored_while_paused() {
        let mut engine = started(0.0);
        let mut now = 0.0;
        for _ in 0..70 {
            now += 16.0;
            engine.tick(now).unwrap();
        }
        engine.push_intent(Intent::TogglePause);
        engine.tick(now + 16.0).unwrap();
        let paused = engine.snapshot(now + 16.0).unwrap();
        assert_eq!(paused.phase, RunPhase::Paused);

        engine.push_intent(Intent::Restart);
        engine.push_intent(Intent::SelectCharacter(2));
        engine.tick(now + 32.0).unwrap();
        let after = engine.snapshot(now + 32.0).unwrap();
        assert_eq!(after.phase, RunPhase::Paused);
        assert_eq!(after.frame, paused.frame);
        assert_eq!(after.score, paused.score);
        assert_eq!(engine.character().id, 1);
    }

    #[test]
    fn test_stop() {
        let mut engine = started(0.0);
        engine.stop();
        assert!(!engine.is_running());
        assert!(engine.poll_music(1_000.0).is_none());
        assert_eq!(engine.tick(16.0), Ok(TickReport::default()));
    }

    #[test]
    fn test_frame_includes_toast() {
        let mut engine = started(0.0);
        engine.notifications_mut().push(achievements::catalog()[0].clone());
        let cmds = engine.frame(16.0);
        assert!(cmds.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text.contains("Achievement Unlocked")
        )));
    }
}
