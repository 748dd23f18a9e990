//! Alpine Rush headless demo
//!
//! Loads tuning and sprites, then lets a simple autopilot play one run on a
//! 60 Hz timer, logging cues and the final records.
//!
//! Usage: `alpine-rush [tuning.json]`. `ALPINE_RUSH_ASSETS` points at the
//! sprite root and `ALPINE_RUSH_SAVE` at the save directory.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::Duration;

    use alpine_rush::assets::{self, AssetManifest};
    use alpine_rush::consts::{CANVAS_HEIGHT, PLAYER_X};
    use alpine_rush::persistence::{GameStorage, JsonFileStore};
    use alpine_rush::sim::RunSnapshot;
    use alpine_rush::{Engine, Intent, Tuning, platform};

    const FRAME: Duration = Duration::from_millis(16);
    /// Give up after ten minutes of simulated play
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    fn load_tuning() -> Tuning {
        let Some(path) = std::env::args().nth(1) else {
            return Tuning::default();
        };
        match Tuning::load_file(std::path::Path::new(&path)) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {path}: {e}");
                Tuning::default()
            }
        }
    }

    fn env_dir(var: &str, default: &str) -> PathBuf {
        std::env::var_os(var)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default))
    }

    /// Climb away from the nearest obstacle ahead, otherwise drift to mid-slope
    fn autopilot(snapshot: &RunSnapshot) -> bool {
        let player = snapshot.player.pos;
        let threat = snapshot
            .obstacles
            .iter()
            .filter(|o| o.pos.x > PLAYER_X - 16.0 && o.pos.x < PLAYER_X + 160.0)
            .filter(|o| (o.pos.y - player.y).abs() < 48.0)
            .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));
        match threat {
            Some(o) => o.pos.y >= player.y,
            None => player.y > CANVAS_HEIGHT / 2.0,
        }
    }

    pub async fn run() {
        platform::init_logging();
        log::info!("{} (native) starting...", alpine_rush::GAME_NAME);

        let tuning = load_tuning();
        let asset_root = env_dir("ALPINE_RUSH_ASSETS", "assets");
        let assets = assets::load_all(&asset_root, &AssetManifest::default()).await;
        let storage = GameStorage::new(JsonFileStore::new(env_dir("ALPINE_RUSH_SAVE", "save")));

        let seed = platform::now_ms() as u64;
        let mut engine = Engine::new(storage, assets, tuning, seed);
        let character = engine.settings().last_character;
        engine.push_intent(Intent::SelectCharacter(character));

        let mut interval = tokio::time::interval(FRAME);
        let mut ascending = false;
        let mut frames = 0u64;

        while engine.is_running() {
            interval.tick().await;
            let now = platform::now_ms();

            if let Some(snapshot) = engine.snapshot(now) {
                let want = autopilot(&snapshot);
                if want != ascending {
                    ascending = want;
                    engine.push_intent(if want { Intent::AscentStart } else { Intent::AscentStop });
                }
            }

            let report = match engine.tick(now) {
                Ok(report) => report,
                Err(e) => {
                    log::error!("{e}");
                    break;
                }
            };
            for cue in &report.cues {
                log::debug!("cue: {cue:?}");
            }
            if let Some(note) = engine.poll_music(now) {
                log::trace!("note {} ({:.0} ms)", note.name, note.duration_ms);
            }
            while let Some(achievement) = engine.notifications_mut().dismiss() {
                log::info!("{} {}", achievement.icon, achievement.name);
            }

            frames += 1;
            if report.run_over {
                if let Some(score) = engine.pending_high_score() {
                    let name = engine.settings().last_player_name.clone();
                    if let Some(rank) = engine.submit_high_score(&name) {
                        log::info!("High score #{rank}: {score}");
                    }
                }
                engine.stop();
            } else if frames >= MAX_FRAMES {
                log::info!("Time limit reached");
                engine.stop();
            }
        }

        let stats = engine.stats();
        log::info!(
            "Games played: {}, best score: {}, total play time: {}",
            stats.total_games_played,
            stats.high_score,
            alpine_rush::format_clock(stats.total_play_time)
        );
        for (i, entry) in engine.high_scores().entries.iter().enumerate() {
            log::info!("{}. {} {} ({})", i + 1, entry.name, entry.score, entry.date);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    native::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    alpine_rush::platform::init_logging();
    log::info!("{} is a library on wasm32; drive Engine from the host page", alpine_rush::GAME_NAME);
}
