//! KidneyQuest headless demo
//!
//! Runs the autopilot for a fixed stretch of simulated time and prints the
//! final snapshot. The playable build is the wasm module driven by the page.
//!
//! Usage: `kidney-quest [tuning.json] [seconds]`

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::PathBuf;

    use kidney_quest::persistence::JsonFileStore;
    use kidney_quest::sim::{RunEvent, RunSession, TickInput};
    use kidney_quest::tuning::Tuning;

    env_logger::init();
    log::info!("KidneyQuest (native demo) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(&PathBuf::from(path)),
        None => Tuning::default(),
    };
    let seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);

    let store = JsonFileStore::new(std::env::temp_dir().join("kidneyquest_highscore.json"));
    log::info!("High score file: {}", store.path().display());
    let mut session = RunSession::new(tuning, rand::random(), Box::new(store));
    log::info!("Session seed {}", session.seed());

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let frames = (seconds * 60.0) as u64;
    let mut runs = 0;
    for frame in 0..=frames {
        session.frame(frame as f64 / 60.0, &input);
        for event in session.drain_events() {
            match event {
                RunEvent::GameOver { score, new_record } => {
                    runs += 1;
                    let note = if new_record { " (new record)" } else { "" };
                    log::info!("Run {runs} over: {score} points{note}");
                }
                RunEvent::GeneCollected { name, points } => {
                    log::debug!("Collected {name} (+{points})")
                }
                other => log::trace!("{other:?}"),
            }
        }
    }

    log::info!("Finished {runs} run(s); high score {}", session.high_score());
    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}
