//! Engine binary for the Solace release simulation.
//!
//! This is the main entry point that wires together the frame loop, the
//! command console, and the save file. It loads configuration, restores
//! the saved simulation (or starts fresh), and steps the simulation at a
//! fixed frame interval while a console thread feeds it commands.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `solace-config.yaml`
//! 3. Open the save file storage
//! 4. Restore the saved simulation, or start fresh
//! 5. Start the command console thread (stdin)
//! 6. Run the frame loop until `quit` or end of input
//! 7. Save and shut down

mod commands;
mod error;

use std::io::BufRead as _;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use solace_core::session::RELEASES_PER_SESSION;
use solace_core::{
    Command, FileStorage, SessionSettings, SimulationState, SolaceConfig, StandAnchors,
    persistence, run_tick,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{Instruction, ParseError};
use crate::error::EngineError;

/// Application entry point for the engine.
///
/// Initializes all subsystems and runs the frame loop. Returns an error
/// code on failure.
///
/// # Errors
///
/// Returns an error if configuration loading or the final save fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("solace-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        tick_interval_ms = config.engine.tick_interval_ms,
        autosave_interval_ticks = config.engine.autosave_interval_ticks,
        save_path = config.persistence.save_path,
        "Configuration loaded"
    );

    // 3. Open the save file storage.
    let storage = FileStorage::new(config.persistence.save_path.clone());

    // 4. Restore the saved simulation, or start fresh.
    let mut rng = SmallRng::from_os_rng();
    let settings = SessionSettings::from_config(&config);
    let manager = persistence::load_or_default(&storage, settings, &mut rng);
    info!(
        session = %manager.current_session(),
        releases = manager.release_count(),
        tokens = manager.token_count(),
        "Simulation state ready"
    );

    let mut state = SimulationState::new(manager, config);

    // 5. Start the command console thread.
    let rx = spawn_console();
    println!("commands: release <emotion> [text...] | new | reset | status | quit");

    // 6. Run the frame loop.
    let tick_interval = Duration::from_millis(state.config.engine.tick_interval_ms);
    let mut queued: Vec<Command> = Vec::new();

    'frames: loop {
        loop {
            match rx.try_recv() {
                Ok(Instruction::Queue(command)) => {
                    if admits(&state.manager, &command) {
                        queued.push(command);
                    } else {
                        println!(
                            "cannot release into session {}: completed or at its limit \
                             (try 'new' or 'status')",
                            state.manager.current_session()
                        );
                    }
                }
                Ok(Instruction::Status) => print_status(&state),
                Ok(Instruction::Quit) | Err(mpsc::TryRecvError::Disconnected) => break 'frames,
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        run_tick(
            &mut state,
            std::mem::take(&mut queued),
            &StandAnchors,
            &storage,
            &mut rng,
        );

        std::thread::sleep(tick_interval);
    }

    // 7. Save and shut down.
    persistence::save(&state.manager, &storage).map_err(EngineError::from)?;
    info!(ticks = state.tick, "solace-engine shutdown complete");
    Ok(())
}

/// Load the simulation configuration from `solace-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// a missing file means defaults throughout.
fn load_config() -> Result<SolaceConfig, EngineError> {
    let config_path = Path::new("solace-config.yaml");
    if config_path.exists() {
        Ok(SolaceConfig::from_file(config_path)?)
    } else {
        info!("solace-config.yaml not found, using defaults");
        Ok(SolaceConfig::default())
    }
}

/// Spawn the stdin reader thread and return its instruction channel.
///
/// Parse errors are reported to the console immediately; blank lines are
/// ignored. End of input shuts the engine down.
fn spawn_console() -> mpsc::Receiver<Instruction> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match commands::parse(&line) {
                Ok(instruction) => {
                    if tx.send(instruction).is_err() {
                        break;
                    }
                }
                Err(ParseError::Empty) => {}
                Err(err) => println!("{err}"),
            }
        }
        let _ = tx.send(Instruction::Quit);
    });
    rx
}

/// Gate a queued command the way the original UI gates its release
/// control: a release is admitted only while the session can still
/// accept it with these texts. Other commands always pass; the manager
/// rejects them itself if need be.
fn admits(manager: &solace_core::SessionManager, command: &Command) -> bool {
    match command {
        Command::Release {
            label, description, ..
        } => manager.can_release(label, description),
        Command::NewSession | Command::ResetAll => true,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use solace_core::SessionManager;

    use super::*;

    fn make_manager() -> (SessionManager, SmallRng) {
        (
            SessionManager::new(SessionSettings::default()),
            SmallRng::seed_from_u64(17),
        )
    }

    fn release_command() -> Command {
        Command::Release {
            emotion_index: 0,
            label: "Happiness".to_owned(),
            description: "a good day".to_owned(),
        }
    }

    #[test]
    fn open_session_admits_a_release() {
        let (manager, _) = make_manager();
        assert!(admits(&manager, &release_command()));
    }

    #[test]
    fn completed_session_refuses_further_releases() {
        let (mut manager, mut rng) = make_manager();
        for index in 0..RELEASES_PER_SESSION {
            let _ = manager.release(index, "", "a note", &StandAnchors, &mut rng);
        }

        assert!(!admits(&manager, &release_command()));
        // Session-level commands still go through to the manager.
        assert!(admits(&manager, &Command::NewSession));
        assert!(admits(&manager, &Command::ResetAll));
    }

    #[test]
    fn blank_texts_are_refused_at_the_gate() {
        let (manager, _) = make_manager();
        let blank = Command::Release {
            emotion_index: 0,
            label: "Happiness".to_owned(),
            description: "   ".to_owned(),
        };
        assert!(!admits(&manager, &blank));
    }
}

/// Print a one-line session summary to the console.
fn print_status(state: &SimulationState) {
    let manager = &state.manager;
    println!(
        "session {} | releases {}/{} | {} | tokens alive {}",
        manager.current_session(),
        manager.release_count(),
        RELEASES_PER_SESSION,
        if manager.is_completed() {
            "completed"
        } else {
            "open"
        },
        manager.token_count(),
    );
}
