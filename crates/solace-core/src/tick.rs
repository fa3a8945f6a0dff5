//! The per-frame simulation cycle.
//!
//! Each tick runs five phases in a fixed order:
//!
//! 1. **Input** -- apply queued commands against the session manager.
//! 2. **Phase advance** -- step every token's drift/idle machine and
//!    deliver idle notifications back to the manager.
//! 3. **Formation** -- steer non-idling followers toward their leader.
//! 4. **Containers** -- trail each session container after its leader.
//! 5. **Persistence** -- save immediately after state-changing commands,
//!    otherwise on the autosave cadence. Save failures are logged and
//!    never stop the simulation.

use rand::Rng;
use tracing::{debug, warn};

use solace_types::{SessionId, TokenId};

use crate::anchor::AnchorProvider;
use crate::config::SolaceConfig;
use crate::persistence;
use crate::session::SessionManager;
use crate::storage::Storage;

/// A state-changing request queued for the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Release a token of the indexed emotion with a reflection text.
    Release {
        /// Integer index of the emotion kind.
        emotion_index: u32,
        /// The emotion label to stamp onto the token.
        label: String,
        /// The user's free-text reflection.
        description: String,
    },
    /// Begin the next session.
    NewSession,
    /// Discard all state and the saved document.
    ResetAll,
}

/// Everything the tick cycle reads and writes.
#[derive(Debug)]
pub struct SimulationState {
    /// Frames completed so far.
    pub tick: u64,
    /// Accumulated simulation time in seconds.
    pub time: f32,
    /// All session and token state.
    pub manager: SessionManager,
    /// Loaded configuration.
    pub config: SolaceConfig,
}

impl SimulationState {
    /// Wrap a manager and configuration into a fresh simulation at tick 0.
    pub const fn new(manager: SessionManager, config: SolaceConfig) -> Self {
        Self {
            tick: 0,
            time: 0.0,
            manager,
            config,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The frame number this summary describes.
    pub tick: u64,
    /// Commands applied successfully.
    pub commands_applied: u32,
    /// Commands rejected by the session rules.
    pub commands_rejected: u32,
    /// Tokens that settled into idle this frame.
    pub settled: u32,
    /// Followers steered toward their leader this frame.
    pub steered: u32,
    /// Whether a save was written this frame.
    pub saved: bool,
    /// Whether a save was attempted and failed this frame.
    pub save_failed: bool,
}

/// Run one frame of the simulation.
pub fn run_tick(
    state: &mut SimulationState,
    commands: Vec<Command>,
    anchors: &impl AnchorProvider,
    storage: &dyn Storage,
    rng: &mut impl Rng,
) -> TickSummary {
    state.tick += 1;
    let dt = state.config.frame_dt();
    let time = state.time;

    let mut summary = TickSummary {
        tick: state.tick,
        ..TickSummary::default()
    };

    let dirty = apply_commands(state, commands, anchors, storage, rng, &mut summary);
    advance_phases(state, time, dt, &mut summary);
    steer_formations(state, time, dt, &mut summary);
    track_containers(state, dt);

    let autosave_due = state.config.engine.autosave_interval_ticks > 0
        && state.tick % state.config.engine.autosave_interval_ticks == 0;
    if dirty || autosave_due {
        match persistence::save(&state.manager, storage) {
            Ok(()) => summary.saved = true,
            Err(err) => {
                warn!(tick = state.tick, error = %err, "save failed; continuing");
                summary.save_failed = true;
            }
        }
    }

    state.time += dt;
    summary
}

/// Apply queued commands; returns whether live state changed.
fn apply_commands(
    state: &mut SimulationState,
    commands: Vec<Command>,
    anchors: &impl AnchorProvider,
    storage: &dyn Storage,
    rng: &mut impl Rng,
    summary: &mut TickSummary,
) -> bool {
    let mut dirty = false;

    for command in commands {
        match command {
            Command::Release {
                emotion_index,
                label,
                description,
            } => match state
                .manager
                .release(emotion_index, &label, &description, anchors, rng)
            {
                Ok(id) => {
                    debug!(token = %id, "release applied");
                    summary.commands_applied += 1;
                    dirty = true;
                }
                Err(err) => {
                    warn!(error = %err, "release rejected");
                    summary.commands_rejected += 1;
                }
            },
            Command::NewSession => match state.manager.start_new_session() {
                Ok(session) => {
                    debug!(session = %session, "new session applied");
                    summary.commands_applied += 1;
                    dirty = true;
                }
                Err(err) => {
                    warn!(error = %err, "new session rejected");
                    summary.commands_rejected += 1;
                }
            },
            Command::ResetAll => {
                state.manager.reset();
                if let Err(err) = storage.delete() {
                    warn!(error = %err, "reset could not delete the saved document");
                }
                summary.commands_applied += 1;
                // Deletion is the persistence action for a reset.
                dirty = false;
            }
        }
    }

    dirty
}

/// Step every token's phase machine and deliver idle notifications.
fn advance_phases(state: &mut SimulationState, time: f32, dt: f32, summary: &mut TickSummary) {
    let mut settled: Vec<TokenId> = Vec::new();
    for token in state.manager.tokens.values_mut() {
        if token.advance(time, dt, &state.config.drift).is_some() {
            settled.push(token.id);
        }
    }

    summary.settled = u32::try_from(settled.len()).unwrap_or(u32::MAX);
    for id in settled {
        state.manager.on_token_idle(id);
    }
}

/// Steer every non-idling follower toward its session leader.
///
/// A follower's ring index is its position in the session's follower
/// list; idling followers are skipped but keep their index, so nobody
/// shuffles slots when a neighbor settles.
fn steer_formations(state: &mut SimulationState, time: f32, dt: f32, summary: &mut TickSummary) {
    let cfg = &state.config.follower;

    let mut moves: Vec<(TokenId, glam::Vec3)> = Vec::new();
    for (session, follower_ids) in &state.manager.followers {
        let Some(leader_pos) = state
            .manager
            .leaders
            .get(session)
            .and_then(|id| state.manager.tokens.get(id))
            .map(|leader| leader.position)
        else {
            continue;
        };

        for (index, id) in follower_ids.iter().enumerate() {
            let Some(slot) = state.manager.slots.get(id) else {
                continue;
            };
            if slot.idling {
                continue;
            }
            let Some(follower) = state.manager.tokens.get(id) else {
                continue;
            };

            let next = solace_sim::steer_follower(
                follower.position,
                leader_pos,
                slot.offset,
                index,
                time,
                dt,
                cfg,
            );
            moves.push((*id, next));
        }
    }

    summary.steered = u32::try_from(moves.len()).unwrap_or(u32::MAX);
    for (id, next) in moves {
        if let Some(token) = state.manager.tokens.get_mut(&id) {
            token.position = next;
        }
    }
}

/// Trail each session container after its leader.
fn track_containers(state: &mut SimulationState, dt: f32) {
    let smoothness = state.config.follower.follow_smoothness;

    let leader_positions: Vec<(SessionId, glam::Vec3)> = state
        .manager
        .leaders
        .iter()
        .filter_map(|(session, id)| {
            state
                .manager
                .tokens
                .get(id)
                .map(|leader| (session.clone(), leader.position))
        })
        .collect();

    for (session, leader_pos) in leader_positions {
        if let Some(container) = state.manager.containers.get_mut(&session) {
            container.position =
                solace_sim::track_container(container.position, leader_pos, smoothness, dt);
        }
    }
}
