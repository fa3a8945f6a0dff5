//! Snapshot and restore between live state and the flat save record.
//!
//! Saving flattens the manager into a [`SaveData`] document; loading
//! replays the release rules over that document: the first record of each
//! session becomes the leader, later records become followers whose chase
//! offsets are rederived from the stored positions, and tokens of
//! non-current sessions skip drifting entirely. An unreadable document is
//! treated exactly like a missing one.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::Rng;
use tracing::{debug, info, warn};

use solace_types::{ContainerId, ContainerRecord, EmotionKind, EmotionRecord, SaveData, SessionId};

use crate::session::{ContainerState, RELEASES_PER_SESSION, SessionManager, SessionSettings};
use crate::storage::{Storage, StorageError};
use crate::token::{TextLock, Token};

/// Errors raised while saving or loading the simulation.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The saved document is not valid JSON for the expected shape.
    #[error("save document is malformed: {source}")]
    Malformed {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionManager {
    /// Flatten the live state into a persistable document.
    ///
    /// Tokens are written in release order; containers in session order.
    /// No runtime relationship is persisted, only what is needed to
    /// replay it on load.
    pub fn snapshot(&self) -> SaveData {
        let emotions = self
            .release_order
            .iter()
            .filter_map(|id| self.tokens.get(id))
            .map(|token| EmotionRecord {
                position: token.position,
                name: token.display_name(),
                session_id: token.session_id.clone(),
                label: token.label.clone(),
                description: token.description.clone(),
                emotion_type_index: token.kind.index(),
            })
            .collect();

        let containers = self
            .containers
            .values()
            .map(|container| ContainerRecord {
                session_id: container.session_id.clone(),
                position: container.position,
            })
            .collect();

        SaveData {
            session_id: self.current_session.clone(),
            release_counter: self.release_count,
            is_session_completed: self.completed,
            emotions,
            containers,
        }
    }

    /// Rebuild a manager from a persisted document.
    ///
    /// The completion flag is rederived when the stored counter already
    /// sits at the limit, and records with an unknown emotion index are
    /// skipped rather than failing the whole load. Restored tokens have
    /// their texts frozen; the edit window exists only at release time.
    pub fn restore(data: &SaveData, settings: SessionSettings, rng: &mut impl Rng) -> Self {
        let mut manager = Self::new(settings);
        manager.current_session = data.session_id.clone();
        manager.release_count = data.release_counter.min(RELEASES_PER_SESSION);
        manager.completed =
            data.is_session_completed || manager.release_count >= RELEASES_PER_SESSION;

        let mut leader_positions: BTreeMap<SessionId, Vec3> = BTreeMap::new();
        for record in &data.emotions {
            let Some(kind) = EmotionKind::from_index(record.emotion_type_index) else {
                warn!(
                    index = record.emotion_type_index,
                    "skipping saved token with unknown emotion index"
                );
                continue;
            };

            // Older saves may lack an explicit label.
            let label = if record.label.is_empty() {
                kind.name()
            } else {
                record.label.as_str()
            };
            let released_before = record.session_id != data.session_id;

            let mut token = Token::new(
                kind,
                record.session_id.clone(),
                record.position,
                label,
                &record.description,
                1,
                released_before,
                rng,
            );
            token.text_lock = TextLock::Closed;

            // The first surviving record of each session leads it; later
            // records follow with offsets rederived from geometry.
            let offset = leader_positions
                .get(&record.session_id)
                .map(|leader| (record.position - *leader).normalize_or(Vec3::Y));
            if offset.is_none() {
                leader_positions.insert(record.session_id.clone(), record.position);
            }
            manager.attach(token, offset, rng);
        }

        for record in &data.containers {
            let label = format!("Session {}", record.session_id);
            manager.containers.insert(
                record.session_id.clone(),
                ContainerState {
                    id: ContainerId::new(),
                    session_id: record.session_id.clone(),
                    position: record.position,
                    label,
                },
            );
        }

        info!(
            session = %manager.current_session,
            tokens = manager.tokens.len(),
            containers = manager.containers.len(),
            "simulation restored from save"
        );
        manager
    }
}

/// Serialize the manager and overwrite the saved document.
///
/// # Errors
///
/// Returns [`PersistError::Storage`] if the backend rejects the write.
/// Serialization of a well-formed manager does not fail.
pub fn save(manager: &SessionManager, storage: &dyn Storage) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(&manager.snapshot())?;
    storage.write_all(&json)?;
    debug!(bytes = json.len(), "simulation saved");
    Ok(())
}

/// Load the saved simulation, falling back to a fresh one.
///
/// A missing document means a first run; an unreadable or malformed
/// document is logged and treated the same way, so a corrupt save never
/// wedges startup.
pub fn load_or_default(
    storage: &dyn Storage,
    settings: SessionSettings,
    rng: &mut impl Rng,
) -> SessionManager {
    if !storage.exists() {
        info!("no saved simulation found; starting fresh");
        return SessionManager::new(settings);
    }

    match try_load(storage, settings, rng) {
        Ok(manager) => manager,
        Err(err) => {
            warn!(error = %err, "saved simulation unreadable; starting fresh");
            SessionManager::new(settings)
        }
    }
}

fn try_load(
    storage: &dyn Storage,
    settings: SessionSettings,
    rng: &mut impl Rng,
) -> Result<SessionManager, PersistError> {
    let contents = storage.read_all()?;
    let data: SaveData = serde_json::from_str(&contents)?;
    Ok(SessionManager::restore(&data, settings, rng))
}
