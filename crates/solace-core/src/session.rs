//! Session bookkeeping and the release / new-session / reset operations.
//!
//! A session accepts up to [`RELEASES_PER_SESSION`] releases and is
//! marked completed when the limit is reached. The first token released
//! into a session becomes its leader; every later token becomes a
//! follower with a persistent chase offset and a formation slot. Each
//! session also owns a grouping container that trails the leader.
//!
//! All runtime relationships live in explicit maps keyed by identifier,
//! so a token's role and slot are looked up directly rather than derived
//! from list positions.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::Rng;
use tracing::{debug, info};

use solace_types::{ContainerId, EmotionKind, SessionId, TokenId};

use crate::anchor::AnchorProvider;
use crate::config::SolaceConfig;
use crate::token::Token;

/// Maximum releases a single session accepts.
pub const RELEASES_PER_SESSION: u32 = 3;

/// Why a release request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReleaseError {
    /// The current session has already reached its release limit.
    #[error("session is completed; start a new session to release again")]
    SessionCompleted,

    /// The emotion index does not name a known emotion kind.
    #[error("no emotion kind with index {index}")]
    InvalidEmotion {
        /// The rejected index.
        index: u32,
    },

    /// The release counter is at the limit without the completed flag.
    #[error("release limit of {RELEASES_PER_SESSION} reached")]
    LimitReached,
}

/// Why a session operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A new session cannot start while the current one is mid-flight.
    #[error("current session has {released} release(s) and is not completed")]
    SessionInProgress {
        /// Releases already made into the current session.
        released: u32,
    },
}

/// A follower's persistent steering state.
#[derive(Debug, Clone, Copy)]
pub struct FollowerSlot {
    /// Persistent chase offset relative to the leader.
    pub offset: Vec3,
    /// Whether this follower has settled and left the formation dance.
    pub idling: bool,
}

/// A live session container trailing its leader.
#[derive(Debug, Clone)]
pub struct ContainerState {
    /// Stable identity.
    pub id: ContainerId,
    /// The session this container groups.
    pub session_id: SessionId,
    /// Current world position.
    pub position: Vec3,
    /// Human-readable container label.
    pub label: String,
}

/// Tunables the manager needs per release.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Frames a new token's texts stay mutable.
    pub text_lock_ticks: u32,
    /// Vertical scale applied when drawing follower offsets.
    pub height_variation: f32,
}

impl SessionSettings {
    /// Derive settings from loaded configuration.
    pub const fn from_config(config: &SolaceConfig) -> Self {
        Self {
            text_lock_ticks: config.engine.text_lock_ticks,
            height_variation: config.follower.height_variation,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&SolaceConfig::default())
    }
}

/// Owner of all mutable session state: tokens, roles, slots, containers.
#[derive(Debug, Clone)]
pub struct SessionManager {
    pub(crate) current_session: SessionId,
    pub(crate) release_count: u32,
    pub(crate) completed: bool,
    /// Every live token, keyed by identity.
    pub(crate) tokens: BTreeMap<TokenId, Token>,
    /// Token identities in release order across all sessions.
    pub(crate) release_order: Vec<TokenId>,
    /// Each session's leader token.
    pub(crate) leaders: BTreeMap<SessionId, TokenId>,
    /// Each session's followers, in release order.
    pub(crate) followers: BTreeMap<SessionId, Vec<TokenId>>,
    /// Steering state per follower token.
    pub(crate) slots: BTreeMap<TokenId, FollowerSlot>,
    /// One container per session that has released at least one token.
    pub(crate) containers: BTreeMap<SessionId, ContainerState>,
    settings: SessionSettings,
}

impl SessionManager {
    /// Create an empty manager on the first session.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            current_session: SessionId::first(),
            release_count: 0,
            completed: false,
            tokens: BTreeMap::new(),
            release_order: Vec::new(),
            leaders: BTreeMap::new(),
            followers: BTreeMap::new(),
            slots: BTreeMap::new(),
            containers: BTreeMap::new(),
            settings,
        }
    }

    /// The session currently accepting releases.
    pub const fn current_session(&self) -> &SessionId {
        &self.current_session
    }

    /// Releases made into the current session so far.
    pub const fn release_count(&self) -> u32 {
        self.release_count
    }

    /// Whether the current session has reached its release limit.
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Total live tokens across all sessions.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Look up a live token.
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    /// Look up a live token mutably.
    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.get_mut(&id)
    }

    /// The leader token of a session, if it has one.
    pub fn leader_of(&self, session: &SessionId) -> Option<TokenId> {
        self.leaders.get(session).copied()
    }

    /// The followers of a session, in release order.
    pub fn followers_of(&self, session: &SessionId) -> &[TokenId] {
        self.followers.get(session).map_or(&[], Vec::as_slice)
    }

    /// The steering slot of a follower token.
    pub fn slot_of(&self, id: TokenId) -> Option<&FollowerSlot> {
        self.slots.get(&id)
    }

    /// The container of a session, if one exists.
    pub fn container_of(&self, session: &SessionId) -> Option<&ContainerState> {
        self.containers.get(session)
    }

    /// Whether a release with these texts would be accepted right now.
    ///
    /// True when the session is still open, the counter is below the
    /// limit, and both texts carry non-blank content. Front-ends use this
    /// to gate the release control before committing.
    pub fn can_release(&self, label: &str, description: &str) -> bool {
        !self.completed
            && self.release_count < RELEASES_PER_SESSION
            && !label.trim().is_empty()
            && !description.trim().is_empty()
    }

    /// Release a new token into the current session.
    ///
    /// The first token of a session becomes its leader; later tokens
    /// become followers with a freshly drawn chase offset. The emotion
    /// label is stamped onto the token at this moment; given blank, it
    /// falls back to the kind's display name.
    ///
    /// # Errors
    ///
    /// [`ReleaseError::SessionCompleted`] once the session holds its full
    /// complement, [`ReleaseError::InvalidEmotion`] for an unknown kind
    /// index, [`ReleaseError::LimitReached`] if the counter is at the
    /// limit without the completed flag. A rejected release changes no
    /// state at all.
    pub fn release(
        &mut self,
        emotion_index: u32,
        label: &str,
        description: &str,
        anchors: &impl AnchorProvider,
        rng: &mut impl Rng,
    ) -> Result<TokenId, ReleaseError> {
        if self.completed {
            return Err(ReleaseError::SessionCompleted);
        }
        let kind = EmotionKind::from_index(emotion_index)
            .ok_or(ReleaseError::InvalidEmotion { index: emotion_index })?;
        if self.release_count >= RELEASES_PER_SESSION {
            return Err(ReleaseError::LimitReached);
        }

        let label = if label.trim().is_empty() {
            kind.name()
        } else {
            label
        };
        let spawn = anchors.anchor_position(kind);
        let token = Token::new(
            kind,
            self.current_session.clone(),
            spawn,
            label,
            description,
            self.settings.text_lock_ticks,
            false,
            rng,
        );
        let id = token.id;

        self.attach(token, None, rng);

        self.release_count += 1;
        if self.release_count >= RELEASES_PER_SESSION {
            self.completed = true;
            info!(session = %self.current_session, "session completed");
        }

        info!(
            session = %self.current_session,
            emotion = kind.name(),
            count = self.release_count,
            "token released"
        );
        Ok(id)
    }

    /// Begin the next session.
    ///
    /// Only allowed when the current session is completed or still empty;
    /// tokens of earlier sessions stay alive and keep their formations.
    /// When the successor id revisits an existing session (non-numeric
    /// ids restart numbering at `"001"`), that id's leader and follower
    /// roles are cleared so the next release leads it afresh.
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionInProgress`] when the current session has
    /// releases but has not yet reached its limit.
    pub fn start_new_session(&mut self) -> Result<&SessionId, SessionError> {
        if !self.completed && self.release_count > 0 {
            return Err(SessionError::SessionInProgress {
                released: self.release_count,
            });
        }

        self.current_session = self.current_session.successor();
        self.release_count = 0;
        self.completed = false;

        // Id wraparound can revisit a session that restored tokens still
        // occupy; the new session must open with no roles assigned so its
        // first release becomes the leader.
        self.leaders.remove(&self.current_session);
        if let Some(ids) = self.followers.remove(&self.current_session) {
            for id in ids {
                self.slots.remove(&id);
            }
        }

        info!(session = %self.current_session, "new session started");
        Ok(&self.current_session)
    }

    /// Discard every token, container, and session record and return to
    /// the first session.
    pub fn reset(&mut self) {
        let dropped = self.tokens.len();
        self.current_session = SessionId::first();
        self.release_count = 0;
        self.completed = false;
        self.tokens.clear();
        self.release_order.clear();
        self.leaders.clear();
        self.followers.clear();
        self.slots.clear();
        self.containers.clear();
        info!(dropped_tokens = dropped, "simulation reset");
    }

    /// React to a token settling into idle.
    ///
    /// A settling leader brings its session's container into being (or
    /// re-snaps an existing one to the leader). A settling follower marks
    /// its own slot as idling; formation steering skips it from then on.
    pub fn on_token_idle(&mut self, id: TokenId) {
        let Some((session, position)) = self
            .tokens
            .get(&id)
            .map(|token| (token.session_id.clone(), token.position))
        else {
            return;
        };

        if self.leaders.get(&session) == Some(&id) {
            debug!(token = %id, session = %session, "leader settled into idle");
            self.ensure_container(&session, position);
        } else if let Some(slot) = self.slots.get_mut(&id) {
            slot.idling = true;
            debug!(token = %id, "follower settled into idle");
        }
    }

    /// Register a token under its session's leader/follower bookkeeping.
    ///
    /// `offset` overrides the freshly drawn chase offset (used when
    /// reconstructing followers from a save, where the offset is derived
    /// from stored positions instead).
    pub(crate) fn attach(&mut self, token: Token, offset: Option<Vec3>, rng: &mut impl Rng) {
        let id = token.id;
        let session = token.session_id.clone();
        self.release_order.push(id);

        if self.leaders.contains_key(&session) {
            let offset = offset
                .unwrap_or_else(|| solace_sim::follower_offset(rng, self.settings.height_variation));
            let idling = token.phase.is_idle();
            self.slots.insert(id, FollowerSlot { offset, idling });
            self.followers.entry(session).or_default().push(id);
        } else {
            self.leaders.insert(session, id);
        }

        self.tokens.insert(id, token);
    }

    /// Create a session's container at the leader position if it does
    /// not exist yet, or re-snap an existing one to that position.
    pub(crate) fn ensure_container(&mut self, session: &SessionId, leader_pos: Vec3) {
        if let Some(container) = self.containers.get_mut(session) {
            container.position = leader_pos;
            return;
        }
        info!(session = %session, "container created");
        let label = format!("Session {session}");
        self.containers.insert(
            session.clone(),
            ContainerState {
                id: ContainerId::new(),
                session_id: session.clone(),
                position: leader_pos,
                label,
            },
        );
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use crate::anchor::StandAnchors;

    use super::*;

    fn make_manager() -> (SessionManager, SmallRng) {
        (
            SessionManager::new(SessionSettings::default()),
            SmallRng::seed_from_u64(21),
        )
    }

    fn release(manager: &mut SessionManager, rng: &mut SmallRng, index: u32) -> Result<TokenId, ReleaseError> {
        manager.release(index, "", "a note", &StandAnchors, rng)
    }

    #[test]
    fn counter_tracks_releases_up_to_the_limit() {
        let (mut manager, mut rng) = make_manager();
        for expected in 1..=RELEASES_PER_SESSION {
            assert!(release(&mut manager, &mut rng, 0).is_ok());
            assert_eq!(manager.release_count(), expected);
        }
        assert!(manager.is_completed());
    }

    #[test]
    fn fourth_release_is_rejected_without_state_change() {
        let (mut manager, mut rng) = make_manager();
        for _ in 0..RELEASES_PER_SESSION {
            let _ = release(&mut manager, &mut rng, 1);
        }

        let before_tokens = manager.token_count();
        let result = release(&mut manager, &mut rng, 1);
        assert_eq!(result, Err(ReleaseError::SessionCompleted));
        assert_eq!(manager.token_count(), before_tokens);
        assert_eq!(manager.release_count(), RELEASES_PER_SESSION);
    }

    #[test]
    fn unknown_emotion_index_is_rejected() {
        let (mut manager, mut rng) = make_manager();
        let result = release(&mut manager, &mut rng, 99);
        assert_eq!(result, Err(ReleaseError::InvalidEmotion { index: 99 }));
        assert_eq!(manager.token_count(), 0);
    }

    #[test]
    fn first_token_leads_and_later_tokens_follow() {
        let (mut manager, mut rng) = make_manager();
        let first = release(&mut manager, &mut rng, 0).ok();
        let second = release(&mut manager, &mut rng, 2).ok();
        let third = release(&mut manager, &mut rng, 4).ok();

        let session = manager.current_session().clone();
        assert_eq!(manager.leader_of(&session), first);
        let followers = manager.followers_of(&session);
        assert_eq!(followers.len(), 2);
        assert_eq!(followers.first().copied(), second);
        assert_eq!(followers.get(1).copied(), third);

        // The leader has no steering slot; followers each have one.
        assert!(first.and_then(|id| manager.slot_of(id)).is_none());
        assert!(second.and_then(|id| manager.slot_of(id)).is_some());
    }

    #[test]
    fn follower_offsets_are_unit_length() {
        let (mut manager, mut rng) = make_manager();
        let _ = release(&mut manager, &mut rng, 0);
        let follower = release(&mut manager, &mut rng, 1).ok();

        let offset = follower
            .and_then(|id| manager.slot_of(id))
            .map(|slot| slot.offset)
            .unwrap_or_default();
        assert!((offset.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn container_appears_when_the_leader_settles() {
        let (mut manager, mut rng) = make_manager();
        let leader = release(&mut manager, &mut rng, 3).unwrap_or_default();
        assert!(manager.container_of(&SessionId::first()).is_none());

        if let Some(token) = manager.token_mut(leader) {
            let _ = token.phase.force_idle();
        }
        manager.on_token_idle(leader);

        let container = manager.container_of(&SessionId::first());
        assert!(container.is_some());
        assert_eq!(container.map(|c| c.label.as_str()), Some("Session 001"));

        // A second idle notification re-snaps rather than duplicates.
        let first_id = container.map(|c| c.id);
        manager.on_token_idle(leader);
        assert_eq!(
            manager.container_of(&SessionId::first()).map(|c| c.id),
            first_id
        );
    }

    #[test]
    fn can_release_requires_open_session_and_texts() {
        let (mut manager, mut rng) = make_manager();
        assert!(manager.can_release("Worry", "circling"));
        assert!(!manager.can_release("", "circling"));
        assert!(!manager.can_release("Worry", "   "));

        for index in 0..RELEASES_PER_SESSION {
            let _ = release(&mut manager, &mut rng, index);
        }
        assert!(!manager.can_release("Worry", "circling"));
    }

    #[test]
    fn blank_label_falls_back_to_the_kind_name() {
        let (mut manager, mut rng) = make_manager();
        let id = manager
            .release(1, "  ", "a heavy day", &StandAnchors, &mut rng)
            .unwrap_or_default();
        assert_eq!(
            manager.token(id).map(|t| t.label.as_str()),
            Some("Sadness")
        );

        let labeled = manager
            .release(1, "Old grief", "a heavy day", &StandAnchors, &mut rng)
            .unwrap_or_default();
        assert_eq!(
            manager.token(labeled).map(|t| t.label.as_str()),
            Some("Old grief")
        );
    }

    #[test]
    fn new_session_requires_completion_or_emptiness() {
        let (mut manager, mut rng) = make_manager();

        // Empty session: allowed.
        assert!(manager.start_new_session().is_ok());
        assert_eq!(manager.current_session().as_str(), "002");

        // Mid-flight: rejected.
        let _ = release(&mut manager, &mut rng, 0);
        assert_eq!(
            manager.start_new_session().err(),
            Some(SessionError::SessionInProgress { released: 1 })
        );

        // Completed: allowed, counter and flag reset.
        let _ = release(&mut manager, &mut rng, 1);
        let _ = release(&mut manager, &mut rng, 2);
        assert!(manager.start_new_session().is_ok());
        assert_eq!(manager.current_session().as_str(), "003");
        assert_eq!(manager.release_count(), 0);
        assert!(!manager.is_completed());
    }

    #[test]
    fn earlier_sessions_survive_a_new_session() {
        let (mut manager, mut rng) = make_manager();
        for index in 0..RELEASES_PER_SESSION {
            let _ = release(&mut manager, &mut rng, index);
        }
        let old_session = manager.current_session().clone();
        let _ = manager.start_new_session();
        let _ = release(&mut manager, &mut rng, 0);

        assert_eq!(manager.token_count(), 4);
        assert!(manager.leader_of(&old_session).is_some());
        assert_eq!(manager.followers_of(&old_session).len(), 2);
    }

    #[test]
    fn reset_drops_everything_and_restarts_numbering() {
        let (mut manager, mut rng) = make_manager();
        for index in 0..RELEASES_PER_SESSION {
            let _ = release(&mut manager, &mut rng, index);
        }
        let _ = manager.start_new_session();
        let _ = release(&mut manager, &mut rng, 0);

        manager.reset();
        assert_eq!(manager.current_session().as_str(), "001");
        assert_eq!(manager.release_count(), 0);
        assert!(!manager.is_completed());
        assert_eq!(manager.token_count(), 0);
        assert!(manager.container_of(&SessionId::first()).is_none());
    }

    #[test]
    fn idle_notification_marks_the_follower_slot() {
        let (mut manager, mut rng) = make_manager();
        let _ = release(&mut manager, &mut rng, 0);
        let follower = release(&mut manager, &mut rng, 1).ok();

        let id = follower.unwrap_or_default();
        assert_eq!(manager.slot_of(id).map(|s| s.idling), Some(false));
        manager.on_token_idle(id);
        assert_eq!(manager.slot_of(id).map(|s| s.idling), Some(true));

        // Idling a leader is a harmless no-op.
        let leader = manager.leader_of(&manager.current_session().clone());
        if let Some(leader) = leader {
            manager.on_token_idle(leader);
            assert!(manager.slot_of(leader).is_none());
        }
    }
}
