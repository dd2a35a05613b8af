use crate::session::{Revision, Session};
use lottie_data::model::LottieJson;

/// What the player is asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerSource {
    /// In-memory document. Nodes are shared copy-on-write with the session, so nothing
    /// the player does to its copy can reach the editable document.
    Document(LottieJson),
    /// Opaque locator (URL or file name) of a packaged `.lottie` bundle.
    Packaged(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInput {
    pub source: PlayerSource,
    /// Changes whenever the session's content changes; a new key means a new document.
    pub key: Revision,
}

/// Events reported back by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Ready,
    Error,
}

/// The playback component the session feeds.
pub trait Player {
    /// Drops any previous state and starts over with `input`.
    fn reinitialize(&mut self, input: PlayerInput);

    /// Called when the session no longer has anything to play.
    fn clear(&mut self) {}
}

/// Keeps a [`Player`] in step with a [`Session`], reinitializing only on new revisions.
pub struct PlayerBinding<P: Player> {
    player: P,
    last: Option<Revision>,
}

impl<P: Player> PlayerBinding<P> {
    pub fn new(player: P) -> Self {
        Self { player, last: None }
    }

    /// Pushes the session's current content to the player if its revision changed.
    ///
    /// Returns `true` when the player was reinitialized or cleared.
    pub fn sync(&mut self, session: &Session) -> bool {
        let revision = session.revision();
        if self.last == Some(revision) {
            return false;
        }
        self.last = Some(revision);
        match session.player_input() {
            Some(input) => self.player.reinitialize(input),
            None => self.player.clear(),
        }
        true
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn into_inner(self) -> P {
        self.player
    }
}
