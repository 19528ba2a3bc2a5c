// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directional lock that breaks editor ↔ scene feedback loops

use std::time::{Duration, Instant};

/// Direction of a synchronization update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncDirection {
    SceneToEditor,
    EditorToScene,
}

impl SyncDirection {
    pub fn opposite(self) -> Self {
        match self {
            SyncDirection::SceneToEditor => SyncDirection::EditorToScene,
            SyncDirection::EditorToScene => SyncDirection::SceneToEditor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockState {
    Unlocked,
    Locked {
        direction: SyncDirection,
        expires_at: Instant,
    },
}

/// Lock held by one sync direction until a timeout passes
///
/// The lock is not released when the reactive update returns: the other
/// surface may echo the change a frame or two later, and that echo must still
/// be recognized.
#[derive(Debug, Clone)]
pub struct SyncLock {
    state: LockState,
    timeout: Duration,
}

impl SyncLock {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: LockState::Unlocked,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Direction currently holding the lock
    pub fn holder(&self, now: Instant) -> Option<SyncDirection> {
        match self.state {
            LockState::Locked {
                direction,
                expires_at,
            } if now < expires_at => Some(direction),
            _ => None,
        }
    }

    /// True when the opposite direction holds the lock
    pub fn is_blocked(&self, direction: SyncDirection, now: Instant) -> bool {
        self.holder(now) == Some(direction.opposite())
    }

    /// Take or refresh the lock for `direction`; fails while the other direction holds it
    pub fn try_acquire(&mut self, direction: SyncDirection, now: Instant) -> bool {
        if self.is_blocked(direction, now) {
            tracing::debug!(?direction, "sync lock held by the other direction");
            return false;
        }
        self.state = LockState::Locked {
            direction,
            expires_at: now + self.timeout,
        };
        tracing::debug!(?direction, "sync lock acquired");
        true
    }

    /// Drop an expired lock
    pub fn expire(&mut self, now: Instant) {
        if let LockState::Locked { expires_at, .. } = self.state {
            if now >= expires_at {
                self.state = LockState::Unlocked;
            }
        }
    }

    pub fn release(&mut self) {
        self.state = LockState::Unlocked;
    }
}

impl Default for SyncLock {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}
