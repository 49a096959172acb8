//! Scoped make/unmake.

use std::ops::{Deref, DerefMut};

use crate::position::Position;

/// A move applied to a [`Position`] for the lifetime of the guard.
///
/// Created by [`Position::play`] or [`Position::play_null`]. Dereferences to
/// the position after the move; dropping the guard unmakes the move, so the
/// position is restored on every exit path, including early returns through
/// `?` and unwinding panics.
pub struct MoveGuard<'a> {
    position: &'a mut Position,
}

impl<'a> MoveGuard<'a> {
    /// Wrap a position whose undo stack top is the move being guarded.
    pub(crate) fn new(position: &'a mut Position) -> Self {
        Self { position }
    }
}

impl Deref for MoveGuard<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        let undone = self.position.unmake_move();
        debug_assert!(undone.is_ok(), "guarded move missing from undo stack");
    }
}
