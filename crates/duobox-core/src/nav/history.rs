//! Per-panel back/forward history.

use crate::archive::RemotePath;

/// Maximum number of paths kept on each stack.
const MAX_DEPTH: usize = 100;

/// Immutable navigation history with back/forward stacks.
///
/// Every mutation returns a new `History`. Pushing a path clears the
/// forward stack, like a web browser. Leaving a path and coming back to it
/// does not record it twice in a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    back: Vec<RemotePath>,
    forward: Vec<RemotePath>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `left` as the path navigated away from.
    pub fn push(&self, left: RemotePath) -> Self {
        let mut back = self.back.clone();
        if back.last() != Some(&left) {
            back.push(left);
        }
        if back.len() > MAX_DEPTH {
            back.remove(0);
        }
        Self {
            back,
            forward: Vec::new(),
        }
    }

    /// Steps back from `current`.
    ///
    /// Returns the new history and the path to show, or `None` when there
    /// is nothing to go back to.
    pub fn go_back(&self, current: &RemotePath) -> Option<(Self, RemotePath)> {
        let mut back = self.back.clone();
        let target = back.pop()?;
        let mut forward = self.forward.clone();
        forward.push(current.clone());
        Some((Self { back, forward }, target))
    }

    /// Steps forward from `current`, undoing a [`go_back`](Self::go_back).
    pub fn go_forward(&self, current: &RemotePath) -> Option<(Self, RemotePath)> {
        let mut forward = self.forward.clone();
        let target = forward.pop()?;
        let mut back = self.back.clone();
        back.push(current.clone());
        Some((Self { back, forward }, target))
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }
}
