//! Breadcrumb trail used by back navigation.

use crate::nav::panel::PanelId;

/// Immutable stack of panels to return to.
///
/// Every mutation returns a **new** `Breadcrumbs`, following the
/// project-wide immutability convention. The top of the stack is the panel
/// the next "back" will show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumbs {
    stack: Vec<PanelId>,
}

impl Breadcrumbs {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `panel` onto the trail. Returns a new `Breadcrumbs`.
    pub fn push(&self, panel: PanelId) -> Self {
        let mut stack = self.stack.clone();
        stack.push(panel);
        Self { stack }
    }

    /// Pops the top entry. Returns the new trail and the popped panel,
    /// or `None` if the trail is empty.
    pub fn pop(&self) -> Option<(Self, PanelId)> {
        let mut stack = self.stack.clone();
        let panel = stack.pop()?;
        Some((Self { stack }, panel))
    }

    /// Drops entries equal to `current` from the top of the trail.
    ///
    /// Keeps the top from ever naming the panel that is already visible.
    pub fn trimmed_above(&self, current: PanelId) -> Self {
        let mut stack = self.stack.clone();
        while stack.last() == Some(&current) {
            stack.pop();
        }
        Self { stack }
    }

    /// The panel the next "back" returns to.
    pub fn top(&self) -> Option<PanelId> {
        self.stack.last().copied()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Entries from bottom (oldest) to top.
    pub fn as_slice(&self) -> &[PanelId] {
        &self.stack
    }
}
