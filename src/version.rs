//! Map a conversation's assistant turns to navigable artifact versions.

use serde::Serialize;

/// Which version the caller is displaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// The in-flight streaming turn.
    Live,
    /// A persisted turn, by id.
    Turn(&'a str),
}

/// A persisted assistant turn.
pub trait Turn {
    /// Stable identifier used to find the turn in the ordered list.
    fn turn_id(&self) -> &str;
}

impl<T: Turn + ?Sized> Turn for &T {
    fn turn_id(&self) -> &str {
        return (**self).turn_id();
    }
}

/// A navigation target.
#[derive(Debug, PartialEq, Eq)]
pub enum Version<'a, T> {
    /// The in-flight streaming turn.
    Live,
    /// A persisted turn.
    Turn(&'a T),
}

/// Navigation state over a conversation's versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionCursor {
    /// Zero-based index of the displayed version.
    pub current_index: usize,
    /// True when the newest slot is an in-flight stream.
    pub live: bool,
    /// Persisted turns plus the in-flight slot, if any.
    pub total_versions: usize,
}

impl VersionCursor {
    /// Whether a version before the current one exists.
    pub const fn has_previous(&self) -> bool {
        return self.total_versions > 0 && self.current_index > 0;
    }

    /// Whether a version after the current one exists.
    pub const fn has_next(&self) -> bool {
        return self.current_index.saturating_add(1) < self.total_versions;
    }

    /// Whether the displayed version is the in-flight stream.
    pub const fn is_live(&self) -> bool {
        return self.live && self.has_current() && !self.has_next();
    }

    /// `Version X of Y`, one-based.
    pub fn label(&self) -> String {
        if self.total_versions == 0 {
            return "No versions".to_string();
        }
        return format!("Version {} of {}", self.current_index.saturating_add(1), self.total_versions);
    }

    /// The version after the current one: a persisted turn, or the live slot.
    pub fn next<'a, T>(&self, turns: &'a [T]) -> Option<Version<'a, T>> {
        if !self.has_next() {
            return None;
        }
        let index = self.current_index.saturating_add(1);
        if self.live && index == self.total_versions.saturating_sub(1) {
            return Some(Version::Live);
        }
        return turns.get(index).map(Version::Turn);
    }

    /// The persisted turn before the current one.
    pub fn previous<'a, T>(&self, turns: &'a [T]) -> Option<Version<'a, T>> {
        if !self.has_previous() {
            return None;
        }
        return turns.get(self.current_index.saturating_sub(1)).map(Version::Turn);
    }

    /// Whether the cursor points at any version at all.
    const fn has_current(&self) -> bool {
        return self.total_versions > 0;
    }
}

/// Compute the cursor for `selection` over the ordered assistant `turns`.
///
/// While `streaming`, the in-flight turn adds one version after every persisted turn.
/// Selecting `Live` implies streaming. A turn id that is not found (a stale reference)
/// falls back to the newest version instead of failing.
pub fn locate<T: Turn>(turns: &[T], selection: Selection<'_>, streaming: bool) -> VersionCursor {
    let live = streaming || selection == Selection::Live;
    let total_versions = turns.len().saturating_add(usize::from(live));
    let last = total_versions.saturating_sub(1);

    let current_index = match selection {
        Selection::Live => last,
        Selection::Turn(id) => turns.iter().position(|t| return t.turn_id() == id).unwrap_or_else(|| {
            log::debug!("turn `{id}` not found among {} turns, showing newest", turns.len());
            return last;
        }),
    };

    return VersionCursor { current_index, live, total_versions };
}
