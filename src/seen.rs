//! Tracking of postings that were already reported.
//!
//! The driver asks a [`SeenStore`] about every extracted posting before
//! queueing it for the alert. The default store remembers nothing, so every
//! posting found is reported. [`MemoryStore`] drops repeats within one run.
//! A store that survives between runs would plug in here as well.

use std::collections::HashSet;

/// Remembers posting uids.
pub trait SeenStore {
    /// Whether `uid` was marked before.
    fn has_seen(&self, uid: &str) -> bool;
    /// Remember `uid`.
    fn mark_seen(&mut self, uid: &str);
}

/// Never reports anything as seen.
#[derive(Debug, Default)]
pub struct ForgetfulStore;

impl SeenStore for ForgetfulStore {
    fn has_seen(&self, _uid: &str) -> bool {
        false
    }

    fn mark_seen(&mut self, _uid: &str) {}
}

/// Remembers uids for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    uids: HashSet<String>,
}

impl SeenStore for MemoryStore {
    fn has_seen(&self, uid: &str) -> bool {
        self.uids.contains(uid)
    }

    fn mark_seen(&mut self, uid: &str) {
        self.uids.insert(uid.to_string());
    }
}
