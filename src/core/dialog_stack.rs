//! Dialog stack - LIFO bookkeeping for modal dialogs.
//!
//! Only the top dialog is visible. Opening hides the current top; closing pops it and
//! reveals the one underneath. Close operations return the configured transition delay
//! so the caller can let the exit animation finish before tearing the dialog down.

use std::time::Duration;
use tracing::debug;

/// Default exit transition length.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(200);

/// One dialog on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogEntry<K, P> {
    /// Stack-unique handle
    pub id: u64,
    /// Which dialog to render
    pub kind: K,
    /// Data the dialog renders
    pub props: P,
    /// Whether the dialog is currently shown
    pub visible: bool,
}

/// Dialogs removed by a close, plus how long their exit transition lasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed<K, P> {
    /// Removed dialogs, topmost first
    pub dialogs: Vec<DialogEntry<K, P>>,
    /// Delay to await before discarding them
    pub delay: Duration,
}

/// Stack of open dialogs.
#[derive(Debug, Clone)]
pub struct DialogStack<K, P> {
    entries: Vec<DialogEntry<K, P>>,
    next_id: u64,
    transition: Duration,
}

impl<K, P> Default for DialogStack<K, P> {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION)
    }
}

impl<K, P> DialogStack<K, P> {
    /// Creates an empty stack with the given exit transition.
    #[must_use]
    pub const fn new(transition: Duration) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            transition,
        }
    }

    /// Configured exit transition.
    #[must_use]
    pub const fn transition_delay(&self) -> Duration {
        self.transition
    }

    /// Open dialogs, bottom first.
    #[must_use]
    pub fn entries(&self) -> &[DialogEntry<K, P>] {
        &self.entries
    }

    /// The visible dialog, if any.
    #[must_use]
    pub fn top(&self) -> Option<&DialogEntry<K, P>> {
        self.entries.last()
    }

    /// Number of open dialogs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no dialog is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: std::fmt::Debug, P> DialogStack<K, P> {
    fn entry(&mut self, kind: K, props: P, visible: bool) -> DialogEntry<K, P> {
        self.next_id += 1;
        DialogEntry {
            id: self.next_id,
            kind,
            props,
            visible,
        }
    }

    /// Pushes a dialog and hides the previous top. Returns its handle.
    pub fn open(&mut self, kind: K, props: P) -> u64 {
        debug!("Opening dialog {:?}", kind);
        if let Some(top) = self.entries.last_mut() {
            top.visible = false;
        }
        let entry = self.entry(kind, props, true);
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Places a hidden dialog directly under the top one, so closing the top reveals it.
    ///
    /// On an empty stack this is the same as [`DialogStack::open`].
    pub fn insert_behind_current(&mut self, kind: K, props: P) -> u64 {
        if self.entries.is_empty() {
            return self.open(kind, props);
        }
        debug!("Queueing dialog {:?} behind the current one", kind);
        let entry = self.entry(kind, props, false);
        let id = entry.id;
        let index = self.entries.len() - 1;
        self.entries.insert(index, entry);
        id
    }

    /// Pops the top dialog and reveals the new top.
    pub fn close(&mut self) -> Option<Closed<K, P>> {
        let closed = self.close_n(1);
        (!closed.dialogs.is_empty()).then_some(closed)
    }

    /// Pops up to `count` dialogs and reveals the new top.
    pub fn close_n(&mut self, count: usize) -> Closed<K, P> {
        let keep = self.entries.len().saturating_sub(count);
        let mut dialogs = self.entries.split_off(keep);
        dialogs.reverse();
        for dialog in &mut dialogs {
            dialog.visible = false;
        }
        if let Some(top) = self.entries.last_mut() {
            top.visible = true;
        }
        debug!("Closed {} dialogs, {} left", dialogs.len(), self.entries.len());
        Closed {
            dialogs,
            delay: self.transition,
        }
    }
}
