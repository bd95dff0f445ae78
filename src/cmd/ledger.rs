/*!
Ledger resource.

Calculation history shared by the arithmetic commands (writers) and
`history` (reader). Registered once as a dispatcher resource and injected into
each command's constructor; lives as long as the dispatcher, so the history
accumulates across lines in `--repl` mode.
*/

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub command: String,
    pub expression: String,
    pub result: f64,
}

#[derive(Debug, Default)]
pub struct Ledger {
    entries: Mutex<Vec<Entry>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking writer cannot leave a half-written Vec behind, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, command: &str, expression: impl Into<String>, result: f64) {
        let entry = Entry {
            command: command.to_string(),
            expression: expression.into(),
            result,
        };
        tracing::debug!(command, expression = %entry.expression, result, "ledger entry");
        self.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.lock().clone()
    }

    /// Drop every entry; returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
