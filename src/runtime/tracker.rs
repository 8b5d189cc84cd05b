//! Per-instance recomposition tracking
//!
//! Each instrumented call site owns a [`TrackerInstance`]. Every re-execution
//! hands it the freshly captured arguments; the instance diffs them against the
//! previous snapshot and decides whether the re-execution is worth logging.

use std::fmt;
use std::sync::Arc;

use super::arguments::Arguments;
use super::sink::{LogSink, LOGGER_TAG};
use super::value::{self, CapturedValue};

/// Lifecycle phase of a tracker instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the host committed the first render
    Initial,
    Steady,
}

/// One argument whose value differs from the previous snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentChange {
    pub name: &'static str,
    pub previous: Option<CapturedValue>,
    pub current: Option<CapturedValue>,
    pub skipped: bool,
}

impl ArgumentChange {
    fn is_reactive(&self) -> bool {
        self.current
            .as_ref()
            .or(self.previous.as_ref())
            .map(CapturedValue::is_reactive)
            .unwrap_or(false)
    }

    /// `name: previous (hash) → current (hash)`, with a `(State) ` marker for reactive values
    pub fn describe(&self) -> String {
        let previous = self.previous.as_ref();
        let current = self.current.as_ref();
        format!(
            "{}: {}{} ({}) → {} ({})",
            self.name,
            if self.is_reactive() { "(State) " } else { "" },
            value::render(previous),
            value::hash(previous),
            value::render(current),
            value::hash(current)
        )
    }
}

impl fmt::Display for ArgumentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Classification of one re-execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recomposition {
    /// Tracking is switched off
    Disabled,
    /// First render, not yet committed; nothing is logged
    Initial,
    /// Tracked arguments changed; `count` is the logged-change counter after this one
    Changed {
        count: u64,
        changes: Vec<ArgumentChange>,
    },
    /// No argument changed, so the cause is state the arguments do not reflect
    Unreflected { count: u64 },
    /// Only skipped arguments changed
    Suppressed { changes: Vec<ArgumentChange> },
    /// The instance was already running
    Reentered,
}

/// Result of comparing the current snapshot with the previous one
#[derive(Debug, Default)]
struct Diff {
    has_any_change: bool,
    has_significant_change: bool,
    changes: Vec<ArgumentChange>,
}

/// Double-buffered snapshots plus the counters of one instance
#[derive(Debug, Clone)]
pub struct TrackerState {
    buffers: [Arguments; 2],
    current: usize,
    phase: Phase,
    entered: bool,
    logged_changes: u64,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerState {
    pub fn new() -> Self {
        Self {
            buffers: [Arguments::new(), Arguments::new()],
            current: 0,
            phase: Phase::Initial,
            entered: false,
            logged_changes: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn logged_changes(&self) -> u64 {
        self.logged_changes
    }

    /// Most recently stored snapshot
    pub fn last_arguments(&self) -> &Arguments {
        &self.buffers[self.current]
    }

    /// Flip buffers, store `arguments` and diff against the previous snapshot
    fn advance(&mut self, arguments: &Arguments, skipped: &[&str]) -> Diff {
        let previous_index = self.current;
        self.current = (self.current + 1) % 2;
        self.buffers[self.current].copy_from(arguments);

        let previous = &self.buffers[previous_index];
        let current = &self.buffers[self.current];
        let mut diff = Diff::default();
        for (name, value) in current.iter() {
            let Some(old) = previous.entry(name) else {
                continue;
            };
            if value::same(old, value) {
                continue;
            }
            diff.has_any_change = true;
            let is_skipped = skipped.contains(&name);
            if !is_skipped {
                diff.has_significant_change = true;
            }
            diff.changes.push(ArgumentChange {
                name,
                previous: old.cloned(),
                current: value.cloned(),
                skipped: is_skipped,
            });
        }
        diff
    }
}

/// Tracker bound to one call-site instance; logs its exit when dropped
pub struct TrackerInstance {
    name: String,
    state: TrackerState,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for TrackerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerInstance")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish()
    }
}

impl TrackerInstance {
    pub fn new(name: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            name: name.into(),
            state: TrackerState::new(),
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Record one re-execution. Stays in [`Phase::Initial`] until [`commit`](Self::commit).
    pub fn recompose(&mut self, arguments: &Arguments, skipped: &[&str]) -> Recomposition {
        if !self.state.entered {
            self.state.entered = true;
            self.sink.debug(
                LOGGER_TAG,
                &format!(
                    "{} enters composition, params: ({})",
                    self.name,
                    arguments.render()
                ),
            );
        }

        let diff = self.state.advance(arguments, skipped);
        if self.state.phase == Phase::Initial {
            return Recomposition::Initial;
        }

        if diff.has_significant_change {
            self.state.logged_changes += 1;
            let count = self.state.logged_changes;
            let changes: Vec<ArgumentChange> =
                diff.changes.into_iter().filter(|c| !c.skipped).collect();
            let lines: String = changes
                .iter()
                .map(|change| format!("\n••• {}", change.describe()))
                .collect();
            self.sink
                .debug(LOGGER_TAG, &format!("{} recomposed {} times", self.name, count));
            self.sink.debug(LOGGER_TAG, &format!("Changes:{}", lines));
            Recomposition::Changed { count, changes }
        } else if !diff.has_any_change {
            self.state.logged_changes += 1;
            let count = self.state.logged_changes;
            self.sink.debug(
                LOGGER_TAG,
                &format!(
                    "{} recomposed {} times due to state not reflected in tracked parameters",
                    self.name, count
                ),
            );
            Recomposition::Unreflected { count }
        } else {
            log::trace!("{}: only skipped arguments changed", self.name);
            Recomposition::Suppressed {
                changes: diff.changes,
            }
        }
    }

    /// Leave the initial phase; called once the host committed the first render
    pub fn commit(&mut self) {
        self.state.phase = Phase::Steady;
    }

    /// Record and commit in one step, for use without a host
    pub fn track(&mut self, arguments: &Arguments, skipped: &[&str]) -> Recomposition {
        let outcome = self.recompose(arguments, skipped);
        self.commit();
        outcome
    }
}

impl Drop for TrackerInstance {
    fn drop(&mut self) {
        self.sink.debug(
            LOGGER_TAG,
            &format!(
                "{} exits composition, params: ({})",
                self.name,
                self.state.last_arguments().render()
            ),
        );
    }
}
