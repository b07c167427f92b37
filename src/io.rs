//! Background I/O with completion reported to the logic thread.
//!
//! Loading and saving run on worker threads. While any job is outstanding
//! the editor is "in I/O" and actions not marked valid during I/O are
//! disabled. Workers never touch editor state; they send a [`Completion`]
//! over a channel that the logic thread drains with [`IoMonitor::poll`].

use crate::actions::{ActionRegistry, EditorState, StateChange};
use crate::messages::MessageSink;
use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// A finished background job.
#[derive(Debug)]
pub struct Completion {
    pub label: String,
    pub result: Result<()>,
}

#[derive(Debug)]
pub struct IoMonitor {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    pending: usize,
}

impl Default for IoMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl IoMonitor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, pending: 0 }
    }

    /// Runs `job` on a new thread.
    ///
    /// A job that panics still reports a failed [`Completion`].
    pub fn spawn<F>(&mut self, label: impl Into<String>, job: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let label = label.into();
        let tx = self.tx.clone();
        let thread_label = label.clone();

        thread::Builder::new()
            .name(format!("io-{label}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown cause".to_string());
                    Err(anyhow!("job panicked: {reason}"))
                });
                // The monitor may already be gone when the editor is closing.
                let _ = tx.send(Completion {
                    label: thread_label,
                    result,
                });
            })
            .with_context(|| format!("Failed to start background job '{label}'"))?;

        self.pending += 1;
        debug!("Started background job '{}' ({} pending)", label, self.pending);
        Ok(())
    }

    pub fn io_in_progress(&self) -> bool {
        self.pending > 0
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Collects finished jobs without blocking.
    pub fn poll(&mut self) -> Vec<Completion> {
        let done: Vec<_> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(done.len());
        done
    }

    /// Blocks until every outstanding job has finished or `timeout` elapses
    /// while waiting for the next one.
    pub fn wait(&mut self, timeout: Duration) -> Result<Vec<Completion>> {
        let mut done = Vec::new();
        while self.pending > 0 {
            let completion = self
                .rx
                .recv_timeout(timeout)
                .map_err(|_| anyhow!("Timed out waiting for {} background job(s)", self.pending))?;
            self.pending -= 1;
            done.push(completion);
        }
        Ok(done)
    }

    /// Applies finished jobs to the editor: failures go to `sink`, and
    /// actions are re-evaluated when the in-progress flag changes.
    ///
    /// Returns the number of jobs that finished.
    pub fn sync(
        &mut self,
        state: &mut EditorState,
        registry: &mut ActionRegistry,
        sink: &mut dyn MessageSink,
    ) -> usize {
        let done = self.poll();
        for completion in &done {
            match &completion.result {
                Ok(()) => info!("Background job '{}' finished", completion.label),
                Err(err) => sink.error(&format!("{} failed: {:#}", completion.label, err)),
            }
        }
        self.update_state(state, registry);
        done.len()
    }

    /// Copies the in-progress flag into `state`, refreshing actions on change.
    pub fn update_state(&self, state: &mut EditorState, registry: &mut ActionRegistry) {
        let busy = self.io_in_progress();
        if state.io_in_progress != busy {
            state.io_in_progress = busy;
            registry.refresh(StateChange::Io, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::CollectingSink;
    use std::sync::{Arc, Barrier};

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn jobs_are_pending_until_polled() {
        let mut monitor = IoMonitor::new();
        assert!(!monitor.io_in_progress());

        let gate = Arc::new(Barrier::new(2));
        let worker_gate = Arc::clone(&gate);
        monitor
            .spawn("save", move || {
                worker_gate.wait();
                Ok(())
            })
            .unwrap();
        assert!(monitor.io_in_progress());
        assert!(monitor.poll().is_empty());

        gate.wait();
        let done = monitor.wait(WAIT).unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].label, "save");
        assert!(!monitor.io_in_progress());
    }

    #[test]
    fn sync_disables_actions_during_io() {
        let mut registry = ActionRegistry::with_defaults();
        let mut state = EditorState {
            document_empty: false,
            ..EditorState::default()
        };
        registry.refresh_all(&state);
        assert!(registry.is_enabled("file.save"));

        let mut monitor = IoMonitor::new();
        let gate = Arc::new(Barrier::new(2));
        let worker_gate = Arc::clone(&gate);
        monitor
            .spawn("load", move || {
                worker_gate.wait();
                Err(anyhow!("disk full"))
            })
            .unwrap();

        monitor.update_state(&mut state, &mut registry);
        assert!(state.io_in_progress);
        assert!(!registry.is_enabled("file.save"));
        assert!(registry.is_enabled("file.quit"));

        gate.wait();
        let done = monitor.wait(WAIT).unwrap();
        assert_eq!(done.len(), 1);
        assert!(done[0].result.is_err());
        monitor.update_state(&mut state, &mut registry);
        assert!(!state.io_in_progress);
        assert!(registry.is_enabled("file.save"));
    }

    #[test]
    fn panicking_job_still_completes() {
        let mut monitor = IoMonitor::new();
        monitor.spawn("load", || panic!("decoder bug")).unwrap();

        let done = monitor.wait(WAIT).unwrap();
        assert_eq!(done.len(), 1);
        let err = done[0].result.as_ref().unwrap_err();
        assert_eq!(err.to_string(), "job panicked: decoder bug");
        assert!(!monitor.io_in_progress());
    }

    #[test]
    fn sync_reports_failures() {
        let mut registry = ActionRegistry::with_defaults();
        let mut state = EditorState::default();
        let mut monitor = IoMonitor::new();
        let mut sink = CollectingSink::default();

        monitor
            .spawn("export", || Err(anyhow!("latex not found")))
            .unwrap();

        let mut finished = 0;
        for _ in 0..500 {
            finished += monitor.sync(&mut state, &mut registry, &mut sink);
            if finished == 1 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(finished, 1);
        assert_eq!(sink.errors, vec!["export failed: latex not found".to_string()]);
        assert!(!state.io_in_progress);
    }
}
