//! Progress reporting and cooperative cancellation for pack and unpack jobs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Receives a callback before and after every entry a job processes.
///
/// `current` counts from 1 and `total` includes null entries, which never get callbacks.
pub trait Progress {
    fn on_start(&mut self, _total: u32, _current: u32, _name: &str) {}

    fn on_done(&mut self, _total: u32, _current: u32, _name: &str) {}
}

/// Ignores all progress
impl Progress for () {}

impl<P: Progress + ?Sized> Progress for &mut P {
    fn on_start(&mut self, total: u32, current: u32, name: &str) {
        (**self).on_start(total, current, name)
    }

    fn on_done(&mut self, total: u32, current: u32, name: &str) {
        (**self).on_done(total, current, name)
    }
}

/// Shared flag that asks a running job to stop at the next entry boundary
///
/// ```
/// use chi_archive::CancellationToken;
///
/// let token = CancellationToken::new();
/// let worker = token.clone();
/// token.cancel();
/// assert!(worker.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fails with [`Error::OperationCancelled`] once the token was cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::OperationCancelled);
        }
        Ok(())
    }
}

/// Lifecycle of a single pack or unpack call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub const fn is_finished(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }

    /// Final state for the outcome of a job
    pub fn finish<T>(result: &Result<T>) -> JobState {
        match result {
            Ok(_) => JobState::Completed,
            Err(Error::OperationCancelled) => JobState::Cancelled,
            Err(_) => JobState::Failed,
        }
    }
}

/// Runs `job`, moving `state` from idle through running to its final state
pub fn run_job<T>(state: &mut JobState, job: impl FnOnce() -> Result<T>) -> Result<T> {
    *state = JobState::Running;
    let result = job();
    *state = JobState::finish(&result);
    result
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::io;

    use crate::error::Error;
    use crate::progress::{run_job, CancellationToken, JobState};

    #[test]
    fn token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let worker = token.clone();

        assert!(worker.check().is_ok());
        token.cancel();
        assert!(matches!(worker.check(), Err(Error::OperationCancelled)));
    }

    #[test]
    fn job_states() {
        let mut state = JobState::default();
        assert_eq!(state, JobState::Idle);
        assert!(!state.is_finished());

        let value = run_job(&mut state, || Ok(7));
        assert_eq!(value.ok(), Some(7));
        assert_eq!(state, JobState::Completed);

        let _ = run_job(&mut state, || -> crate::error::Result<()> {
            Err(Error::OperationCancelled)
        });
        assert_eq!(state, JobState::Cancelled);

        let _ = run_job(&mut state, || -> crate::error::Result<()> {
            Err(io::Error::from(io::ErrorKind::NotFound).into())
        });
        assert_eq!(state, JobState::Failed);
        assert!(state.is_finished());
    }
}
