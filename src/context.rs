use {
    crate::error::*,
    std::{
        sync::{
            Arc,
            atomic::{
                AtomicBool,
                Ordering,
            },
        },
        time::{
            Duration,
            Instant,
        },
    },
};

/// Cancellation and deadline carried by every query.
///
/// Clones share the cancellation flag, so a clone handed to another
/// thread can cancel an operation running here. A context is never
/// reset: once cancelled, every operation using it fails.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// a context which is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }
    pub fn with_timeout(
        self,
        timeout: Duration,
    ) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }
    /// set the deadline, keeping the earliest one if there was already one
    pub fn with_deadline(
        mut self,
        deadline: Instant,
    ) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
    /// return the error the current operation must stop with, if any
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return CancelledSnafu.fail();
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => DeadlineExceededSnafu.fail(),
            _ => Ok(()),
        }
    }
}

#[test]
fn test_background_never_stops() {
    assert!(Context::background().check().is_ok());
}

#[test]
fn test_cancel_is_shared_by_clones() {
    let ctx = Context::background();
    let other = ctx.clone();
    other.cancel();
    assert!(matches!(ctx.check(), Err(Error::Cancelled)));
}

#[test]
fn test_elapsed_deadline() {
    let ctx = Context::background().with_deadline(Instant::now());
    assert!(matches!(ctx.check(), Err(Error::DeadlineExceeded)));
    let ctx = Context::background().with_timeout(Duration::from_secs(3600));
    assert!(ctx.check().is_ok());
}

#[test]
fn test_earliest_deadline_wins() {
    let now = Instant::now();
    let ctx = Context::background()
        .with_deadline(now + Duration::from_secs(10))
        .with_deadline(now + Duration::from_secs(60));
    assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(10)));
}
