//! Bounded, cancellable context handed to every store call.
//!
//! # Invariants
//! - A context that is past its deadline or cancelled never becomes valid again.
//! - Context failures classify as `Connectivity`.

use crate::error::{KindHint, StoreFailure};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a context refused further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    DeadlineExceeded { timeout_ms: u128 },
    Cancelled,
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeadlineExceeded { timeout_ms } => {
                write!(f, "store operation exceeded its {timeout_ms} ms deadline")
            }
            Self::Cancelled => write!(f, "store operation was cancelled"),
        }
    }
}

impl Error for ContextError {}

impl StoreFailure for ContextError {
    fn kind_hint(&self) -> KindHint {
        match self {
            Self::DeadlineExceeded { .. } => KindHint::TimedOut,
            Self::Cancelled => KindHint::Cancelled,
        }
    }

    fn code(&self) -> Option<String> {
        Some(
            match self {
                Self::DeadlineExceeded { .. } => "deadline_exceeded",
                Self::Cancelled => "cancelled",
            }
            .to_string(),
        )
    }
}

/// Handle that cancels the context it was taken from, from any thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Operation context with an optional deadline and a cancellation flag.
#[derive(Debug, Clone)]
pub struct OpContext {
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl OpContext {
    /// Context without a deadline; only cancellation can stop it.
    pub fn background() -> Self {
        Self {
            timeout: None,
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fails once the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(ContextError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ContextError::DeadlineExceeded {
                    timeout_ms: self.timeout.map_or(0, |timeout| timeout.as_millis()),
                });
            }
        }
        Ok(())
    }
}
