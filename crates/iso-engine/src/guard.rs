use std::time::{Duration, Instant};

use iso_core::{CancelToken, ErrorInfo, IsoError};

use crate::params::QueryOpts;

const DEADLINE_STRIDE: u64 = 1024;

/// Cancellation, deadline and row-cap checks shared by every strategy.
#[derive(Debug, Clone)]
pub struct SearchGuard {
    cancel: CancelToken,
    deadline: Option<Instant>,
    max_rows: Option<usize>,
    ticks: u64,
}

impl SearchGuard {
    /// Starts the clock for a query.
    pub fn new(cancel: CancelToken, opts: &QueryOpts) -> Self {
        Self {
            cancel,
            deadline: opts
                .timeout_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
            max_rows: opts.limits.max_configurations,
            ticks: 0,
        }
    }

    /// Guard with no deadline and no caps.
    pub fn unbounded() -> Self {
        Self {
            cancel: CancelToken::new(),
            deadline: None,
            max_rows: None,
            ticks: 0,
        }
    }

    /// Per-step check; the clock is only read every few calls.
    pub fn checkpoint(&mut self) -> Result<(), IsoError> {
        self.ticks += 1;
        self.check_cancel()?;
        if self.ticks % DEADLINE_STRIDE == 0 {
            self.check_deadline()?;
        }
        Ok(())
    }

    /// Round boundary check; always reads the clock.
    pub fn checkpoint_round(&mut self) -> Result<(), IsoError> {
        self.check_cancel()?;
        self.check_deadline()
    }

    /// Fails once `rows` exceeds the configured row cap.
    pub fn check_rows(&self, rows: usize) -> Result<(), IsoError> {
        match self.max_rows {
            Some(limit) if rows > limit => Err(IsoError::ResourceExhausted(
                ErrorInfo::new("configuration-cap", "result exceeds the configured row limit")
                    .with_context("limit", limit)
                    .with_hint("raise limits.max_configurations or tighten the stop condition"),
            )),
            _ => Ok(()),
        }
    }

    fn check_cancel(&self) -> Result<(), IsoError> {
        if self.cancel.is_cancelled() {
            return Err(IsoError::Cancelled(ErrorInfo::new(
                "cancelled",
                "query cancelled by caller",
            )));
        }
        Ok(())
    }

    fn check_deadline(&self) -> Result<(), IsoError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(IsoError::Cancelled(
                ErrorInfo::new("deadline", "query exceeded its time budget")
                    .with_context("steps", self.ticks),
            )),
            _ => Ok(()),
        }
    }
}
