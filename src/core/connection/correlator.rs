// Correlator - pairs the outstanding request with the next inbound reply
use crate::domain::command::Command;
use std::time::{Duration, Instant};

/// The one request awaiting its reply
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub command: Command,
    pub armed_at: Instant,
}

impl PendingRequest {
    pub fn elapsed(&self) -> Duration {
        self.armed_at.elapsed()
    }
}

/// Positional reply correlation.
///
/// Replies carry no identifier, so the next inbound payload belongs to
/// whatever request is armed. At most one request is ever armed.
#[derive(Debug, Default)]
pub struct Correlator {
    pending: Option<PendingRequest>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    /// Arm for `command`, replacing any request still pending.
    /// Returns the replaced request.
    pub fn arm(&mut self, command: &Command) -> Option<PendingRequest> {
        self.pending.replace(PendingRequest {
            command: command.clone(),
            armed_at: Instant::now(),
        })
    }

    /// Take the pending request once its reply (or failure) is in.
    pub fn resolve(&mut self) -> Option<PendingRequest> {
        self.pending.take()
    }

    /// Forget the pending request without a reply.
    pub fn reset(&mut self) -> Option<PendingRequest> {
        self.pending.take()
    }
}
