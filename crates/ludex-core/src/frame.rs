//! Frame scheduling primitives.
//!
//! Raw scroll and resize events fire far faster than useful recomputation, so
//! the windowing controller coalesces them to one pass per display frame.
//! The host's frame callback is abstracted as [`FrameClock`]; [`FrameGate`]
//! is the single-slot pending flag that does the coalescing.

/// The host's frame-tick primitive.
///
/// On the web this maps to `requestAnimationFrame`; in a native shell to the
/// compositor's vsync callback; in tests to [`ManualFrameClock`]. After a
/// tick is requested the host must eventually call back into the session's
/// frame handler exactly once.
pub trait FrameClock {
    /// Asks the host to deliver one frame tick.
    fn request_tick(&mut self);
}

/// Single-slot pending-update flag.
///
/// Repeated [`arm`](FrameGate::arm) calls between ticks collapse into one
/// pending pass; a `force` request survives coalescing so a forced pass is
/// never downgraded by a later non-forced one.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameGate {
    pending: bool,
    forced: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the gate. Returns `true` when the caller should request a tick
    /// from the [`FrameClock`] (i.e. the gate was not already pending).
    pub fn arm(&mut self, force: bool) -> bool {
        self.forced |= force;
        if self.pending {
            false
        } else {
            self.pending = true;
            true
        }
    }

    /// Consumes the pending slot on a tick.
    ///
    /// Returns `Some(forced)` when a pass was pending, `None` for a spurious
    /// tick (e.g. one that raced a teardown).
    pub fn take(&mut self) -> Option<bool> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        let forced = self.forced;
        self.forced = false;
        Some(forced)
    }

    /// Whether a pass is waiting for the next tick.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Drops any pending pass. Used on teardown.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.forced = false;
    }
}

/// Test [`FrameClock`] that records tick requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualFrameClock {
    /// Number of ticks requested so far.
    pub requests: usize,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameClock for ManualFrameClock {
    fn request_tick(&mut self) {
        self.requests += 1;
    }
}
