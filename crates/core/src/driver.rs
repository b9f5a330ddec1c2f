//! Frame-oriented tick driver.
//!
//! The driver decouples simulation rate from display rate: each presented
//! frame runs a fixed number of engine ticks to completion on the calling
//! thread, then exposes the engine's presentation field read-only.
//!
//! ```text
//! Idle --frame()--> Stepping(n) --> Presented --finish_frame()--> Idle
//! ```
//!
//! A reset request is a single-shot flag: it is consumed at the start of
//! the next frame, before any tick of that frame runs.

use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::field::Field;

/// Where the driver is within the current frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    /// Waiting for the next frame.
    Idle,
    /// Running the given number of ticks.
    Stepping(usize),
    /// Ticks done; the presentation field is ready to read.
    Presented,
}

/// Summary of one completed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// 1-based index of this frame since the driver was created.
    pub frame: u64,
    /// Ticks executed in this frame.
    pub ticks: usize,
    /// Whether a pending reset was consumed before stepping.
    pub reset: bool,
    /// Engine time after the frame.
    pub time: f64,
    /// Non-finite samples in the presentation field, when the check is enabled.
    pub non_finite: Option<usize>,
}

impl FrameReport {
    /// True if the divergence check ran and found NaN or ±∞ samples.
    pub fn diverged(&self) -> bool {
        self.non_finite.is_some_and(|n| n > 0)
    }
}

/// Owns an engine and advances it `substeps` ticks per presented frame.
pub struct TickDriver<E: Engine> {
    engine: E,
    substeps: usize,
    phase: TickPhase,
    reset_pending: bool,
    frames: u64,
    ticks: u64,
    check_finite: bool,
}

impl<E: Engine> TickDriver<E> {
    /// Wraps `engine`, running `substeps` ticks per frame.
    pub fn new(engine: E, substeps: usize) -> Self {
        info!(substeps, "tick driver created");
        Self {
            engine,
            substeps,
            phase: TickPhase::Idle,
            reset_pending: false,
            frames: 0,
            ticks: 0,
            check_finite: false,
        }
    }

    /// Enables or disables the post-frame finite-value scan. The scan only
    /// reports; it never modifies the field.
    pub fn with_divergence_check(mut self, enabled: bool) -> Self {
        self.check_finite = enabled;
        self
    }

    /// Requests a re-initialisation before the next frame's ticks.
    ///
    /// Repeated requests within one frame collapse into a single reset.
    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    /// True if a reset is waiting to be consumed.
    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Runs one frame: consumes a pending reset, executes all sub-steps and
    /// leaves the driver in [`TickPhase::Presented`].
    ///
    /// Calling `frame()` while a previous frame is still presented implicitly
    /// finishes it. On a step error the driver returns to `Idle` and the
    /// error is propagated.
    pub fn frame(&mut self) -> Result<FrameReport, EngineError> {
        if self.phase == TickPhase::Presented {
            self.finish_frame();
        }

        let reset = std::mem::take(&mut self.reset_pending);
        if reset {
            info!(frame = self.frames + 1, "re-initialising fields");
            self.engine.reinitialize();
        }

        self.phase = TickPhase::Stepping(self.substeps);
        for _ in 0..self.substeps {
            if let Err(e) = self.engine.step() {
                self.phase = TickPhase::Idle;
                return Err(e);
            }
            self.ticks += 1;
        }
        self.frames += 1;
        self.phase = TickPhase::Presented;

        let non_finite = self
            .check_finite
            .then(|| self.engine.field().count_non_finite());
        if let Some(n) = non_finite.filter(|&n| n > 0) {
            warn!(
                frame = self.frames,
                non_finite = n,
                "presentation field contains non-finite values"
            );
        }

        let report = FrameReport {
            frame: self.frames,
            ticks: self.substeps,
            reset,
            time: self.engine.time(),
            non_finite,
        };
        debug!(frame = report.frame, time = report.time, "frame presented");
        Ok(report)
    }

    /// Runs `n` frames back to back, returning the last report (if any).
    pub fn run_frames(&mut self, n: usize) -> Result<Option<FrameReport>, EngineError> {
        let mut last = None;
        for _ in 0..n {
            last = Some(self.frame()?);
            self.finish_frame();
        }
        Ok(last)
    }

    /// Read-only presentation view of the engine's "new" buffer.
    pub fn present(&self) -> &Field {
        self.engine.field()
    }

    /// Marks the presented frame as consumed (`Presented → Idle`).
    pub fn finish_frame(&mut self) {
        if self.phase == TickPhase::Presented {
            self.phase = TickPhase::Idle;
        }
    }

    /// Current phase of the frame cycle.
    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    /// Ticks per frame.
    pub fn substeps(&self) -> usize {
        self.substeps
    }

    /// Changes the ticks per frame, effective from the next frame.
    pub fn set_substeps(&mut self, substeps: usize) {
        self.substeps = substeps;
    }

    /// Frames completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Shared access to the driven engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine, e.g. for runtime parameter edits
    /// between frames.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Releases the engine.
    pub fn into_engine(self) -> E {
        self.engine
    }
}
