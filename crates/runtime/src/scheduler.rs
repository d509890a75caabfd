use tracing::debug;

use crate::frame::Frame;

/// Result of one scheduler tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickOutcome {
    /// The frame callback ran; the host should request another frame.
    Ran(Frame),
    /// The view is inactive; the host must not schedule further frames.
    Stopped,
}

impl TickOutcome {
    pub fn should_reschedule(&self) -> bool {
        matches!(self, TickOutcome::Ran(_))
    }
}

/// Per-frame driver for a view that is only animated while visible.
///
/// The host calls [`FrameScheduler::tick`] from its frame callback and keeps
/// requesting frames only while the outcome says so. Hiding the view flips the
/// active flag; the next tick observes it and stops the loop, so no perpetual
/// timer outlives the view.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    active: bool,
    last: Option<Frame>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        if !self.active {
            debug!("frame loop activated");
        }
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        if self.active {
            debug!("frame loop deactivation requested");
        }
        self.active = false;
    }

    /// Last frame that ran, if any.
    pub fn current_frame(&self) -> Option<Frame> {
        self.last
    }

    /// Advances one frame by `dt_s` and runs `on_frame`, unless inactive.
    pub fn tick<F>(&mut self, dt_s: f64, on_frame: F) -> TickOutcome
    where
        F: FnOnce(Frame),
    {
        if !self.active {
            debug!("frame loop stopped: view inactive");
            return TickOutcome::Stopped;
        }

        let frame = match self.last {
            None => Frame::first(),
            Some(prev) => prev.next(dt_s),
        };
        self.last = Some(frame);
        on_frame(frame);
        TickOutcome::Ran(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameScheduler, TickOutcome};
    use foundation::time::Time;

    #[test]
    fn inactive_scheduler_never_runs() {
        let mut sched = FrameScheduler::new();
        let mut ran = 0;
        let outcome = sched.tick(0.016, |_| ran += 1);
        assert_eq!(outcome, TickOutcome::Stopped);
        assert!(!outcome.should_reschedule());
        assert_eq!(ran, 0);
    }

    #[test]
    fn frames_advance_while_active() {
        let mut sched = FrameScheduler::new();
        sched.activate();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let outcome = sched.tick(0.5, |f| seen.push(f.index));
            assert!(outcome.should_reschedule());
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(sched.current_frame().map(|f| f.time), Some(Time(1.0)));
    }

    #[test]
    fn deactivation_stops_at_next_tick() {
        let mut sched = FrameScheduler::new();
        sched.activate();
        assert!(sched.tick(0.1, |_| {}).should_reschedule());

        sched.deactivate();
        let mut ran = false;
        assert_eq!(sched.tick(0.1, |_| ran = true), TickOutcome::Stopped);
        assert!(!ran);

        // Re-entering continues the same timebase.
        sched.activate();
        let TickOutcome::Ran(frame) = sched.tick(0.1, |_| {}) else {
            panic!("expected a frame");
        };
        assert_eq!(frame.index, 1);
    }
}
