use foundation::time::Time;

/// Frame metadata handed to every per-frame callback.
///
/// The host decides the delta (it owns the display clock); the frame only
/// accumulates it so animation is a pure function of `time`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta since the previous frame (seconds).
    pub dt_s: f64,
    /// Elapsed view time at this frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn first() -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time::ZERO,
        }
    }

    /// Fixed-step frame, used by tests and replays.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Next frame after `dt_s` seconds. Negative or non-finite deltas count as 0.
    pub fn next(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.advanced_by(dt_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn fixed_step_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 * (1.0 / 60.0)));
    }

    #[test]
    fn next_accumulates_variable_deltas() {
        let f = Frame::first().next(0.5).next(0.25);
        assert_eq!(f.index, 2);
        assert_eq!(f.time, Time(0.75));
        assert_eq!(f.dt_s, 0.25);
    }

    #[test]
    fn bogus_deltas_do_not_move_time() {
        let f = Frame::first().next(-1.0).next(f64::NAN);
        assert_eq!(f.index, 2);
        assert_eq!(f.time, Time::ZERO);
    }
}
