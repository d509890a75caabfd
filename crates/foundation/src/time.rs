/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn advanced_by(self, dt_s: f64) -> Self {
        Time(self.0 + dt_s.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn advancing_never_goes_backwards() {
        let t = Time(1.5);
        assert_eq!(t.advanced_by(0.5), Time(2.0));
        assert_eq!(t.advanced_by(-3.0), t);
    }
}
