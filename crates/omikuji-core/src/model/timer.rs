/// Whole-second countdown. The round machine decides when a second passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    start: u32,
    seconds: u32,
}

impl Timer {
    pub const fn new(start: u32) -> Self {
        Self {
            start,
            seconds: start,
        }
    }

    pub const fn seconds_remaining(&self) -> u32 {
        self.seconds
    }

    pub const fn is_expired(&self) -> bool {
        self.seconds == 0
    }

    pub fn reset(&mut self) {
        self.seconds = self.start;
    }

    pub fn tick_down(&mut self) {
        self.seconds = self.seconds.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::Timer;

    #[test]
    fn ticks_down_to_zero_and_stops() {
        let mut timer = Timer::new(2);
        timer.tick_down();
        assert_eq!(timer.seconds_remaining(), 1);
        timer.tick_down();
        timer.tick_down();
        assert!(timer.is_expired());
        timer.reset();
        assert_eq!(timer.seconds_remaining(), 2);
    }
}
