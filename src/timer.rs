use core::convert::TryFrom;
use core::time::Duration;

/// Length of a single timer tick, 1/60 of a second
pub const TIMER_PERIOD: Duration = Duration::from_nanos(16_666_667);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    On,
    Off,
    Finished,
}

/// 8-bit countdown register, saturating at 0
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer(u8);

impl Timer {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn store(&mut self, value: u8) {
        self.0 = value;
    }

    #[inline]
    pub fn load(&self) -> u8 {
        self.0
    }

    #[inline]
    pub fn decrement(&mut self) -> TimerState {
        match self.0 {
            0 => TimerState::Off,
            1 => {
                self.0 = 0;
                TimerState::Finished
            }
            _ => {
                self.0 -= 1;
                TimerState::On
            }
        }
    }
}

/// Tracks 60 Hz boundaries against a monotonic clock supplied by the driver
///
/// The first call to `advance` only anchors the clock. Each later call reports
/// how many whole periods passed since the anchor and moves the anchor forward
/// by exactly that many periods, so a stalled driver catches up on the next call
/// without drifting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimerClock {
    anchor: Option<Duration>,
}

impl TimerClock {
    pub fn new() -> Self {
        Self { anchor: None }
    }

    /// Number of timer ticks due at `now`
    pub fn advance(&mut self, now: Duration) -> u32 {
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                self.anchor = Some(now);
                return 0;
            }
        };
        // Time going backwards is treated as no time passing
        let elapsed = match now.checked_sub(anchor) {
            Some(elapsed) => elapsed,
            None => return 0,
        };
        let ticks = u32::try_from(elapsed.as_nanos() / TIMER_PERIOD.as_nanos()).unwrap_or(u32::MAX);
        self.anchor = Some(anchor + TIMER_PERIOD * ticks);
        ticks
    }

    /// Forget the anchor, the next `advance` starts counting anew
    pub fn reset(&mut self) {
        self.anchor = None;
    }
}
