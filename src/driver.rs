use core::cmp;
use core::time::Duration;

use log::debug;

use crate::context::Context;
use crate::error::Error;
use crate::kiwi::Kiwi8;
use crate::timer::TimerClock;

/// One iteration of a platform loop, split into its two clocks
///
/// `tick_chip` is meant to be called at the instruction rate chosen by the
/// platform, `tick_timers` as often as convenient with the current monotonic
/// time. The driver never loops or sleeps on its own.
#[derive(Debug)]
pub struct Driver<C: Context> {
    chip: Kiwi8,
    ctx: C,
    clock: TimerClock,
}

impl<C: Context> Driver<C> {
    pub fn new(chip: Kiwi8, ctx: C) -> Self {
        Self {
            chip,
            ctx,
            clock: TimerClock::new(),
        }
    }

    /// Sample the keypad, run a single cycle and forward presentation requests
    ///
    /// Requests raised before a failing or blocked cycle are still serviced.
    pub fn tick_chip(&mut self) -> nb::Result<(), Error> {
        self.chip.set_key_mask(self.ctx.key_mask());
        let result = self.chip.cycle();
        self.present();
        result
    }

    fn present(&mut self) {
        if self.chip.clear_requested() {
            self.ctx.on_clear();
            self.chip.clear_frame();
            self.chip.ack_clear();
        }
        if self.chip.draw_requested() {
            self.ctx.on_frame(self.chip.frame());
            self.chip.ack_draw();
        }
    }

    /// Decrement timers once for every 60 Hz boundary passed since the last call
    ///
    /// Returns the number of boundaries. The first call only starts the clock.
    pub fn tick_timers(&mut self, now: Duration) -> u32 {
        let ticks = self.clock.advance(now);
        // timers reach zero after at most 255 ticks
        for _ in 0..cmp::min(ticks, u32::from(u8::MAX)) {
            self.chip.tick_timers();
        }
        if ticks > 1 {
            debug!("timers caught up on {} ticks", ticks);
        }
        ticks
    }

    /// Stop counting, the next `tick_timers` only anchors the clock again
    ///
    /// Useful after the platform loop was paused, so the pause is not caught up.
    pub fn reset_timers(&mut self) {
        self.clock.reset();
    }

    pub fn chip(&self) -> &Kiwi8 {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut Kiwi8 {
        &mut self.chip
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    /// Take the machine and the context back
    pub fn release(self) -> (Kiwi8, C) {
        (self.chip, self.ctx)
    }
}
