//! Raster position, bad lines, display state and interrupts.
//!
//! # Bad lines
//!
//! A bad line is any raster line in $30-$F7 whose low three bits equal
//! YSCROLL, provided DEN was set at some point during line $30. On a bad
//! line the chip steals the bus for 40 c-accesses and the sequencer enters
//! display state. The DEN latch is sampled at the start of line $30 and set
//! again by any $D011 write with DEN during that line; toggling DEN in other
//! lines has no effect until the next frame.
//!
//! # Interrupts
//!
//! IRR bits: 0 raster, 1 sprite-background, 2 sprite-sprite, 3 light pen.
//! The IRQ output follows `IRR & IMR` through the delay queue, so it changes
//! one cycle after the source for internal events and two cycles after a
//! register write.

use log::trace;

use crate::Vic;
use crate::events::Action;

/// IRR source bits.
pub const IRQ_RASTER: u8 = 0x01;
pub const IRQ_SPRITE_BACKGROUND: u8 = 0x02;
pub const IRQ_SPRITE_SPRITE: u8 = 0x04;
pub const IRQ_LIGHTPEN: u8 = 0x08;

/// First and last raster line on which a bad line can occur.
const BAD_LINE_FIRST: u16 = 0x30;
const BAD_LINE_LAST: u16 = 0xF7;

impl Vic {
    pub(crate) fn bad_line_condition(&self) -> bool {
        (BAD_LINE_FIRST..=BAD_LINE_LAST).contains(&self.y_counter)
            && (self.y_counter as u8 & 0x07) == self.regs.current().yscroll()
            && self.den_seen
    }

    /// Whether this is the scanline in which the y counter returns to 0.
    pub(crate) fn y_counter_overflow(&self) -> bool {
        self.scanline == self.config.model.y_wrap_line()
    }

    /// Compare the raster counter with the interrupt line.
    ///
    /// The compare is edge triggered: the interrupt fires when the match
    /// condition becomes true, not while it holds. During the last cycle of
    /// a line the counter already shows the next line's value.
    pub(crate) fn check_for_raster_irq(&mut self) {
        let counter = if self.cycle == self.config.model.cycles_per_line() {
            self.y_counter + 1
        } else {
            self.y_counter
        };
        let matched = self.regs.current().irq_line == counter;
        if matched && !self.raster_irq_match {
            trace!("Raster IRQ at line {counter}");
            self.trigger_irq(IRQ_RASTER);
        }
        self.raster_irq_match = matched;
    }

    pub(crate) fn trigger_irq(&mut self, source: u8) {
        self.irr |= source;
        self.queue.schedule_next(Action::UpdateIrqLine);
    }

    pub(crate) fn update_irq_line(&mut self) {
        let irq = self.irr & self.imr != 0;
        if irq != self.irq {
            trace!(
                "VIC IRQ line {} (IRR=${:02X} IMR=${:02X})",
                if irq { "asserted" } else { "released" },
                self.irr,
                self.imr
            );
        }
        self.irq = irq;
    }

    pub(crate) fn set_display_state(&mut self) {
        self.display_state |= self.bad_line;
    }

    /// Drive BA. A low phase restarts the three-cycle count when it begins.
    pub(crate) fn update_ba(&mut self, value: u8) {
        if value != self.ba_line.current() {
            if value != 0 {
                self.ba_line.write(value);
            } else {
                self.ba_line.clear(0);
            }
        }
    }

    /// The CPU releases the bus three cycles after BA goes low.
    pub(crate) fn ba_low_for_three_cycles(&self) -> bool {
        self.ba_line.read(3) != 0
    }

    /// Cycle 14: VCBASE -> VC, clear VMLI, and reset RC on a bad line.
    pub(crate) fn load_video_counter(&mut self) {
        self.vc = self.vc_base;
        self.vmli = 0;
        if self.bad_line {
            self.rc = 0;
        }
    }

    /// Cycle 58: leave display state after the eighth row of a character
    /// line unless another bad line follows, then advance RC.
    pub(crate) fn update_row_counter(&mut self) {
        if self.rc == 7 {
            self.display_state = self.bad_line;
            self.vc_base = self.vc;
        }
        if self.display_state {
            self.rc = (self.rc + 1) & 0x07;
        }
    }

    pub(crate) fn begin_frame(&mut self) {
        self.lp_irq_occurred = false;
        self.refresh = 0xFF;
        self.vc_base = 0;
    }

    /// Cycle 1 of every line.
    pub(crate) fn begin_line(&mut self) {
        self.border.clear_vertical_pending();
        self.vblank = self.config.model.is_vblank(self.scanline);

        // The wrap to 0 happens in cycle 2
        if !self.y_counter_overflow() {
            self.y_counter += 1;
        }

        if self.y_counter == BAD_LINE_FIRST {
            self.den_seen = self.regs.current().den();
        }

        self.bad_line = self.bad_line_condition();
        if self.bad_line {
            self.queue.schedule_next(Action::SetDisplayState);
        }
    }

    pub(crate) fn end_line(&mut self) {
        if self.border.vertical_pending() {
            self.set_vertical_flipflop(true);
        }
    }

    pub(crate) fn end_frame(&mut self) {
        self.pixels.swap();
        self.frame_complete = true;
        self.frame_count += 1;
        trace!("VIC frame {} complete", self.frame_count);
    }

    /// Drive the light-pen input. A falling edge latches the beam position
    /// one cycle later.
    pub fn set_lightpen(&mut self, level: bool) {
        if self.lp_line && !level {
            self.queue.schedule_after_next(Action::LightpenTransition);
        }
        self.lp_line = level;
    }

    pub(crate) fn check_for_lightpen_irq(&mut self) {
        // Only one light-pen event per frame
        if self.lp_irq_occurred {
            return;
        }
        // Not in the last PAL line except in its first cycle
        if self.y_counter == 311 && self.cycle != 1 {
            return;
        }

        self.lp_x = (self.config.model.lightpen_x(self.cycle) / 2) as u8;
        self.lp_y = self.y_counter as u8;

        if !self.config.model.delayed_lightpen_irqs() {
            self.trigger_irq(IRQ_LIGHTPEN);
        }
        self.lp_irq_occurred = true;
    }

    /// Cycle 2 of line 0 with the light-pen input held low.
    pub(crate) fn check_for_lightpen_irq_at_frame_start(&mut self) {
        self.lp_x = self.config.model.lightpen_frame_start_x();
        self.lp_y = 0;
        self.trigger_irq(IRQ_LIGHTPEN);
        self.lp_irq_occurred = true;
    }
}
