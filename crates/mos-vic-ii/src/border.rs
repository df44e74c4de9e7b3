//! Border flip-flops.
//!
//! The border is produced by two flip-flops. The vertical one is set when
//! the raster reaches the bottom compare line and cleared at the top compare
//! line if DEN is set. The main one is set at the right compare position and
//! cleared at the left compare position, but only while the vertical one is
//! clear and not about to be set. The renderer reads a copy that lags one
//! cycle behind, refreshed through the delay queue.
//!
//! | | CSEL/RSEL = 0 | CSEL/RSEL = 1 |
//! |--------|---------------|---------------|
//! | left   | 31            | 24            |
//! | right  | 335           | 344           |
//! | top    | 55            | 51            |
//! | bottom | 247           | 251           |

use crate::Vic;
use crate::events::Action;
use crate::registers::RegisterFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlipFlops {
    pub main: bool,
    pub vertical: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BorderUnit {
    pub current: FlipFlops,
    pub delayed: FlipFlops,
    /// The bottom compare matched in this line; the vertical flip-flop is
    /// set at the end of the line.
    vertical_set_pending: bool,
    left: u16,
    right: u16,
    upper: u16,
    lower: u16,
}

impl BorderUnit {
    pub fn new(regs: &RegisterFile) -> Self {
        let mut unit = Self {
            current: FlipFlops {
                main: true,
                vertical: true,
            },
            ..Self::default()
        };
        unit.delayed = unit.current;
        unit.update_horizontal(regs);
        unit.update_vertical(regs);
        unit
    }

    pub fn update_horizontal(&mut self, regs: &RegisterFile) {
        (self.left, self.right) = if regs.csel() { (24, 344) } else { (31, 335) };
    }

    pub fn update_vertical(&mut self, regs: &RegisterFile) {
        (self.upper, self.lower) = if regs.rsel() { (51, 251) } else { (55, 247) };
    }

    pub fn vertical_pending(&self) -> bool {
        self.vertical_set_pending
    }

    pub fn clear_vertical_pending(&mut self) {
        self.vertical_set_pending = false;
    }

    /// Copy the flip-flops into the renderer's view.
    pub fn latch(&mut self) {
        self.delayed = self.current;
    }

    /// Set the main flip-flop. Returns whether the renderer's copy is stale.
    fn set_main(&mut self, value: bool) -> bool {
        if value == self.delayed.main {
            return false;
        }
        self.current.main = value;
        true
    }

    fn set_vertical(&mut self, value: bool) -> bool {
        if value == self.delayed.vertical {
            return false;
        }
        self.current.vertical = value;
        true
    }
}

impl Vic {
    pub(crate) fn update_horizontal_compare(&mut self) {
        let regs = self.regs.current();
        self.border.update_horizontal(&regs);
    }

    pub(crate) fn update_vertical_compare(&mut self) {
        let regs = self.regs.current();
        self.border.update_vertical(&regs);
    }

    pub(crate) fn set_main_flipflop(&mut self, value: bool) {
        if self.border.set_main(value) {
            self.queue.schedule_next(Action::UpdateFlipflops);
        }
    }

    pub(crate) fn set_vertical_flipflop(&mut self, value: bool) {
        if self.border.set_vertical(value) {
            self.queue.schedule_next(Action::UpdateFlipflops);
        }
    }

    /// Runs in every cycle. The top compare clears at once, the bottom
    /// compare only arms the set for the end of the line.
    pub(crate) fn check_vertical_flipflop(&mut self) {
        if self.y_counter == self.border.upper {
            if self.regs.current().den() {
                self.set_vertical_flipflop(false);
            }
        } else if self.y_counter == self.border.lower {
            self.border.vertical_set_pending = true;
        }
    }

    /// Left compare in cycle 17 (x = 24) and cycle 18 (x = 31).
    pub(crate) fn check_left_border(&mut self, x: u16) {
        if x == self.border.left
            && !self.border.current.vertical
            && !self.border.vertical_set_pending
        {
            self.set_main_flipflop(false);
        }
    }

    /// Right compare in cycle 56 (x = 335) and cycle 57 (x = 344).
    pub(crate) fn check_right_border(&mut self, x: u16) {
        if x == self.border.right {
            self.set_main_flipflop(true);
        }
    }
}
