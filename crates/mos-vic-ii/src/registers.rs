//! CPU-visible register file ($D000-$D03F).
//!
//! The writable registers live in a [`RegisterFile`] that the chip keeps as
//! a two-deep history: the renderer works from the copy as of the end of the
//! previous cycle, and switches individual fields over to the current copy
//! part way through an 8-pixel chunk. Reads of counters, latches and the
//! interrupt and collision registers come from live chip state.

use log::trace;

use crate::Vic;
use crate::events::Action;

/// Index of the border colour in [`RegisterFile::colours`].
pub const BORDER: usize = 0;
/// Index of background colour 0; 1-3 follow.
pub const BG0: usize = 1;
/// Sprite multicolour 0 ($D025).
pub const SPR_EX1: usize = 5;
/// Sprite multicolour 1 ($D026).
pub const SPR_EX2: usize = 6;
/// Colour of sprite 0; 1-7 follow.
pub const SPR0: usize = 7;

/// Graphics mode selected by ECM, BMM ($D011) and MCM ($D016).
///
/// The three modes with ECM and BMM or MCM set are invalid: the sequencer
/// outputs black but still tells foreground from background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayMode {
    StandardText,
    MulticolourText,
    StandardBitmap,
    MulticolourBitmap,
    ExtendedColourText,
    InvalidText,
    InvalidBitmap,
    InvalidMulticolourBitmap,
}

impl DisplayMode {
    #[must_use]
    pub const fn from_registers(ctrl1: u8, ctrl2: u8) -> Self {
        // ECM BMM MCM
        match ((ctrl1 >> 4) & 0x06) | ((ctrl2 >> 4) & 0x01) {
            0 => Self::StandardText,
            1 => Self::MulticolourText,
            2 => Self::StandardBitmap,
            3 => Self::MulticolourBitmap,
            4 => Self::ExtendedColourText,
            5 => Self::InvalidText,
            6 => Self::InvalidBitmap,
            _ => Self::InvalidMulticolourBitmap,
        }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(
            self,
            Self::InvalidText | Self::InvalidBitmap | Self::InvalidMulticolourBitmap
        )
    }
}

/// Snapshot of the writable registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
    /// 9-bit X coordinates ($D000/$D002/.. plus $D010).
    pub sprite_x: [u16; 8],
    pub sprite_y: [u8; 8],
    /// $D011 as written, including the raster compare bit.
    pub ctrl1: u8,
    /// $D016 as written.
    pub ctrl2: u8,
    /// Raster compare line ($D012 plus bit 7 of $D011).
    pub irq_line: u16,
    pub sprite_enable: u8,
    pub sprite_expand_y: u8,
    pub sprite_priority: u8,
    pub sprite_multicolour: u8,
    pub sprite_expand_x: u8,
    /// $D018 as written.
    pub mem_select: u8,
    /// $D020-$D02E, low nibbles.
    pub colours: [u8; 15],
}

impl RegisterFile {
    /// Power-on values: display enabled, 25 rows, screen at $0400 and the
    /// KERNAL's light blue on blue.
    #[must_use]
    pub fn power_on() -> Self {
        let mut colours = [0; 15];
        colours[BORDER] = 14;
        colours[BG0] = 6;
        Self {
            sprite_x: [0; 8],
            sprite_y: [0; 8],
            ctrl1: 0x10,
            ctrl2: 0,
            irq_line: 0,
            sprite_enable: 0,
            sprite_expand_y: 0,
            sprite_priority: 0,
            sprite_multicolour: 0,
            sprite_expand_x: 0,
            mem_select: 0x10,
            colours,
        }
    }

    #[must_use]
    pub fn den(&self) -> bool {
        self.ctrl1 & 0x10 != 0
    }

    /// RSEL: 25 rows.
    #[must_use]
    pub fn rsel(&self) -> bool {
        self.ctrl1 & 0x08 != 0
    }

    /// CSEL: 40 columns.
    #[must_use]
    pub fn csel(&self) -> bool {
        self.ctrl2 & 0x08 != 0
    }

    #[must_use]
    pub fn yscroll(&self) -> u8 {
        self.ctrl1 & 0x07
    }

    #[must_use]
    pub fn xscroll(&self) -> u8 {
        self.ctrl2 & 0x07
    }

    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_registers(self.ctrl1, self.ctrl2)
    }

    /// Video matrix base (VM13-VM10).
    #[must_use]
    pub fn video_matrix_base(&self) -> u16 {
        u16::from(self.mem_select >> 4) << 10
    }

    /// Character generator base (CB13-CB11).
    #[must_use]
    pub fn char_base(&self) -> u16 {
        u16::from(self.mem_select & 0x0E) << 10
    }

    /// Bitmap base (CB13 only).
    #[must_use]
    pub fn bitmap_base(&self) -> u16 {
        u16::from(self.mem_select & 0x08) << 10
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::power_on()
    }
}

impl Vic {
    /// Read a register with side effects.
    ///
    /// Reading $D01E or $D01F clears the collision register one cycle later.
    pub fn peek(&mut self, reg: u8) -> u8 {
        let reg = reg & 0x3F;
        let value = self.spy(reg);
        match reg {
            0x1E => self.queue.schedule_after_next(Action::ClearSpriteSpriteCollision),
            0x1F => self.queue.schedule_after_next(Action::ClearSpriteBackgroundCollision),
            _ => {}
        }
        self.data_bus_phi2 = value;
        value
    }

    /// Read a register without side effects (for debuggers).
    #[must_use]
    pub fn spy(&self, reg: u8) -> u8 {
        let regs = self.regs.current();
        match reg & 0x3F {
            r @ 0x00..=0x0F if r & 1 == 0 => regs.sprite_x[usize::from(r >> 1)] as u8,
            r @ 0x00..=0x0F => regs.sprite_y[usize::from(r >> 1)],
            0x10 => (0..8).fold(0, |acc, i| {
                acc | (u8::from(regs.sprite_x[i] & 0x100 != 0) << i)
            }),
            0x11 => (regs.ctrl1 & 0x7F) | if self.y_counter > 0xFF { 0x80 } else { 0 },
            0x12 => self.y_counter as u8,
            0x13 => self.lp_x,
            0x14 => self.lp_y,
            0x15 => regs.sprite_enable,
            0x16 => regs.ctrl2 | 0xC0,
            0x17 => regs.sprite_expand_y,
            0x18 => regs.mem_select | 0x01,
            0x19 => {
                if self.irr & self.imr != 0 {
                    self.irr | 0xF0
                } else {
                    self.irr | 0x70
                }
            }
            0x1A => self.imr | 0xF0,
            0x1B => regs.sprite_priority,
            0x1C => regs.sprite_multicolour,
            0x1D => regs.sprite_expand_x,
            0x1E => self.ss_collision,
            0x1F => self.sb_collision,
            r @ 0x20..=0x2E => regs.colours[usize::from(r - 0x20)] | 0xF0,
            _ => 0xFF,
        }
    }

    /// Write a register.
    pub fn poke(&mut self, reg: u8, value: u8) {
        let reg = reg & 0x3F;
        trace!("VIC poke ${reg:02X} = ${value:02X}");
        self.data_bus_phi2 = value;

        match reg {
            r @ 0x00..=0x0F if r & 1 == 0 => {
                let x = &mut self.regs.current_mut().sprite_x[usize::from(r >> 1)];
                *x = (*x & 0x100) | u16::from(value);
            }
            r @ 0x00..=0x0F => {
                self.regs.current_mut().sprite_y[usize::from(r >> 1)] = value;
            }
            0x10 => {
                for (i, x) in self.regs.current_mut().sprite_x.iter_mut().enumerate() {
                    *x = (*x & 0xFF) | (u16::from((value >> i) & 1) << 8);
                }
            }
            0x11 => {
                let regs = self.regs.current_mut();
                regs.ctrl1 = value;
                regs.irq_line = (regs.irq_line & 0xFF) | (u16::from(value & 0x80) << 1);

                // DEN seen anywhere in line $30 enables bad lines
                if self.y_counter == 0x30 && value & 0x10 != 0 {
                    self.den_seen = true;
                }
                self.bad_line = self.bad_line_condition();
                if self.bad_line {
                    self.queue.schedule_after_next(Action::SetDisplayState);
                }
                self.update_vertical_compare();
                self.check_for_raster_irq();
            }
            0x12 => {
                let regs = self.regs.current_mut();
                regs.irq_line = (regs.irq_line & 0x100) | u16::from(value);
                self.check_for_raster_irq();
            }
            0x15 => self.regs.current_mut().sprite_enable = value,
            0x16 => {
                self.regs.current_mut().ctrl2 = value;
                self.update_horizontal_compare();
            }
            0x17 => self.write_sprite_expand_y(value),
            0x18 => self.regs.current_mut().mem_select = value,
            0x19 => {
                // Writing 1 acknowledges
                self.irr &= !value & 0x0F;
                self.queue.schedule_after_next(Action::UpdateIrqLine);
            }
            0x1A => {
                self.imr = value & 0x0F;
                self.queue.schedule_after_next(Action::UpdateIrqLine);
            }
            0x1B => self.regs.current_mut().sprite_priority = value,
            0x1C => self.regs.current_mut().sprite_multicolour = value,
            0x1D => self.regs.current_mut().sprite_expand_x = value,
            r @ 0x20..=0x2E => {
                let index = usize::from(r - 0x20);
                self.regs.current_mut().colours[index] = value & 0x0F;
                if self.config.gray_dot_bug && self.config.model.is_856x() {
                    self.regs.delayed_mut().colours[index] = 0x0F;
                }
            }
            // Light pen latches, collision registers and unused addresses
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DisplayMode;
    use crate::{ChipModel, Vic, VicConfig};

    #[test]
    fn display_mode_decodes_ecm_bmm_mcm() {
        let cases = [
            (0x1B, 0x08, DisplayMode::StandardText),
            (0x1B, 0x18, DisplayMode::MulticolourText),
            (0x3B, 0x08, DisplayMode::StandardBitmap),
            (0x3B, 0x18, DisplayMode::MulticolourBitmap),
            (0x5B, 0x08, DisplayMode::ExtendedColourText),
            (0x5B, 0x18, DisplayMode::InvalidText),
            (0x7B, 0x08, DisplayMode::InvalidBitmap),
            (0x7B, 0x18, DisplayMode::InvalidMulticolourBitmap),
        ];
        for (ctrl1, ctrl2, mode) in cases {
            assert_eq!(DisplayMode::from_registers(ctrl1, ctrl2), mode, "{ctrl1:02X}/{ctrl2:02X}");
        }
        assert!(DisplayMode::ExtendedColourText.is_valid());
        assert!(!DisplayMode::InvalidText.is_valid());
    }

    #[test]
    fn sprite_x_keeps_msb() {
        let mut vic = Vic::new();
        vic.poke(0x10, 0x04);
        vic.poke(0x04, 0x20);
        assert_eq!(vic.peek(0x04), 0x20);
        assert_eq!(vic.peek(0x10), 0x04);
        assert_eq!(vic.regs.current().sprite_x[2], 0x120);
    }

    #[test]
    fn unused_bits_read_as_one() {
        let mut vic = Vic::new();
        vic.poke(0x16, 0x08);
        vic.poke(0x18, 0x14);
        vic.poke(0x1A, 0x01);
        vic.poke(0x20, 0x03);
        assert_eq!(vic.peek(0x16), 0xC8);
        assert_eq!(vic.peek(0x18), 0x15);
        assert_eq!(vic.peek(0x1A), 0xF1);
        assert_eq!(vic.peek(0x20), 0xF3);
        assert_eq!(vic.peek(0x2F), 0xFF);
        assert_eq!(vic.peek(0x3F), 0xFF);
    }

    #[test]
    fn raster_compare_msb_comes_from_d011() {
        let mut vic = Vic::new();
        vic.poke(0x12, 0x20);
        vic.poke(0x11, 0x9B);
        assert_eq!(vic.regs.current().irq_line, 0x120);
        vic.poke(0x11, 0x1B);
        assert_eq!(vic.regs.current().irq_line, 0x020);
    }

    #[test]
    fn spy_has_no_side_effects() {
        let mut vic = Vic::new();
        vic.ss_collision = 0x03;
        assert_eq!(vic.spy(0x1E), 0x03);
        assert!(vic.queue.is_empty());
        assert_eq!(vic.peek(0x1E), 0x03);
        assert!(!vic.queue.is_empty());
    }

    #[test]
    fn gray_dot_bug_only_on_856x() {
        let config = VicConfig::new(ChipModel::Pal8565).with_gray_dot_bug(true);
        let mut vic = Vic::with_config(config).expect("valid config");
        vic.poke(0x21, 0x02);
        assert_eq!(vic.regs.delayed().colours[1], 0x0F);

        let config = VicConfig::new(ChipModel::Pal6569R3).with_gray_dot_bug(true);
        let mut vic = Vic::with_config(config).expect("valid config");
        vic.poke(0x21, 0x02);
        assert_eq!(vic.regs.delayed().colours[1], 0x06);
    }

    #[test]
    fn irq_mask_and_ack() {
        let mut vic = Vic::new();
        vic.irr = 0x05;
        vic.poke(0x1A, 0xFF);
        assert_eq!(vic.peek(0x1A), 0xFF);
        assert_eq!(vic.peek(0x19), 0xF5);
        vic.poke(0x19, 0x01);
        assert_eq!(vic.peek(0x19), 0xF4);
        vic.poke(0x1A, 0x00);
        assert_eq!(vic.peek(0x19), 0x74);
    }
}
