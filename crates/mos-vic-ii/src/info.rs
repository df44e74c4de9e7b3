//! Debugger views of the chip state. Nothing here has side effects.

use crate::Vic;
use crate::registers::{BG0, BORDER, DisplayMode, SPR_EX1, SPR_EX2, SPR0};

/// Sequencer, display and interrupt state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VicInfo {
    // Beam and counters
    pub cycle: u8,
    pub scanline: u16,
    pub raster_line: u16,
    pub x_counter: u16,
    pub vc: u16,
    pub vc_base: u16,
    pub rc: u8,
    pub vmli: u8,

    // Display
    pub bad_line: bool,
    pub display_state: bool,
    pub vblank: bool,
    pub display_mode: DisplayMode,
    pub xscroll: u8,
    pub yscroll: u8,
    /// 24 or 25 (RSEL).
    pub rows: u8,
    /// 38 or 40 (CSEL).
    pub columns: u8,
    pub main_border: bool,
    pub vertical_border: bool,
    pub border_colour: u8,
    pub background: [u8; 4],

    // Memory, as 14-bit addresses inside the current bank
    pub screen_base: u16,
    pub char_base: u16,
    pub bitmap_base: u16,

    // Interrupts and light pen
    pub raster_compare: u16,
    pub irr: u8,
    pub imr: u8,
    pub irq: bool,
    pub lightpen_x: u8,
    pub lightpen_y: u8,

    // Sprite sequencer, one bit or entry per sprite
    pub sprite_dma: u8,
    pub sprite_display: u8,
    pub sprite_mc: [u8; 8],
}

/// Register settings and sequencer state of one sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpriteInfo {
    pub enabled: bool,
    /// 9-bit X coordinate.
    pub x: u16,
    pub y: u8,
    pub expand_x: bool,
    pub expand_y: bool,
    /// Drawn behind foreground graphics ($D01B).
    pub behind_foreground: bool,
    pub multicolour: bool,
    pub colour: u8,
    /// Shared multicolours from $D025/$D026.
    pub extra_colours: [u8; 2],
    pub ss_collision: bool,
    pub sb_collision: bool,
    pub dma: bool,
    pub display: bool,
    /// Data address from the last p-access (pointer * 64).
    pub data_address: u16,
    pub mc: u8,
    pub mcbase: u8,
}

impl Vic {
    #[must_use]
    pub fn info(&self) -> VicInfo {
        let regs = self.regs.current();
        let mut background = [0; 4];
        background.copy_from_slice(&regs.colours[BG0..BG0 + 4]);

        VicInfo {
            cycle: self.cycle,
            scanline: self.scanline,
            raster_line: self.y_counter,
            x_counter: self.x_counter,
            vc: self.vc,
            vc_base: self.vc_base,
            rc: self.rc,
            vmli: self.vmli,
            bad_line: self.bad_line,
            display_state: self.display_state,
            vblank: self.vblank,
            display_mode: regs.display_mode(),
            xscroll: regs.xscroll(),
            yscroll: regs.yscroll(),
            rows: if regs.rsel() { 25 } else { 24 },
            columns: if regs.csel() { 40 } else { 38 },
            main_border: self.border.current.main,
            vertical_border: self.border.current.vertical,
            border_colour: regs.colours[BORDER],
            background,
            screen_base: regs.video_matrix_base(),
            char_base: regs.char_base(),
            bitmap_base: regs.bitmap_base(),
            raster_compare: regs.irq_line,
            irr: self.irr,
            imr: self.imr,
            irq: self.irq,
            lightpen_x: self.lp_x,
            lightpen_y: self.lp_y,
            sprite_dma: self.sprites.dma,
            sprite_display: self.sprites.display.current(),
            sprite_mc: self.sprites.mc,
        }
    }

    /// State of sprite `sprite` (0-7).
    ///
    /// # Panics
    ///
    /// Panics if `sprite` is 8 or more.
    #[must_use]
    pub fn sprite_info(&self, sprite: usize) -> SpriteInfo {
        assert!(sprite < 8, "sprite {sprite} out of range");
        let regs = self.regs.current();
        let bit = 1 << sprite;

        SpriteInfo {
            enabled: regs.sprite_enable & bit != 0,
            x: regs.sprite_x[sprite],
            y: regs.sprite_y[sprite],
            expand_x: regs.sprite_expand_x & bit != 0,
            expand_y: regs.sprite_expand_y & bit != 0,
            behind_foreground: regs.sprite_priority & bit != 0,
            multicolour: regs.sprite_multicolour & bit != 0,
            colour: regs.colours[SPR0 + sprite],
            extra_colours: [regs.colours[SPR_EX1], regs.colours[SPR_EX2]],
            ss_collision: self.ss_collision & bit != 0,
            sb_collision: self.sb_collision & bit != 0,
            dma: self.sprites.dma & bit != 0,
            display: self.sprites.display.current() & bit != 0,
            data_address: self.sprites.pointer[sprite],
            mc: self.sprites.mc[sprite],
            mcbase: self.sprites.mcbase[sprite],
        }
    }
}
