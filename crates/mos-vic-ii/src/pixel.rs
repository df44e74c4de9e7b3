//! Pixel synthesis.
//!
//! Each cycle produces an 8-pixel chunk. The border is written first, then
//! the canvas (text or bitmap graphics), then the sprites. Every source
//! carries a depth and a pixel is only written when its depth does not
//! exceed what the chunk already holds there:
//!
//! | source                      | depth       |
//! |-----------------------------|-------------|
//! | border                      | $10         |
//! | sprite in front (MDP = 0)   | $20 + n     |
//! | canvas foreground           | $30         |
//! | sprite behind (MDP = 1)     | $40 + n     |
//! | canvas background           | $50         |
//!
//! Sprite n beats sprite m for n < m because sprites are drawn in order and
//! a column already claimed by a sprite is skipped. The same per-column
//! sprite mask drives collision detection.
//!
//! Registers are read from the snapshot taken at the end of the previous
//! cycle. Writes that land part way through a chunk are switched in at the
//! pixel where the hardware sees them.

use crate::Vic;
use crate::model::ChipModel;
use crate::raster::{IRQ_SPRITE_BACKGROUND, IRQ_SPRITE_SPRITE};
use crate::registers::{BG0, BORDER, SPR_EX1, SPR_EX2, SPR0};

const DEPTH_BORDER: u8 = 0x10;
const DEPTH_SPRITE_FRONT: u8 = 0x20;
const DEPTH_FOREGROUND: u8 = 0x30;
const DEPTH_SPRITE_BEHIND: u8 = 0x40;
const DEPTH_BACKGROUND: u8 = 0x50;

/// Border compare happening in the middle of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BorderEdge {
    None,
    /// Cycle 18, 38 columns: the border ends after pixel 6.
    Left,
    /// Cycle 56, 38 columns: the border starts at pixel 7.
    Right,
}

/// Graphics sequencer shift register.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CanvasShifter {
    pub data: u8,
    /// Video matrix byte of the character being shifted out.
    pub latched_char: u8,
    /// Colour RAM nibble of the character being shifted out.
    pub latched_colour: u8,
    pub mc_flop: bool,
    pub colour_bits: u8,
}

/// Frame store and chunk state.
#[derive(Debug, Clone)]
pub(crate) struct PixelEngine {
    frames: [Vec<u32>; 2],
    /// Buffer being drawn; the other one holds the last complete frame.
    active: usize,
    width: usize,
    height: usize,
    z: [u8; 8],
    /// Columns of this chunk holding canvas foreground.
    foreground: u8,
    /// Sprites drawn into each column of this chunk.
    collision: [u8; 8],
    pub canvas: CanvasShifter,
    /// Set between cycles 18 and 57, where the shift register may reload.
    pub can_load: bool,
}

impl PixelEngine {
    pub fn new(model: ChipModel) -> Self {
        let width = usize::from(model.cycles_per_line()) * 8;
        let height = usize::from(model.lines_per_frame());
        Self {
            frames: [
                vec![0xFF00_0000; width * height],
                vec![0xFF00_0000; width * height],
            ],
            active: 0,
            width,
            height,
            z: [0xFF; 8],
            foreground: 0,
            collision: [0; 8],
            canvas: CanvasShifter::default(),
            can_load: false,
        }
    }

    pub fn begin_chunk(&mut self) {
        self.z = [0xFF; 8];
        self.foreground = 0;
    }

    pub fn swap(&mut self) {
        self.active ^= 1;
    }

    /// The last complete frame.
    pub fn frame(&self) -> &[u32] {
        &self.frames[self.active ^ 1]
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn put(&mut self, row: usize, column: usize, argb: u32) {
        let index = row * self.width + column;
        if let Some(pixel) = self.frames[self.active].get_mut(index) {
            *pixel = argb;
        }
    }
}

impl Vic {
    /// Write `colour` at `pixel` of this chunk if `depth` wins.
    fn set_pixel(&mut self, pixel: usize, colour: u8, depth: u8) -> bool {
        if depth > self.pixels.z[pixel] {
            return false;
        }
        self.pixels.z[pixel] = depth;
        let column = usize::from(self.cycle - 1) * 8 + pixel;
        let argb = self.palette[usize::from(colour & 0x0F)];
        self.pixels.put(usize::from(self.scanline), column, argb);
        true
    }

    /// Border and canvas for one visible cycle.
    pub(crate) fn draw(&mut self, edge: BorderEdge) {
        if self.vblank {
            return;
        }
        self.draw_border(edge);
        self.draw_canvas();
    }

    fn draw_border(&mut self, edge: BorderEdge) {
        let delayed = self.border.delayed.main;
        let current = self.border.current.main;
        let old = self.regs.delayed().colours[BORDER];
        let new = self.regs.current().colours[BORDER];

        match edge {
            BorderEdge::Left if delayed && !current => {
                self.set_pixel(0, old, DEPTH_BORDER);
                for pixel in 1..=6 {
                    self.set_pixel(pixel, new, DEPTH_BORDER);
                }
            }
            BorderEdge::Right if !delayed && current => {
                self.set_pixel(7, old, DEPTH_BORDER);
            }
            _ if delayed => {
                self.set_pixel(0, old, DEPTH_BORDER);
                for pixel in 1..8 {
                    self.set_pixel(pixel, new, DEPTH_BORDER);
                }
            }
            _ => {}
        }
    }

    /// Canvas pixels for one chunk.
    ///
    /// A CPU write lands in phi2 while the sequencer is already shifting out
    /// the chunk, so the new value reaches each part of the pixel pipeline at
    /// a different pixel. The chunk starts from the previous cycle's
    /// registers and switches over at fixed points:
    ///
    /// | pixel | change                                              |
    /// |-------|-----------------------------------------------------|
    /// | 1     | background colours $D021-$D024                      |
    /// | 4     | MCM from $D016; on the 656x, newly set ECM/BMM bits |
    /// | 6     | on the 656x, newly cleared ECM/BMM bits             |
    /// | 7     | the multicolour shift clock follows MCM             |
    ///
    /// The 856x keeps the old ECM and BMM for the whole chunk. XSCROLL is
    /// sampled once, at the start.
    fn draw_canvas(&mut self) {
        let delayed = self.regs.delayed();
        let current = self.regs.current();
        let old_chip = !self.config.model.is_856x();
        let xscroll = delayed.xscroll();

        let mut d011 = delayed.ctrl1;
        let mut d016 = delayed.ctrl2;
        let mut mode = (d011 & 0x60) | (d016 & 0x10);
        let mut colours = delayed.colours;

        self.draw_canvas_pixel(0, mode, d016, xscroll, &colours);

        // Background colour writes show up from pixel 1
        colours[BG0..BG0 + 4].copy_from_slice(&current.colours[BG0..BG0 + 4]);
        self.regs.delayed_mut().colours[BG0..BG0 + 4]
            .copy_from_slice(&current.colours[BG0..BG0 + 4]);

        for pixel in 1..=3 {
            self.draw_canvas_pixel(pixel, mode, d016, xscroll, &colours);
        }

        // A new $D016 selects the mode from pixel 4; the 656x also lets set
        // bits of a new $D011 through here
        let new_d016 = current.ctrl2;
        if old_chip {
            d011 |= current.ctrl1;
        }
        mode = (d011 & 0x60) | (new_d016 & 0x10);

        self.draw_canvas_pixel(4, mode, d016, xscroll, &colours);
        self.draw_canvas_pixel(5, mode, d016, xscroll, &colours);

        // ...and its cleared bits from pixel 6
        if old_chip {
            d011 = current.ctrl1;
            mode = (d011 & 0x60) | (new_d016 & 0x10);
        }

        self.draw_canvas_pixel(6, mode, d016, xscroll, &colours);

        // MCM switching on resets the multicolour flip-flop before pixel 7
        if d016 != new_d016 {
            if d016 & 0x10 == 0 && new_d016 & 0x10 != 0 {
                self.pixels.canvas.mc_flop = false;
            }
            d016 = new_d016;
        }

        self.draw_canvas_pixel(7, mode, d016, xscroll, &colours);
    }

    /// Reload the graphics shift register from the g-access two cycles ago.
    fn load_canvas_shifter(&mut self) {
        if self.border.delayed.vertical || !self.pixels.can_load {
            return;
        }
        let fetched = self.g_access.read(2);
        let sr = &mut self.pixels.canvas;
        sr.data = fetched as u8;
        sr.latched_colour = (fetched >> 8) as u8;
        sr.latched_char = (fetched >> 16) as u8;
        sr.mc_flop = true;
    }

    fn draw_canvas_pixel(
        &mut self,
        pixel: usize,
        mode: u8,
        d016: u8,
        xscroll: u8,
        colours: &[u8; 15],
    ) {
        if pixel == usize::from(xscroll) {
            self.load_canvas_shifter();
        }

        let sr = &mut self.pixels.canvas;
        let mc_bit = sr.latched_colour & 0x08;
        let bmm_or_mc = mode & 0x20 != 0 || mc_bit != 0;
        let multicolour_display = mode & 0x10 != 0 && bmm_or_mc;
        let multicolour_shift = d016 & 0x10 != 0 && bmm_or_mc;

        if multicolour_shift {
            if sr.mc_flop {
                sr.colour_bits = (sr.data >> 6) >> u8::from(!multicolour_display);
            }
        } else {
            sr.colour_bits = (sr.data >> 7) << u8::from(multicolour_display);
        }
        sr.data <<= 1;
        sr.mc_flop = !sr.mc_flop;

        let bits = sr.colour_bits;
        let chr = sr.latched_char;
        let col = sr.latched_colour;

        // ECM BMM MCM MC-bit colour-bits
        let colour = match ((mode | mc_bit) >> 1) | bits {
            // Standard text, multicolour text with MC clear
            0x00..=0x0B if bits & 1 == 0 => colours[BG0],
            0x00..=0x0B => col,
            // Multicolour text
            0x0C => colours[BG0],
            0x0D => colours[BG0 + 1],
            0x0E => colours[BG0 + 2],
            0x0F => col & 0x07,
            // Standard bitmap
            0x10..=0x17 if bits & 1 == 0 => chr & 0x0F,
            0x10..=0x17 => chr >> 4,
            // Multicolour bitmap
            0x18..=0x1F => match bits {
                0 => colours[BG0],
                1 => chr >> 4,
                2 => chr & 0x0F,
                _ => col,
            },
            // ECM text
            0x20..=0x27 if bits & 1 == 0 => colours[BG0 + usize::from(chr >> 6)],
            0x20..=0x27 => col,
            // ECM with BMM or MCM: black, but pixels still collide
            _ => 0,
        };

        let foreground = if multicolour_display {
            bits & 0x02 != 0
        } else {
            bits != 0
        };

        if foreground {
            if self.set_pixel(pixel, colour, DEPTH_FOREGROUND) {
                self.pixels.foreground |= 1 << pixel;
            }
        } else {
            self.set_pixel(pixel, colour, DEPTH_BACKGROUND);
        }
    }

    /// Sprite layer for one cycle, visible or not.
    pub(crate) fn draw_sprites(&mut self) {
        let display = self.sprites.display.current();
        let display_delayed = self.sprites.display_delayed();
        let first = self.sprites.first_dma;
        let second = self.sprites.second_dma;
        if display | display_delayed | first | second == 0 {
            return;
        }

        self.pixels.collision = [0; 8];
        let current = self.regs.current();

        self.draw_sprite_pixel(0, display_delayed, second);

        // Sprite colour writes show up from pixel 1
        self.regs.delayed_mut().colours[SPR_EX1..].copy_from_slice(&current.colours[SPR_EX1..]);

        self.draw_sprite_pixel(1, display_delayed, second);

        // The second s-access stops the shift register
        self.sprites.sr_active &= !second;

        self.draw_sprite_pixel(2, display_delayed, second);
        self.draw_sprite_pixel(3, display_delayed, first | second);

        // Freshly fetched data enters the shift register here
        for sprite in 0..8 {
            if second & (1 << sprite) != 0 {
                self.sprites.shifters[sprite].load();
            }
        }

        self.draw_sprite_pixel(4, display, first | second);
        self.draw_sprite_pixel(5, display, first | second);

        {
            let delayed = self.regs.delayed_mut();
            delayed.sprite_expand_x = current.sprite_expand_x;
            delayed.sprite_priority = current.sprite_priority;
        }

        let toggled = self.regs.delayed().sprite_multicolour ^ current.sprite_multicolour;
        let new_chip = self.config.model.is_856x();
        if toggled != 0 && new_chip {
            self.regs.delayed_mut().sprite_multicolour = current.sprite_multicolour;
            for (i, shifter) in self.sprites.shifters.iter_mut().enumerate() {
                if toggled & (1 << i) != 0 {
                    shifter.mc_flop ^= !shifter.exp_flop;
                }
            }
        }

        self.draw_sprite_pixel(6, display, first | second);

        if toggled != 0 && !new_chip {
            self.regs.delayed_mut().sprite_multicolour = current.sprite_multicolour;
            for (i, shifter) in self.sprites.shifters.iter_mut().enumerate() {
                if toggled & (1 << i) != 0 {
                    shifter.mc_flop = false;
                }
            }
        }

        self.draw_sprite_pixel(7, display, first);

        self.check_collisions();
    }

    /// One pixel column for all sprites. Sprites in `freeze` are being
    /// fetched and neither start nor shift.
    fn draw_sprite_pixel(&mut self, pixel: usize, enable: u8, freeze: u8) {
        if enable == 0 && self.sprites.sr_active == 0 {
            return;
        }

        let regs = self.regs.delayed();
        let x = self.x_counter + pixel as u16;

        for sprite in 0..8 {
            let bit = 1 << sprite;
            let enabled = enable & bit != 0;
            let mut active = self.sprites.sr_active & bit != 0;
            if !enabled && !active {
                continue;
            }

            let frozen = freeze & bit != 0;
            let multicolour = regs.sprite_multicolour & bit != 0;
            let expand_x = regs.sprite_expand_x & bit != 0;
            let sr = &mut self.sprites.shifters[sprite];

            if enabled && !active && !frozen && x == regs.sprite_x[sprite] {
                self.sprites.sr_active |= bit;
                active = true;
                sr.exp_flop = true;
                sr.mc_flop = true;
            }
            if !active {
                continue;
            }

            if !frozen {
                if sr.exp_flop {
                    if multicolour {
                        if sr.mc_flop {
                            sr.col_bits = ((sr.data >> 22) & 0x03) as u8;
                        }
                        sr.mc_flop = !sr.mc_flop;
                    } else {
                        sr.col_bits = ((sr.data >> 22) & 0x02) as u8;
                    }
                    sr.data = (sr.data << 1) & 0x00FF_FFFF;

                    if sr.data == 0 && sr.col_bits == 0 {
                        self.sprites.sr_active &= !bit;
                    }
                }
                sr.exp_flop = !sr.exp_flop || !expand_x;
            }

            let col_bits = sr.col_bits;
            if col_bits == 0 {
                continue;
            }
            if self.pixels.collision[pixel] == 0 && !self.config.hide_sprites {
                let colour = match col_bits {
                    1 => regs.colours[SPR_EX1],
                    2 => regs.colours[SPR0 + sprite],
                    _ => regs.colours[SPR_EX2],
                };
                let depth = if regs.sprite_priority & bit != 0 {
                    DEPTH_SPRITE_BEHIND
                } else {
                    DEPTH_SPRITE_FRONT
                } | sprite as u8;
                self.set_sprite_pixel(pixel, colour, depth);
            }
            self.pixels.collision[pixel] |= bit;
        }
    }

    /// Sprites only reach the frame buffer in visible columns, but always
    /// claim the column's depth.
    fn set_sprite_pixel(&mut self, pixel: usize, colour: u8, depth: u8) {
        if depth > self.pixels.z[pixel] {
            return;
        }
        if self.visible_column {
            self.set_pixel(pixel, colour, depth);
        } else {
            self.pixels.z[pixel] = depth;
        }
    }

    fn check_collisions(&mut self) {
        for pixel in 0..8 {
            let sprites = self.pixels.collision[pixel];
            if sprites == 0 {
                continue;
            }

            // Two or more sprites in one column
            if sprites & (sprites - 1) != 0 && self.config.check_ss_collisions {
                if self.ss_collision == 0 {
                    self.trigger_irq(IRQ_SPRITE_SPRITE);
                }
                self.ss_collision |= sprites;
            }

            if self.pixels.foreground & (1 << pixel) != 0 && self.config.check_sb_collisions {
                if self.sb_collision == 0 {
                    self.trigger_irq(IRQ_SPRITE_BACKGROUND);
                }
                self.sb_collision |= sprites;
            }
        }
    }
}
