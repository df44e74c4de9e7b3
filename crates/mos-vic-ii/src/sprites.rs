//! Sprite sequencer: DMA switching, data counters and Y expansion.
//!
//! Each sprite has a 6-bit data counter MC and its line start MCBASE. DMA
//! for a sprite is switched on in cycles 55/56 when it is enabled and its Y
//! coordinate equals the low byte of the raster counter. Every line the
//! three s-accesses advance MC by 3, and in cycle 16 MCBASE catches up with
//! MC whenever the expansion flip-flop is set. The flip-flop toggles once
//! per line with $D017, so a Y-expanded sprite repeats each line. When
//! MCBASE reaches 63 the DMA switches itself off.

use crate::Vic;
use crate::delayed::DelayedRegister;

/// Output stage of one sprite: the 24-bit shift register and its flip-flops.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SpriteShifter {
    /// Bytes from the three s-accesses, in fetch order.
    pub chunks: [u8; 3],
    /// 24-bit shift register, MSB first.
    pub data: u32,
    /// X expansion: shift only every other pixel when stretched.
    pub exp_flop: bool,
    /// Multicolour: fetch two new bits every other pixel.
    pub mc_flop: bool,
    /// Colour bits of the pixel being output (0 is transparent).
    pub col_bits: u8,
}

impl SpriteShifter {
    /// Move the fetched bytes into the shift register.
    pub fn load(&mut self) {
        let [a, b, c] = self.chunks;
        self.data = u32::from(a) << 16 | u32::from(b) << 8 | u32::from(c);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SpriteUnit {
    /// DMA enabled, one bit per sprite.
    pub dma: u8,
    /// Y expansion flip-flops (set means "advance MCBASE").
    pub expansion_ff: u8,
    /// $D017 bits cleared by the CPU in the current line before cycle 16.
    pub cleared_bits_in_d017: u8,
    /// Sprite display enable. The renderer reads it two entries back.
    pub display: DelayedRegister<u8, 3>,
    /// Sprite whose first s-access happened in the previous cycle.
    pub first_dma: u8,
    /// Sprite whose second s-access is the current phi1 fetch.
    pub second_dma: u8,
    pub mc: [u8; 8],
    pub mcbase: [u8; 8],
    /// Data pointer from the p-access, already multiplied by 64.
    pub pointer: [u16; 8],
    pub shifters: [SpriteShifter; 8],
    /// Shift registers currently outputting pixels.
    pub sr_active: u8,
}

impl SpriteUnit {
    pub fn new(is_856x: bool) -> Self {
        Self {
            dma: 0,
            expansion_ff: 0xFF,
            cleared_bits_in_d017: 0,
            display: DelayedRegister::new(0),
            first_dma: 0,
            second_dma: 0,
            mc: [0; 8],
            mcbase: [if is_856x { 0x00 } else { 0x3F }; 8],
            pointer: [0; 8],
            shifters: [SpriteShifter::default(); 8],
            sr_active: 0,
        }
    }

    /// Display enable as seen by the renderer.
    pub fn display_delayed(&self) -> u8 {
        self.display.read(2)
    }
}

impl Vic {
    /// Sprites whose Y coordinate matches the raster counter.
    fn compare_sprite_y(&self) -> u8 {
        let regs = self.regs.current();
        let line = self.y_counter as u8;
        regs.sprite_y
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &y)| acc | (u8::from(y == line) << i))
    }

    /// Cycles 55 and 56.
    pub(crate) fn turn_sprite_dma_on(&mut self) {
        let rising =
            !self.sprites.dma & (self.regs.current().sprite_enable & self.compare_sprite_y());
        for i in 0..8 {
            if rising & (1 << i) != 0 {
                self.sprites.mcbase[i] = 0;
            }
        }
        self.sprites.dma |= rising;
        self.sprites.expansion_ff |= rising;
    }

    /// Cycle 16.
    pub(crate) fn turn_sprite_dma_off(&mut self) {
        let sprites = &mut self.sprites;
        for i in 0..8 {
            let bit = 1 << i;
            if sprites.expansion_ff & bit == 0 {
                continue;
            }
            if sprites.cleared_bits_in_d017 & bit != 0 {
                // $D017 cleared in cycle 15 mixes old and new counter bits
                let (base, mc) = (sprites.mcbase[i], sprites.mc[i]);
                sprites.mcbase[i] = (0b10_1010 & (base & mc)) | (0b01_0101 & (base | mc));
            } else {
                sprites.mcbase[i] = sprites.mc[i];
            }
            if sprites.mcbase[i] == 63 {
                sprites.dma &= !bit;
            }
        }
    }

    /// Cycle 56.
    pub(crate) fn toggle_expansion_flipflop(&mut self) {
        self.sprites.expansion_ff ^= self.regs.current().sprite_expand_y;
    }

    /// Cycle 58: reload MC and switch the display on for sprites starting
    /// in this line, off for sprites whose DMA has ended.
    pub(crate) fn turn_sprites_on_or_off(&mut self) {
        self.sprites.mc = self.sprites.mcbase;
        let mut display = self.sprites.display.current();
        display |= self.regs.current().sprite_enable & self.compare_sprite_y();
        display &= self.sprites.dma;
        self.sprites.display.write(display);
    }

    /// $D017 write. The flip-flop is held set while the bit is clear.
    pub(crate) fn write_sprite_expand_y(&mut self, value: u8) {
        self.regs.current_mut().sprite_expand_y = value;
        self.sprites.cleared_bits_in_d017 = !value & !self.sprites.expansion_ff;
        self.sprites.expansion_ff |= !value;
    }
}
