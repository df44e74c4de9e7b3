//! MOS 6569/6567/8565/8562 VIC-II video chip emulator.
//!
//! The chip is clocked once per CPU cycle. Each call to [`Vic::tick`] runs
//! one bus cycle: both memory phases, the raster and sprite sequencers, the
//! border unit and an 8-pixel chunk of output. The return value is the BA
//! line; while it is asserted the CPU must stall on its next read.
//!
//! Memory is reached through the [`VicBus`] trait so the embedding machine
//! decides banking and character ROM visibility. The interrupt line is
//! polled with [`Vic::irq_line`].
//!
//! # Register map ($D000-$D02E, mirrored every 64 bytes)
//!
//! | Addr      | Register                                   |
//! |-----------|--------------------------------------------|
//! | $00-$0F   | Sprite 0-7 X (low byte) and Y              |
//! | $10       | Sprite X bit 8                             |
//! | $11       | Control 1: RST8 ECM BMM DEN RSEL YSCROLL   |
//! | $12       | Raster counter / compare line              |
//! | $13-$14   | Light pen X/Y (read-only)                  |
//! | $15       | Sprite enable                              |
//! | $16       | Control 2: RES MCM CSEL XSCROLL            |
//! | $17       | Sprite Y expansion                         |
//! | $18       | Memory pointers: VM13-VM10 CB13-CB11       |
//! | $19       | Interrupt request (write 1 to acknowledge) |
//! | $1A       | Interrupt mask                             |
//! | $1B       | Sprite priority (1 = behind foreground)    |
//! | $1C       | Sprite multicolour                         |
//! | $1D       | Sprite X expansion                         |
//! | $1E       | Sprite-sprite collision (read clears)      |
//! | $1F       | Sprite-background collision (read clears)  |
//! | $20       | Border colour                              |
//! | $21-$24   | Background colours 0-3                     |
//! | $25-$26   | Sprite multicolours 0-1                    |
//! | $27-$2E   | Sprite 0-7 colours                         |
//! | $2F-$3F   | Unused, read $FF                           |
//!
//! # Frame store
//!
//! Every cycle of every line produces eight pixels, so a frame is
//! `cycles_per_line * 8` pixels wide and `lines_per_frame` high, blanking
//! included. Output is ARGB32 and double buffered: [`Vic::frame`] returns
//! the last complete frame while the next one is drawn.

#![allow(clippy::cast_possible_truncation)]

mod access;
mod border;
mod bus;
mod config;
mod cycles;
mod delayed;
mod events;
mod info;
mod model;
mod palette;
mod pixel;
mod raster;
mod registers;
mod sprites;

#[cfg(feature = "png")]
pub mod capture;

use log::debug;

pub use border::FlipFlops;
pub use bus::{BankedMemory, VicBus};
pub use config::{ConfigError, VicConfig};
pub use delayed::DelayedRegister;
pub use info::{SpriteInfo, VicInfo};
pub use model::{ChipModel, ChipTraits, VideoStandard};
pub use palette::{PaletteKind, palette};
pub use raster::{IRQ_LIGHTPEN, IRQ_RASTER, IRQ_SPRITE_BACKGROUND, IRQ_SPRITE_SPRITE};
pub use registers::{DisplayMode, RegisterFile};

use border::BorderUnit;
use events::{Action, DelayQueue};
use pixel::PixelEngine;
use sprites::SpriteUnit;

/// MOS VIC-II video chip.
pub struct Vic {
    config: VicConfig,
    /// ARGB32 colours for the 16 colour codes.
    palette: [u32; 16],

    // Beam position
    /// Current cycle within the line, 1-based.
    cycle: u8,
    /// Physical line since the start of the frame.
    scanline: u16,
    /// Sprite X coordinate of the first pixel of this cycle.
    x_counter: u16,
    /// Raster counter as seen in $D011/$D012.
    y_counter: u16,

    /// Registers as written, and as at the end of the previous cycle.
    regs: DelayedRegister<RegisterFile, 2>,
    queue: DelayQueue,

    /// Last byte fetched in phi1.
    data_bus_phi1: u8,
    /// Last byte on the bus in phi2; floats to $FF at the end of a cycle.
    data_bus_phi2: u8,

    // Sequencer
    bad_line: bool,
    /// DEN was set during line $30.
    den_seen: bool,
    display_state: bool,
    vc: u16,
    vc_base: u16,
    rc: u8,
    vmli: u8,
    refresh: u8,
    video_matrix: [u8; 64],
    colour_line: [u8; 64],
    /// Graphics fetches, consumed two cycles late by the shift register.
    g_access: DelayedRegister<u32, 3>,
    /// Non-zero while BA is low: bit n for sprite n, or 1 for a bad line.
    ba_line: DelayedRegister<u8, 4>,

    // Interrupts
    raster_irq_match: bool,
    vblank: bool,
    irr: u8,
    imr: u8,
    irq: bool,
    ss_collision: u8,
    sb_collision: u8,

    // Light pen
    /// Level of the light-pen input (active low).
    lp_line: bool,
    lp_x: u8,
    lp_y: u8,
    lp_irq_occurred: bool,

    /// Between cycles 14 and 61, where sprite pixels reach the frame.
    visible_column: bool,
    border: BorderUnit,
    sprites: SpriteUnit,
    pixels: PixelEngine,

    frame_complete: bool,
    frame_count: u64,
}

impl Vic {
    /// Create a PAL 6569R3 with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::build(VicConfig::default())
    }

    pub fn with_config(config: VicConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Power-on state: the beam sits in the last cycle of the last line, so
    /// the first tick starts a frame.
    fn build(config: VicConfig) -> Self {
        let model = config.model;
        let lines = model.lines_per_frame();
        let scanline = lines - 1;
        let regs = RegisterFile::power_on();

        Self {
            config,
            palette: palette(
                model,
                config.brightness,
                config.contrast,
                config.saturation,
                config.palette,
            ),
            cycle: model.cycles_per_line(),
            scanline,
            x_counter: 0,
            y_counter: lines - model.y_wrap_line() - 1,
            regs: DelayedRegister::new(regs),
            queue: DelayQueue::new(),
            data_bus_phi1: 0xFF,
            data_bus_phi2: 0xFF,
            bad_line: false,
            den_seen: false,
            display_state: false,
            vc: 0,
            vc_base: 0,
            rc: 0,
            vmli: 0,
            refresh: 0xFF,
            video_matrix: [0; 64],
            colour_line: [0; 64],
            g_access: DelayedRegister::new(0),
            ba_line: DelayedRegister::new(0),
            raster_irq_match: false,
            vblank: model.is_vblank(scanline),
            irr: 0,
            imr: 0,
            irq: false,
            ss_collision: 0,
            sb_collision: 0,
            lp_line: true,
            lp_x: 0,
            lp_y: 0,
            lp_irq_occurred: false,
            visible_column: false,
            border: BorderUnit::new(&regs),
            sprites: SpriteUnit::new(model.is_856x()),
            pixels: PixelEngine::new(model),
            frame_complete: false,
            frame_count: 0,
        }
    }

    /// Return to power-on state, keeping the configuration.
    pub fn reset(&mut self) {
        debug!("VIC-II reset ({})", self.config.model);
        *self = Self::build(self.config);
    }

    /// Run one cycle. Returns `true` while BA is low.
    pub fn tick<B: VicBus>(&mut self, bus: &B) -> bool {
        self.process_events();

        if self.cycle == self.config.model.cycles_per_line() {
            self.cycle = 1;
            self.scanline += 1;
            if self.scanline == self.config.model.lines_per_frame() {
                self.scanline = 0;
            }
        } else {
            self.cycle += 1;
        }

        self.execute_cycle(bus);
        self.end_cycle();

        self.ba_line.current() != 0
    }

    /// Run until the current frame is complete. Returns the number of
    /// cycles executed.
    pub fn run_frame<B: VicBus>(&mut self, bus: &B) -> u32 {
        let mut cycles = 0;
        self.frame_complete = false;
        while !self.frame_complete {
            self.tick(bus);
            cycles += 1;
        }
        self.frame_complete = false;
        cycles
    }

    fn process_events(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        for action in self.queue.drain().iter() {
            match action {
                Action::UpdateIrqLine => self.update_irq_line(),
                Action::UpdateFlipflops => self.border.latch(),
                Action::SetDisplayState => self.set_display_state(),
                Action::LightpenTransition => self.check_for_lightpen_irq(),
                Action::ClearSpriteSpriteCollision => self.ss_collision = 0,
                Action::ClearSpriteBackgroundCollision => self.sb_collision = 0,
            }
        }
    }

    fn end_cycle(&mut self) {
        self.data_bus_phi2 = 0xFF;
        self.x_counter = if self.cycle == 14 {
            0
        } else {
            self.x_counter.wrapping_add(8)
        };

        self.ba_line.advance();
        self.g_access.advance();
        self.regs.advance();
        self.sprites.display.advance();

        if self.cycle == self.config.model.cycles_per_line() {
            self.end_line();
            if self.scanline == self.config.model.lines_per_frame() - 1 {
                self.end_frame();
            }
        }
    }

    /// Interrupt output (active high here; the pin is active low).
    #[must_use]
    pub fn irq_line(&self) -> bool {
        self.irq
    }

    /// The last complete frame, ARGB32, row-major.
    #[must_use]
    pub fn frame(&self) -> &[u32] {
        self.pixels.frame()
    }

    #[must_use]
    pub fn frame_width(&self) -> u32 {
        self.pixels.width() as u32
    }

    #[must_use]
    pub fn frame_height(&self) -> u32 {
        self.pixels.height() as u32
    }

    /// Whether a frame finished since the last call.
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    /// Recompute the palette.
    pub fn set_palette_params(
        &mut self,
        brightness: u8,
        contrast: u8,
        saturation: u8,
    ) -> Result<(), ConfigError> {
        let config = self
            .config
            .with_picture(brightness, contrast, saturation);
        config.validate()?;
        debug!("VIC-II palette: brightness {brightness} contrast {contrast} saturation {saturation}");
        self.config = config;
        self.update_palette();
        Ok(())
    }

    /// Apply a new configuration. Changing the chip model resets the chip.
    pub fn set_config(&mut self, config: VicConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config.model == self.config.model {
            self.config = config;
            self.update_palette();
        } else {
            debug!("VIC-II model {} -> {}", self.config.model, config.model);
            *self = Self::build(config);
        }
        Ok(())
    }

    fn update_palette(&mut self) {
        let c = &self.config;
        self.palette = palette(c.model, c.brightness, c.contrast, c.saturation, c.palette);
    }

    #[must_use]
    pub fn config(&self) -> &VicConfig {
        &self.config
    }

    #[must_use]
    pub fn model(&self) -> ChipModel {
        self.config.model
    }

    /// ARGB32 value of a colour code.
    #[must_use]
    pub fn colour(&self, code: u8) -> u32 {
        self.palette[usize::from(code & 0x0F)]
    }

    #[must_use]
    pub fn cycle(&self) -> u8 {
        self.cycle
    }

    #[must_use]
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Raster counter ($D012 plus bit 8).
    #[must_use]
    pub fn raster_line(&self) -> u16 {
        self.y_counter
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Vic {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_starts_a_frame() {
        let mut vic = Vic::new();
        let mem = BankedMemory::new();
        vic.tick(&mem);
        assert_eq!((vic.scanline(), vic.cycle()), (0, 1));
        assert_eq!(vic.raster_line(), 311, "wraps in cycle 2");
        vic.tick(&mem);
        assert_eq!(vic.raster_line(), 0);
    }

    #[test]
    fn ntsc_raster_runs_ahead_of_scanline() {
        let mut vic = Vic::with_config(VicConfig::new(ChipModel::Ntsc6567)).expect("valid config");
        let mem = BankedMemory::new();
        vic.tick(&mem);
        assert_eq!((vic.scanline(), vic.raster_line()), (0, 25));
    }

    #[test]
    fn run_frame_counts_cycles() {
        for model in ChipModel::ALL {
            let mut vic = Vic::with_config(VicConfig::new(model)).expect("valid config");
            let mem = BankedMemory::new();
            assert_eq!(vic.run_frame(&mem), model.cycles_per_frame(), "{model}");
            assert_eq!(vic.run_frame(&mem), model.cycles_per_frame(), "{model}");
            assert_eq!(vic.frame_count(), 2);
        }
    }

    #[test]
    fn frame_covers_the_whole_raster() {
        let vic = Vic::new();
        assert_eq!((vic.frame_width(), vic.frame_height()), (504, 312));
        assert_eq!(vic.frame().len(), 504 * 312);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = VicConfig::default().with_picture(50, 100, 120);
        assert!(matches!(
            Vic::with_config(config),
            Err(ConfigError::SaturationOutOfRange(120))
        ));
    }

    #[test]
    fn model_change_rebuilds_frame_store() {
        let mut vic = Vic::new();
        vic.set_config(VicConfig::new(ChipModel::Ntsc6567))
            .expect("valid config");
        assert_eq!((vic.frame_width(), vic.frame_height()), (520, 263));
        assert_eq!(vic.cycle(), 65);
    }

    #[test]
    fn palette_params_keep_state() {
        let mut vic = Vic::new();
        let mem = BankedMemory::new();
        for _ in 0..100 {
            vic.tick(&mem);
        }
        let before = vic.colour(0);
        vic.set_palette_params(80, 100, 50).expect("in range");
        assert_ne!(vic.colour(0), before);
        assert_eq!((vic.scanline(), vic.cycle()), (1, 37));
        assert!(vic.set_palette_params(101, 100, 50).is_err());
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut vic = Vic::new();
        let mem = BankedMemory::new();
        vic.poke(0x20, 0x02);
        vic.run_frame(&mem);
        vic.reset();
        assert_eq!(vic.spy(0x20), 0xFE);
        assert_eq!(vic.frame_count(), 0);
        assert_eq!(vic.cycle(), 63);
    }
}
