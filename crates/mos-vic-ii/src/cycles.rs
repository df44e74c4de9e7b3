//! Per-cycle dispatch.
//!
//! Every cycle runs its steps in the same order:
//!
//! 1. the phi2 sprite fetch left over from the previous cycle
//! 2. frame logic (border flip-flops)
//! 3. drawing
//! 4. the phi1 fetch
//! 5. raster interrupt, sprite logic and VC/RC logic
//! 6. BA
//! 7. a phi2 fetch that belongs to this cycle (c-accesses, NTSC s-accesses)
//!
//! PAL lines have 63 cycles and fetch sprites 3-7 in cycles 1-10 and
//! sprites 0-2 in cycles 58-63. NTSC lines have 65 cycles and the sprite
//! slots sit one cycle later. The 6567R56A has 64 cycles; its last cycle
//! does the work of NTSC cycles 64 and 65.

use crate::Vic;
use crate::bus::VicBus;
use crate::model::VideoStandard;
use crate::pixel::BorderEdge;

const S0: u8 = 0x01;
const S1: u8 = 0x02;
const S2: u8 = 0x04;
const S3: u8 = 0x08;
const S4: u8 = 0x10;
const S5: u8 = 0x20;
const S6: u8 = 0x40;
const S7: u8 = 0x80;

impl Vic {
    pub(crate) fn execute_cycle(&mut self, bus: &dyn VicBus) {
        self.pixels.begin_chunk();

        if self.cycle == 1 {
            if self.scanline == 0 {
                self.begin_frame();
            }
            self.begin_line();
        }

        match self.config.model.standard() {
            VideoStandard::Pal => self.pal_cycle(bus),
            VideoStandard::Ntsc => self.ntsc_cycle(bus),
        }
    }

    /// Pull BA low for the sprites in `mask` that have DMA.
    fn sprite_ba(&mut self, mask: u8) {
        self.update_ba(self.sprites.dma & mask);
    }

    fn bad_line_ba(&mut self) {
        self.update_ba(u8::from(self.bad_line));
    }

    /// Cycle 2: a light-pen input held low re-triggers at frame start.
    fn lightpen_frame_start(&mut self) {
        if !self.lp_line && self.scanline == 0 {
            self.check_for_lightpen_irq_at_frame_start();
        }
    }

    /// Cycle 2: the y counter returns to 0 on the wrap line.
    fn wrap_y_counter(&mut self) {
        if self.y_counter_overflow() {
            self.y_counter = 0;
            self.check_for_raster_irq();
        }
    }

    /// Cycle 1 frame logic: a bottom compare match in this cycle sets the
    /// vertical flip-flop at once.
    fn first_cycle_frame_logic(&mut self) {
        self.check_vertical_flipflop();
        if self.border.vertical_pending() {
            self.set_vertical_flipflop(true);
        }
    }

    /// Cycles 11-58 are the same on both standards apart from BA and the
    /// fetch in cycles 55, 57 and 58.
    fn common_cycle(&mut self, bus: &dyn VicBus) {
        let pal = self.config.model.is_pal();
        self.check_vertical_flipflop();

        match self.cycle {
            11 => {
                self.draw_sprites();
                self.s_finalize();
                self.r_access(bus);
                self.update_ba(0);
            }
            12 | 13 => {
                self.draw_sprites();
                self.r_access(bus);
                self.bad_line_ba();
            }
            14 => {
                self.visible_column = true;
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.r_access(bus);
                self.load_video_counter();
                self.bad_line_ba();
            }
            15 => {
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.r_access(bus);
                self.bad_line_ba();
                if self.bad_line {
                    self.c_access(bus);
                }
                self.sprites.cleared_bits_in_d017 = 0;
            }
            16 => {
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.g_access(bus);
                self.turn_sprite_dma_off();
                self.bad_line_ba();
                if self.bad_line {
                    self.c_access(bus);
                }
            }
            17 | 18 => {
                let edge = if self.cycle == 17 {
                    self.check_left_border(24);
                    BorderEdge::None
                } else {
                    self.check_left_border(31);
                    self.pixels.can_load = true;
                    BorderEdge::Left
                };
                self.draw(edge);
                self.draw_sprites();
                self.g_access(bus);
                self.bad_line_ba();
                if self.bad_line {
                    self.c_access(bus);
                }
            }
            19..=54 => {
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.g_access(bus);
                self.bad_line_ba();
                if self.bad_line {
                    self.c_access(bus);
                }
            }
            55 => {
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.g_access(bus);
                self.turn_sprite_dma_on();
                if pal {
                    self.sprite_ba(S0);
                } else {
                    self.update_ba(0);
                }
            }
            56 => {
                self.check_right_border(335);
                self.draw(BorderEdge::Right);
                self.draw_sprites();
                self.i_access(bus);
                self.turn_sprite_dma_on();
                self.toggle_expansion_flipflop();
                self.sprite_ba(S0);
            }
            57 => {
                self.check_right_border(344);
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.pixels.can_load = false;
                self.i_access(bus);
                self.sprite_ba(if pal { S0 | S1 } else { S0 });
            }
            58 => {
                self.draw(BorderEdge::None);
                self.draw_sprites();
                if pal {
                    self.p_access(bus, 0);
                } else {
                    self.i_access(bus);
                }
                self.turn_sprites_on_or_off();
                self.update_row_counter();
                self.sprite_ba(S0 | S1);
            }
            cycle => unreachable!("cycle {cycle} is not a shared cycle"),
        }
    }

    fn pal_cycle(&mut self, bus: &dyn VicBus) {
        match self.cycle {
            1 => {
                self.s_access3(bus, 2);
                self.first_cycle_frame_logic();
                self.draw_sprites();
                self.s_finalize();
                self.p_access(bus, 3);
                self.check_for_raster_irq();
                self.sprite_ba(S3 | S4);
            }
            2 => {
                self.lightpen_frame_start();
                self.s_access1(bus, 3);
                self.wrap_y_counter();
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_access2(bus, 3);
                self.sprite_ba(S3 | S4 | S5);
            }
            // Sprites 4-7: s3 of the previous sprite and p-access in odd
            // cycles, s1 and s2 in even cycles
            3..=10 => {
                let odd = self.cycle % 2 == 1;
                let sprite = usize::from(self.cycle / 2) + if odd { 3 } else { 2 };
                if odd {
                    self.s_access3(bus, sprite - 1);
                } else {
                    self.s_access1(bus, sprite);
                }
                self.check_vertical_flipflop();
                self.draw_sprites();
                if odd {
                    self.s_finalize();
                    self.p_access(bus, sprite);
                } else {
                    self.s_access2(bus, sprite);
                }
                let mask = match self.cycle {
                    3 => S4 | S5,
                    4 => S4 | S5 | S6,
                    5 => S5 | S6,
                    6 => S5 | S6 | S7,
                    7 | 8 => S6 | S7,
                    _ => S7,
                };
                self.sprite_ba(mask);
            }
            11 => {
                self.s_access3(bus, 7);
                self.common_cycle(bus);
            }
            12..=58 => self.common_cycle(bus),
            59 => {
                self.s_access1(bus, 0);
                self.check_vertical_flipflop();
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.s_access2(bus, 0);
                self.sprite_ba(S0 | S1 | S2);
            }
            60 => {
                self.s_access3(bus, 0);
                self.check_vertical_flipflop();
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.s_finalize();
                self.p_access(bus, 1);
                self.sprite_ba(S1 | S2);
            }
            61 => {
                self.s_access1(bus, 1);
                self.check_vertical_flipflop();
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.s_access2(bus, 1);
                self.sprite_ba(S1 | S2 | S3);
                self.visible_column = false;
            }
            62 => {
                self.s_access3(bus, 1);
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_finalize();
                self.p_access(bus, 2);
                self.sprite_ba(S2 | S3);
            }
            63 => {
                self.s_access1(bus, 2);
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_access2(bus, 2);
                self.sprite_ba(S2 | S3 | S4);
            }
            cycle => unreachable!("PAL line has no cycle {cycle}"),
        }
    }

    fn ntsc_cycle(&mut self, bus: &dyn VicBus) {
        let last = self.config.model.cycles_per_line();
        match self.cycle {
            1 => {
                self.s_access1(bus, 3);
                self.first_cycle_frame_logic();
                self.draw_sprites();
                self.s_access2(bus, 3);
                self.check_for_raster_irq();
                self.sprite_ba(S3 | S4 | S5);
            }
            2 => {
                self.lightpen_frame_start();
                self.s_access3(bus, 3);
                self.wrap_y_counter();
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_finalize();
                self.p_access(bus, 4);
                self.sprite_ba(S4 | S5);
            }
            // Sprites 4-7: s1 and s2 in odd cycles, s3 and the next
            // p-access in even cycles
            3..=9 => {
                let sprite = usize::from(self.cycle / 2) + 3;
                let odd = self.cycle % 2 == 1;
                if odd {
                    self.s_access1(bus, sprite);
                } else {
                    self.s_access3(bus, sprite - 1);
                }
                self.check_vertical_flipflop();
                self.draw_sprites();
                if odd {
                    self.s_access2(bus, sprite);
                } else {
                    self.s_finalize();
                    self.p_access(bus, sprite);
                }
                let mask = match self.cycle {
                    3 => S4 | S5 | S6,
                    4 => S5 | S6,
                    5 => S5 | S6 | S7,
                    6 | 7 => S6 | S7,
                    _ => S7,
                };
                self.sprite_ba(mask);
            }
            10 => {
                self.s_access3(bus, 7);
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_finalize();
                self.i_access(bus);
                self.update_ba(0);
            }
            11..=58 => self.common_cycle(bus),
            59 => {
                self.check_vertical_flipflop();
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.p_access(bus, 0);
                self.sprite_ba(S0 | S1);
            }
            60 => {
                self.s_access1(bus, 0);
                self.check_vertical_flipflop();
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.s_access2(bus, 0);
                self.sprite_ba(S0 | S1 | S2);
                self.s_access3(bus, 0);
            }
            61 => {
                self.check_vertical_flipflop();
                self.draw(BorderEdge::None);
                self.draw_sprites();
                self.s_finalize();
                self.p_access(bus, 1);
                self.sprite_ba(S1 | S2);
                self.visible_column = false;
            }
            62 => {
                self.s_access1(bus, 1);
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_access2(bus, 1);
                self.sprite_ba(S1 | S2 | S3);
            }
            63 => {
                self.s_access3(bus, 1);
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_finalize();
                self.p_access(bus, 2);
                self.sprite_ba(S2 | S3);
            }
            64 if last == 64 => {
                // 6567R56A: sprite 2's data and sprite 3's pointer in one cycle
                self.s_access1(bus, 2);
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_access2(bus, 2);
                self.s_access3(bus, 2);
                self.s_finalize();
                self.p_access(bus, 3);
                self.sprite_ba(S2 | S3 | S4);
            }
            64 => {
                self.s_access1(bus, 2);
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_access2(bus, 2);
                self.sprite_ba(S2 | S3 | S4);
                self.s_access3(bus, 2);
            }
            65 => {
                self.check_vertical_flipflop();
                self.draw_sprites();
                self.s_finalize();
                self.p_access(bus, 3);
                self.sprite_ba(S3 | S4);
            }
            cycle => unreachable!("NTSC line has no cycle {cycle}"),
        }
    }
}
