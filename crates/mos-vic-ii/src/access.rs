//! Memory accesses.
//!
//! Every cycle has two bus phases. The VIC-II owns phi1 and uses it for
//! refresh (r), idle (i), graphics (g) and sprite pointer (p) accesses. In
//! phi2 the CPU normally has the bus; the chip takes it for character
//! pointer (c) and sprite data (s) accesses once BA has been low for three
//! cycles.
//!
//! ```text
//! c-access  |VM13-VM10|VC9-VC0|
//! g-access  BMM=1: |CB13|VC9-VC0|RC2-RC0|
//!           BMM=0: |CB13-CB11|D7-D0|RC2-RC0|
//!           ECM=1: address lines 9 and 10 held low
//! p-access  |VM13-VM10|1111111|sprite|
//! s-access  |MP7-MP0|MC5-MC0|
//! idle      $3FFF ($39FF with ECM)
//! ```

use crate::Vic;
use crate::bus::VicBus;

impl Vic {
    /// DRAM refresh.
    pub(crate) fn r_access(&mut self, bus: &dyn VicBus) {
        self.data_bus_phi1 = bus.read(0x3F00 | u16::from(self.refresh));
        self.refresh = self.refresh.wrapping_sub(1);
    }

    /// Idle access.
    pub(crate) fn i_access(&mut self, bus: &dyn VicBus) {
        self.data_bus_phi1 = bus.read(0x3FFF);
    }

    /// Character pointer and colour fetch into the line buffers.
    ///
    /// Before BA has been low for three cycles the data bus is still
    /// floating: the pointer reads $FF and the colour nibble is whatever the
    /// CPU fetched last.
    pub(crate) fn c_access(&mut self, bus: &dyn VicBus) {
        let index = usize::from(self.vmli);
        if self.ba_low_for_three_cycles() {
            let addr = self.regs.current().video_matrix_base() | self.vc;
            self.data_bus_phi2 = bus.read(addr);
            self.video_matrix[index] = self.data_bus_phi2;
            self.colour_line[index] = bus.colour_ram(self.vc) & 0x0F;
        } else {
            self.data_bus_phi2 = 0xFF;
            self.video_matrix[index] = 0xFF;
            self.colour_line[index] = bus.cpu_data_nibble() & 0x0F;
        }
    }

    /// Graphics fetch.
    ///
    /// The result is packed as `data | colour << 8 | pointer << 16` and
    /// reaches the shift register two cycles later.
    pub(crate) fn g_access(&mut self, bus: &dyn VicBus) {
        if self.display_state {
            let addr = if self.config.model.is_856x() {
                self.g_access_addr_856x()
            } else {
                self.g_access_addr_656x(bus)
            };
            self.data_bus_phi1 = bus.read(addr);

            let index = usize::from(self.vmli);
            self.g_access.write(
                u32::from(self.data_bus_phi1)
                    | u32::from(self.colour_line[index]) << 8
                    | u32::from(self.video_matrix[index]) << 16,
            );
            self.vc = (self.vc + 1) & 0x3FF;
            self.vmli = (self.vmli + 1) & 0x3F;
        } else {
            // The 856x sees ECM one cycle late here as well
            let ctrl1 = if self.config.model.is_856x() {
                self.regs.delayed().ctrl1
            } else {
                self.regs.current().ctrl1
            };
            let addr = if ctrl1 & 0x40 != 0 { 0x39FF } else { 0x3FFF };
            self.data_bus_phi1 = bus.read(addr);
            self.g_access.write(u32::from(self.data_bus_phi1));
        }
    }

    fn g_access_addr(&self, bmm: bool, ecm: bool) -> u16 {
        let regs = self.regs.current();
        let rc = u16::from(self.rc);
        let mut addr = if bmm {
            regs.bitmap_base() | self.vc << 3 | rc
        } else {
            let pointer = u16::from(self.video_matrix[usize::from(self.vmli)]);
            regs.char_base() | pointer << 3 | rc
        };
        if ecm {
            addr &= 0xF9FF;
        }
        addr
    }

    /// The 856x latches BMM and ECM a cycle before the access.
    fn g_access_addr_856x(&self) -> u16 {
        let old = self.regs.delayed().ctrl1;
        self.g_access_addr(old & 0x20 != 0, old & 0x40 != 0)
    }

    /// The 656x ORs old and new BMM. When BMM changes and the new address
    /// lands in the character ROM, the bus carries the high byte of the new
    /// address and the low byte of the old one.
    fn g_access_addr_656x(&self, bus: &dyn VicBus) -> u16 {
        let old = self.regs.delayed().ctrl1;
        let new = self.regs.current().ctrl1;
        let (old_bmm, new_bmm) = (old & 0x20 != 0, new & 0x20 != 0);
        let (old_ecm, new_ecm) = (old & 0x40 != 0, new & 0x40 != 0);

        let addr = self.g_access_addr(old_bmm || new_bmm, new_ecm);
        if old_bmm == new_bmm {
            return addr;
        }

        let old_addr = self.g_access_addr(old_bmm, old_ecm);
        let new_addr = self.g_access_addr(new_bmm, new_ecm);
        if bus.is_char_rom(new_addr) && !bus.is_char_rom(old_addr) {
            (new_addr & 0x3F00) | (old_addr & 0x00FF)
        } else {
            addr
        }
    }

    /// Sprite pointer fetch.
    pub(crate) fn p_access(&mut self, bus: &dyn VicBus, sprite: usize) {
        let addr = self.regs.current().video_matrix_base() | 0x03F8 | sprite as u16;
        self.data_bus_phi1 = bus.read(addr);
        self.sprites.pointer[sprite] = u16::from(self.data_bus_phi1) << 6;
    }

    fn sprite_data_addr(&self, sprite: usize) -> u16 {
        self.sprites.pointer[sprite] | u16::from(self.sprites.mc[sprite])
    }

    fn advance_mc(&mut self, sprite: usize) {
        self.sprites.mc[sprite] = (self.sprites.mc[sprite] + 1) & 0x3F;
    }

    /// First sprite data byte (phi2 of the cycle before the pointer's).
    ///
    /// MC advances even when the CPU still holds the bus; the byte is then
    /// whatever floats on the data bus.
    pub(crate) fn s_access1(&mut self, bus: &dyn VicBus, sprite: usize) {
        let bit = 1 << sprite;
        self.sprites.first_dma = bit;
        if self.sprites.dma & bit != 0 {
            if self.ba_low_for_three_cycles() {
                self.data_bus_phi2 = bus.read(self.sprite_data_addr(sprite));
            }
            self.advance_mc(sprite);
        }
        self.sprites.shifters[sprite].chunks[0] = self.data_bus_phi2;
    }

    /// Second sprite data byte (phi1). Without DMA this is an idle access.
    pub(crate) fn s_access2(&mut self, bus: &dyn VicBus, sprite: usize) {
        let bit = 1 << sprite;
        self.sprites.first_dma = 0;
        self.sprites.second_dma = bit;
        if self.sprites.dma & bit != 0 {
            self.data_bus_phi1 = bus.read(self.sprite_data_addr(sprite));
            self.advance_mc(sprite);
        } else {
            self.data_bus_phi1 = bus.read(0x3FFF);
        }
        self.sprites.shifters[sprite].chunks[1] = self.data_bus_phi1;
    }

    /// Third sprite data byte (phi2).
    pub(crate) fn s_access3(&mut self, bus: &dyn VicBus, sprite: usize) {
        if self.sprites.dma & (1 << sprite) != 0 {
            self.data_bus_phi2 = bus.read(self.sprite_data_addr(sprite));
            self.advance_mc(sprite);
        }
        self.sprites.shifters[sprite].chunks[2] = self.data_bus_phi2;
    }

    pub(crate) fn s_finalize(&mut self) {
        self.sprites.second_dma = 0;
    }
}
