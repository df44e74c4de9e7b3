//! The VIC-II's view of memory.
//!
//! The chip drives a 14-bit address bus. Which 16 KiB bank it sees, and
//! whether the character ROM shadows part of it, is decided outside the chip
//! (CIA2 port A and the PLA on a C64), so the embedding machine implements
//! [`VicBus`]. [`BankedMemory`] is a self-contained implementation with the
//! C64's banking rules, used by the tests and the benchmark.

/// Memory as seen by the VIC-II.
pub trait VicBus {
    /// Read a byte at a 14-bit VIC address. The bank is applied by the
    /// implementer.
    fn read(&self, addr: u16) -> u8;

    /// Colour RAM nibble for video matrix index `index` (0-1023).
    fn colour_ram(&self, index: u16) -> u8;

    /// Low nibble left on the data bus by the CPU's last opcode fetch.
    ///
    /// A c-access that happens before BA has been low for three cycles
    /// picks this up instead of colour RAM.
    fn cpu_data_nibble(&self) -> u8 {
        0x0F
    }

    /// Whether `addr` hits the character ROM in the current bank.
    fn is_char_rom(&self, _addr: u16) -> bool {
        false
    }
}

/// 64 KiB RAM, 4 KiB character ROM and 1 KiB colour RAM with C64 banking.
pub struct BankedMemory {
    ram: Vec<u8>,
    char_rom: Vec<u8>,
    colour_ram: [u8; 1024],
    /// VIC-II bank (0-3).
    bank: u8,
    cpu_data: u8,
}

impl BankedMemory {
    /// Creates zeroed memory with a blank character ROM in bank 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x10000],
            char_rom: vec![0; 0x1000],
            colour_ram: [0; 1024],
            bank: 0,
            cpu_data: 0xFF,
        }
    }

    /// Replaces the character ROM. Images shorter than 4 KiB are zero-padded.
    pub fn load_char_rom(&mut self, data: &[u8]) {
        let len = data.len().min(self.char_rom.len());
        self.char_rom.fill(0);
        self.char_rom[..len].copy_from_slice(&data[..len]);
    }

    pub fn set_bank(&mut self, bank: u8) {
        self.bank = bank & 0x03;
    }

    #[must_use]
    pub fn bank(&self) -> u8 {
        self.bank
    }

    /// Byte last fetched by the CPU.
    pub fn set_cpu_data(&mut self, value: u8) {
        self.cpu_data = value;
    }

    pub fn ram_write(&mut self, addr: u16, value: u8) {
        self.ram[addr as usize] = value;
    }

    #[must_use]
    pub fn ram_read(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    /// Write colour RAM at offset 0-1023. Only the low nibble is stored.
    pub fn colour_ram_write(&mut self, offset: u16, value: u8) {
        self.colour_ram[(offset & 0x3FF) as usize] = value & 0x0F;
    }

    /// Character ROM shows up at $1000-$1FFF in banks 0 and 2.
    fn char_rom_visible(&self, addr: u16) -> bool {
        (self.bank == 0 || self.bank == 2) && (0x1000..0x2000).contains(&(addr & 0x3FFF))
    }
}

impl Default for BankedMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl VicBus for BankedMemory {
    fn read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        if self.char_rom_visible(addr) {
            self.char_rom[(addr - 0x1000) as usize]
        } else {
            self.ram[usize::from(self.bank) * 0x4000 + addr as usize]
        }
    }

    fn colour_ram(&self, index: u16) -> u8 {
        self.colour_ram[(index & 0x3FF) as usize]
    }

    fn cpu_data_nibble(&self) -> u8 {
        self.cpu_data & 0x0F
    }

    fn is_char_rom(&self, addr: u16) -> bool {
        self.char_rom_visible(addr)
    }
}
