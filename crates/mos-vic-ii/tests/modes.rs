//! One row of pixels per display mode. Every test looks at the first two
//! character cells of line 51 with 40 columns, which start at frame
//! column 136.

use mos_vic_ii::{BankedMemory, DisplayMode, Vic};

/// Character ROM with `row0` as the top row of character $01.
fn memory_with_char(row0: u8) -> BankedMemory {
    let mut mem = BankedMemory::new();
    let mut rom = vec![0u8; 0x1000];
    rom[8] = row0;
    mem.load_char_rom(&rom);
    mem
}

fn row(vic: &Vic, from: u32, to: u32) -> Vec<u32> {
    let width = vic.frame_width();
    (from..to)
        .map(|x| vic.frame()[(51 * width + x) as usize])
        .collect()
}

fn colours(vic: &Vic, codes: &[u8]) -> Vec<u32> {
    codes.iter().map(|&code| vic.colour(code)).collect()
}

#[test]
fn standard_bitmap_takes_colours_from_the_screen() {
    let mut vic = Vic::new();
    let mut mem = BankedMemory::new();
    mem.ram_write(0x2000, 0xF0);
    mem.ram_write(0x0400, 0x25);
    vic.poke(0x11, 0x3B);
    vic.poke(0x16, 0x08);
    vic.poke(0x18, 0x18);
    assert_eq!(vic.info().display_mode, DisplayMode::StandardBitmap);
    vic.run_frame(&mem);

    // Set bits use the high nibble, clear bits the low nibble
    assert_eq!(row(&vic, 136, 144), colours(&vic, &[2, 2, 2, 2, 5, 5, 5, 5]));
}

#[test]
fn multicolour_bitmap_uses_four_sources() {
    let mut vic = Vic::new();
    let mut mem = BankedMemory::new();
    mem.ram_write(0x2000, 0b00_01_10_11);
    mem.ram_write(0x0400, 0x25);
    mem.colour_ram_write(0, 0x07);
    vic.poke(0x11, 0x3B);
    vic.poke(0x16, 0x18);
    vic.poke(0x18, 0x18);
    assert_eq!(vic.info().display_mode, DisplayMode::MulticolourBitmap);
    vic.run_frame(&mem);

    // %00 background, %01 screen high nibble, %10 screen low nibble,
    // %11 colour RAM
    assert_eq!(row(&vic, 136, 144), colours(&vic, &[6, 6, 2, 2, 5, 5, 7, 7]));
}

#[test]
fn multicolour_text_depends_on_colour_bit_3() {
    let mut vic = Vic::new();
    let mut mem = memory_with_char(0b00_01_10_11);
    mem.ram_write(0x0400, 0x01);
    mem.ram_write(0x0401, 0x01);
    mem.colour_ram_write(0, 0x0D);
    mem.colour_ram_write(1, 0x02);
    vic.poke(0x11, 0x1B);
    vic.poke(0x16, 0x18);
    vic.poke(0x18, 0x14);
    vic.poke(0x22, 3);
    vic.poke(0x23, 4);
    assert_eq!(vic.info().display_mode, DisplayMode::MulticolourText);
    vic.run_frame(&mem);

    // Colour $D: bit pairs from $D021, $D022, $D023 and colour & 7
    assert_eq!(row(&vic, 136, 144), colours(&vic, &[6, 6, 3, 3, 4, 4, 5, 5]));
    // Colour $2: a normal hires character
    assert_eq!(row(&vic, 144, 152), colours(&vic, &[6, 6, 6, 2, 2, 6, 2, 2]));
}

#[test]
fn extended_colour_picks_background_from_pointer_bits() {
    let mut vic = Vic::new();
    let mut mem = memory_with_char(0xF0);
    // Both cells show character $01
    mem.ram_write(0x0400, 0x41);
    mem.ram_write(0x0401, 0xC1);
    mem.colour_ram_write(0, 0x02);
    mem.colour_ram_write(1, 0x07);
    vic.poke(0x11, 0x5B);
    vic.poke(0x16, 0x08);
    vic.poke(0x18, 0x14);
    vic.poke(0x22, 3);
    vic.poke(0x24, 4);
    assert_eq!(vic.info().display_mode, DisplayMode::ExtendedColourText);
    vic.run_frame(&mem);

    // Pointer bits 6-7: %01 selects $D022, %11 selects $D024
    assert_eq!(row(&vic, 136, 144), colours(&vic, &[2, 2, 2, 2, 3, 3, 3, 3]));
    assert_eq!(row(&vic, 144, 152), colours(&vic, &[7, 7, 7, 7, 4, 4, 4, 4]));
}
