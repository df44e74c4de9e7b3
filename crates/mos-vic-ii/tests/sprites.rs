use mos_vic_ii::{BankedMemory, IRQ_SPRITE_BACKGROUND, IRQ_SPRITE_SPRITE, Vic, VicConfig};

/// Solid sprite image at $2000, used by sprites 0 and 1.
fn sprite_memory() -> BankedMemory {
    sprite_memory_filled(0xFF)
}

/// Sprite image at $2000 with every byte set to `byte`.
fn sprite_memory_filled(byte: u8) -> BankedMemory {
    let mut mem = BankedMemory::new();
    for offset in 0..63 {
        mem.ram_write(0x2000 + offset, byte);
    }
    mem.ram_write(0x07F8, 0x80);
    mem.ram_write(0x07F9, 0x80);
    mem
}

/// Sprite at X = 100, Y = 100 on an empty 25-row screen.
fn place_sprite(vic: &mut Vic, sprite: u8) {
    vic.poke(0x11, 0x1B);
    vic.poke(sprite * 2, 100);
    vic.poke(sprite * 2 + 1, 100);
    let enable = vic.spy(0x15) | 1 << sprite;
    vic.poke(0x15, enable);
}

/// Solid red character $01 from the character ROM on every cell.
fn fill_screen(vic: &mut Vic, mem: &mut BankedMemory) {
    let mut rom = vec![0u8; 0x1000];
    rom[8..16].fill(0xFF);
    mem.load_char_rom(&rom);
    for offset in 0..1000 {
        mem.ram_write(0x0400 + offset, 0x01);
        mem.colour_ram_write(offset, 0x02);
    }
    vic.poke(0x18, 0x14);
}

fn pixel(vic: &Vic, x: u32, y: u32) -> u32 {
    vic.frame()[(y * vic.frame_width() + x) as usize]
}

fn run_to(vic: &mut Vic, mem: &BankedMemory, scanline: u16, cycle: u8) {
    while !(vic.scanline() == scanline && vic.cycle() == cycle) {
        vic.tick(mem);
    }
}

#[test]
fn sprite_is_24_pixels_wide() {
    let mut vic = Vic::new();
    let mem = sprite_memory();
    place_sprite(&mut vic, 0);
    vic.poke(0x27, 7);
    vic.run_frame(&mem);

    // X = 100 lands in frame column 212; line 100 only fetches
    let yellow = vic.colour(7);
    let blue = vic.colour(6);
    for x in 212..236 {
        assert_eq!(pixel(&vic, x, 101), yellow, "column {x}");
    }
    assert_eq!(pixel(&vic, 211, 101), blue);
    assert_eq!(pixel(&vic, 236, 101), blue);
    assert_eq!(pixel(&vic, 212, 100), blue);
    assert_eq!(pixel(&vic, 212, 121), yellow, "21st line");
    assert_eq!(pixel(&vic, 212, 122), blue);
}

#[test]
fn x_expansion_doubles_the_width() {
    let mut vic = Vic::new();
    let mem = sprite_memory();
    place_sprite(&mut vic, 0);
    vic.poke(0x27, 7);
    vic.poke(0x1D, 0x01);
    vic.run_frame(&mem);

    let yellow = vic.colour(7);
    for x in 212..260 {
        assert_eq!(pixel(&vic, x, 101), yellow, "column {x}");
    }
    assert_eq!(pixel(&vic, 260, 101), vic.colour(6));
}

#[test]
fn hidden_sprites_still_collide() {
    let config = VicConfig::default().with_hidden_sprites(true);
    let mut vic = Vic::with_config(config).expect("valid config");
    let mem = sprite_memory();
    place_sprite(&mut vic, 0);
    place_sprite(&mut vic, 1);
    vic.poke(0x27, 7);
    vic.run_frame(&mem);

    assert_eq!(pixel(&vic, 212, 101), vic.colour(6));
    assert_eq!(vic.spy(0x1E), 0x03);
}

#[test]
fn sprite_sprite_collision_latches_until_read() {
    let mut vic = Vic::new();
    let mem = sprite_memory();
    place_sprite(&mut vic, 0);
    place_sprite(&mut vic, 1);
    vic.poke(0x1A, IRQ_SPRITE_SPRITE);
    vic.run_frame(&mem);

    assert_eq!(vic.spy(0x1E), 0x03);
    assert!(vic.irq_line());

    // Register still set: no new interrupt
    vic.poke(0x19, 0x0F);
    vic.run_frame(&mem);
    assert_eq!(vic.spy(0x19) & IRQ_SPRITE_SPRITE, 0);

    // Reading clears one cycle later, and the next overlap interrupts again
    assert_eq!(vic.peek(0x1E), 0x03);
    vic.tick(&mem);
    assert_eq!(vic.spy(0x1E), 0x03);
    vic.tick(&mem);
    assert_eq!(vic.spy(0x1E), 0x00);
    vic.run_frame(&mem);
    assert_eq!(vic.spy(0x19) & IRQ_SPRITE_SPRITE, IRQ_SPRITE_SPRITE);
    assert!(vic.irq_line());
}

#[test]
fn sprite_background_collision_needs_foreground() {
    let mut vic = Vic::new();
    let mut mem = sprite_memory();
    vic.poke(0x1A, IRQ_SPRITE_BACKGROUND);

    // Blank screen: nothing to hit
    place_sprite(&mut vic, 0);
    vic.run_frame(&mem);
    assert_eq!(vic.spy(0x1F), 0);

    // Solid character $01 from the character ROM all over the screen
    let mut rom = vec![0u8; 0x1000];
    rom[8..16].fill(0xFF);
    mem.load_char_rom(&rom);
    for offset in 0..1000 {
        mem.ram_write(0x0400 + offset, 0x01);
    }
    vic.poke(0x18, 0x14);
    vic.run_frame(&mem);
    assert_eq!(vic.spy(0x1F), 0x01);
    assert!(vic.irq_line());
}

#[test]
fn collision_checks_can_be_disabled() {
    let config = VicConfig::default().with_collision_checks(false, false);
    let mut vic = Vic::with_config(config).expect("valid config");
    let mem = sprite_memory();
    place_sprite(&mut vic, 0);
    place_sprite(&mut vic, 1);
    vic.run_frame(&mem);
    assert_eq!(vic.spy(0x1E), 0);
    assert_eq!(vic.spy(0x1F), 0);
    assert_eq!(vic.spy(0x19) & (IRQ_SPRITE_SPRITE | IRQ_SPRITE_BACKGROUND), 0);
}

#[test]
fn sprite_in_front_covers_characters() {
    let mut vic = Vic::new();
    let mut mem = sprite_memory();
    fill_screen(&mut vic, &mut mem);
    place_sprite(&mut vic, 0);
    vic.poke(0x27, 7);
    vic.run_frame(&mem);

    let yellow = vic.colour(7);
    for x in 212..236 {
        assert_eq!(pixel(&vic, x, 101), yellow, "column {x}");
    }
    assert_eq!(pixel(&vic, 236, 101), vic.colour(2));
}

#[test]
fn sprite_behind_characters_is_hidden() {
    let mut vic = Vic::new();
    let mut mem = sprite_memory();
    fill_screen(&mut vic, &mut mem);
    place_sprite(&mut vic, 0);
    vic.poke(0x27, 7);
    vic.poke(0x1B, 0x01);
    vic.run_frame(&mem);

    let red = vic.colour(2);
    for x in 212..236 {
        assert_eq!(pixel(&vic, x, 101), red, "column {x}");
    }
    assert_eq!(vic.spy(0x1F), 0x01, "still collides");
}

#[test]
fn sprite_behind_foreground_masks_lower_priority_sprite() {
    // Sprite 0 claims the pixel even though the character wins, so
    // sprite 1 in front of the character is not drawn either.
    let mut vic = Vic::new();
    let mut mem = sprite_memory();
    fill_screen(&mut vic, &mut mem);
    place_sprite(&mut vic, 0);
    place_sprite(&mut vic, 1);
    vic.poke(0x27, 7);
    vic.poke(0x28, 8);
    vic.poke(0x1B, 0x01);
    vic.run_frame(&mem);

    let red = vic.colour(2);
    for x in 212..236 {
        assert_eq!(pixel(&vic, x, 101), red, "column {x}");
    }
}

#[test]
fn multicolour_sprite_uses_bit_pairs() {
    let mut vic = Vic::new();
    let mem = sprite_memory_filled(0b01_10_11_00);
    place_sprite(&mut vic, 0);
    vic.poke(0x1C, 0x01);
    vic.poke(0x25, 5);
    vic.poke(0x26, 8);
    vic.poke(0x27, 7);
    vic.run_frame(&mem);

    // %01 = $D025, %10 = sprite colour, %11 = $D026, %00 = transparent
    let expected = [5, 5, 7, 7, 8, 8, 6, 6];
    for x in 212..236 {
        let colour = expected[(x - 212) as usize % 8];
        assert_eq!(pixel(&vic, x, 101), vic.colour(colour), "column {x}");
    }
}

#[test]
fn clearing_d017_in_cycle_15_mixes_mcbase() {
    let mut vic = Vic::new();
    let mem = sprite_memory();
    vic.poke(0x11, 0x0B);
    vic.poke(0x01, 100);
    vic.poke(0x15, 0x01);
    vic.poke(0x17, 0x01);

    // Odd lines of a Y-expanded sprite leave MCBASE alone
    run_to(&mut vic, &mem, 105, 15);
    let sprite = vic.sprite_info(0);
    assert_eq!((sprite.mcbase, sprite.mc), (6, 9));

    vic.poke(0x17, 0x00);
    vic.tick(&mem);
    // (%101010 & (6 & 9)) | (%010101 & (6 | 9))
    assert_eq!(vic.sprite_info(0).mcbase, 5);

    // From here on the sprite is unexpanded and counts up by 3 from the
    // odd value, so it misses 63 and wraps around once.
    run_to(&mut vic, &mem, 106, 17);
    assert_eq!(vic.info().sprite_mc[0], 8);
    run_to(&mut vic, &mem, 124, 17);
    assert_eq!(vic.sprite_info(0).mcbase, 62);
    run_to(&mut vic, &mem, 125, 17);
    assert_eq!(vic.sprite_info(0).mcbase, 1);
    run_to(&mut vic, &mem, 142, 17);
    assert!(vic.sprite_info(0).dma, "an expanded sprite would stop here");
    run_to(&mut vic, &mem, 166, 17);
    let sprite = vic.sprite_info(0);
    assert_eq!(sprite.mcbase, 60);
    assert!(sprite.dma);
    run_to(&mut vic, &mem, 167, 17);
    let sprite = vic.sprite_info(0);
    assert_eq!(sprite.mcbase, 63);
    assert!(!sprite.dma);
}
