//! PNG export of the frame store.

use std::error::Error;
use std::fs;
use std::path::Path;

use crate::Vic;
use crate::bus::VicBus;

/// Save the last complete frame as a PNG file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_frame(vic: &Vic, path: &Path) -> Result<(), Box<dyn Error>> {
    let width = vic.frame_width();
    let height = vic.frame_height();

    let file = fs::File::create(path)?;
    let w = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    // ARGB32 -> RGBA bytes
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for &pixel in vic.frame() {
        rgba.extend_from_slice(&[(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8, 0xFF]);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Run `num_frames` frames and save each one as `NNNNNN.png` in `dir`.
///
/// # Errors
///
/// Returns an error if the directory or a frame cannot be written.
pub fn record<B: VicBus>(
    vic: &mut Vic,
    bus: &B,
    dir: &Path,
    num_frames: u32,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;

    for i in 1..=num_frames {
        vic.run_frame(bus);
        save_frame(vic, &dir.join(format!("{i:06}.png")))?;
    }

    log::info!("Captured {num_frames} frames to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BankedMemory;

    #[test]
    fn saved_frame_decodes_to_the_frame_store() {
        let mut vic = Vic::new();
        let mem = BankedMemory::new();
        vic.poke(0x11, 0x1B);
        vic.poke(0x16, 0x08);
        vic.run_frame(&mem);

        let path = std::env::temp_dir().join(format!("mos_vic_ii_frame_{}.png", std::process::id()));
        save_frame(&vic, &path).expect("write png");

        let decoder = png::Decoder::new(fs::File::open(&path).expect("open png"));
        let mut reader = decoder.read_info().expect("png header");
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).expect("png data");
        fs::remove_file(&path).ok();

        assert_eq!((info.width, info.height), (vic.frame_width(), vic.frame_height()));
        assert_eq!(info.color_type, png::ColorType::Rgba);

        let at = |x: u32, y: u32| {
            let i = ((y * info.width + x) * 4) as usize;
            u32::from(buf[i]) << 16 | u32::from(buf[i + 1]) << 8 | u32::from(buf[i + 2])
        };
        assert_eq!(at(136, 51), vic.colour(6) & 0x00FF_FFFF, "background");
        assert_eq!(at(135, 51), vic.colour(14) & 0x00FF_FFFF, "border");
    }

    #[test]
    fn record_numbers_frames_from_one() {
        let mut vic = Vic::new();
        let mem = BankedMemory::new();
        let dir = std::env::temp_dir().join(format!("mos_vic_ii_record_{}", std::process::id()));

        record(&mut vic, &mem, &dir, 2).expect("record");
        let written = [dir.join("000001.png").exists(), dir.join("000002.png").exists()];
        fs::remove_dir_all(&dir).ok();
        assert_eq!(written, [true, true]);
    }
}
