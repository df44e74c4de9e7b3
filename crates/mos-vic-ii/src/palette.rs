//! VIC-II colour palette.
//!
//! Colours are synthesised from YUV the way the chip produces them: every
//! revision has its own luma levels, the chroma angle is shared, and PAL
//! output is gamma corrected from the PAL display gamma (2.8) to sRGB (2.2).
//! The luma levels of the NMOS parts are VICE's measured voltages, the HMOS
//! parts use Pepto's Colodore levels.
//!
//! Output is ARGB32, alpha always $FF.

use crate::model::ChipModel;

/// Monitor emulation applied on top of the chip's colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaletteKind {
    #[default]
    Colour,
    BlackWhite,
    PaperWhite,
    Green,
    Amber,
    Sepia,
}

impl PaletteKind {
    /// Fixed chroma of a monochrome monitor, or `None` for colour.
    fn tint(self) -> Option<(f64, f64)> {
        match self {
            Self::Colour => None,
            Self::BlackWhite => Some((0.0, 0.0)),
            Self::PaperWhite => Some((-8.0, 5.0)),
            Self::Green => Some((-99.0, -64.0)),
            Self::Amber => Some((-104.0, 50.0)),
            Self::Sepia => Some((-31.0, 26.0)),
        }
    }
}

/// Measured luma voltages in mV, with the black and white levels.
struct LumaLevels {
    levels: [u16; 16],
    black: u16,
    white: u16,
}

const LUMA_6569R1: LumaLevels = LumaLevels {
    levels: [
        630, 1850, 900, 1560, 1260, 1260, 900, 1560, 1260, 900, 1260, 900, 1260, 1560, 1260, 1560,
    ],
    black: 630,
    white: 1850,
};

const LUMA_6569R3: LumaLevels = LumaLevels {
    levels: [
        700, 1850, 1090, 1480, 1180, 1340, 1020, 1620, 1180, 1020, 1340, 1090, 1300, 1620, 1300,
        1480,
    ],
    black: 700,
    white: 1850,
};

const LUMA_6567: LumaLevels = LumaLevels {
    levels: [
        590, 1825, 950, 1380, 1030, 1210, 860, 1560, 1030, 860, 1210, 950, 1160, 1560, 1160, 1380,
    ],
    black: 590,
    white: 1825,
};

const LUMA_6567R56A: LumaLevels = LumaLevels {
    levels: [
        560, 1825, 840, 1500, 1180, 1180, 840, 1500, 1180, 840, 1180, 840, 1180, 1500, 1180, 1500,
    ],
    black: 560,
    white: 1825,
};

/// Colodore luma steps (0-32) for the HMOS parts.
const LUMA_COLODORE: [u8; 16] = [0, 32, 10, 20, 12, 16, 8, 24, 12, 8, 16, 10, 15, 24, 15, 20];

/// Chroma angle in 22.5° steps; `None` for the greys.
const ANGLE: [Option<u8>; 16] = [
    None,
    None,
    Some(4),
    Some(12),
    Some(2),
    Some(10),
    Some(15),
    Some(7),
    Some(5),
    Some(6),
    Some(4),
    None,
    None,
    Some(10),
    Some(15),
    None,
];

fn luma(model: ChipModel, colour: usize) -> f64 {
    let table = match model {
        ChipModel::Pal6569R1 => &LUMA_6569R1,
        ChipModel::Pal6569R3 => &LUMA_6569R3,
        ChipModel::Ntsc6567 => &LUMA_6567,
        ChipModel::Ntsc6567R56A => &LUMA_6567R56A,
        ChipModel::Pal8565 | ChipModel::Ntsc8562 => {
            return f64::from(LUMA_COLODORE[colour]) * 7.968_75;
        }
    };
    let level = f64::from(table.levels[colour] - table.black);
    level * 256.0 / f64::from(table.white - table.black)
}

/// Undo the display gamma `source` and apply `target`.
fn gamma_correct(value: f64, source: f64, target: f64) -> f64 {
    let factor = 255f64.powf(1.0 - source);
    let linear = (factor * value.powf(source)).clamp(0.0, 255.0);
    let factor = 255f64.powf(1.0 - 1.0 / target);
    (factor * linear.powf(1.0 / target)).clamp(0.0, 255.0).round()
}

/// Compute the 16 ARGB32 colours for a chip revision.
///
/// `brightness`, `contrast` and `saturation` are percentages (0-100); the
/// neutral setting is 50/100/50.
#[must_use]
pub fn palette(
    model: ChipModel,
    brightness: u8,
    contrast: u8,
    saturation: u8,
    kind: PaletteKind,
) -> [u32; 16] {
    let brightness = f64::from(brightness) - 50.0;
    let contrast = f64::from(contrast) / 100.0 + 0.2;
    let saturation = f64::from(saturation) / 1.25;

    let mut colours = [0u32; 16];
    for (colour, out) in colours.iter_mut().enumerate() {
        let (u, v) = match ANGLE[colour] {
            Some(step) => {
                let angle = (f64::from(step) * 22.5 + 11.5).to_radians();
                (angle.cos() * saturation, angle.sin() * saturation)
            }
            None => (0.0, 0.0),
        };

        let y = luma(model, colour) * contrast + brightness;
        let (u, v) = kind.tint().unwrap_or((u * contrast, v * contrast));

        let mut r = (y + 1.140 * v).clamp(0.0, 255.0);
        let mut g = (y - 0.396 * u - 0.581 * v).clamp(0.0, 255.0);
        let mut b = (y + 2.029 * u).clamp(0.0, 255.0);

        if model.is_pal() {
            r = gamma_correct(r, 2.8, 2.2);
            g = gamma_correct(g, 2.8, 2.2);
            b = gamma_correct(b, 2.8, 2.2);
        }

        *out = 0xFF00_0000 | (u32::from(r as u8) << 16) | (u32::from(g as u8) << 8) | u32::from(b as u8);
    }
    colours
}
