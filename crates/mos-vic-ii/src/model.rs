//! Chip revisions and their timing parameters.
//!
//! The VIC-II shipped in six relevant revisions. They split into a PAL and an
//! NTSC family that differ in line length, frame height and the layout of the
//! per-cycle bus schedule. Within a family the newer HMOS-II parts (8565,
//! 8562) differ in a handful of sequencing details.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Video standard a chip revision belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VideoStandard {
    Pal,
    Ntsc,
}

/// VIC-II chip revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipModel {
    /// Early PAL 6569, delayed light-pen interrupts.
    Pal6569R1,
    /// PAL 6569R3, the common breadbin chip.
    #[default]
    Pal6569R3,
    /// PAL 8565 (C64C).
    Pal8565,
    /// Early NTSC 6567 with 64-cycle lines and 262 lines.
    Ntsc6567R56A,
    /// NTSC 6567R8.
    Ntsc6567,
    /// NTSC 8562 (C64C).
    Ntsc8562,
}

/// Capability flags for a specific chip revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipTraits {
    pub standard: VideoStandard,
    /// HMOS-II part (8565/8562).
    pub is_856x: bool,
    /// A latched light-pen event does not raise the interrupt.
    pub delayed_lightpen_irqs: bool,
    pub cycles_per_line: u8,
    pub lines_per_frame: u16,
    /// CPU clock in Hz.
    pub clock_frequency: u32,
}

impl ChipModel {
    pub const ALL: [ChipModel; 6] = [
        Self::Pal6569R1,
        Self::Pal6569R3,
        Self::Pal8565,
        Self::Ntsc6567R56A,
        Self::Ntsc6567,
        Self::Ntsc8562,
    ];

    #[must_use]
    pub const fn traits(self) -> ChipTraits {
        const PAL: ChipTraits = ChipTraits {
            standard: VideoStandard::Pal,
            is_856x: false,
            delayed_lightpen_irqs: false,
            cycles_per_line: 63,
            lines_per_frame: 312,
            clock_frequency: 985_248,
        };
        const NTSC: ChipTraits = ChipTraits {
            standard: VideoStandard::Ntsc,
            is_856x: false,
            delayed_lightpen_irqs: false,
            cycles_per_line: 65,
            lines_per_frame: 263,
            clock_frequency: 1_022_727,
        };
        match self {
            Self::Pal6569R1 => ChipTraits {
                delayed_lightpen_irqs: true,
                ..PAL
            },
            Self::Pal6569R3 => PAL,
            Self::Pal8565 => ChipTraits {
                is_856x: true,
                ..PAL
            },
            Self::Ntsc6567R56A => ChipTraits {
                delayed_lightpen_irqs: true,
                cycles_per_line: 64,
                lines_per_frame: 262,
                ..NTSC
            },
            Self::Ntsc6567 => NTSC,
            Self::Ntsc8562 => ChipTraits {
                is_856x: true,
                ..NTSC
            },
        }
    }

    #[must_use]
    pub const fn standard(self) -> VideoStandard {
        self.traits().standard
    }

    #[must_use]
    pub const fn is_pal(self) -> bool {
        matches!(self.traits().standard, VideoStandard::Pal)
    }

    #[must_use]
    pub const fn is_856x(self) -> bool {
        self.traits().is_856x
    }

    #[must_use]
    pub const fn delayed_lightpen_irqs(self) -> bool {
        self.traits().delayed_lightpen_irqs
    }

    #[must_use]
    pub const fn cycles_per_line(self) -> u8 {
        self.traits().cycles_per_line
    }

    #[must_use]
    pub const fn lines_per_frame(self) -> u16 {
        self.traits().lines_per_frame
    }

    #[must_use]
    pub const fn cycles_per_frame(self) -> u32 {
        self.cycles_per_line() as u32 * self.lines_per_frame() as u32
    }

    #[must_use]
    pub const fn clock_frequency(self) -> u32 {
        self.traits().clock_frequency
    }

    /// Scanline in which the y counter returns to zero (in cycle 2).
    #[must_use]
    pub const fn y_wrap_line(self) -> u16 {
        if self.is_pal() { 0 } else { 238 }
    }

    /// Whether `scanline` lies in the vertical blanking interval.
    #[must_use]
    pub const fn is_vblank(self, scanline: u16) -> bool {
        match self {
            Self::Pal6569R1 | Self::Pal6569R3 | Self::Pal8565 => scanline < 16 || scanline >= 300,
            Self::Ntsc6567R56A => scanline >= 250,
            Self::Ntsc6567 | Self::Ntsc8562 => scanline >= 251,
        }
    }

    /// Raw light-pen X position latched during `cycle`, before halving.
    #[must_use]
    pub const fn lightpen_x(self, cycle: u8) -> u16 {
        let offset = if self.is_856x() { 2 } else { 4 };
        let base = if self.is_pal() { 392 } else { 400 };
        let cycle = cycle as u16;
        if cycle < 14 {
            offset + base + 8 * cycle
        } else {
            offset + (cycle - 14) * 8
        }
    }

    /// X coordinate latched when the light pen is held low at frame start.
    #[must_use]
    pub const fn lightpen_frame_start_x(self) -> u8 {
        if self.is_pal() { 209 } else { 213 }
    }

    /// Chip part number as printed on the package.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pal6569R1 => "6569R1",
            Self::Pal6569R3 => "6569R3",
            Self::Pal8565 => "8565",
            Self::Ntsc6567R56A => "6567R56A",
            Self::Ntsc6567 => "6567R8",
            Self::Ntsc8562 => "8562",
        }
    }
}

impl fmt::Display for ChipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChipModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let model = match name.as_str() {
            "6569r1" => Self::Pal6569R1,
            "6569" | "6569r3" | "pal" => Self::Pal6569R3,
            "8565" => Self::Pal8565,
            "6567r56a" => Self::Ntsc6567R56A,
            "6567" | "6567r8" | "ntsc" => Self::Ntsc6567,
            "8562" => Self::Ntsc8562,
            _ => return Err(ConfigError::UnknownModel(s.to_string())),
        };
        Ok(model)
    }
}
