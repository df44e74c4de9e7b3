//! VIC-II configuration: chip revision, emulation switches and palette.

use thiserror::Error;

use crate::model::ChipModel;
use crate::palette::PaletteKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Brightness {0} outside 0..=100")]
    BrightnessOutOfRange(u8),
    #[error("Contrast {0} outside 0..=100")]
    ContrastOutOfRange(u8),
    #[error("Saturation {0} outside 0..=100")]
    SaturationOutOfRange(u8),
    #[error("Unknown VIC-II model: {0}")]
    UnknownModel(String),
}

/// Configuration for constructing a [`Vic`](crate::Vic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VicConfig {
    pub model: ChipModel,
    /// Emulate the 856x gray-dot bug: a colour register write shows
    /// light grey for one pixel.
    pub gray_dot_bug: bool,
    /// Raise sprite-sprite collisions.
    pub check_ss_collisions: bool,
    /// Raise sprite-background collisions.
    pub check_sb_collisions: bool,
    /// Debug switch: sprites still run and collide but are not drawn.
    pub hide_sprites: bool,
    pub palette: PaletteKind,
    /// 0..=100, 50 is neutral.
    pub brightness: u8,
    /// 0..=100.
    pub contrast: u8,
    /// 0..=100.
    pub saturation: u8,
}

impl Default for VicConfig {
    fn default() -> Self {
        Self {
            model: ChipModel::default(),
            gray_dot_bug: false,
            check_ss_collisions: true,
            check_sb_collisions: true,
            hide_sprites: false,
            palette: PaletteKind::Colour,
            brightness: 50,
            contrast: 100,
            saturation: 50,
        }
    }
}

impl VicConfig {
    #[must_use]
    pub fn new(model: ChipModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: ChipModel) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_gray_dot_bug(mut self, enabled: bool) -> Self {
        self.gray_dot_bug = enabled;
        self
    }

    #[must_use]
    pub fn with_collision_checks(mut self, sprite_sprite: bool, sprite_background: bool) -> Self {
        self.check_ss_collisions = sprite_sprite;
        self.check_sb_collisions = sprite_background;
        self
    }

    #[must_use]
    pub fn with_hidden_sprites(mut self, hidden: bool) -> Self {
        self.hide_sprites = hidden;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: PaletteKind) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_picture(mut self, brightness: u8, contrast: u8, saturation: u8) -> Self {
        self.brightness = brightness;
        self.contrast = contrast;
        self.saturation = saturation;
        self
    }

    /// Check that the palette parameters are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.brightness > 100 {
            return Err(ConfigError::BrightnessOutOfRange(self.brightness));
        }
        if self.contrast > 100 {
            return Err(ConfigError::ContrastOutOfRange(self.contrast));
        }
        if self.saturation > 100 {
            return Err(ConfigError::SaturationOutOfRange(self.saturation));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_pal() {
        let config = VicConfig::default();
        assert_eq!(config.model, ChipModel::Pal6569R3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = VicConfig::new(ChipModel::Pal8565)
            .with_gray_dot_bug(true)
            .with_collision_checks(false, true)
            .with_picture(40, 90, 60);
        assert!(config.gray_dot_bug);
        assert!(!config.check_ss_collisions);
        assert!(config.check_sb_collisions);
        assert_eq!((config.brightness, config.contrast, config.saturation), (40, 90, 60));
    }

    #[test]
    fn out_of_range_picture_is_rejected() {
        let config = VicConfig::default().with_picture(50, 101, 50);
        assert_eq!(config.validate(), Err(ConfigError::ContrastOutOfRange(101)));
        let config = VicConfig::default().with_picture(200, 50, 50);
        assert_eq!(config.validate(), Err(ConfigError::BrightnessOutOfRange(200)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_round_trips_through_json() {
        let config = VicConfig::new(ChipModel::Ntsc8562)
            .with_gray_dot_bug(true)
            .with_collision_checks(true, false)
            .with_picture(40, 90, 60);
        let json = serde_json::to_string(&config).expect("serialize");
        let back: VicConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
