use std::str::FromStr;

use palette::Srgb;

use crate::map::style::exp::{self, Color, Exp};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
}

/// Parse `RRGGBB` with or without a leading `#`.
pub fn parse_hex(hex: &str) -> Result<Srgb<u8>, ColorError> {
    Srgb::<u8>::from_str(hex).map_err(|_| ColorError::InvalidHex(hex.to_string()))
}

/// Format as `#RRGGBB`.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

/// Theme colors the layers reference besides route colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    pub deemphasized: Srgb<u8>,
    pub fill3: Srgb<u8>,
    pub text: Srgb<u8>,
}

impl ColorPalette {
    pub fn light() -> Self {
        Self {
            deemphasized: Srgb::new(0x8A, 0x91, 0x99),
            fill3: Srgb::new(0xFF, 0xFF, 0xFF),
            text: Srgb::new(0x19, 0x20, 0x26),
        }
    }

    pub fn dark() -> Self {
        Self {
            deemphasized: Srgb::new(0x8A, 0x91, 0x99),
            fill3: Srgb::new(0x00, 0x00, 0x00),
            text: Srgb::new(0xE5, 0xE5, 0xE3),
        }
    }

    pub fn for_dark_mode(dark: bool) -> Self {
        if dark { Self::dark() } else { Self::light() }
    }

    pub fn from_hex(deemphasized: &str, fill3: &str, text: &str) -> Result<Self, ColorError> {
        Ok(Self {
            deemphasized: parse_hex(deemphasized)?,
            fill3: parse_hex(fill3)?,
            text: parse_hex(text)?,
        })
    }

    pub fn deemphasized_exp(&self) -> Exp<Color> {
        exp::color(to_hex(self.deemphasized))
    }

    pub fn fill3_exp(&self) -> Exp<Color> {
        exp::color(to_hex(self.fill3))
    }

    pub fn text_exp(&self) -> Exp<Color> {
        exp::color(to_hex(self.text))
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::light()
    }
}
