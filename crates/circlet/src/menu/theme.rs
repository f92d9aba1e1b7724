use derive_more::{Deref, From, Into};
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Colour `{0}` must start with '#'")]
    MissingHash(String),
    #[error("Colour `{0}` must have 6 or 8 hex digits")]
    Length(String),
    #[error("Colour `{0}` contains a non-hex digit")]
    Digit(String),
}

/// An sRGB colour with alpha, written as `#rrggbb` or `#rrggbbaa` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, SerializeDisplay, DeserializeFromStr)]
pub struct Color(Srgba<f64>);

impl Color {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn rgba(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self(Srgba::new(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            alpha,
        ))
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }
}

fn to_byte(component: f64) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return Err(ColorParseError::Length(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError::Digit(s.to_string()))
        };
        let alpha = if hex.len() == 8 {
            f64::from(channel(6)?) / 255.0
        } else {
            1.0
        };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            to_byte(c.red),
            to_byte(c.green),
            to_byte(c.blue)
        )?;
        let alpha = to_byte(c.alpha);
        if alpha != u8::MAX {
            write!(f, "{alpha:02x}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub unfocused_background: Color,
    pub unfocused_icon: Color,
    pub focused_background: Color,
    pub focused_icon: Color,
    /// Backdrop dimming colour.
    pub blackout: Color,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            unfocused_background: Color::white(),
            unfocused_icon: Color::rgb(51, 52, 51),
            focused_background: Color::rgb(60, 109, 240),
            focused_icon: Color::white(),
            blackout: Color::rgba(246, 246, 246, 0.64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppearanceChange {
    UnfocusedBackground(Color),
    UnfocusedIcon(Color),
    FocusedBackground(Color),
    FocusedIcon(Color),
    Blackout(Color),
}

impl Appearance {
    /// Colours that differ in `next`, in declaration order.
    pub fn diff(&self, next: &Appearance) -> Vec<AppearanceChange> {
        let pairs = [
            (
                self.unfocused_background,
                next.unfocused_background,
                AppearanceChange::UnfocusedBackground as fn(Color) -> AppearanceChange,
            ),
            (self.unfocused_icon, next.unfocused_icon, AppearanceChange::UnfocusedIcon),
            (self.focused_background, next.focused_background, AppearanceChange::FocusedBackground),
            (self.focused_icon, next.focused_icon, AppearanceChange::FocusedIcon),
            (self.blackout, next.blackout, AppearanceChange::Blackout),
        ];
        pairs
            .into_iter()
            .filter(|(old, new, _)| old != new)
            .map(|(_, new, change)| change(new))
            .collect()
    }
}

/// Colours a ring or submenu button is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotStyle {
    pub background: Color,
    pub icon: Color,
}

impl SlotStyle {
    pub fn resolve(appearance: &Appearance, focused: bool) -> Self {
        if focused {
            Self {
                background: appearance.focused_background,
                icon: appearance.focused_icon,
            }
        } else {
            Self {
                background: appearance.unfocused_background,
                icon: appearance.unfocused_icon,
            }
        }
    }
}

impl Default for SlotStyle {
    fn default() -> Self {
        Self::resolve(&Appearance::default(), false)
    }
}
