use serde::{Deserialize, Serialize};

/// An sRGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("navy", 0x000080),
    ("yellow", 0xffff00),
    ("brown", 0xa52a2a),
    ("orange", 0xffa500),
    ("purple", 0x800080),
    ("cyan", 0x00ffff),
    ("magenta", 0xff00ff),
    ("pink", 0xffc0cb),
    ("teal", 0x008080),
    ("olive", 0x808000),
    ("maroon", 0x800000),
    ("silver", 0xc0c0c0),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("tan", 0xd2b48c),
    ("khaki", 0xf0e68c),
    ("skyblue", 0x87ceeb),
];

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(&self) -> u32 {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (c(self.r) << 16) | (c(self.g) << 8) | c(self.b)
    }

    /// Strict parse of a CSS colour name, `#rgb`, `#rrggbb` or `0xrrggbb`.
    pub fn try_parse(style: &str) -> Option<Self> {
        let s = style.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#').or_else(|| s.strip_prefix("0x")) {
            return match hex.len() {
                6 => u32::from_str_radix(hex, 16).ok().map(Self::from_hex),
                3 => {
                    let short = u32::from_str_radix(hex, 16).ok()?;
                    let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                    Some(Self::from_hex((r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11)))
                }
                _ => None,
            };
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, hex)| Self::from_hex(*hex))
    }

    /// Lenient parse: unknown styles log a warning and fall back to white.
    pub fn parse(style: &str) -> Self {
        Self::try_parse(style).unwrap_or_else(|| {
            tracing::warn!("unknown colour {style:?}, using white");
            Self::WHITE
        })
    }

    /// sRGB to linear, per component.
    pub fn to_linear(&self) -> [f32; 3] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(Color::parse("brown").to_hex(), 0xa52a2a);
        assert_eq!(Color::parse("Green").to_hex(), 0x008000);
        assert_eq!(Color::parse("#b9d5ff").to_hex(), 0xb9d5ff);
        assert_eq!(Color::parse("0x262837").to_hex(), 0x262837);
        assert_eq!(Color::parse("#fff").to_hex(), 0xffffff);
    }

    #[test]
    fn unknown_name_falls_back_to_white() {
        assert!(Color::try_parse("yelow").is_none());
        assert_eq!(Color::parse("yelow"), Color::WHITE);
        assert!(Color::try_parse("#12345").is_none());
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color::WHITE.to_linear(), [1.0, 1.0, 1.0]);
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let mid = Color::new(0.5, 0.5, 0.5).to_linear()[0];
        assert!(mid > 0.2 && mid < 0.22);
    }
}
