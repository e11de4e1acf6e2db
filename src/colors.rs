use std::fmt;

const SATURATION: u16 = 90;
const LIGHTNESS: u16 = 36;

/// Display colour for a username, in HSL with fixed saturation and lightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayColor {
    pub hue: u16,
    pub saturation: u16,
    pub lightness: u16,
}

/// Hashes the UTF-16 code units of `username` with `hash * 31 + unit` in
/// wrapping 32-bit signed arithmetic and folds the result onto a hue.
pub fn colorize(username: &str) -> DisplayColor {
    let hash = username.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });

    DisplayColor {
        hue: (hash % 360).unsigned_abs() as u16,
        saturation: SATURATION,
        lightness: LIGHTNESS,
    }
}

impl DisplayColor {
    /// Converts to 8-bit RGB using per-mille integer arithmetic.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = i32::from(self.saturation) * 10;
        let l = i32::from(self.lightness) * 10;
        let hue = i32::from(self.hue % 360);

        let chroma = (1000 - (2 * l - 1000).abs()) * s / 1000;
        let x = chroma * (60 - (hue % 120 - 60).abs()) / 60;
        let m = l - chroma / 2;

        let (r, g, b) = match hue / 60 {
            0 => (chroma, x, 0),
            1 => (x, chroma, 0),
            2 => (0, chroma, x),
            3 => (0, x, chroma),
            4 => (x, 0, chroma),
            _ => (chroma, 0, x),
        };

        let channel = |v: i32| (((v + m) * 255 + 500) / 1000).clamp(0, 255) as u8;
        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_maps_to_hue_zero() {
        assert_eq!(colorize("").hue, 0);
        assert_eq!(colorize("").to_string(), "hsl(0, 90%, 36%)");
    }

    #[test]
    fn known_hues() {
        assert_eq!(colorize("a").hue, 97);
        assert_eq!(colorize("bob").hue, 157);
        assert_eq!(colorize("alice").hue, 0);
        assert_eq!(colorize("thesephist").hue, 255);
    }

    #[test]
    fn wraps_on_overflow() {
        // accumulator goes negative for this one
        assert_eq!(colorize("a very long username indeed").hue, 26);
    }

    #[test]
    fn hashes_utf16_units() {
        assert_eq!(colorize("é😀").hue, 252);
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(colorize("alice"), colorize("alice"));
        assert_eq!(colorize("bob").to_string(), "hsl(157, 90%, 36%)");
    }

    #[test]
    fn rgb_conversion() {
        assert_eq!(colorize("").to_rgb(), (174, 9, 9));

        let green = DisplayColor {
            hue: 120,
            saturation: 90,
            lightness: 36,
        };
        assert_eq!(green.to_rgb(), (9, 174, 9));
    }
}
