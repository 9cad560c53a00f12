//! Style colour strings.
//!
//! Built on `winnow` 0.7. Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
//! `rgb(r, g, b)`, `rgba(r, g, b, a)`, `transparent` and the CSS named
//! colours. Anything else (`hsl()`, `currentcolor`) is left to the consumer
//! as an opaque string.

use winnow::ascii::{float, space0};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::prelude::*;
use winnow::token::take_while;

/// An RGBA colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_pair(s: &str) -> Option<f32> {
    u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0)
}

fn hex_nibble(s: &str) -> Option<f32> {
    u8::from_str_radix(s, 16).ok().map(|v| (v * 17) as f32 / 255.0)
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from a packed `0xRRGGBB` value.
    pub fn from_rgb_u32(rgb: u32) -> Self {
        let c = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::rgba(c(16), c(8), c(0), 1.0)
    }

    /// Look up a CSS colour keyword (lowercase).
    pub fn named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .binary_search_by(|(n, _)| n.cmp(&name))
            .ok()
            .map(|i| Self::from_rgb_u32(NAMED_COLORS[i].1))
    }

    /// Parse the hex digits of `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 | 4 => {
                let a = if hex.len() == 4 {
                    hex_nibble(&hex[3..4])?
                } else {
                    1.0
                };
                Some(Self::rgba(
                    hex_nibble(&hex[0..1])?,
                    hex_nibble(&hex[1..2])?,
                    hex_nibble(&hex[2..3])?,
                    a,
                ))
            }
            6 | 8 => {
                let a = if hex.len() == 8 {
                    hex_pair(&hex[6..8])?
                } else {
                    1.0
                };
                Some(Self::rgba(
                    hex_pair(&hex[0..2])?,
                    hex_pair(&hex[2..4])?,
                    hex_pair(&hex[4..6])?,
                    a,
                ))
            }
            _ => None,
        }
    }

    /// Parse any supported colour notation. Case-insensitive; surrounding
    /// whitespace is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        parse_color.parse(lowered.as_str()).ok()
    }

    /// Same colour with its alpha multiplied by an opacity percentage.
    pub fn with_opacity(self, percent: f32) -> Self {
        let factor = if percent.is_nan() {
            1.0
        } else {
            percent.clamp(0.0, 100.0) / 100.0
        };
        Self {
            a: self.a * factor,
            ..self
        }
    }

    /// 8-bit channels.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (c(self.r), c(self.g), c(self.b))
    }

    /// CSS `rgba(r, g, b, a)` text. Alpha keeps up to three decimals.
    pub fn to_css_rgba(&self) -> String {
        let (r, g, b) = self.to_rgb8();
        let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
        format!("rgba({r}, {g}, {b}, {a})")
    }
}

/// Resolve a stored colour string against its opacity percentage.
///
/// Fully opaque colours pass through untouched; translucent ones become
/// `rgba()`. Strings the parser does not understand are returned as-is,
/// since the opacity cannot be folded into them.
pub fn composite(color: &str, opacity_percent: f32) -> String {
    let Some(parsed) = Color::parse(color) else {
        return color.to_string();
    };
    let out = parsed.with_opacity(opacity_percent);
    if out.a <= 0.0 {
        "transparent".to_string()
    } else if out.a >= 1.0 {
        color.trim().to_string()
    } else {
        out.to_css_rgba()
    }
}

/// CSS named colours, sorted by name.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

// ─── Parsers ─────────────────────────────────────────────────────────────

fn parse_color(input: &mut &str) -> ModalResult<Color> {
    alt((
        parse_hex_color,
        parse_rgb_function,
        "transparent".value(Color::TRANSPARENT),
        take_while(1.., |c: char| c.is_ascii_alphabetic()).verify_map(Color::named),
    ))
    .parse_next(input)
}

fn parse_hex_color(input: &mut &str) -> ModalResult<Color> {
    preceded('#', take_while(3..=8, |c: char| c.is_ascii_hexdigit()))
        .verify_map(Color::from_hex)
        .parse_next(input)
}

fn parse_channel(input: &mut &str) -> ModalResult<f32> {
    delimited(space0, float, space0).parse_next(input)
}

/// `rgb(r, g, b)` or `rgba(r, g, b, a)`; alpha is optional in both.
fn parse_rgb_function(input: &mut &str) -> ModalResult<Color> {
    (
        alt(("rgba(", "rgb(")),
        parse_channel,
        preceded(',', parse_channel),
        preceded(',', parse_channel),
        opt(preceded(',', parse_channel)),
        ')',
    )
        .map(|(_, r, g, b, a, _): (_, f32, f32, f32, Option<f32>, _)| {
            let c = |v: f32| v.clamp(0.0, 255.0) / 255.0;
            Color::rgba(c(r), c(g), c(b), a.unwrap_or(1.0).clamp(0.0, 1.0))
        })
        .parse_next(input)
}
