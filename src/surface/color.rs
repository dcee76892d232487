use crate::geometry::{Color, Rgba};

const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("black", Rgba::opaque(0, 0, 0)),
    ("white", Rgba::opaque(255, 255, 255)),
    ("red", Rgba::opaque(255, 0, 0)),
    ("green", Rgba::opaque(0, 128, 0)),
    ("lime", Rgba::opaque(0, 255, 0)),
    ("blue", Rgba::opaque(0, 0, 255)),
    ("yellow", Rgba::opaque(255, 255, 0)),
    ("cyan", Rgba::opaque(0, 255, 255)),
    ("magenta", Rgba::opaque(255, 0, 255)),
    ("gray", Rgba::opaque(128, 128, 128)),
    ("grey", Rgba::opaque(128, 128, 128)),
    ("orange", Rgba::opaque(255, 165, 0)),
    ("purple", Rgba::opaque(128, 0, 128)),
    ("transparent", Rgba::new(0, 0, 0, 0)),
];

/// Resolves a color token into RGBA, or `None` if the syntax is not understood.
pub fn parse_color(color: &Color) -> Option<Rgba> {
    let token = color.as_str().trim();
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = token.to_ascii_lowercase();
    if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
        return parse_rgb_function(args);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgba)| *rgba)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 | 4 => {
            let mut channels = [255_u8; 4];
            for (slot, ch) in channels.iter_mut().zip(hex.chars()) {
                let nibble = u8::try_from(ch.to_digit(16)?).ok()?;
                *slot = nibble * 17;
            }
            let [r, g, b, a] = channels;
            Some(Rgba::new(r, g, b, a))
        }
        6 | 8 => {
            let mut channels = [255_u8; 4];
            for (index, slot) in channels.iter_mut().enumerate().take(hex.len() / 2) {
                *slot = u8::from_str_radix(&hex[index * 2..index * 2 + 2], 16).ok()?;
            }
            let [r, g, b, a] = channels;
            Some(Rgba::new(r, g, b, a))
        }
        _ => None,
    }
}

fn function_args<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    token
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_function(args: &str) -> Option<Rgba> {
    let parts = args.split(',').map(str::trim).collect::<Vec<_>>();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |part: &str| -> Option<u8> {
        let value = part.parse::<f64>().ok()?;
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(part) => {
            let alpha = part.parse::<f64>().ok()?;
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Rgba::new(r, g, b, a))
}
