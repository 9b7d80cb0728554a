use iced_core::Color;
use palette::Srgb;

/// Reference line of the whole study, drawn at full opacity regardless of selection.
pub const STUDY: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};
/// Uniform colour of patient trajectories inside detail panels.
pub const SUB_ENTITY: Color = Color {
    r: 0.6,
    g: 0.6,
    b: 0.6,
    a: 0.5,
};
/// Used for entities without a label row or with an unparsable colour.
pub const DEFAULT_ENTITY: Color = Color {
    r: 0.667,
    g: 0.667,
    b: 0.667,
    a: 1.0,
};
/// Highlight outline of the detail panel bound to the current selection.
pub const HIGHLIGHT: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

pub fn hex_to_color(hex: &str) -> Option<Color> {
    let rgb: Srgb<u8> = hex.trim().parse().ok()?;
    Some(Color::from_rgb8(rgb.red, rgb.green, rgb.blue))
}

/// Hex colour with its alpha replaced by `alpha`, for dimming unselected series.
pub fn translucent(hex: &str, alpha: f32) -> Option<Color> {
    hex_to_color(hex).map(|color| color.scale_alpha(alpha.clamp(0.0, 1.0)))
}

pub fn entity_color(hex: Option<&str>) -> Color {
    hex.and_then(hex_to_color).unwrap_or(DEFAULT_ENTITY)
}

pub fn color_to_hex(color: Color) -> String {
    let [r, g, b, _] = color.into_rgba8();
    format!("#{r:02x}{g:02x}{b:02x}")
}
