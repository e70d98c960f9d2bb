use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lighten, Srgb};

/// An sRGB triple shared by the egui view and the PNG renderer.
pub type Rgb = [u8; 3];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            from_hsl(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

/// Lighter variant of `rgb`, used for outer sunburst rings. `amount` scales
/// HSL lightness towards white.
pub fn lighten(rgb: Rgb, amount: f32) -> Rgb {
    let srgb: Srgb = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format();
    let hsl: Hsl = srgb.into_color();
    from_hsl(hsl.lighten(amount.clamp(0.0, 1.0)))
}

fn from_hsl(hsl: Hsl) -> Rgb {
    let rgb: Srgb = hsl.into_color();
    let rgb: Srgb<u8> = rgb.into_format();
    [rgb.red, rgb.green, rgb.blue]
}

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}
