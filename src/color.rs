use palette::{Hsl, IntoColor, Lighten, Srgb};

// ---------------------------------------------------------------------------
// Paired palette
// ---------------------------------------------------------------------------

/// Leading entries of the qualitative "Paired" colour map
/// (light blue, dark blue, light green, dark green).
pub fn paired_palette() -> [Srgb<u8>; 4] {
    [
        Srgb::new(166, 206, 227),
        Srgb::new(31, 120, 180),
        Srgb::new(178, 223, 138),
        Srgb::new(51, 160, 44),
    ]
}

/// A lighter tint of `base`, used for grid lines drawn under a curve.
/// `amount` is the relative lightening in `0.0..=1.0`.
pub fn tint(base: Srgb<u8>, amount: f32) -> Srgb<u8> {
    let hsl: Hsl = base.into_format::<f32>().into_color();
    let rgb: Srgb = hsl.lighten(amount).into_color();
    rgb.into_format()
}
