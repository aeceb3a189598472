//! Overlay colour metadata handed to the renderer.

pub struct OverlayConfig {
    pub support_color: &'static str,
    pub resistance_color: &'static str,
    // Gradient colours for line importance, low score first
    pub score_gradient_colors: &'static [&'static str],
}

pub const OVERLAY_CONFIG: OverlayConfig = OverlayConfig {
    support_color: "#00c800",    // Green
    resistance_color: "#c80000", // Red
    // From low importance (navy blue) to high importance (dark red)
    score_gradient_colors: &[
        "#000080", // Navy blue
        "#4b0082", // Indigo
        "#ffb703", // Amber
        "#ff8c00", // Dark orange
        "#ff4500", // Orange red
        "#b22222", // Firebrick
        "#8b0000", // Dark red
    ],
};
