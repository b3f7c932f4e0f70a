//! Half-disc glyph geometry

use crate::svg::fmt_number;

/// SVG path for an upward-facing half disc centered on the origin.
///
/// Starts at the left rim, arcs over the top to the right rim, then closes
/// through the center, so the flat edge sits on the mark's baseline and the
/// dome points up. Outer radius encodes magnitude; the inner radius is zero.
pub fn half_disc_path(radius: f64) -> String {
    let r = fmt_number(radius);
    format!("M-{r},0A{r},{r},0,0,1,{r},0L0,0Z")
}
