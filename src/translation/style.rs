/*!
 * Style equivalence predicates.
 *
 * These decide whether a styled run needs to be protected by placeholders
 * at all. They are deliberately loose and are not meant as general style
 * comparison.
 */

use crate::document::{GraphicState, Style};

/// Font sizes closer than this are the same size
const SIZE_EPSILON: f64 = 0.02;

/// Size ratios strictly inside this range count as the same style
const SIZE_RATIO_RANGE: (f64, f64) = (0.7, 1.3);

fn same_graphic_state(a: Option<&GraphicState>, b: Option<&GraphicState>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.passthrough_per_char_instruction == b.passthrough_per_char_instruction,
        _ => false,
    }
}

fn same_size(a: &Style, b: &Style) -> bool {
    (a.font_size - b.font_size).abs() < SIZE_EPSILON
}

/// Same font, same size and same drawing state.
pub fn is_same_style(a: &Style, b: &Style) -> bool {
    a.font_id == b.font_id && same_size(a, b) && same_graphic_state(a.graphic_state.as_ref(), b.graphic_state.as_ref())
}

/// Same font and drawing state, size within the drop-cap tolerance.
pub fn is_same_style_except_size(a: &Style, b: &Style) -> bool {
    if b.font_size == 0.0 {
        return is_same_style(a, b);
    }
    let ratio = (a.font_size / b.font_size).abs();
    a.font_id == b.font_id
        && ratio >= SIZE_RATIO_RANGE.0
        && ratio <= SIZE_RATIO_RANGE.1
        && same_graphic_state(a.graphic_state.as_ref(), b.graphic_state.as_ref())
}

/// Same size and drawing state; the font may differ.
pub fn is_same_style_except_font(a: &Style, b: &Style) -> bool {
    same_size(a, b) && same_graphic_state(a.graphic_state.as_ref(), b.graphic_state.as_ref())
}
