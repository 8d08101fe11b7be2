//! Fixed level order

use crate::consts::{END_LEVEL, LEVEL_ORDER, TOTAL_MAIN_LEVELS};

/// Successor of `level_id` in the main order, or `"end"` if it is unknown or last
pub fn next_level(level_id: &str) -> &'static str {
    LEVEL_ORDER
        .iter()
        .position(|id| *id == level_id)
        .and_then(|i| LEVEL_ORDER.get(i + 1))
        .copied()
        .unwrap_or(END_LEVEL)
}

/// Whether `level_id` is one of the main levels
pub fn is_main_level(level_id: &str) -> bool {
    LEVEL_ORDER.contains(&level_id)
}

/// `round(100 * completed / 7)`, rounding half up
pub fn progress_percentage(completed: usize) -> u32 {
    let total = TOTAL_MAIN_LEVELS;
    ((200 * completed + total) / (2 * total)) as u32
}
