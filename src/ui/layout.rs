use serde::{Deserialize, Serialize};

/// Whether the column count follows the window after startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Computed once at startup and kept
    Fixed,
    /// Recomputed whenever the window is resized
    #[default]
    FollowViewport,
}

/// How many `item_width_px` cells fit across `screen_width_px`. Always at least 1.
pub fn columns(screen_width_px: u32, item_width_px: u32) -> u32 {
    if item_width_px == 0 {
        return 1;
    }
    (screen_width_px / item_width_px).max(1)
}
