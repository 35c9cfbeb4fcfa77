//! Screen Module
//!
//! Screen metrics the placement, tiling and move/resize code share: the
//! pixel size of the root window and the usable work area left after the
//! configured edge padding.

use tracing::debug;

use crate::config::PaddingConfig;
use crate::shared::Geometry;

/// Per-screen geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    /// Screen width in pixels (all outputs combined)
    pub width: u32,

    /// Screen height in pixels (all outputs combined)
    pub height: u32,

    /// Edge padding (left, right, top, bottom)
    pub padding: PaddingConfig,

    /// Work area (screen minus padding)
    pub work_area: Geometry,
}

impl ScreenInfo {
    pub fn new(width: u32, height: u32, padding: PaddingConfig) -> Self {
        let mut screen = Self {
            width,
            height,
            padding,
            work_area: Geometry::default(),
        };
        screen.update_work_area();
        screen
    }

    /// Recompute the work area from the screen size and padding
    pub fn update_work_area(&mut self) {
        let p = &self.padding;
        let work_width = self.width.saturating_sub(p.left + p.right);
        let work_height = self.height.saturating_sub(p.top + p.bottom);

        self.work_area = Geometry {
            x: p.left as i32,
            y: p.top as i32,
            width: work_width,
            height: work_height,
        };

        debug!(
            "Updated work area: {}x{} at ({}, {})",
            work_width, work_height, p.left, p.top
        );
    }
}
