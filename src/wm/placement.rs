//! Placement Module
//!
//! Initial position of a newly managed window. Two policies:
//!
//! - `Cascade`: a diagonal heuristic. Every existing window whose origin lies
//!   beyond the running extremum pushes the extremum to its far edge, so new
//!   windows land progressively down and to the right. It is not a packer
//!   and does not guarantee the result overlaps nothing.
//! - `Smart`: grid scan of the work area for the top-left-most spot that
//!   overlaps no managed window, falling back to `Cascade`.
//!
//! Both clamp the result into the padded screen area; the lower bound
//! (left/top padding) wins when the window is larger than the work area.

use tracing::debug;

use crate::config::PlacementPolicy;
use crate::shared::Geometry;
use crate::wm::client::ManagedWindow;
use crate::wm::registry::WindowRegistry;
use crate::wm::screen::ScreenInfo;

/// Placement manager
#[derive(Debug, Clone)]
pub struct PlacementManager {
    /// Current placement policy
    pub policy: PlacementPolicy,
}

impl PlacementManager {
    /// Create a new placement manager
    pub fn new(policy: PlacementPolicy) -> Self {
        Self { policy }
    }

    /// Compute the initial position of `window`. The window itself may
    /// already be in `registry`; it is skipped during the scan.
    pub fn next_position(
        &self,
        screen: &ScreenInfo,
        registry: &WindowRegistry,
        window: &ManagedWindow,
    ) -> (i32, i32) {
        let (x, y) = match self.policy {
            PlacementPolicy::Cascade => self.place_cascade(registry, window),
            PlacementPolicy::Smart => self
                .place_smart(screen, registry, window)
                .unwrap_or_else(|| self.place_cascade(registry, window)),
        };

        let (x, y) = clamp_to_screen(screen, x, y, &window.geometry);
        debug!("Found position for 0x{:x}: ({}, {})", window.id, x, y);
        (x, y)
    }

    /// Diagonal cascade past the current extremum
    fn place_cascade(&self, registry: &WindowRegistry, window: &ManagedWindow) -> (i32, i32) {
        let mut tx = 0;
        let mut ty = 0;

        for other in registry.iter().filter(|other| other.id != window.id) {
            if other.geometry.x > tx {
                tx = other.geometry.right();
            }
            if other.geometry.y > ty {
                ty = other.geometry.bottom();
            }
        }

        (tx, ty)
    }

    /// Smart placement (avoid overlapping windows)
    fn place_smart(
        &self,
        screen: &ScreenInfo,
        registry: &WindowRegistry,
        window: &ManagedWindow,
    ) -> Option<(i32, i32)> {
        let work_area = &screen.work_area;
        let geometry = &window.geometry;

        // Try positions in a grid
        let step_x = (geometry.width / 4).max(10) as usize;
        let step_y = (geometry.height / 4).max(10) as usize;
        let last_x = work_area.right() - geometry.width as i32;
        let last_y = work_area.bottom() - geometry.height as i32;

        let mut best: Option<(i32, i32)> = None;
        let mut best_score = i32::MAX;

        for y in (work_area.y..=last_y).step_by(step_y) {
            for x in (work_area.x..=last_x).step_by(step_x) {
                let score = x + y;
                if score >= best_score {
                    continue;
                }

                let candidate = Geometry::new(x, y, geometry.width, geometry.height);
                let overlaps = registry
                    .iter()
                    .filter(|other| other.id != window.id && other.has_geometry())
                    .any(|other| candidate.overlaps(&other.geometry));

                if !overlaps {
                    best_score = score;
                    best = Some((x, y));
                }
            }
        }

        best
    }
}

impl Default for PlacementManager {
    fn default() -> Self {
        Self::new(PlacementPolicy::Cascade)
    }
}

/// Keep the window's far edges inside the padded screen, then its origin
/// at or beyond the left/top padding.
fn clamp_to_screen(screen: &ScreenInfo, x: i32, y: i32, geometry: &Geometry) -> (i32, i32) {
    let p = &screen.padding;
    let max_x = screen.width as i32 - p.right as i32 - geometry.width as i32;
    let max_y = screen.height as i32 - p.bottom as i32 - geometry.height as i32;

    let x = x.min(max_x).max(p.left as i32);
    let y = y.min(max_y).max(p.top as i32);
    (x, y)
}
