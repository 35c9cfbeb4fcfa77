//! Tiling Module
//!
//! Grid layout of every managed window inside the work area. Windows fill
//! columns of at most `max_rows` cells; the number of columns grows with
//! the window count up to `max_cols`. A single window fills the work area,
//! up to `max_rows` windows share one column.
//!
//! With more than one window, cells are outer frames: the window's inner
//! size leaves room for its border on every side, so neighbouring frames
//! never overlap and the last row and column end on the work area edge.

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::shared::Geometry;
use crate::wm::display::DisplayServer;
use crate::wm::error::WmError;
use crate::wm::registry::WindowRegistry;

#[derive(Debug, Clone)]
pub struct TilingEngine {
    max_rows: u32,
    max_cols: u32,
    border_width: u32,
    enabled: bool,
}

impl TilingEngine {
    pub fn new(layout: &LayoutConfig, border_width: u32) -> Self {
        Self {
            max_rows: layout.max_rows.max(1),
            max_cols: layout.max_cols.max(1),
            border_width,
            enabled: layout.tiling,
        }
    }

    /// Most windows the grid can hold
    pub fn capacity(&self) -> usize {
        self.max_rows as usize * self.max_cols as usize
    }

    /// Cells for `count` windows, in registry order (column-major)
    pub fn layout(&self, work_area: &Geometry, count: usize) -> Result<Vec<Geometry>, WmError> {
        if count > self.capacity() {
            return Err(WmError::TilingOverflow {
                count,
                capacity: self.capacity(),
            });
        }

        let count = count as u32;
        let mut cells = Vec::with_capacity(count as usize);
        match count {
            0 => return Ok(cells),
            // A lone window covers the work area exactly
            1 => {
                cells.push(*work_area);
                return Ok(cells);
            }
            _ => {}
        }
        let frame = 2 * self.border_width;

        let cols = count.div_ceil(self.max_rows);
        let col_width = work_area.width / cols;

        for col in 0..cols {
            // Spread the windows evenly, earlier columns take the remainder
            let rows = count / cols + u32::from(col < count % cols);
            let row_height = work_area.height / rows;

            let x = work_area.x + (col * col_width) as i32;
            let width = if col == cols - 1 {
                work_area.width - col * col_width
            } else {
                col_width
            };

            for row in 0..rows {
                let y = work_area.y + (row * row_height) as i32;
                let height = if row == rows - 1 {
                    work_area.height - row * row_height
                } else {
                    row_height
                };
                let inner_width = width.saturating_sub(frame).max(1);
                let inner_height = height.saturating_sub(frame).max(1);
                cells.push(Geometry::new(x, y, inner_width, inner_height));
            }
        }

        Ok(cells)
    }

    /// Move and resize every managed window into its cell. On overflow no
    /// window is touched. Returns the number of windows laid out.
    pub fn retile<D: DisplayServer>(
        &self,
        display: &D,
        work_area: &Geometry,
        registry: &mut WindowRegistry,
    ) -> Result<usize, WmError> {
        if !self.enabled {
            debug!("Tiling disabled, leaving {} windows floating", registry.len());
            return Ok(0);
        }

        let cells = self.layout(work_area, registry.len())?;
        for (window, cell) in registry.iter_mut().zip(&cells) {
            if let Err(e) = display.move_resize_window(window.id, *cell) {
                warn!("Failed to tile window 0x{:x}: {}", window.id, e);
                continue;
            }
            window.geometry = *cell;
        }

        debug!("Tiled {} windows", cells.len());
        Ok(cells.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::testing::{Command, RecordingDisplay};

    fn work_area() -> Geometry {
        // 800x600 screen, padding (4, 4, 24, 4)
        Geometry::new(4, 24, 792, 572)
    }

    fn engine() -> TilingEngine {
        TilingEngine::new(&LayoutConfig::default(), 2)
    }

    /// Bounding box including the border
    fn outer(cell: &Geometry) -> Geometry {
        Geometry::new(cell.x, cell.y, cell.width + 4, cell.height + 4)
    }

    fn registry_of(count: u32) -> WindowRegistry {
        let mut registry = WindowRegistry::new();
        for id in 1..=count {
            registry.insert(id).unwrap().geometry = Geometry::new(id as i32, id as i32, 50, 50);
        }
        registry
    }

    #[test]
    fn empty_registry_is_a_no_op() {
        let display = RecordingDisplay::new(800, 600);
        let mut registry = WindowRegistry::new();
        assert_eq!(engine().retile(&display, &work_area(), &mut registry), Ok(0));
        assert!(display.commands().is_empty());
    }

    #[test]
    fn single_window_fills_work_area() {
        let display = RecordingDisplay::new(800, 600);
        let mut registry = registry_of(1);

        assert_eq!(engine().retile(&display, &work_area(), &mut registry), Ok(1));
        assert_eq!(
            display.commands(),
            vec![Command::MoveResize { window: 1, geometry: Geometry::new(4, 24, 792, 572) }]
        );
        assert_eq!(registry.find(1).unwrap().geometry, Geometry::new(4, 24, 792, 572));
    }

    #[test]
    fn up_to_max_rows_share_one_column() {
        let cells = engine().layout(&work_area(), 3).unwrap();
        assert_eq!(
            cells,
            vec![
                Geometry::new(4, 24, 788, 186),
                Geometry::new(4, 214, 788, 186),
                Geometry::new(4, 404, 788, 188),
            ]
        );
    }

    #[test]
    fn more_windows_add_columns() {
        let cells = engine().layout(&work_area(), 5).unwrap();
        assert_eq!(
            cells,
            vec![
                Geometry::new(4, 24, 392, 186),
                Geometry::new(4, 214, 392, 186),
                Geometry::new(4, 404, 392, 188),
                Geometry::new(400, 24, 392, 282),
                Geometry::new(400, 310, 392, 282),
            ]
        );
    }

    #[test]
    fn full_grid_has_no_overlaps_and_covers_work_area() {
        let area = work_area();
        let cells: Vec<Geometry> = engine().layout(&area, 16).unwrap().iter().map(outer).collect();
        assert_eq!(cells.len(), 16);

        for (i, a) in cells.iter().enumerate() {
            assert!(a.x >= area.x && a.y >= area.y);
            assert!(a.right() <= area.right() && a.bottom() <= area.bottom());
            for b in &cells[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }

        let covered: u64 = cells.iter().map(|c| c.width as u64 * c.height as u64).sum();
        assert_eq!(covered, area.width as u64 * area.height as u64);
    }

    #[test]
    fn bordered_frames_stay_apart_and_inside_work_area() {
        let area = work_area();
        let frames: Vec<Geometry> = engine().layout(&area, 2).unwrap().iter().map(outer).collect();
        assert_eq!(
            frames,
            vec![Geometry::new(4, 24, 792, 286), Geometry::new(4, 310, 792, 286)]
        );
        assert!(!frames[0].overlaps(&frames[1]));
        assert_eq!(frames[1].bottom(), area.bottom());
    }

    #[test]
    fn overflow_leaves_every_window_untouched() {
        let display = RecordingDisplay::new(800, 600);
        let mut registry = registry_of(17);
        let before: Vec<Geometry> = registry.iter().map(|w| w.geometry).collect();

        assert_eq!(
            engine().retile(&display, &work_area(), &mut registry),
            Err(WmError::TilingOverflow { count: 17, capacity: 16 })
        );
        assert!(display.commands().is_empty());
        let after: Vec<Geometry> = registry.iter().map(|w| w.geometry).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn disabled_tiling_writes_nothing() {
        let display = RecordingDisplay::new(800, 600);
        let mut registry = registry_of(3);
        let layout = LayoutConfig { tiling: false, ..LayoutConfig::default() };
        let engine = TilingEngine::new(&layout, 2);

        assert_eq!(engine.retile(&display, &work_area(), &mut registry), Ok(0));
        assert!(display.commands().is_empty());
    }

    #[test]
    fn capacity_follows_config() {
        let layout = LayoutConfig { max_rows: 2, max_cols: 3, ..LayoutConfig::default() };
        let engine = TilingEngine::new(&layout, 2);
        assert_eq!(engine.capacity(), 6);
        assert!(engine.layout(&work_area(), 6).is_ok());
        assert!(engine.layout(&work_area(), 7).is_err());
    }
}
