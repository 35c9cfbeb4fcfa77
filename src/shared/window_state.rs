//! Shared window state
//!
//! Geometry primitives used by the registry, placement, tiling and the
//! interactive move/resize code.

/// Window geometry (outer position, inner size)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Check if two geometries overlap
    pub fn overlaps(&self, other: &Geometry) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Geometry::new(0, 0, 100, 100);
        let b = Geometry::new(100, 0, 50, 50);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn nested_geometry_overlaps() {
        let a = Geometry::new(0, 0, 100, 100);
        let b = Geometry::new(10, 10, 5, 5);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }
}
