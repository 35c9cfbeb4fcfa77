use crate::shared::Geometry;

/// Window Manager client state
/// Represents a top-level window being managed by the WM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedWindow {
    /// X11 window ID
    pub id: u32,

    /// Last known/validated geometry (zeroed until the first successful query)
    pub geometry: Geometry,
}

impl ManagedWindow {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            geometry: Geometry::default(),
        }
    }

    /// Whether the geometry has been filled from a successful query
    pub fn has_geometry(&self) -> bool {
        self.geometry.width > 0 && self.geometry.height > 0
    }
}
