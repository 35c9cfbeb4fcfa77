//! Window registry
//!
//! Ordered collection of managed windows. Insertion order is kept in a
//! `Vec` (placement and tiling walk it front to back) and an id → index map
//! makes lookup and removal independent of the window count.

use std::collections::HashMap;

use crate::wm::client::ManagedWindow;
use crate::wm::error::WmError;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct WindowRegistry {
    /// Managed windows, oldest first
    windows: Vec<ManagedWindow>,
    /// Window id → position in `windows`
    index: HashMap<u32, usize>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start managing `id` with zeroed geometry, appended after every
    /// existing window.
    pub fn insert(&mut self, id: u32) -> Result<&mut ManagedWindow, WmError> {
        if self.index.contains_key(&id) {
            return Err(WmError::AlreadyManaged(id));
        }

        self.windows
            .try_reserve(1)
            .map_err(|_| WmError::AllocationFailure(id))?;
        self.index
            .try_reserve(1)
            .map_err(|_| WmError::AllocationFailure(id))?;

        let slot = self.windows.len();
        self.windows.push(ManagedWindow::new(id));
        self.index.insert(id, slot);
        Ok(&mut self.windows[slot])
    }

    /// Stop managing `id`. Unknown ids are not an error; `None` is returned.
    pub fn remove(&mut self, id: u32) -> Option<ManagedWindow> {
        let slot = self.index.remove(&id)?;
        let removed = self.windows.remove(slot);

        // Everything after the removed slot shifted down by one
        for window in &self.windows[slot..] {
            if let Some(i) = self.index.get_mut(&window.id) {
                *i -= 1;
            }
        }

        Some(removed)
    }

    pub fn find(&self, id: u32) -> Option<&ManagedWindow> {
        self.index.get(&id).map(|&slot| &self.windows[slot])
    }

    pub fn find_mut(&mut self, id: u32) -> Option<&mut ManagedWindow> {
        let slot = *self.index.get(&id)?;
        Some(&mut self.windows[slot])
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Managed windows in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ManagedWindow> {
        self.windows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ManagedWindow> {
        self.windows.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }
}
