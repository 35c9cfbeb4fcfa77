//! In-memory display server for unit tests.
//!
//! Keeps a geometry table standing in for the server's window state and
//! records every command the core issues.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::shared::Geometry;
use crate::wm::display::DisplayServer;
use crate::wm::error::WmError;

pub const ROOT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectRootEvents,
    GrabButton { button: u8, modifiers: u16 },
    GrabPointer,
    UngrabPointer,
    BorderColor { window: u32, pixel: u32 },
    BorderWidth { window: u32, width: u32 },
    SelectWindowEvents(u32),
    Move { window: u32, x: i32, y: i32 },
    Resize { window: u32, width: u32, height: u32 },
    MoveResize { window: u32, geometry: Geometry },
    Raise(u32),
    Map(u32),
    Warp { window: u32, x: i16, y: i16 },
    Focus(u32),
}

pub struct RecordingDisplay {
    size: (u32, u32),
    windows: RefCell<HashMap<u32, Geometry>>,
    existing: Vec<u32>,
    commands: RefCell<Vec<Command>>,
}

impl RecordingDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            windows: RefCell::new(HashMap::new()),
            existing: Vec::new(),
            commands: RefCell::new(Vec::new()),
        }
    }

    /// Make `window` known to the fake server with `geometry`
    pub fn with_window(self, window: u32, geometry: Geometry) -> Self {
        self.windows.borrow_mut().insert(window, geometry);
        self
    }

    /// Report `window` as already mapped when the tree is queried
    pub fn with_existing(mut self, window: u32, geometry: Geometry) -> Self {
        self.existing.push(window);
        self.with_window(window, geometry)
    }

    pub fn forget_window(&self, window: u32) {
        self.windows.borrow_mut().remove(&window);
    }

    pub fn geometry_of(&self, window: u32) -> Option<Geometry> {
        self.windows.borrow().get(&window).copied()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    fn record(&self, command: Command) {
        self.commands.borrow_mut().push(command);
    }

    fn update(&self, window: u32, f: impl FnOnce(&mut Geometry)) {
        if let Some(geometry) = self.windows.borrow_mut().get_mut(&window) {
            f(geometry);
        }
    }
}

impl DisplayServer for RecordingDisplay {
    fn root(&self) -> u32 {
        ROOT
    }

    fn screen_size(&self) -> (u32, u32) {
        self.size
    }

    fn select_root_events(&self) -> Result<()> {
        self.record(Command::SelectRootEvents);
        Ok(())
    }

    fn grab_button(&self, button: u8, modifiers: u16) -> Result<()> {
        self.record(Command::GrabButton { button, modifiers });
        Ok(())
    }

    fn grab_pointer(&self) -> Result<()> {
        self.record(Command::GrabPointer);
        Ok(())
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.record(Command::UngrabPointer);
        Ok(())
    }

    fn query_geometry(&self, window: u32) -> Result<Geometry, WmError> {
        self.geometry_of(window)
            .ok_or(WmError::GeometryUnavailable(window))
    }

    fn query_tree(&self) -> Result<Vec<u32>> {
        Ok(self.existing.clone())
    }

    fn set_border_color(&self, window: u32, pixel: u32) -> Result<()> {
        self.record(Command::BorderColor { window, pixel });
        Ok(())
    }

    fn set_border_width(&self, window: u32, width: u32) -> Result<()> {
        self.record(Command::BorderWidth { window, width });
        Ok(())
    }

    fn select_window_events(&self, window: u32) -> Result<()> {
        self.record(Command::SelectWindowEvents(window));
        Ok(())
    }

    fn move_window(&self, window: u32, x: i32, y: i32) -> Result<()> {
        self.record(Command::Move { window, x, y });
        self.update(window, |g| {
            g.x = x;
            g.y = y;
        });
        Ok(())
    }

    fn resize_window(&self, window: u32, width: u32, height: u32) -> Result<()> {
        self.record(Command::Resize { window, width, height });
        self.update(window, |g| {
            g.width = width;
            g.height = height;
        });
        Ok(())
    }

    fn move_resize_window(&self, window: u32, geometry: Geometry) -> Result<()> {
        self.record(Command::MoveResize { window, geometry });
        self.update(window, |g| *g = geometry);
        Ok(())
    }

    fn raise_window(&self, window: u32) -> Result<()> {
        self.record(Command::Raise(window));
        Ok(())
    }

    fn map_window(&self, window: u32) -> Result<()> {
        self.record(Command::Map(window));
        Ok(())
    }

    fn warp_pointer(&self, window: u32, x: i16, y: i16) -> Result<()> {
        self.record(Command::Warp { window, x, y });
        Ok(())
    }

    fn set_input_focus(&self, window: u32) -> Result<()> {
        self.record(Command::Focus(window));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
