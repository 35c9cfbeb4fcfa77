//! Window Manager Module
//!
//! Owns all mutable window manager state (registry, drag session, retiling
//! flag, screen metrics) and routes decoded events to the components.
//! Everything runs on one task, one event at a time.

pub mod client;
pub mod decorations;
pub mod display;
pub mod error;
pub mod events;
pub mod moveresize;
pub mod placement;
pub mod registry;
pub mod screen;
pub mod tiling;

#[cfg(test)]
pub mod testing;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::shared::Geometry;
use crate::wm::decorations::Decorations;
use crate::wm::display::DisplayServer;
use crate::wm::error::WmError;
use crate::wm::events::{ButtonEvent, WmEvent};
use crate::wm::moveresize::MoveResizeManager;
use crate::wm::placement::PlacementManager;
use crate::wm::registry::WindowRegistry;
use crate::wm::screen::ScreenInfo;
use crate::wm::tiling::TilingEngine;

pub struct WindowManager<D: DisplayServer> {
    display: D,
    screen: ScreenInfo,
    registry: WindowRegistry,
    decorations: Decorations,
    placement: PlacementManager,
    moveresize: MoveResizeManager,
    tiling: TilingEngine,
    focus_follows_mouse: bool,
    /// Set when the set of managed windows changed
    needs_tiling: bool,
}

impl<D: DisplayServer> WindowManager<D> {
    pub fn new(display: D, config: &Config) -> Self {
        let (width, height) = display.screen_size();
        let screen = ScreenInfo::new(width, height, config.padding);

        Self {
            display,
            screen,
            registry: WindowRegistry::new(),
            decorations: Decorations::new(&config.appearance),
            placement: PlacementManager::new(config.layout.placement),
            moveresize: MoveResizeManager::new(
                &config.bindings,
                &config.layout,
                config.appearance.border_width,
            ),
            tiling: TilingEngine::new(&config.layout, config.appearance.border_width),
            focus_follows_mouse: config.focus.follow_mouse,
            needs_tiling: false,
        }
    }

    /// Select root events, install the pointer bindings and adopt the
    /// windows that are already mapped.
    pub fn start(&mut self) -> Result<()> {
        self.display.select_root_events()?;
        self.moveresize
            .grab_buttons(&self.display)
            .context("Failed to grab move/resize buttons")?;

        let existing = self
            .display
            .query_tree()
            .context("Failed to list existing windows")?;
        info!("Adopting {} existing windows", existing.len());
        for window in existing {
            self.manage_window(window);
        }

        self.display.flush()?;
        Ok(())
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn needs_tiling(&self) -> bool {
        self.needs_tiling
    }

    /// Route one event to the component that owns it
    pub fn handle_event(&mut self, event: WmEvent) {
        match event {
            WmEvent::WindowCreated(window) => {
                debug!("event: create notify 0x{:x}", window);
                self.manage_window(window);
            }
            WmEvent::MapRequested(window) => {
                debug!("event: map request 0x{:x}", window);
                self.manage_window(window);
            }
            WmEvent::WindowDestroyed(window) => {
                debug!("event: destroy notify 0x{:x}", window);
                self.unmanage_window(window);
            }
            WmEvent::ConfigureRequest { window, requested } => {
                self.configure_request(window, requested);
            }
            WmEvent::FocusIn(window) => self.focus_changed(window, true),
            WmEvent::FocusOut(window) => self.focus_changed(window, false),
            WmEvent::PointerEntered(window) => self.pointer_entered(window),
            WmEvent::ButtonPress(press) => self.button_press(&press),
            WmEvent::Motion { root_x, root_y } => {
                self.moveresize.handle_motion(
                    &self.display,
                    &self.screen,
                    &mut self.registry,
                    root_x,
                    root_y,
                );
            }
            WmEvent::ButtonRelease(release) => {
                self.moveresize.handle_button_release(&self.display, &release);
            }
        }
    }

    /// Run the tiling pass if the managed set changed since the last one
    pub fn retile_if_needed(&mut self) {
        if !self.needs_tiling {
            return;
        }
        // Cleared on every path, overflow included
        self.needs_tiling = false;

        match self
            .tiling
            .retile(&self.display, &self.screen.work_area, &mut self.registry)
        {
            Ok(count) => debug!("Retiled {} windows", count),
            Err(e @ WmError::TilingOverflow { .. }) => warn!("Skipping tiling pass: {}", e),
            Err(e) => warn!("Tiling pass failed: {}", e),
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.display.flush()
    }

    /// Start managing a window: border, placement, map
    fn manage_window(&mut self, window: u32) {
        match self.registry.insert(window) {
            Ok(_) => {}
            Err(WmError::AlreadyManaged(_)) => {
                debug!("Window 0x{:x} is already managed, skipping", window);
                return;
            }
            Err(e) => {
                error!("Couldn't set up window 0x{:x}: {}", window, e);
                return;
            }
        }

        self.decorations.set_border_color(&self.display, window, false);
        self.decorations.set_border_width(&self.display, window);
        if let Err(e) = self.display.select_window_events(window) {
            warn!("Failed to select events on window 0x{:x}: {}", window, e);
        }

        let geometry = match self.display.query_geometry(window) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!("{}, placing it with unknown size", e);
                Geometry::default()
            }
        };

        let Some(record) = self.registry.find_mut(window) else {
            return;
        };
        record.geometry = geometry;

        let (x, y) = match self.registry.find(window) {
            Some(record) => self.placement.next_position(&self.screen, &self.registry, record),
            None => return,
        };

        if let Err(e) = self.display.move_window(window, x, y) {
            warn!("Failed to move window 0x{:x}: {}", window, e);
        }
        if let Some(record) = self.registry.find_mut(window) {
            record.geometry.x = x;
            record.geometry.y = y;
        }

        if let Err(e) = self.display.map_window(window) {
            warn!("Failed to map window 0x{:x}: {}", window, e);
        }

        self.needs_tiling = true;
        debug!("Managed window 0x{:x} at ({}, {})", window, x, y);
    }

    fn unmanage_window(&mut self, window: u32) {
        self.moveresize.forget_window(&self.display, window);

        if self.registry.remove(window).is_some() {
            self.needs_tiling = true;
            debug!("Forgot window 0x{:x}", window);
        } else {
            debug!("{}, ignoring destroy", WmError::UnknownWindow(window));
        }
    }

    /// Client configure requests are acknowledged but not acted on: the
    /// manager does not enforce or forward configuration overrides.
    fn configure_request(&mut self, window: u32, requested: Geometry) {
        if self.registry.contains(window) {
            debug!(
                "Configure request for 0x{:x} ({}x{}+{}+{}) left as is",
                window, requested.width, requested.height, requested.x, requested.y
            );
        } else {
            warn!(
                "Configure request for a window we don't know about yet: {}",
                WmError::UnknownWindow(window)
            );
        }
    }

    fn focus_changed(&mut self, window: u32, focused: bool) {
        if !self.registry.contains(window) {
            debug!("Focus change on unmanaged window 0x{:x}", window);
            return;
        }
        self.decorations.set_border_color(&self.display, window, focused);
    }

    fn pointer_entered(&mut self, window: u32) {
        if !self.focus_follows_mouse || self.moveresize.is_active() {
            return;
        }
        if !self.registry.contains(window) {
            return;
        }
        if let Err(e) = self.display.set_input_focus(window) {
            warn!("Failed to focus window 0x{:x}: {}", window, e);
        }
    }

    fn button_press(&mut self, press: &ButtonEvent) {
        if self.moveresize.handle_button_press(&self.display, press) {
            debug!("Drag started on 0x{:x} with button {}", press.child, press.button);
        }
    }
}
