//! MoveResize Module
//!
//! Pointer-driven move and resize of one window at a time.
//!
//! ```text
//! Idle --press(mod + move button)--> Moving   --motion--> Moving
//! Idle --press(mod + resize button)-> Resizing --motion--> Resizing
//! Moving | Resizing --release(drag button)--> Idle
//! ```
//!
//! A press while a drag is active is ignored: the target never changes
//! mid-drag, and releasing that other button does not end the drag.

use tracing::{debug, warn};

use crate::config::{BindingsConfig, LayoutConfig};
use crate::shared::Geometry;
use crate::wm::display::{DisplayServer, ignored_modifiers};
use crate::wm::events::ButtonEvent;
use crate::wm::registry::WindowRegistry;
use crate::wm::screen::ScreenInfo;

/// Shift, Lock, Control and Mod1..Mod5; the pointer button bits are above.
const KEY_MODIFIERS: u16 = 0x00ff;

/// Pointer and window geometry captured when the drag started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Pointer position (root coordinates)
    pub pointer_x: i32,
    pub pointer_y: i32,

    /// Window geometry at start
    pub geometry: Geometry,
}

/// Move/resize operation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Moving { target: u32, button: u8, anchor: Anchor },
    Resizing { target: u32, button: u8, anchor: Anchor },
}

impl Interaction {
    pub fn target(&self) -> Option<u32> {
        match *self {
            Interaction::Idle => None,
            Interaction::Moving { target, .. } | Interaction::Resizing { target, .. } => {
                Some(target)
            }
        }
    }

    /// Button that started the drag
    fn button(&self) -> Option<u8> {
        match *self {
            Interaction::Idle => None,
            Interaction::Moving { button, .. } | Interaction::Resizing { button, .. } => {
                Some(button)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragKind {
    Move,
    Resize,
}

/// Move/resize manager
#[derive(Debug)]
pub struct MoveResizeManager {
    /// Current operation state
    state: Interaction,

    modifiers: u16,
    move_button: u8,
    resize_button: u8,

    min_width: u32,
    min_height: u32,

    /// Border width, for the outer bounding box and the pointer anchor
    border_width: u32,
}

impl MoveResizeManager {
    pub fn new(bindings: &BindingsConfig, layout: &LayoutConfig, border_width: u32) -> Self {
        Self {
            state: Interaction::Idle,
            modifiers: bindings.modifier_mask(),
            move_button: bindings.move_button,
            resize_button: bindings.resize_button,
            min_width: layout.min_width,
            min_height: layout.min_height,
            border_width,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> Interaction {
        self.state
    }

    /// Check if move/resize is active
    pub fn is_active(&self) -> bool {
        self.state != Interaction::Idle
    }

    /// Install the passive button grabs on the root window
    pub fn grab_buttons<D: DisplayServer>(&self, display: &D) -> anyhow::Result<()> {
        display.grab_button(self.move_button, self.modifiers)?;
        display.grab_button(self.resize_button, self.modifiers)?;
        Ok(())
    }

    fn drag_kind(&self, press: &ButtonEvent) -> Option<DragKind> {
        let held = press.state & KEY_MODIFIERS & !ignored_modifiers();
        if held != self.modifiers {
            return None;
        }
        if press.button == self.move_button {
            Some(DragKind::Move)
        } else if press.button == self.resize_button {
            Some(DragKind::Resize)
        } else {
            None
        }
    }

    /// Start a move or resize if `press` is a qualified binding on a window.
    /// Returns whether a drag started.
    pub fn handle_button_press<D: DisplayServer>(
        &mut self,
        display: &D,
        press: &ButtonEvent,
    ) -> bool {
        if let Some(target) = self.state.target() {
            debug!(
                "Ignoring button {} press on 0x{:x}: already dragging 0x{:x}",
                press.button, press.child, target
            );
            return false;
        }

        let Some(kind) = self.drag_kind(press) else {
            return false;
        };

        let window = press.child;
        if window == 0 || window == display.root() {
            debug!("Button press without a target window, ignoring");
            return false;
        }

        if let Err(e) = display.raise_window(window) {
            warn!("Failed to raise window 0x{:x}: {}", window, e);
        }

        let geometry = match display.query_geometry(window) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!("Not starting drag: {}", e);
                return false;
            }
        };

        // Move grabs the top-left corner, resize the bottom-right one
        let (warp_x, warp_y) = match kind {
            DragKind::Move => (0, 0),
            DragKind::Resize => (
                geometry.width.min(i16::MAX as u32) as i16,
                geometry.height.min(i16::MAX as u32) as i16,
            ),
        };
        if let Err(e) = display.warp_pointer(window, warp_x, warp_y) {
            warn!("Failed to warp pointer into window 0x{:x}: {}", window, e);
        }

        if let Err(e) = display.grab_pointer() {
            warn!("Not starting drag, pointer grab failed: {}", e);
            return false;
        }

        let bw = self.border_width as i32;
        let anchor = Anchor {
            pointer_x: geometry.x + bw + warp_x as i32,
            pointer_y: geometry.y + bw + warp_y as i32,
            geometry,
        };

        let button = press.button;
        self.state = match kind {
            DragKind::Move => {
                debug!("Starting move operation for window 0x{:x}", window);
                Interaction::Moving { target: window, button, anchor }
            }
            DragKind::Resize => {
                debug!("Starting resize operation for window 0x{:x}", window);
                Interaction::Resizing { target: window, button, anchor }
            }
        };
        true
    }

    /// Handle motion during move/resize
    pub fn handle_motion<D: DisplayServer>(
        &mut self,
        display: &D,
        screen: &ScreenInfo,
        registry: &mut WindowRegistry,
        root_x: i16,
        root_y: i16,
    ) {
        let (root_x, root_y) = (root_x as i32, root_y as i32);
        let outer = 2 * self.border_width;

        match self.state {
            Interaction::Idle => {}
            Interaction::Moving { target, anchor, .. } => {
                let start = anchor.geometry;
                let new_x = start.x + (root_x - anchor.pointer_x);
                let new_y = start.y + (root_y - anchor.pointer_y);

                // Keep the bounding box on screen
                let max_x = screen.width as i32 - (start.width + outer) as i32;
                let max_y = screen.height as i32 - (start.height + outer) as i32;
                let new_x = new_x.min(max_x).max(0);
                let new_y = new_y.min(max_y).max(0);

                if let Err(e) = display.move_window(target, new_x, new_y) {
                    warn!("Failed to move window 0x{:x}: {}", target, e);
                    return;
                }
                if let Some(window) = registry.find_mut(target) {
                    window.geometry.x = new_x;
                    window.geometry.y = new_y;
                }
            }
            Interaction::Resizing { target, anchor, .. } => {
                let start = anchor.geometry;
                let origin_x = start.x + self.border_width as i32;
                let origin_y = start.y + self.border_width as i32;

                let max_w = screen.width as i32 - start.x - outer as i32;
                let max_h = screen.height as i32 - start.y - outer as i32;
                let new_w = (root_x - origin_x).min(max_w).max(self.min_width as i32) as u32;
                let new_h = (root_y - origin_y).min(max_h).max(self.min_height as i32) as u32;

                if let Err(e) = display.resize_window(target, new_w, new_h) {
                    warn!("Failed to resize window 0x{:x}: {}", target, e);
                    return;
                }
                if let Some(window) = registry.find_mut(target) {
                    window.geometry.width = new_w;
                    window.geometry.height = new_h;
                }
            }
        }
    }

    /// Finish the move/resize once the button that started it is released
    pub fn handle_button_release<D: DisplayServer>(&mut self, display: &D, release: &ButtonEvent) {
        match self.state.button() {
            Some(button) if button == release.button => self.end_drag(display),
            Some(button) => debug!(
                "Ignoring button {} release, drag is bound to button {}",
                release.button, button
            ),
            None => {}
        }
    }

    fn end_drag<D: DisplayServer>(&mut self, display: &D) {
        let Some(target) = self.state.target() else {
            return;
        };

        if let Err(e) = display.ungrab_pointer() {
            warn!("Failed to release pointer grab: {}", e);
        }
        self.state = Interaction::Idle;
        debug!("Finished move/resize operation for window 0x{:x}", target);
    }

    /// End the drag early if its target went away
    pub fn forget_window<D: DisplayServer>(&mut self, display: &D, window: u32) {
        if self.state.target() == Some(window) {
            debug!("Drag target 0x{:x} disappeared", window);
            self.end_drag(display);
        }
    }
}
