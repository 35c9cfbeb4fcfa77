//! Events Module
//!
//! Typed records for the protocol notifications the window manager core
//! reacts to, and the translation from raw x11rb events.

use x11rb::protocol::Event;
use x11rb::protocol::xproto::{NotifyDetail, NotifyMode};

use crate::shared::Geometry;

/// Button press/release as seen by the move/resize code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Pointer button number
    pub button: u8,
    /// Modifier and button state at the time of the event
    pub state: u16,
    /// Child of the root the pointer was over (0 if none)
    pub child: u32,
    pub root_x: i16,
    pub root_y: i16,
}

/// Window lifecycle and input events consumed by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmEvent {
    WindowCreated(u32),
    MapRequested(u32),
    WindowDestroyed(u32),
    ConfigureRequest { window: u32, requested: Geometry },
    FocusIn(u32),
    FocusOut(u32),
    PointerEntered(u32),
    ButtonPress(ButtonEvent),
    Motion { root_x: i16, root_y: i16 },
    ButtonRelease(ButtonEvent),
}

impl WmEvent {
    /// Translate a raw X event. Events the core has no interest in, events
    /// about the root window itself and override-redirect windows yield `None`.
    pub fn from_x11(event: &Event, root: u32) -> Option<Self> {
        let ours = |window: u32| window != 0 && window != root;

        let translated = match event {
            Event::CreateNotify(e) if !e.override_redirect && ours(e.window) => {
                WmEvent::WindowCreated(e.window)
            }
            Event::MapRequest(e) if ours(e.window) => WmEvent::MapRequested(e.window),
            Event::DestroyNotify(e) if ours(e.window) => WmEvent::WindowDestroyed(e.window),
            Event::ConfigureRequest(e) if ours(e.window) => WmEvent::ConfigureRequest {
                window: e.window,
                requested: Geometry::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
            },
            Event::FocusIn(e) if is_window_focus(e.mode, e.detail) && ours(e.event) => {
                WmEvent::FocusIn(e.event)
            }
            Event::FocusOut(e) if is_window_focus(e.mode, e.detail) && ours(e.event) => {
                WmEvent::FocusOut(e.event)
            }
            Event::EnterNotify(e) if ours(e.event) => WmEvent::PointerEntered(e.event),
            Event::ButtonPress(e) => WmEvent::ButtonPress(ButtonEvent {
                button: e.detail,
                state: u16::from(e.state),
                child: e.child,
                root_x: e.root_x,
                root_y: e.root_y,
            }),
            Event::MotionNotify(e) => WmEvent::Motion {
                root_x: e.root_x,
                root_y: e.root_y,
            },
            Event::ButtonRelease(e) => WmEvent::ButtonRelease(ButtonEvent {
                button: e.detail,
                state: u16::from(e.state),
                child: e.child,
                root_x: e.root_x,
                root_y: e.root_y,
            }),
            _ => return None,
        };

        Some(translated)
    }
}

/// Whether a focus change is about the top-level window itself. Grab and
/// ungrab changes come from our own pointer grab; inferior and pointer
/// details mean focus moved inside the window, not into or out of it.
fn is_window_focus(mode: NotifyMode, detail: NotifyDetail) -> bool {
    let grab = mode == NotifyMode::GRAB || mode == NotifyMode::UNGRAB;
    let inside = detail == NotifyDetail::INFERIOR || detail == NotifyDetail::POINTER;
    !grab && !inside
}
