//! Display Module
//!
//! The narrow set of requests the window manager core issues to the X
//! server, expressed as the `DisplayServer` trait, and its x11rb
//! implementation over a `RustConnection`.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::shared::Geometry;
use crate::wm::error::WmError;

/// Requests the core needs from the display server.
///
/// Every call is synchronous from the caller's point of view. Commands that
/// the core treats as fire-and-forget still return a `Result` so transport
/// failures can be logged.
pub trait DisplayServer {
    /// Root window of the managed screen
    fn root(&self) -> u32;

    /// Screen size in pixels (width, height)
    fn screen_size(&self) -> (u32, u32);

    /// Ask for create/destroy/map notifications of the root's children
    fn select_root_events(&self) -> Result<()>;

    /// Passively grab `button` + `modifiers` on the root window
    fn grab_button(&self, button: u8, modifiers: u16) -> Result<()>;

    /// Actively grab the pointer for the duration of a drag
    fn grab_pointer(&self) -> Result<()>;

    fn ungrab_pointer(&self) -> Result<()>;

    /// Round-trip for the current geometry of `window`
    fn query_geometry(&self, window: u32) -> Result<Geometry, WmError>;

    /// Viewable, non-override-redirect children of the root
    fn query_tree(&self) -> Result<Vec<u32>>;

    fn set_border_color(&self, window: u32, pixel: u32) -> Result<()>;

    fn set_border_width(&self, window: u32, width: u32) -> Result<()>;

    /// Ask for enter/focus events on a managed window
    fn select_window_events(&self, window: u32) -> Result<()>;

    fn move_window(&self, window: u32, x: i32, y: i32) -> Result<()>;

    fn resize_window(&self, window: u32, width: u32, height: u32) -> Result<()>;

    fn move_resize_window(&self, window: u32, geometry: Geometry) -> Result<()>;

    /// Raise `window` above its siblings
    fn raise_window(&self, window: u32) -> Result<()>;

    fn map_window(&self, window: u32) -> Result<()>;

    /// Warp the pointer to an offset relative to `window`
    fn warp_pointer(&self, window: u32, x: i16, y: i16) -> Result<()>;

    fn set_input_focus(&self, window: u32) -> Result<()>;

    fn flush(&self) -> Result<()>;
}

/// Lock and NumLock (Mod2) are toggles; bindings must fire with either on.
pub fn ignored_modifiers() -> u16 {
    u16::from(ModMask::LOCK) | u16::from(ModMask::M2)
}

/// X11 connection to a single screen
pub struct X11Display {
    conn: Arc<RustConnection>,
    root: u32,
    width: u32,
    height: u32,
}

impl X11Display {
    /// Connect to the X server named by `$DISPLAY`
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
        let conn = Arc::new(conn);

        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let width = screen.width_in_pixels as u32;
        let height = screen.height_in_pixels as u32;

        info!("Connected to X server, screen {}, root window 0x{:x}", screen_num, root);
        info!("Screen size: {}x{}", width, height);

        let display = Self {
            conn,
            root,
            width,
            height,
        };
        display.log_monitors();
        Ok(display)
    }

    /// Shared handle to the connection (for the event stream)
    pub fn connection(&self) -> Arc<RustConnection> {
        Arc::clone(&self.conn)
    }

    /// Report the RandR monitor layout. Placement and tiling work on the
    /// whole screen, so this is informational only.
    fn log_monitors(&self) {
        let monitors = self
            .conn
            .randr_get_monitors(self.root, true)
            .map_err(anyhow::Error::from)
            .and_then(|cookie| cookie.reply().map_err(anyhow::Error::from));

        match monitors {
            Ok(reply) => {
                for (i, m) in reply.monitors.iter().enumerate() {
                    info!(
                        "Monitor {}: {}x{}+{}+{}{}",
                        i,
                        m.width,
                        m.height,
                        m.x,
                        m.y,
                        if m.primary { " (primary)" } else { "" }
                    );
                }
            }
            Err(e) => debug!("RandR monitor query unavailable: {}", e),
        }
    }
}

impl DisplayServer for X11Display {
    fn root(&self) -> u32 {
        self.root
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn select_root_events(&self) -> Result<()> {
        self.conn
            .change_window_attributes(
                self.root,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_NOTIFY),
            )?
            .check()
            .context("Failed to select substructure events on the root window")?;
        Ok(())
    }

    fn grab_button(&self, button: u8, modifiers: u16) -> Result<()> {
        let lock = u16::from(ModMask::LOCK);
        let num_lock = u16::from(ModMask::M2);
        for extra in [0, lock, num_lock, lock | num_lock] {
            self.conn.grab_button(
                false,
                self.root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                ButtonIndex::from(button),
                ModMask::from(modifiers | extra),
            )?;
        }
        Ok(())
    }

    fn grab_pointer(&self) -> Result<()> {
        self.conn.grab_pointer(
            false,
            self.root,
            EventMask::BUTTON_RELEASE | EventMask::BUTTON_MOTION | EventMask::POINTER_MOTION,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
            self.root,
            x11rb::NONE,
            x11rb::CURRENT_TIME,
        )?;
        Ok(())
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn query_geometry(&self, window: u32) -> Result<Geometry, WmError> {
        let reply = self
            .conn
            .get_geometry(window)
            .map_err(anyhow::Error::from)
            .and_then(|cookie| cookie.reply().map_err(anyhow::Error::from));

        match reply {
            Ok(geom) => {
                debug!(
                    "Got geometry of 0x{:x}: {}x{}+{}+{}",
                    window, geom.width, geom.height, geom.x, geom.y
                );
                Ok(Geometry::new(
                    geom.x as i32,
                    geom.y as i32,
                    geom.width as u32,
                    geom.height as u32,
                ))
            }
            Err(e) => {
                debug!("Failed to get geometry for window 0x{:x}: {}", window, e);
                Err(WmError::GeometryUnavailable(window))
            }
        }
    }

    fn query_tree(&self) -> Result<Vec<u32>> {
        let tree = self
            .conn
            .query_tree(self.root)?
            .reply()
            .context("Failed to query root window children")?;

        let mut viewable = Vec::new();
        for child in tree.children {
            match self.conn.get_window_attributes(child)?.reply() {
                Ok(attrs) if attrs.map_state == MapState::VIEWABLE && !attrs.override_redirect => {
                    viewable.push(child);
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping window 0x{:x}, it probably disappeared: {}", child, e),
            }
        }
        Ok(viewable)
    }

    fn set_border_color(&self, window: u32, pixel: u32) -> Result<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().border_pixel(pixel),
        )?;
        Ok(())
    }

    fn set_border_width(&self, window: u32, width: u32) -> Result<()> {
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().border_width(width))?;
        Ok(())
    }

    fn select_window_events(&self, window: u32) -> Result<()> {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new()
                .event_mask(EventMask::ENTER_WINDOW | EventMask::FOCUS_CHANGE),
        )?;
        Ok(())
    }

    fn move_window(&self, window: u32, x: i32, y: i32) -> Result<()> {
        if window == self.root || window == x11rb::NONE {
            warn!("Refusing to move window 0x{:x}", window);
            return Ok(());
        }

        debug!("Moving window 0x{:x} to ({}, {})", window, x, y);
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().x(x).y(y))?;
        Ok(())
    }

    fn resize_window(&self, window: u32, width: u32, height: u32) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().width(width).height(height),
        )?;
        Ok(())
    }

    fn move_resize_window(&self, window: u32, geometry: Geometry) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.x)
                .y(geometry.y)
                .width(geometry.width)
                .height(geometry.height),
        )?;
        Ok(())
    }

    fn raise_window(&self, window: u32) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        Ok(())
    }

    fn map_window(&self, window: u32) -> Result<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn warp_pointer(&self, window: u32, x: i16, y: i16) -> Result<()> {
        self.conn
            .warp_pointer(x11rb::NONE, window, 0, 0, 0, 0, x, y)?;
        Ok(())
    }

    fn set_input_focus(&self, window: u32) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}
