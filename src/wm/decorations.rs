//! Window borders for qtwm
//!
//! The only decoration qtwm draws is the core-protocol window border: a
//! configurable width and one of two colours depending on focus.

use tracing::warn;

use crate::config::AppearanceConfig;
use crate::wm::display::DisplayServer;

/// Stateless border styling
#[derive(Debug, Clone)]
pub struct Decorations {
    focused_color: u32,
    unfocused_color: u32,
    border_width: u32,
}

impl Decorations {
    pub fn new(config: &AppearanceConfig) -> Self {
        Self {
            focused_color: config.focused_color,
            unfocused_color: config.unfocused_color,
            border_width: config.border_width,
        }
    }

    /// Paint the focused or unfocused border colour
    pub fn set_border_color<D: DisplayServer>(&self, display: &D, window: u32, focused: bool) {
        let pixel = if focused {
            self.focused_color
        } else {
            self.unfocused_color
        };
        if let Err(e) = display.set_border_color(window, pixel) {
            warn!("Failed to set border color of window 0x{:x}: {}", window, e);
        }
    }

    pub fn set_border_width<D: DisplayServer>(&self, display: &D, window: u32) {
        if let Err(e) = display.set_border_width(window, self.border_width) {
            warn!("Failed to set border width of window 0x{:x}: {}", window, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::testing::{Command, RecordingDisplay};

    #[test]
    fn focus_selects_configured_colors() {
        let display = RecordingDisplay::new(800, 600);
        let decorations = Decorations::new(&AppearanceConfig {
            border_width: 3,
            focused_color: 0x00ff00,
            unfocused_color: 0x0000ff,
        });

        decorations.set_border_color(&display, 5, true);
        decorations.set_border_color(&display, 5, false);
        decorations.set_border_width(&display, 5);

        assert_eq!(
            display.commands(),
            vec![
                Command::BorderColor { window: 5, pixel: 0x00ff00 },
                Command::BorderColor { window: 5, pixel: 0x0000ff },
                Command::BorderWidth { window: 5, width: 3 },
            ]
        );
    }
}
