//! Configuration system for qtwm
//!
//! Loads configuration from TOML file at `~/.config/qtwm/config.toml`
//! Auto-generates default config file on first run if missing.
//! The configuration is read once at startup and never changes afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use x11rb::protocol::xproto::ModMask;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bindings: BindingsConfig,
    pub appearance: AppearanceConfig,
    pub padding: PaddingConfig,
    pub layout: LayoutConfig,
    pub focus: FocusConfig,
}

impl Config {
    /// Load configuration from the default location, or use defaults if the
    /// file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            // Auto-generate default config file
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Reject values the layout code cannot work with
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        if layout.max_rows == 0 || layout.max_cols == 0 {
            anyhow::bail!(
                "layout.max_rows and layout.max_cols must be non-zero (got {}x{})",
                layout.max_rows,
                layout.max_cols
            );
        }
        if layout.min_width == 0 || layout.min_height == 0 {
            anyhow::bail!(
                "layout.min_width and layout.min_height must be non-zero (got {}x{})",
                layout.min_width,
                layout.min_height
            );
        }
        let bindings = &self.bindings;
        if bindings.modifiers.is_empty() {
            // An unmodified grab would swallow every plain click on the screen
            anyhow::bail!("bindings.modifiers must name at least one modifier key");
        }
        if bindings.move_button == 0 || bindings.resize_button == 0 {
            anyhow::bail!(
                "bindings buttons start at 1 (move_button = {}, resize_button = {})",
                bindings.move_button,
                bindings.resize_button
            );
        }
        if self.bindings.move_button == self.bindings.resize_button {
            anyhow::bail!(
                "bindings.move_button and bindings.resize_button must differ (both {})",
                self.bindings.move_button
            );
        }
        Ok(())
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("qtwm");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = Self::default();
        let toml_string = toml::to_string_pretty(&default_config)
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Modifier keys that can qualify a pointer binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Shift,
    Control,
    Mod1,
    Mod3,
    Mod4,
    Mod5,
}

impl ModifierKey {
    pub fn mask(self) -> ModMask {
        match self {
            ModifierKey::Shift => ModMask::SHIFT,
            ModifierKey::Control => ModMask::CONTROL,
            ModifierKey::Mod1 => ModMask::M1,
            ModifierKey::Mod3 => ModMask::M3,
            ModifierKey::Mod4 => ModMask::M4,
            ModifierKey::Mod5 => ModMask::M5,
        }
    }
}

/// Pointer bindings for interactive move/resize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingsConfig {
    /// Modifiers that must be held for move/resize
    pub modifiers: Vec<ModifierKey>,
    /// Pointer button that starts a move
    pub move_button: u8,
    /// Pointer button that starts a resize
    pub resize_button: u8,
}

impl BindingsConfig {
    /// Combined modifier mask
    pub fn modifier_mask(&self) -> u16 {
        self.modifiers
            .iter()
            .fold(0u16, |mask, key| mask | u16::from(key.mask()))
    }
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            modifiers: vec![ModifierKey::Mod1],
            move_button: 1,
            resize_button: 3,
        }
    }
}

/// Border appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Border width in pixels
    pub border_width: u32,
    /// Border pixel of the focused window (0xAARRGGBB)
    pub focused_color: u32,
    /// Border pixel of every other window (0xAARRGGBB)
    pub unfocused_color: u32,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            border_width: 2,
            focused_color: 0xFFABABAB,
            unfocused_color: 0xFF000000,
        }
    }
}

/// Screen edge padding kept free of windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self {
            left: 4,
            right: 4,
            top: 24,
            bottom: 4,
        }
    }
}

/// Initial placement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    /// Diagonal cascade down-and-right of the existing windows
    Cascade,
    /// First non-overlapping spot, falling back to the cascade
    Smart,
}

/// Layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Smallest width a resize may produce
    pub min_width: u32,
    /// Smallest height a resize may produce
    pub min_height: u32,
    /// Rows per tiling column
    pub max_rows: u32,
    /// Tiling columns
    pub max_cols: u32,
    /// Retile when windows come and go
    pub tiling: bool,
    pub placement: PlacementPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_width: 32,
            min_height: 32,
            max_rows: 4,
            max_cols: 4,
            tiling: true,
            placement: PlacementPolicy::Cascade,
        }
    }
}

/// Focus behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Give input focus to the window under the pointer
    pub follow_mouse: bool,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self { follow_mouse: true }
    }
}
