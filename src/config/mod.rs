//! Runtime configuration (`lume.toml`).
//!
//! All sections and fields are optional; a missing file yields defaults.
//! Unknown keys are warnings, not errors — a typo should not take the
//! preview down.
//!
//! ```toml
//! [compile]
//! debounce_ms = 1000          # idle time after the last edit
//! command = "~/bin/tectonic"  # compiler override (default: PATH lookup)
//! initial = true              # compile once immediately on startup
//!
//! [render]
//! scale = 1.5                 # display scale (1.0 = 72 dpi)
//! pdfinfo = "pdfinfo"         # decoder tool overrides
//! pdftoppm = "pdftoppm"
//! ```

mod error;

pub use error::ConfigError;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lume.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub compile: CompileConfig,
    pub render: RenderConfig,
}

/// `[compile]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Idle time after the last edit before a compile is issued.
    pub debounce_ms: u64,

    /// Compiler executable override (default: `tectonic` from PATH).
    pub command: Option<String>,

    /// Issue one immediate compile when a preview session starts.
    pub initial: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            command: None,
            initial: true,
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Display scale applied to page geometry (1.0 = 72 dpi).
    pub scale: f32,

    /// Decoder tool overrides (default: PATH lookup).
    pub pdfinfo: Option<String>,
    pub pdftoppm: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.5,
            pdfinfo: None,
            pdftoppm: None,
        }
    }
}

impl PreviewConfig {
    /// Load from the given path; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                crate::debug!("config"; "no {} - using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };

        let config = Self::parse(&raw, &mut |key| {
            crate::log!("config"; "unknown key `{}` in {}", key, path.display());
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML, reporting unknown keys through `on_unknown`.
    fn parse(raw: &str, on_unknown: &mut dyn FnMut(String)) -> Result<Self, ConfigError> {
        let deserializer = toml::Deserializer::new(raw);
        let config: PreviewConfig =
            serde_ignored::deserialize(deserializer, |path| on_unknown(path.to_string()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compile.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "compile.debounce_ms must be greater than zero".into(),
            ));
        }
        if !(0.1..=4.0).contains(&self.render.scale) {
            return Err(ConfigError::Validation(format!(
                "render.scale must be within 0.1..=4.0 (got {})",
                self.render.scale
            )));
        }
        Ok(())
    }

    /// Expand a configured tool path (`~` allowed).
    pub fn resolve_command(value: &Option<String>) -> Option<PathBuf> {
        value
            .as_ref()
            .map(|v| PathBuf::from(shellexpand::tilde(v).into_owned()))
    }
}
