//! Simulation settings
//!
//! Read once at startup and never mutated afterwards. The browser build can
//! override the defaults from LocalStorage.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Physical constants of the double pendulum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub gravity: f64,
    /// Rod lengths (simulation units)
    pub length1: f64,
    pub length2: f64,
    /// Bob masses
    pub mass1: f64,
    pub mass2: f64,
    /// Linear damping coefficient applied to both angular velocities
    pub drag: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            length1: LENGTH_1,
            length2: LENGTH_2,
            mass1: MASS_1,
            mass2: MASS_2,
            drag: DRAG,
        }
    }
}

impl PhysicsParams {
    pub fn validate(&self) -> Result<(), SettingsError> {
        finite("physics.gravity", self.gravity)?;
        positive("physics.length1", self.length1)?;
        positive("physics.length2", self.length2)?;
        positive("physics.mass1", self.mass1)?;
        positive("physics.mass2", self.mass2)?;
        finite("physics.drag", self.drag)?;
        if self.drag < 0.0 {
            return Err(SettingsError::Invalid {
                field: "physics.drag",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

/// Screen layout and colours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayParams {
    pub width: u32,
    pub height: u32,
    /// Pivot point in pixels
    pub origin: IVec2,
    /// Pixels per unit of rod length
    pub scale: f64,
    pub rod_width: f32,
    pub bob_radius: f32,
    pub background: [u8; 3],
    pub rod_color: [u8; 3],
    pub bob_color: [u8; 3],
    pub text_color: [u8; 3],
    /// Target tick rate (Hz)
    pub frame_rate: u32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            origin: IVec2::new(ORIGIN.0, ORIGIN.1),
            scale: SCALE,
            rod_width: ROD_WIDTH,
            bob_radius: BOB_RADIUS,
            background: BACKGROUND_COLOR,
            rod_color: ROD_COLOR,
            bob_color: BOB_COLOR,
            text_color: TEXT_COLOR,
            frame_rate: FRAME_RATE,
        }
    }
}

impl DisplayParams {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::Invalid {
                field: "display.width/height",
                reason: "must be non-zero",
            });
        }
        positive("display.scale", self.scale)?;
        positive("display.rod_width", self.rod_width as f64)?;
        positive("display.bob_radius", self.bob_radius as f64)?;
        if self.frame_rate == 0 {
            return Err(SettingsError::Invalid {
                field: "display.frame_rate",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }

    /// Seconds between ticks
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.frame_rate as f64
    }
}

/// Drag behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionParams {
    /// Zero both angular velocities whenever a drag overrides the angles.
    /// Off by default: the pendulum keeps whatever velocity it had.
    pub reset_velocity_on_drag: bool,
}

/// Complete startup configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsParams,
    pub display: DisplayParams,
    pub interaction: InteractionParams,
}

impl Settings {
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "pendulum_sim_settings";

    /// Check every field; the simulation assumes validated settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.physics.validate()?;
        self.display.validate()
    }

    /// Parse JSON overrides (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native builds always start from the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: "must be finite",
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), SettingsError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: "must be positive",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.display.origin, IVec2::new(400, 250));
        assert_eq!(settings.physics.drag, 0.1);
        assert!(!settings.interaction.reset_velocity_on_drag);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "physics": { "drag": 0.0 }, "interaction": { "reset_velocity_on_drag": true } }"#)
                .unwrap();
        assert_eq!(settings.physics.drag, 0.0);
        assert_eq!(settings.physics.gravity, GRAVITY);
        assert_eq!(settings.display, DisplayParams::default());
        assert!(settings.interaction.reset_velocity_on_drag);
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        let err = Settings::from_json(r#"{ "physics": { "mass1": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "physics.mass1",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_drag() {
        let mut settings = Settings::default();
        settings.physics.drag = -1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_frame_rate() {
        let mut settings = Settings::default();
        settings.display.frame_rate = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_frame_interval() {
        let display = DisplayParams::default();
        assert!((display.frame_interval() - 0.01).abs() < 1e-15);
    }
}
