//! Engine tunables.
//!
//! Every value is fixed once the session starts. Defaults reproduce the stock
//! 1280x720 maze; a TOML file may override any subset of them.

use std::f32::consts::{FRAC_PI_3, PI};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::map::TileSource;
use crate::raycaster::RaycastConfig;
use crate::viewer::MoveTuning;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("spawn point ({x:.1}, {y:.1}) is inside a wall")]
    SpawnInWall { x: f32, y: f32 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    // ========================================================================
    // Viewport
    // ========================================================================
    /// Internal framebuffer width; also the number of rays per frame.
    pub screen_width: usize,
    pub screen_height: usize,
    /// Horizontal field of view (radians).
    pub fov: f32,
    pub target_fps: u32,

    // ========================================================================
    // World
    // ========================================================================
    /// Tile edge length (world units / pixels).
    pub tile_size: f32,
    /// Spawn position in tile units, e.g. [1.5, 1.5] is the centre of tile (1, 1).
    pub spawn_tile: [f32; 2],
    pub spawn_heading: f32,

    // ========================================================================
    // Movement
    // ========================================================================
    /// World units per held intent per frame.
    pub move_speed: f32,
    /// Radians per unit of horizontal pointer motion.
    pub rotation_sensitivity: f32,
    /// Collision clearance (world units).
    pub collision_margin: f32,

    // ========================================================================
    // Ray traversal
    // ========================================================================
    /// Grid steps before a ray gives up.
    pub max_depth: u32,
    pub fisheye_correction: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            fov: FRAC_PI_3,
            target_fps: 60,

            tile_size: 64.0,
            spawn_tile: [1.5, 1.5],
            spawn_heading: 0.3,

            move_speed: 1.5,
            rotation_sensitivity: 0.0003,
            collision_margin: 10.0,

            max_depth: 20,
            fisheye_correction: true,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(invalid("screen_width/screen_height", "must be non-zero"));
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(invalid("fov", format!("{} is outside (0, pi)", self.fov)));
        }
        if self.target_fps == 0 {
            return Err(invalid("target_fps", "must be non-zero"));
        }
        if !(self.tile_size > 0.0 && self.tile_size.is_finite()) {
            return Err(invalid("tile_size", "must be positive"));
        }
        if !(self.collision_margin >= 0.0 && self.collision_margin < self.tile_size / 2.0) {
            return Err(invalid(
                "collision_margin",
                format!(
                    "{} must be in [0, {})",
                    self.collision_margin,
                    self.tile_size / 2.0
                ),
            ));
        }
        if !(self.move_speed >= 0.0 && self.move_speed.is_finite()) {
            return Err(invalid("move_speed", "must be non-negative"));
        }
        if !(self.rotation_sensitivity >= 0.0 && self.rotation_sensitivity.is_finite()) {
            return Err(invalid("rotation_sensitivity", "must be non-negative"));
        }
        if !self.spawn_heading.is_finite() {
            return Err(invalid("spawn_heading", "must be finite"));
        }
        Ok(())
    }

    /// Spawn position in world units.
    pub fn spawn_position(&self) -> [f32; 2] {
        [
            self.spawn_tile[0] * self.tile_size,
            self.spawn_tile[1] * self.tile_size,
        ]
    }

    /// Fails if `map` was built with a different tile size than this config.
    pub fn check_tile_size<M: TileSource>(&self, map: &M) -> Result<(), ConfigError> {
        if map.tile_size() != self.tile_size {
            return Err(invalid(
                "tile_size",
                format!(
                    "config uses {} but the map was built with {}",
                    self.tile_size,
                    map.tile_size()
                ),
            ));
        }
        Ok(())
    }

    /// Fails if the spawn point is not on open floor of `map`.
    pub fn check_spawn<M: TileSource>(&self, map: &M) -> Result<(), ConfigError> {
        let [x, y] = self.spawn_position();
        if map.is_wall(x, y) {
            return Err(ConfigError::SpawnInWall { x, y });
        }
        Ok(())
    }

    pub fn raycast_config(&self) -> RaycastConfig {
        RaycastConfig {
            fov: self.fov,
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            max_depth: self.max_depth,
            fisheye_correction: self.fisheye_correction,
        }
    }

    pub fn move_tuning(&self) -> MoveTuning {
        MoveTuning {
            move_speed: self.move_speed,
            rotation_sensitivity: self.rotation_sensitivity,
            margin: self.collision_margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{DEFAULT_LAYOUT, GridMap};

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.spawn_position(), [96.0, 96.0]);
        assert_eq!(config.raycast_config().screen_width, 1280);
        assert!(config.raycast_config().fisheye_correction);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            screen_width = 320
            screen_height = 200
            fisheye_correction = false
            "#,
        )
        .unwrap();
        assert_eq!(config.screen_width, 320);
        assert_eq!(config.screen_height, 200);
        assert!(!config.fisheye_correction);
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.tile_size, 64.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineConfig::from_toml_str("screen_widht = 10").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_values_name_the_field() {
        for (toml, field) in [
            ("screen_width = 0", "screen_width/screen_height"),
            ("fov = 3.5", "fov"),
            ("fov = 0.0", "fov"),
            ("target_fps = 0", "target_fps"),
            ("tile_size = -1.0", "tile_size"),
            ("collision_margin = 32.0", "collision_margin"),
            ("move_speed = -2.0", "move_speed"),
        ] {
            match EngineConfig::from_toml_str(toml) {
                Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field, "{toml}"),
                other => panic!("{toml}: expected invalid {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn spawn_must_be_open() {
        let map = GridMap::parse(DEFAULT_LAYOUT, 64.0).unwrap();
        EngineConfig::default().check_spawn(&map).unwrap();

        let walled = EngineConfig {
            spawn_tile: [0.5, 0.5],
            ..EngineConfig::default()
        };
        assert!(matches!(
            walled.check_spawn(&map),
            Err(ConfigError::SpawnInWall { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/raycaster.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/raycaster.toml"));
    }
}
