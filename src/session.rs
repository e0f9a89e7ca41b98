//! One running game: the map, the viewer, the ray engine, and the column results
//! of the last frame, all owned in one place.

use crate::config::{ConfigError, EngineConfig};
use crate::input::FrameInput;
use crate::map::GridMap;
use crate::raycaster::{ColumnSlice, Raycaster};
use crate::viewer::{MoveTuning, Pose, Viewer};

pub struct Session {
    map: GridMap,
    viewer: Viewer,
    raycaster: Raycaster,
    tuning: MoveTuning,
    columns: Vec<ColumnSlice>,
}

impl Session {
    pub fn new(config: &EngineConfig, map: GridMap) -> Result<Self, ConfigError> {
        config.validate()?;
        config.check_tile_size(&map)?;
        config.check_spawn(&map)?;

        let [x, y] = config.spawn_position();
        let raycaster = Raycaster::new(config.raycast_config());
        Ok(Self {
            viewer: Viewer::new(x, y, config.spawn_heading),
            columns: Vec::with_capacity(config.screen_width),
            tuning: config.move_tuning(),
            raycaster,
            map,
        })
    }

    /// Run one frame of simulation: turn and move the viewer, then recast every
    /// column from the new pose.
    pub fn step(&mut self, input: &FrameInput) -> &[ColumnSlice] {
        self.viewer.apply_input(input, &self.tuning, &self.map);
        self.raycaster
            .cast_all_columns_into(&self.viewer.pose(), &self.map, &mut self.columns);
        &self.columns
    }

    pub fn pose(&self) -> Pose {
        self.viewer.pose()
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }
}
