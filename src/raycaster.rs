//! Column raycaster over a tile grid.
//!
//! One ray per screen column is stepped through the grid with a DDA walk: the ray
//! always advances to whichever vertical or horizontal grid line is nearer. The
//! distance used for projection is the perpendicular distance to the hit face,
//! which keeps straight walls straight on screen.

use rayon::iter::{IntoParallelIterator, ParallelExtend, ParallelIterator};

use crate::map::{Tile, TileSource};
use crate::viewer::Pose;

const MIN_DISTANCE: f32 = 0.0001;
const SHADE_FALLOFF_PER_TILE: f32 = 18.0;
const SHADE_MIN: f32 = 40.0;
const SHADE_MAX: f32 = 255.0;
const SIDE_DARKEN: f32 = 0.75;

#[derive(Debug, Clone, Copy)]
pub struct RaycastConfig {
    pub fov: f32, // radians, horizontal
    pub screen_width: usize,
    pub screen_height: usize,
    pub max_depth: u32, // grid steps per ray
    /// Use perpendicular distance. When off, the straight-line ray length is used
    /// instead, which bows walls outward near the screen edges.
    pub fisheye_correction: bool,
}

/// Which family of grid lines the last DDA step crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSide {
    /// Vertical grid line: an east or west wall face.
    Vertical,
    /// Horizontal grid line: a north or south wall face.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub perp_distance: f32, // world units, clamped to a small positive minimum
    pub distance: f32,      // distance used for projection
    pub height: u32,
    pub shade: u8, // before side darkening
    pub side: HitSide,
    pub steps: u32,
    pub cell: [i32; 2], // (col, row) where traversal stopped
}

/// What the presentation layer needs to draw one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSlice {
    pub height: u32,
    pub shade: u8,
}

/// Projected wall slice height in pixels for a wall at `distance`. Never zero.
#[inline]
pub fn slice_height(distance: f32, tile_size: f32, screen_height: usize) -> u32 {
    let h = ((tile_size / distance) * screen_height as f32).floor();
    h.max(1.0) as u32
}

/// Linear brightness falloff with distance, clamped to [40, 255].
#[inline]
pub fn distance_shade(distance: f32, tile_size: f32) -> u8 {
    let falloff = ((distance / tile_size) * SHADE_FALLOFF_PER_TILE).floor();
    (SHADE_MAX - falloff).clamp(SHADE_MIN, SHADE_MAX) as u8
}

pub struct Raycaster {
    config: RaycastConfig,
}

impl Raycaster {
    pub fn new(config: RaycastConfig) -> Self {
        Self { config }
    }

    /// Cast a single ray at `ray_angle` from the viewer's position.
    /// Grid geometry, tile size included, comes from `map` alone.
    pub fn cast_column<M: TileSource>(&self, ray_angle: f32, pose: &Pose, map: &M) -> RayHit {
        let tile = map.tile_size();
        let ray_dx = ray_angle.cos();
        let ray_dy = ray_angle.sin();

        // Viewer position in tile units
        let px = pose.pos[0] / tile;
        let py = pose.pos[1] / tile;
        let mut map_col = px.floor() as i32;
        let mut map_row = py.floor() as i32;

        // Ray length needed to cross one whole tile along each axis
        let delta_x = if ray_dx == 0.0 {
            f32::INFINITY
        } else {
            (1.0 / ray_dx).abs()
        };
        let delta_y = if ray_dy == 0.0 {
            f32::INFINITY
        } else {
            (1.0 / ray_dy).abs()
        };

        let (step_x, mut side_x) = if ray_dx < 0.0 {
            (-1, first_crossing(px - map_col as f32, delta_x))
        } else {
            (1, first_crossing(map_col as f32 + 1.0 - px, delta_x))
        };
        let (step_y, mut side_y) = if ray_dy < 0.0 {
            (-1, first_crossing(py - map_row as f32, delta_y))
        } else {
            (1, first_crossing(map_row as f32 + 1.0 - py, delta_y))
        };

        let mut side = HitSide::Vertical;
        let mut steps = 0;
        while steps < self.config.max_depth {
            if side_x < side_y {
                side_x += delta_x;
                map_col += step_x;
                side = HitSide::Vertical;
            } else {
                side_y += delta_y;
                map_row += step_y;
                side = HitSide::Horizontal;
            }
            steps += 1;

            if map.tile_at(map_col, map_row) == Tile::Wall {
                break;
            }
        }

        let perp = match side {
            HitSide::Vertical => side_x - delta_x,
            HitSide::Horizontal => side_y - delta_y,
        } * tile;
        // f32::max drops NaN, which covers inf - inf on an axis that never stepped
        let perp_distance = perp.max(MIN_DISTANCE);

        let distance = if self.config.fisheye_correction {
            perp_distance
        } else {
            perp_distance / (ray_angle - pose.heading).cos()
        };

        RayHit {
            perp_distance,
            distance,
            height: slice_height(distance, tile, self.config.screen_height),
            shade: distance_shade(distance, tile),
            side,
            steps,
            cell: [map_col, map_row],
        }
    }

    /// Cast one ray per screen column, left to right, into `out`.
    ///
    /// Columns are independent and cast in parallel; `out` is cleared first and
    /// always ends up with exactly `screen_width` slices in column order.
    pub fn cast_all_columns_into<M: TileSource + Sync>(
        &self,
        pose: &Pose,
        map: &M,
        out: &mut Vec<ColumnSlice>,
    ) {
        let width = self.config.screen_width;
        let angle_step = self.config.fov / width as f32;
        let start_angle = pose.heading - self.config.fov / 2.0;

        out.clear();
        out.par_extend((0..width).into_par_iter().map(|col| {
            let ray_angle = start_angle + col as f32 * angle_step;
            let hit = self.cast_column(ray_angle, pose, map);
            let shade = match hit.side {
                HitSide::Horizontal => (hit.shade as f32 * SIDE_DARKEN) as u8,
                HitSide::Vertical => hit.shade,
            };
            ColumnSlice {
                height: hit.height,
                shade,
            }
        }));
    }

    pub fn cast_all_columns<M: TileSource + Sync>(&self, pose: &Pose, map: &M) -> Vec<ColumnSlice> {
        let mut out = Vec::with_capacity(self.config.screen_width);
        self.cast_all_columns_into(pose, map, &mut out);
        out
    }
}

/// Ray length to the first grid line, given the fraction of a tile still to cover.
#[inline]
fn first_crossing(fraction: f32, delta: f32) -> f32 {
    if delta.is_infinite() {
        f32::INFINITY
    } else {
        fraction * delta
    }
}
