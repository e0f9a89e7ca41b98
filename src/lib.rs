//! First-person raycaster over a 2D tile grid.
//!
//! Each frame the [`session::Session`] turns and moves the viewer from the frame's
//! input, then casts one ray per screen column through the [`map::GridMap`]. The
//! resulting [`raycaster::ColumnSlice`]s are drawn by [`renderer::render_frame`].

pub mod config;
pub mod input;
pub mod map;
pub mod raycaster;
pub mod renderer;
pub mod scaler;
pub mod session;
pub mod viewer;
