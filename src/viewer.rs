use std::f32::consts::TAU;

use crate::input::FrameInput;
use crate::map::TileSource;

/// Read-only snapshot of where the viewer stands and looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: [f32; 2], // (x, y) in world units
    pub heading: f32,  // radians in [0, 2pi)
}

#[derive(Debug, Clone, Copy)]
pub struct MoveTuning {
    pub move_speed: f32,           // world units per intent per frame
    pub rotation_sensitivity: f32, // radians per unit of pointer motion
    pub margin: f32,               // collision clearance in world units
}

/// The player: a point in the world with a heading. Collision clearance is
/// supplied per move, see [`Viewer::attempt_move`].
pub struct Viewer {
    pos: [f32; 2],
    heading: f32,
}

/// Which axes of an attempted move were committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved_x: bool,
    pub moved_y: bool,
}

#[inline]
fn wrap_heading(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

impl Viewer {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            pos: [x, y],
            heading: wrap_heading(heading),
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose {
            pos: self.pos,
            heading: self.heading,
        }
    }

    pub fn apply_rotation(&mut self, pointer_dx: f32, sensitivity: f32) {
        self.heading = wrap_heading(self.heading + pointer_dx * sensitivity);
    }

    /// Move by `(dx, dy)` with axis-separated sliding collision.
    ///
    /// The player is approximated by two probe points `margin` either side of the
    /// movement axis, not a true circle. X is tested and committed first, then Y is
    /// tested from the possibly-updated X, which lets the player slide along walls
    /// when moving diagonally into them.
    pub fn attempt_move<M: TileSource>(
        &mut self,
        dx: f32,
        dy: f32,
        margin: f32,
        map: &M,
    ) -> MoveOutcome {
        let [x, y] = self.pos;

        let moved_x = !map.is_wall(x + dx, y - margin) && !map.is_wall(x + dx, y + margin);
        if moved_x {
            self.pos[0] += dx;
        }

        let x = self.pos[0];
        let moved_y = !map.is_wall(x - margin, y + dy) && !map.is_wall(x + margin, y + dy);
        if moved_y {
            self.pos[1] += dy;
        }

        if !(moved_x && moved_y) {
            log::trace!(
                "move ({dx:.2}, {dy:.2}) from ({x:.2}, {y:.2}) blocked: x={} y={}",
                !moved_x,
                !moved_y
            );
        }

        MoveOutcome { moved_x, moved_y }
    }

    /// Apply one frame of input: rotate first, then one collision-checked move per
    /// held intent. Held intents are not combined, so diagonal movement is faster.
    pub fn apply_input<M: TileSource>(&mut self, input: &FrameInput, tuning: &MoveTuning, map: &M) {
        self.apply_rotation(input.pointer_dx, tuning.rotation_sensitivity);

        let fwd_x = self.heading.cos() * tuning.move_speed;
        let fwd_y = self.heading.sin() * tuning.move_speed;
        let m = tuning.margin;
        let intents = &input.intents;

        if intents.forward {
            self.attempt_move(fwd_x, fwd_y, m, map);
        }
        if intents.backward {
            self.attempt_move(-fwd_x, -fwd_y, m, map);
        }
        if intents.strafe_left {
            self.attempt_move(fwd_y, -fwd_x, m, map);
        }
        if intents.strafe_right {
            self.attempt_move(-fwd_y, fwd_x, m, map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MovementIntents;
    use crate::map::{DEFAULT_LAYOUT, GridMap};

    const MARGIN: f32 = 10.0;

    fn default_map() -> GridMap {
        GridMap::parse(DEFAULT_LAYOUT, 64.0).unwrap()
    }

    #[test]
    fn starts_at_given_pose() {
        let viewer = Viewer::new(96.0, 96.0, 0.0);
        assert_eq!(
            viewer.pose(),
            Pose {
                pos: [96.0, 96.0],
                heading: 0.0
            }
        );
        let wrapped = Viewer::new(0.0, 0.0, -TAU - 1.0).pose().heading;
        assert!((wrapped - (TAU - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn blocked_axis_keeps_coordinate() {
        let map = default_map();
        let mut viewer = Viewer::new(96.0, 96.0, 0.0);
        let outcome = viewer.attempt_move(-200.0, 0.0, MARGIN, &map);
        assert!(!outcome.moved_x);
        assert_eq!(viewer.pose().pos[0], 96.0);
    }

    #[test]
    fn open_space_moves_by_exact_delta() {
        let map = default_map();
        let mut viewer = Viewer::new(96.0, 96.0, 0.0);
        let outcome = viewer.attempt_move(1.0, 0.5, MARGIN, &map);
        assert_eq!(
            outcome,
            MoveOutcome {
                moved_x: true,
                moved_y: true
            }
        );
        assert_eq!(viewer.pose().pos, [97.0, 96.5]);
    }

    #[test]
    fn slides_along_wall() {
        let map = default_map();
        // row 0 is solid; moving up-right keeps the x component only
        let mut viewer = Viewer::new(96.0, 80.0, 0.0);
        let outcome = viewer.attempt_move(4.0, -20.0, MARGIN, &map);
        assert!(outcome.moved_x);
        assert!(!outcome.moved_y);
        assert_eq!(viewer.pose().pos, [100.0, 80.0]);
    }

    #[test]
    fn y_probe_uses_updated_x() {
        let map = GridMap::parse("1111\n1001\n1011\n1111\n", 64.0).unwrap();
        let mut viewer = Viewer::new(100.0, 100.0, 0.0);
        // from x=100 the y probes would both be open; from x=120 one lands in (2, 2)
        let outcome = viewer.attempt_move(20.0, 40.0, MARGIN, &map);
        assert!(outcome.moved_x);
        assert!(!outcome.moved_y);
        assert_eq!(viewer.pose().pos, [120.0, 100.0]);
    }

    #[test]
    fn heading_wraps_for_any_delta() {
        let mut viewer = Viewer::new(96.0, 96.0, 0.0);
        let sensitivity = 0.0003;
        let large = (TAU / sensitivity) + 1.0;
        for delta in [large, -large, 1.0e9, -1.0e9, 123_456.7, -0.000_001, 0.0] {
            viewer.apply_rotation(delta, sensitivity);
            let heading = viewer.pose().heading;
            assert!((0.0..TAU).contains(&heading), "delta {delta} -> {heading}");
        }
    }

    #[test]
    fn forward_follows_heading() {
        let map = default_map();
        let tuning = MoveTuning {
            move_speed: 1.5,
            rotation_sensitivity: 0.0003,
            margin: MARGIN,
        };
        let mut viewer = Viewer::new(96.0, 96.0, 0.0);
        let input = FrameInput {
            intents: MovementIntents {
                forward: true,
                ..Default::default()
            },
            pointer_dx: 0.0,
        };
        viewer.apply_input(&input, &tuning, &map);
        assert_eq!(viewer.pose().pos, [97.5, 96.0]);
    }

    #[test]
    fn combined_intents_apply_separately() {
        let map = default_map();
        let tuning = MoveTuning {
            move_speed: 2.0,
            rotation_sensitivity: 0.0003,
            margin: MARGIN,
        };
        let mut viewer = Viewer::new(96.0, 96.0, 0.0);
        let input = FrameInput {
            intents: MovementIntents {
                forward: true,
                strafe_right: true,
                ..Default::default()
            },
            pointer_dx: 0.0,
        };
        viewer.apply_input(&input, &tuning, &map);
        let [x, y] = viewer.pose().pos;
        assert!((x - 98.0).abs() < 1e-4);
        assert!((y - 98.0).abs() < 1e-4);
    }

    #[test]
    fn opposite_intents_cancel() {
        let map = default_map();
        let tuning = MoveTuning {
            move_speed: 1.5,
            rotation_sensitivity: 0.0003,
            margin: MARGIN,
        };
        let mut viewer = Viewer::new(96.0, 96.0, 0.0);
        let input = FrameInput {
            intents: MovementIntents {
                strafe_left: true,
                strafe_right: true,
                ..Default::default()
            },
            pointer_dx: 0.0,
        };
        viewer.apply_input(&input, &tuning, &map);
        let [x, y] = viewer.pose().pos;
        assert!((x - 96.0).abs() < 1e-4);
        assert!((y - 96.0).abs() < 1e-4);
    }
}
