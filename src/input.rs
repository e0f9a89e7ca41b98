//! Per-frame input contract consumed by the viewer.
//!
//! The window layer collects key state and pointer motion between frames and
//! hands a [`FrameInput`] to the session once per frame.

use winit::keyboard::KeyCode;

/// Directional movement intents held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntents {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

impl MovementIntents {
    /// Update the intent bound to `key`. Returns false if the key is not a movement key.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        match key {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.backward = pressed,
            KeyCode::KeyA => self.strafe_left = pressed,
            KeyCode::KeyD => self.strafe_right = pressed,
            _ => return false,
        }
        true
    }
}

/// Everything the viewer needs from one frame of input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub intents: MovementIntents,
    /// Horizontal pointer motion summed over every event since the last frame.
    pub pointer_dx: f32,
}

impl FrameInput {
    pub fn accumulate_pointer(&mut self, dx: f64) {
        self.pointer_dx += dx as f32;
    }

    /// Snapshot for this frame, clearing the accumulated pointer motion.
    /// Held keys carry over to the next frame.
    pub fn take_frame(&mut self) -> FrameInput {
        let frame = *self;
        self.pointer_dx = 0.0;
        frame
    }
}
