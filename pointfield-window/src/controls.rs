use std::time::{Duration, Instant};

use glam::Vec2;
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};

/// Pointer travel (pixels) below which a press still counts as a tap.
pub const TAP_SLOP: f32 = 10.0;
/// Longest press that still counts as a tap.
pub const TAP_TIMEOUT: Duration = Duration::from_millis(300);
/// A pan released after resting this long carries no velocity.
pub const PAN_REST: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Drag velocity in pixels per second.
    Pan { velocity: Vec2 },
    Tap,
}

#[derive(Debug, Clone, Copy)]
struct PointerTrack {
    start: Vec2,
    start_time: Instant,
    last: Vec2,
    last_time: Instant,
    velocity: Vec2,
    panning: bool,
}

/// Turns mouse and single-finger touch input into pan and tap gestures.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    track: Option<PointerTrack>,
    cursor: Option<Vec2>,
    touch_id: Option<u64>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, position: Vec2, now: Instant) {
        self.track = Some(PointerTrack {
            start: position,
            start_time: now,
            last: position,
            last_time: now,
            velocity: Vec2::ZERO,
            panning: false,
        });
    }

    pub fn pointer_moved(&mut self, position: Vec2, now: Instant) -> Option<Gesture> {
        let track = self.track.as_mut()?;

        if !track.panning && position.distance(track.start) > TAP_SLOP {
            track.panning = true;
        }

        if !track.panning {
            track.last = position;
            track.last_time = now;
            return None;
        }

        let dt = now.saturating_duration_since(track.last_time).as_secs_f32();
        if dt > 0.0 {
            track.velocity = (position - track.last) / dt;
        }
        track.last = position;
        track.last_time = now;
        Some(Gesture::Pan {
            velocity: track.velocity,
        })
    }

    pub fn pointer_up(&mut self, now: Instant) -> Option<Gesture> {
        let track = self.track.take()?;

        if track.panning {
            let rested = now.saturating_duration_since(track.last_time) > PAN_REST;
            let velocity = if rested { Vec2::ZERO } else { track.velocity };
            return Some(Gesture::Pan { velocity });
        }

        (now.saturating_duration_since(track.start_time) <= TAP_TIMEOUT).then_some(Gesture::Tap)
    }

    /// Drop the current gesture without emitting anything.
    pub fn cancel(&mut self) {
        self.track = None;
        self.touch_id = None;
    }

    /// Feed a window event. Only the left mouse button and the first touch
    /// point participate.
    pub fn handle_event(&mut self, event: &WindowEvent, now: Instant) -> Option<Gesture> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.cursor = Some(position);
                if self.touch_id.is_some() {
                    return None;
                }
                self.pointer_moved(position, now)
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                None
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    if let Some(cursor) = self.cursor {
                        self.pointer_down(cursor, now);
                    }
                    None
                }
                ElementState::Released => self.pointer_up(now),
            },
            WindowEvent::Touch(Touch {
                phase,
                location,
                id,
                ..
            }) => {
                let position = Vec2::new(location.x as f32, location.y as f32);
                match phase {
                    TouchPhase::Started if self.touch_id.is_none() => {
                        self.touch_id = Some(*id);
                        self.pointer_down(position, now);
                        None
                    }
                    TouchPhase::Moved if self.touch_id == Some(*id) => {
                        self.pointer_moved(position, now)
                    }
                    TouchPhase::Ended if self.touch_id == Some(*id) => {
                        self.touch_id = None;
                        self.pointer_up(now)
                    }
                    TouchPhase::Cancelled if self.touch_id == Some(*id) => {
                        self.cancel();
                        None
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSettings {
    /// Radians per second of angular velocity per pixel per second of drag.
    pub velocity_scale: f32,
    /// Per-frame multiplier on both angular velocity components.
    pub rotation_damping: f32,
    /// Extra per-frame multiplier on the pitch component.
    pub pitch_damping: f32,
    pub pitch_limit: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            velocity_scale: 0.005,
            rotation_damping: 0.98,
            pitch_damping: 0.95,
            pitch_limit: 1.0,
        }
    }
}

/// Inertial orbit angles driven by pan gestures.
///
/// `angle.x` is yaw and `angle.y` is pitch, both in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitMotion {
    settings: MotionSettings,
    angle: Vec2,
    angular_velocity: Vec2,
}

impl OrbitMotion {
    pub fn new(settings: MotionSettings) -> Self {
        Self {
            settings,
            angle: Vec2::ZERO,
            angular_velocity: Vec2::ZERO,
        }
    }

    pub fn apply_pan(&mut self, velocity: Vec2) {
        self.angular_velocity = velocity * self.settings.velocity_scale;
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let limit = self.settings.pitch_limit;
        self.angle.x += self.angular_velocity.x * dt;
        self.angle.y = (self.angle.y + self.angular_velocity.y * dt).clamp(-limit, limit);

        self.angular_velocity *= self.settings.rotation_damping;
        self.angular_velocity.y *= self.settings.pitch_damping;
    }

    pub fn yaw(&self) -> f32 {
        self.angle.x
    }

    pub fn pitch(&self) -> f32 {
        self.angle.y
    }

    pub fn angular_velocity(&self) -> Vec2 {
        self.angular_velocity
    }
}

impl Default for OrbitMotion {
    fn default() -> Self {
        Self::new(MotionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn device() -> DeviceId {
        // SAFETY: only compared against other ids, never passed to winit.
        unsafe { DeviceId::dummy() }
    }

    fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> WindowEvent {
        WindowEvent::Touch(Touch {
            device_id: device(),
            phase,
            location: PhysicalPosition::new(x, y),
            force: None,
            id,
        })
    }

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn left_button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_quick_press_is_tap() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.pointer_down(Vec2::new(100.0, 100.0), t0);
        assert_eq!(recognizer.pointer_moved(Vec2::new(104.0, 103.0), t0 + ms(20)), None);
        assert_eq!(recognizer.pointer_up(t0 + ms(120)), Some(Gesture::Tap));
        assert_eq!(recognizer.pointer_up(t0 + ms(130)), None);
    }

    #[test]
    fn test_long_press_is_not_tap() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.pointer_down(Vec2::ZERO, t0);
        assert_eq!(recognizer.pointer_up(t0 + ms(301)), None);
    }

    #[test]
    fn test_drag_reports_velocity() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.pointer_down(Vec2::ZERO, t0);

        let Some(Gesture::Pan { velocity }) =
            recognizer.pointer_moved(Vec2::new(20.0, 0.0), t0 + ms(100))
        else {
            panic!("expected pan once past the slop");
        };
        assert!((velocity - Vec2::new(200.0, 0.0)).length() < 1e-2);

        let Some(Gesture::Pan { velocity }) =
            recognizer.pointer_moved(Vec2::new(20.0, 10.0), t0 + ms(150))
        else {
            panic!("expected pan");
        };
        assert!((velocity - Vec2::new(0.0, 200.0)).length() < 1e-2);

        assert_eq!(
            recognizer.pointer_up(t0 + ms(160)),
            Some(Gesture::Pan { velocity })
        );
    }

    #[test]
    fn test_rested_release_has_zero_velocity() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.pointer_down(Vec2::ZERO, t0);
        recognizer.pointer_moved(Vec2::new(50.0, 0.0), t0 + ms(50));
        assert_eq!(
            recognizer.pointer_up(t0 + ms(400)),
            Some(Gesture::Pan {
                velocity: Vec2::ZERO
            })
        );
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut recognizer = GestureRecognizer::new();
        assert_eq!(recognizer.pointer_up(Instant::now()), None);
        assert_eq!(recognizer.pointer_moved(Vec2::ONE, Instant::now()), None);
    }

    #[test]
    fn test_cancel_drops_gesture() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.pointer_down(Vec2::ZERO, t0);
        recognizer.cancel();
        assert_eq!(recognizer.pointer_up(t0 + ms(10)), None);
    }

    #[test]
    fn test_pan_sets_scaled_angular_velocity() {
        let mut motion = OrbitMotion::default();
        motion.apply_pan(Vec2::new(100.0, -40.0));
        assert!((motion.angular_velocity() - Vec2::new(0.5, -0.2)).length() < 1e-6);
    }

    #[test]
    fn test_update_integrates_and_damps() {
        let mut motion = OrbitMotion::default();
        motion.apply_pan(Vec2::new(100.0, 100.0));
        motion.update(0.1);

        assert!((motion.yaw() - 0.05).abs() < 1e-6);
        assert!((motion.pitch() - 0.05).abs() < 1e-6);
        let av = motion.angular_velocity();
        assert!((av.x - 0.5 * 0.98).abs() < 1e-6);
        assert!((av.y - 0.5 * 0.98 * 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_update_ignores_non_positive_dt() {
        let mut motion = OrbitMotion::default();
        motion.apply_pan(Vec2::new(100.0, 100.0));
        let before = motion;
        motion.update(0.0);
        motion.update(-0.5);
        assert_eq!(motion, before);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut motion = OrbitMotion::default();
        motion.apply_pan(Vec2::new(0.0, 10_000.0));
        motion.update(1.0);
        assert_eq!(motion.pitch(), 1.0);

        motion.apply_pan(Vec2::new(0.0, -100_000.0));
        motion.update(1.0);
        assert_eq!(motion.pitch(), -1.0);
    }

    #[test]
    fn test_touch_tap_is_recognized() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        let down = touch(1, TouchPhase::Started, 50.0, 50.0);
        let up = touch(1, TouchPhase::Ended, 52.0, 51.0);
        assert_eq!(recognizer.handle_event(&down, t0), None);
        assert_eq!(recognizer.handle_event(&up, t0 + ms(80)), Some(Gesture::Tap));
    }

    #[test]
    fn test_second_touch_is_ignored() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.handle_event(&touch(1, TouchPhase::Started, 0.0, 0.0), t0);
        recognizer.handle_event(&touch(2, TouchPhase::Started, 300.0, 300.0), t0 + ms(5));

        let moved = touch(2, TouchPhase::Moved, 400.0, 300.0);
        assert_eq!(recognizer.handle_event(&moved, t0 + ms(20)), None);
        let ended = touch(2, TouchPhase::Ended, 400.0, 300.0);
        assert_eq!(recognizer.handle_event(&ended, t0 + ms(30)), None);

        // The first finger still owns the gesture and never moved.
        let up = touch(1, TouchPhase::Ended, 0.0, 0.0);
        assert_eq!(recognizer.handle_event(&up, t0 + ms(60)), Some(Gesture::Tap));
    }

    #[test]
    fn test_cancelled_touch_emits_nothing() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.handle_event(&touch(7, TouchPhase::Started, 10.0, 10.0), t0);
        let cancelled = touch(7, TouchPhase::Cancelled, 10.0, 10.0);
        assert_eq!(recognizer.handle_event(&cancelled, t0 + ms(10)), None);
        let ended = touch(7, TouchPhase::Ended, 10.0, 10.0);
        assert_eq!(recognizer.handle_event(&ended, t0 + ms(20)), None);

        // A fresh touch id can start a new gesture afterwards.
        recognizer.handle_event(&touch(8, TouchPhase::Started, 10.0, 10.0), t0 + ms(30));
        let up = touch(8, TouchPhase::Ended, 10.0, 10.0);
        assert_eq!(recognizer.handle_event(&up, t0 + ms(60)), Some(Gesture::Tap));
    }

    #[test]
    fn test_press_before_cursor_position_is_ignored() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        let pressed = left_button(ElementState::Pressed);
        let released = left_button(ElementState::Released);
        assert_eq!(recognizer.handle_event(&pressed, t0), None);
        assert_eq!(recognizer.handle_event(&released, t0 + ms(50)), None);

        recognizer.handle_event(&cursor_moved(20.0, 20.0), t0 + ms(60));
        recognizer.handle_event(&pressed, t0 + ms(70));
        assert_eq!(
            recognizer.handle_event(&released, t0 + ms(120)),
            Some(Gesture::Tap)
        );
    }

    #[test]
    fn test_mouse_drag_pans() {
        let t0 = Instant::now();
        let mut recognizer = GestureRecognizer::new();
        recognizer.handle_event(&cursor_moved(0.0, 0.0), t0);
        recognizer.handle_event(&left_button(ElementState::Pressed), t0);

        let Some(Gesture::Pan { velocity }) =
            recognizer.handle_event(&cursor_moved(30.0, 0.0), t0 + ms(100))
        else {
            panic!("expected pan");
        };
        assert!((velocity - Vec2::new(300.0, 0.0)).length() < 1e-2);
        assert!(matches!(
            recognizer.handle_event(&left_button(ElementState::Released), t0 + ms(110)),
            Some(Gesture::Pan { .. })
        ));
    }
}
