/// A camera action produced from pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitAction {
    /// Orbit around the target by a drag in logical pixels.
    Rotate { dx: f32, dy: f32 },
    /// Move the target in the view plane by a drag in logical pixels.
    Pan { dx: f32, dy: f32 },
    /// Wheel steps; positive moves closer.
    Dolly(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input after translation from the window system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Button { button: PointerButton, pressed: bool },
    /// Cursor position in logical pixels.
    Moved { x: f32, y: f32 },
    /// Wheel input in lines.
    Wheel(f32),
    Left,
}

/// Tracks cursor position and held buttons, turning moves into actions.
///
/// Primary drag rotates, secondary drag pans, and the wheel dollies.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    last: Option<(f32, f32)>,
    rotating: bool,
    panning: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one event. `over_ui` is set when an overlay claimed it: presses
    /// and wheel steps are then dropped, while releases and moves still
    /// update the tracker so a drag can neither stick nor jump.
    pub fn handle(&mut self, event: PointerEvent, over_ui: bool) -> Option<OrbitAction> {
        match event {
            PointerEvent::Button { button, pressed } => {
                if !(pressed && over_ui) {
                    self.button(button, pressed);
                }
                None
            }
            PointerEvent::Moved { x, y } => self.moved(x, y),
            PointerEvent::Wheel(_) if over_ui => None,
            PointerEvent::Wheel(lines) => self.wheel(lines),
            PointerEvent::Left => {
                self.left();
                None
            }
        }
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Primary => self.rotating = pressed,
            PointerButton::Secondary | PointerButton::Middle => self.panning = pressed,
        }
    }

    /// Record a cursor move. Returns an action while a drag is in progress.
    pub fn moved(&mut self, x: f32, y: f32) -> Option<OrbitAction> {
        let previous = self.last.replace((x, y));
        let (px, py) = previous?;
        let (dx, dy) = (x - px, y - py);
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if self.rotating {
            Some(OrbitAction::Rotate { dx, dy })
        } else if self.panning {
            Some(OrbitAction::Pan { dx, dy })
        } else {
            None
        }
    }

    /// Wheel input in lines; scrolling up (positive) dollies in.
    pub fn wheel(&mut self, lines: f32) -> Option<OrbitAction> {
        if lines == 0.0 {
            return None;
        }
        Some(OrbitAction::Dolly(lines.signum()))
    }

    /// Forget the cursor, e.g. when it leaves the window.
    pub fn left(&mut self) {
        self.last = None;
        self.rotating = false;
        self.panning = false;
        tracing::trace!("pointer left window");
    }
}
