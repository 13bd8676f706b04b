//! Control-panel bindings.
//!
//! The panel is described as data ([`CONTROLS`]) so any widget toolkit can
//! draw it. Widgets read through [`crate::Sketch::control_value`] and write
//! back through [`crate::Sketch::apply`].

use smoke_common::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    Raw,
    Speed,
    Wireframe,
    Opacity,
    Color,
}

/// Inclusive slider bounds and step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    /// Snap to the nearest step above `min`, then clamp into `[min, max]`.
    /// NaN maps to `min`.
    pub fn constrain(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        self.snap(value).clamp(self.min, self.max)
    }

    // Rounds through the step's reciprocal in f64 so values already on the
    // grid (0.3, 0.75) come back bit-identical.
    fn snap(&self, value: f32) -> f32 {
        let stepped = self.step.is_finite() && self.step > 0.0;
        if !stepped || !value.is_finite() {
            return value;
        }
        let per_unit = (1.0 / f64::from(self.step)).round();
        let min = f64::from(self.min);
        let steps = ((f64::from(value) - min) * per_unit).round();
        (steps / per_unit + min) as f32
    }
}

pub const SPEED_RANGE: SliderRange = SliderRange {
    min: 0.0,
    max: 10.0,
    step: 0.01,
};

pub const OPACITY_RANGE: SliderRange = SliderRange {
    min: 0.0,
    max: 1.0,
    step: 0.01,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Toggle,
    Slider(SliderRange),
    Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSpec {
    pub id: ControlId,
    pub label: &'static str,
    pub kind: ControlKind,
}

/// The debug panel, top to bottom.
pub const CONTROLS: [ControlSpec; 5] = [
    ControlSpec {
        id: ControlId::Raw,
        label: "raw material",
        kind: ControlKind::Toggle,
    },
    ControlSpec {
        id: ControlId::Speed,
        label: "speed",
        kind: ControlKind::Slider(SPEED_RANGE),
    },
    ControlSpec {
        id: ControlId::Wireframe,
        label: "wireframe",
        kind: ControlKind::Toggle,
    },
    ControlSpec {
        id: ControlId::Opacity,
        label: "opacity",
        kind: ControlKind::Slider(OPACITY_RANGE),
    },
    ControlSpec {
        id: ControlId::Color,
        label: "color",
        kind: ControlKind::Color,
    },
];

/// Current value of a control, as a widget sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlValue {
    Bool(bool),
    Number(f32),
    Color(Rgb),
}

/// A user edit coming from one widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEdit {
    Raw(bool),
    Speed(f32),
    Wireframe(bool),
    Opacity(f32),
    Color(Rgb),
}

impl ControlEdit {
    /// Pair a control with a new value. `None` if the value has the wrong type.
    pub fn new(id: ControlId, value: ControlValue) -> Option<Self> {
        match (id, value) {
            (ControlId::Raw, ControlValue::Bool(v)) => Some(Self::Raw(v)),
            (ControlId::Wireframe, ControlValue::Bool(v)) => Some(Self::Wireframe(v)),
            (ControlId::Speed, ControlValue::Number(v)) => Some(Self::Speed(v)),
            (ControlId::Opacity, ControlValue::Number(v)) => Some(Self::Opacity(v)),
            (ControlId::Color, ControlValue::Color(c)) => Some(Self::Color(c)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_lists_five_controls_in_order() {
        let labels: Vec<&str> = CONTROLS.iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            vec!["raw material", "speed", "wireframe", "opacity", "color"]
        );
    }

    #[test]
    fn slider_ranges() {
        assert_eq!(SPEED_RANGE.constrain(12.0), 10.0);
        assert_eq!(SPEED_RANGE.constrain(-1.0), 0.0);
        assert_eq!(OPACITY_RANGE.constrain(0.0), 0.0);
        assert_eq!(OPACITY_RANGE.constrain(1.0), 1.0);
        assert_eq!(OPACITY_RANGE.constrain(f32::NAN), 0.0);
        assert_eq!(OPACITY_RANGE.constrain(f32::INFINITY), 1.0);
        assert_eq!(SPEED_RANGE.step, 0.01);
    }

    #[test]
    fn values_snap_to_step() {
        assert_eq!(SPEED_RANGE.constrain(1.234), 1.23);
        assert_eq!(SPEED_RANGE.constrain(1.236), 1.24);
        assert_eq!(OPACITY_RANGE.constrain(0.499), 0.5);
        assert_eq!(SPEED_RANGE.constrain(9.999), 10.0);
    }

    #[test]
    fn grid_values_are_unchanged() {
        for v in [0.0_f32, 0.01, 0.3, 0.5, 0.75, 0.99, 1.0] {
            assert_eq!(OPACITY_RANGE.constrain(v), v);
        }
        for v in [0.25_f32, 1.0, 2.5, 3.7, 10.0] {
            assert_eq!(SPEED_RANGE.constrain(v), v);
        }
    }

    #[test]
    fn coarse_range_snaps_relative_to_min() {
        let range = SliderRange {
            min: 1.0,
            max: 5.0,
            step: 0.5,
        };
        assert_eq!(range.constrain(2.2), 2.0);
        assert_eq!(range.constrain(2.3), 2.5);
        assert_eq!(range.constrain(0.0), 1.0);
    }

    #[test]
    fn edit_rejects_mismatched_value() {
        assert_eq!(
            ControlEdit::new(ControlId::Raw, ControlValue::Number(1.0)),
            None
        );
        assert_eq!(
            ControlEdit::new(ControlId::Opacity, ControlValue::Number(0.5)),
            Some(ControlEdit::Opacity(0.5))
        );
        assert_eq!(
            ControlEdit::new(ControlId::Color, ControlValue::Bool(true)),
            None
        );
    }
}
