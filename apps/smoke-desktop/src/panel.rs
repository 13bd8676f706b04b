use smoke_common::Rgb;
use smoke_render_wgpu::FrameStats;
use smoke_sketch::{CONTROLS, ControlEdit, ControlKind, ControlSpec, ControlValue, Sketch};
use smoke_tools::SketchInspector;

/// The debug panel, anchored to the top-right corner like a lil-gui panel.
pub fn draw(ctx: &egui::Context, sketch: &mut Sketch, stats: &FrameStats) {
    egui::Window::new("Debug")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            for spec in &CONTROLS {
                let value = sketch.control_value(spec.id);
                if let Some(edit) = control_widget(ui, spec, value) {
                    sketch.apply(edit);
                }
            }

            ui.separator();
            ui.collapsing("inspector", |ui| {
                let summary = SketchInspector::summary(sketch);
                ui.label(format!("frames: {}", summary.frames));
                ui.label(format!("uTime: {:.2}", summary.time));
                ui.label(format!(
                    "model: {}",
                    if summary.model_attached { "attached" } else { "loading" }
                ));
                ui.label(format!(
                    "noise: {}",
                    if summary.texture_loaded { "loaded" } else { "loading" }
                ));
                ui.label(format!("buffer: {}x{}", stats.buffer.width, stats.buffer.height));
                ui.label(format!(
                    "draws: {}  triangles: {}",
                    stats.draw_calls, stats.triangles
                ));
                ui.separator();
                for id in SketchInspector::list_nodes(sketch.scene()) {
                    if let Some(info) = SketchInspector::inspect_node(sketch.scene(), id) {
                        ui.monospace(info.to_string());
                    }
                }
            });
            ui.small("H: toggle panel | LMB: orbit | RMB: pan | wheel: zoom");
        });
}

/// One widget per control. Returns an edit when the user changed the value.
fn control_widget(
    ui: &mut egui::Ui,
    spec: &ControlSpec,
    value: ControlValue,
) -> Option<ControlEdit> {
    let edited = match (spec.kind, value) {
        (ControlKind::Toggle, ControlValue::Bool(mut on)) => ui
            .checkbox(&mut on, spec.label)
            .changed()
            .then_some(ControlValue::Bool(on)),
        (ControlKind::Slider(range), ControlValue::Number(mut v)) => ui
            .add(
                egui::Slider::new(&mut v, range.min..=range.max)
                    .step_by(f64::from(range.step))
                    .text(spec.label),
            )
            .changed()
            .then_some(ControlValue::Number(v)),
        (ControlKind::Color, ControlValue::Color(color)) => {
            let mut rgb = color.to_array();
            let changed = ui
                .horizontal(|ui| {
                    let response = ui.color_edit_button_rgb(&mut rgb);
                    ui.label(spec.label);
                    response.changed()
                })
                .inner;
            changed.then_some(ControlValue::Color(Rgb::from_array(rgb)))
        }
        _ => {
            tracing::warn!(control = spec.label, "control value does not match widget kind");
            None
        }
    };
    edited.and_then(|v| ControlEdit::new(spec.id, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smoke_common::Viewport;

    #[test]
    fn panel_without_input_leaves_sketch_unchanged() {
        let mut sketch = Sketch::new(Viewport::default());
        let before = *sketch.tweaks();
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            draw(ctx, &mut sketch, &FrameStats::default());
        });
        assert_eq!(*sketch.tweaks(), before);
    }

    #[test]
    fn every_control_renders_a_widget() {
        let sketch = Sketch::new(Viewport::default());
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                for spec in &CONTROLS {
                    assert!(control_widget(ui, spec, sketch.control_value(spec.id)).is_none());
                }
            });
        });
    }
}
