use crate::draw::input::{PointerAction, PointerInput, PointerPhase};
use crate::draw::model::{Point, SurfaceRect};
use crate::draw::surface::DrawingSurface;
use eframe::egui;

/// Turns egui's per-finger touch events into whole touch lists, the shape
/// the input normalizer expects, and falls back to mouse events otherwise.
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: Vec<(u64, Point)>,
}

impl TouchTracker {
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    fn touches(&self) -> Vec<Point> {
        self.active.iter().map(|(_, point)| *point).collect()
    }

    /// Only the first finger down draws. Extra fingers are tracked but
    /// neither restart nor end the stroke.
    pub fn touch(&mut self, id: u64, phase: egui::TouchPhase, pos: Point) -> Option<PointerAction> {
        let phase = match phase {
            egui::TouchPhase::Start => {
                self.active.retain(|(known, _)| *known != id);
                let first = self.active.is_empty();
                self.active.push((id, pos));
                if !first {
                    return None;
                }
                PointerPhase::Down
            }
            egui::TouchPhase::Move => {
                let index = self.active.iter().position(|(known, _)| *known == id)?;
                self.active[index].1 = pos;
                if index != 0 {
                    return None;
                }
                PointerPhase::Move
            }
            egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                self.active.retain(|(known, _)| *known != id);
                if !self.active.is_empty() {
                    return None;
                }
                PointerPhase::Up
            }
        };
        Some(PointerAction::new(
            phase,
            PointerInput::Touch {
                touches: self.touches(),
            },
        ))
    }

    /// Maps one frame of events. Mouse events egui synthesizes from touches
    /// are dropped whenever touch input is in play.
    pub fn translate(&mut self, events: &[egui::Event]) -> Vec<PointerAction> {
        let touch_frame = !self.active.is_empty()
            || events
                .iter()
                .any(|event| matches!(event, egui::Event::Touch { .. }));

        let mut actions = Vec::new();
        for event in events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    actions.extend(self.touch(id.0, *phase, Point::new(pos.x, pos.y)));
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } if !touch_frame => {
                    let phase = if *pressed {
                        PointerPhase::Down
                    } else {
                        PointerPhase::Up
                    };
                    actions.push(mouse_action(phase, *pos));
                }
                egui::Event::PointerMoved(pos) if !touch_frame => {
                    actions.push(mouse_action(PointerPhase::Move, *pos));
                }
                egui::Event::PointerGone if !touch_frame => {
                    actions.push(PointerAction::new(
                        PointerPhase::Up,
                        PointerInput::Touch {
                            touches: Vec::new(),
                        },
                    ));
                }
                _ => {}
            }
        }
        actions
    }
}

fn mouse_action(phase: PointerPhase, pos: egui::Pos2) -> PointerAction {
    PointerAction::new(
        phase,
        PointerInput::Mouse {
            client: Point::new(pos.x, pos.y),
        },
    )
}

pub fn surface_rect(rect: egui::Rect) -> SurfaceRect {
    SurfaceRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Feeds actions to the surface. A stroke only starts inside the canvas.
pub fn dispatch(surface: &mut DrawingSurface, actions: Vec<PointerAction>, bounds: SurfaceRect) {
    for action in actions {
        let point = action.input.normalize(bounds);
        if action.phase == PointerPhase::Down
            && !point.is_some_and(|p| bounds.contains_local(p))
        {
            continue;
        }
        surface.apply(action.phase, point);
    }
}
