use crate::draw::model::{Point, SurfaceRect};

/// Pointer event as delivered by the windowing layer, before it is known
/// whether it came from a mouse or a touch screen.
///
/// `touches` is `Some` whenever the event exposes a touch list, even an
/// empty one (a touch-end carries no remaining touch points).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPointerEvent {
    pub client: Option<Point>,
    pub touches: Option<Vec<Point>>,
}

impl RawPointerEvent {
    pub fn mouse(client: Point) -> Self {
        Self {
            client: Some(client),
            touches: None,
        }
    }

    pub fn touch(touches: Vec<Point>) -> Self {
        Self {
            client: None,
            touches: Some(touches),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    Mouse { client: Point },
    Touch { touches: Vec<Point> },
}

impl PointerInput {
    /// Classifies a raw event. A touch list always wins over mouse fields.
    pub fn classify(event: RawPointerEvent) -> Option<Self> {
        match event {
            RawPointerEvent {
                touches: Some(touches),
                ..
            } => Some(Self::Touch { touches }),
            RawPointerEvent {
                client: Some(client),
                touches: None,
            } => Some(Self::Mouse { client }),
            RawPointerEvent {
                client: None,
                touches: None,
            } => None,
        }
    }

    /// Position relative to the top-left corner of `bounds`, or `None` for a
    /// touch event without active touch points.
    pub fn normalize(&self, bounds: SurfaceRect) -> Option<Point> {
        let client = match self {
            Self::Mouse { client } => *client,
            Self::Touch { touches } => *touches.first()?,
        };
        let origin = bounds.origin();
        Some(Point::new(client.x - origin.x, client.y - origin.y))
    }
}

pub fn normalize_event(event: RawPointerEvent, bounds: SurfaceRect) -> Option<Point> {
    PointerInput::classify(event)?.normalize(bounds)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerAction {
    pub phase: PointerPhase,
    pub input: PointerInput,
}

impl PointerAction {
    pub fn new(phase: PointerPhase, input: PointerInput) -> Self {
        Self { phase, input }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: SurfaceRect = SurfaceRect::new(100.0, 50.0, 400.0, 300.0);

    #[test]
    fn mouse_position_is_relative_to_surface_origin() {
        let point = normalize_event(RawPointerEvent::mouse(Point::new(130.0, 70.0)), BOUNDS);
        assert_eq!(point, Some(Point::new(30.0, 20.0)));
    }

    #[test]
    fn mouse_outside_bounds_still_yields_coordinate() {
        let point = normalize_event(RawPointerEvent::mouse(Point::new(90.0, 40.0)), BOUNDS);
        assert_eq!(point, Some(Point::new(-10.0, -10.0)));
    }

    #[test]
    fn first_touch_point_is_used() {
        let event = RawPointerEvent::touch(vec![Point::new(110.0, 60.0), Point::new(300.0, 300.0)]);
        assert_eq!(normalize_event(event, BOUNDS), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn touch_list_wins_over_mouse_fields() {
        let event = RawPointerEvent {
            client: Some(Point::new(400.0, 300.0)),
            touches: Some(vec![Point::new(120.0, 80.0)]),
        };
        assert!(matches!(
            PointerInput::classify(event.clone()),
            Some(PointerInput::Touch { .. })
        ));
        assert_eq!(normalize_event(event, BOUNDS), Some(Point::new(20.0, 30.0)));
    }

    #[test]
    fn touch_end_without_touches_has_no_coordinate() {
        assert_eq!(normalize_event(RawPointerEvent::touch(Vec::new()), BOUNDS), None);

        let with_mouse_fields = RawPointerEvent {
            client: Some(Point::new(120.0, 80.0)),
            touches: Some(Vec::new()),
        };
        assert_eq!(normalize_event(with_mouse_fields, BOUNDS), None);
    }

    #[test]
    fn event_without_position_is_not_classified() {
        assert_eq!(PointerInput::classify(RawPointerEvent::default()), None);
    }
}
