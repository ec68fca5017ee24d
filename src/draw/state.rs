use crate::draw::model::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    /// A path is open; `last` is in logical points so it survives a rescale.
    Drawing { last: Point },
}

impl StrokeState {
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    pub fn last_point(self) -> Option<Point> {
        match self {
            Self::Drawing { last } => Some(last),
            Self::Idle => None,
        }
    }
}
