use glam::Vec2;
use towerscape_common::ScreenRect;

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
}

/// An input event, already translated out of the host toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved over the surface.
    PointerMove(Vec2),
    /// Pointer left the surface.
    PointerLeave,
    /// Primary-button click completed at a position.
    Click(Vec2),
    /// Touches moved. Only the first contact is used for hovering.
    TouchMove(Vec<TouchPoint>),
    /// The last touch lifted.
    TouchEnd,
    /// The container changed size or position.
    Resize { rect: ScreenRect, pixel_ratio: f32 },
}

impl InputEvent {
    /// Position that drives hover, if the event carries one.
    pub fn hover_position(&self) -> Option<Vec2> {
        match self {
            Self::PointerMove(p) | Self::Click(p) => Some(*p),
            Self::TouchMove(touches) => touches.first().map(|t| t.position),
            _ => None,
        }
    }

    /// Whether this event completes a click or tap gesture.
    pub fn completes_gesture(&self) -> bool {
        matches!(self, Self::Click(_) | Self::TouchEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_events_carry_position() {
        let p = Vec2::new(10.0, 20.0);
        assert_eq!(InputEvent::PointerMove(p).hover_position(), Some(p));
        assert_eq!(InputEvent::Click(p).hover_position(), Some(p));
        assert_eq!(InputEvent::PointerLeave.hover_position(), None);
    }

    #[test]
    fn touch_move_uses_first_contact() {
        let touches = vec![
            TouchPoint {
                id: 7,
                position: Vec2::new(1.0, 2.0),
            },
            TouchPoint {
                id: 8,
                position: Vec2::new(3.0, 4.0),
            },
        ];
        assert_eq!(
            InputEvent::TouchMove(touches).hover_position(),
            Some(Vec2::new(1.0, 2.0))
        );
        assert_eq!(InputEvent::TouchMove(Vec::new()).hover_position(), None);
    }

    #[test]
    fn gesture_completion() {
        assert!(InputEvent::Click(Vec2::ZERO).completes_gesture());
        assert!(InputEvent::TouchEnd.completes_gesture());
        assert!(!InputEvent::PointerMove(Vec2::ZERO).completes_gesture());
        assert!(
            !InputEvent::Resize {
                rect: ScreenRect::default(),
                pixel_ratio: 1.0
            }
            .completes_gesture()
        );
    }
}
