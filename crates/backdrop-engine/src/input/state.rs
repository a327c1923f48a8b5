use super::types::{InputEvent, PointerButtonEvent, PointerMoveEvent};

/// Input state the runtime keeps per window between events.
///
/// winit reports button presses without a position, so the last known
/// pointer position is tracked here and attached to button events.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in logical pixels; `None` while the pointer is
    /// outside the window.
    pub pointer_pos: Option<(f32, f32)>,
}

impl InputState {
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match *ev {
            InputEvent::PointerMoved(PointerMoveEvent { x, y })
            | InputEvent::PointerButton(PointerButtonEvent { x, y, .. }) => {
                self.pointer_pos = Some((x, y));
            }
            InputEvent::PointerLeft => self.pointer_pos = None,
            InputEvent::Key { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, MouseButtonState};

    #[test]
    fn pointer_position_follows_moves_and_leaves() {
        let mut state = InputState::default();
        state.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 1.0, y: 2.0 }));
        assert_eq!(state.pointer_pos, Some((1.0, 2.0)));

        state.apply_event(&InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
    }

    #[test]
    fn button_event_updates_position() {
        let mut state = InputState::default();
        let release = InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state: MouseButtonState::Released,
            x: 4.0,
            y: 8.0,
        });
        state.apply_event(&release);
        assert_eq!(state.pointer_pos, Some((4.0, 8.0)));
        assert!(release.is_click());
    }

    #[test]
    fn key_events_leave_position_alone() {
        let mut state = InputState::default();
        state.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 3.0, y: 3.0 }));
        state.apply_event(&InputEvent::Key {
            key: crate::input::Key::Space,
            state: crate::input::KeyState::Pressed,
            repeat: false,
        });
        assert_eq!(state.pointer_pos, Some((3.0, 3.0)));
    }
}
