//! Host input queue
//!
//! Host callbacks push events as they arrive; the frame loop drains them
//! once per frame, before any physics runs.

use glam::IVec2;

use crate::sim::{FrameInput, InputEvent};

/// Arrival-ordered event buffer plus the last reported pointer position
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<InputEvent>,
    pointer: Option<IVec2>,
    button_held: bool,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { position } => self.pointer = Some(position),
            InputEvent::PointerUp { position } => {
                self.pointer = Some(position);
                self.button_held = false;
            }
            InputEvent::PointerDown => self.button_held = true,
            InputEvent::Quit => {}
        }
        self.events.push(event);
    }

    pub fn pointer_down(&mut self, position: IVec2) {
        self.push(InputEvent::PointerMoved { position });
        self.push(InputEvent::PointerDown);
    }

    pub fn pointer_up(&mut self, position: IVec2) {
        self.push(InputEvent::PointerUp { position });
    }

    pub fn pointer_moved(&mut self, position: IVec2) {
        // Only the latest position matters; don't grow the queue on every move
        self.pointer = Some(position);
    }

    /// Pointer left the surface: treat a held button as released there
    pub fn pointer_left(&mut self, position: IVec2) {
        if self.button_held {
            self.pointer_up(position);
        } else {
            self.pointer_moved(position);
        }
    }

    pub fn quit(&mut self) {
        self.push(InputEvent::Quit);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take this frame's events; the pointer position persists
    pub fn drain(&mut self) -> FrameInput {
        FrameInput {
            events: std::mem::take(&mut self.events),
            pointer: self.pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut queue = EventQueue::new();
        queue.pointer_down(IVec2::new(1, 2));
        queue.pointer_up(IVec2::new(3, 4));
        let input = queue.drain();
        assert_eq!(
            input.events,
            vec![
                InputEvent::PointerMoved {
                    position: IVec2::new(1, 2)
                },
                InputEvent::PointerDown,
                InputEvent::PointerUp {
                    position: IVec2::new(3, 4)
                },
            ]
        );
        assert_eq!(input.pointer, Some(IVec2::new(3, 4)));
        assert!(queue.is_empty());
        // Pointer survives the drain
        assert_eq!(queue.drain().pointer, Some(IVec2::new(3, 4)));
    }

    #[test]
    fn test_moves_update_pointer_without_events() {
        let mut queue = EventQueue::new();
        for x in 0..100 {
            queue.pointer_moved(IVec2::new(x, 0));
        }
        let input = queue.drain();
        assert!(input.events.is_empty());
        assert_eq!(input.pointer, Some(IVec2::new(99, 0)));
    }

    #[test]
    fn test_leave_while_held_releases() {
        let mut queue = EventQueue::new();
        queue.pointer_down(IVec2::new(10, 10));
        queue.pointer_left(IVec2::new(0, 5));
        let input = queue.drain();
        assert_eq!(
            input.events.last(),
            Some(&InputEvent::PointerUp {
                position: IVec2::new(0, 5)
            })
        );

        queue.pointer_left(IVec2::new(0, 6));
        assert!(queue.drain().events.is_empty());
    }

    #[test]
    fn test_quit_is_queued() {
        let mut queue = EventQueue::new();
        queue.quit();
        assert_eq!(queue.drain().events, vec![InputEvent::Quit]);
    }
}
