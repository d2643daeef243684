use crate::arena::Arena;
use crate::render::RenderSink;
use crate::types::{Mode, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Press,
    Release,
}

impl InputEvent {
    pub fn mode(self) -> Mode {
        match self {
            InputEvent::Press => Mode::Grow,
            InputEvent::Release => Mode::Shrink,
        }
    }
}

#[derive(Clone, Debug)]
pub struct InputController {
    side: Side,
    held: bool,
    last: Option<InputEvent>,
}

impl InputController {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            held: false,
            last: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn handle(&mut self, event: InputEvent) -> Option<Mode> {
        if self.last == Some(event) {
            return None;
        }
        self.last = Some(event);
        self.held = event == InputEvent::Press;
        Some(event.mode())
    }

    pub fn apply<S: RenderSink>(&mut self, arena: &mut Arena<S>, event: InputEvent) -> Option<Mode> {
        let mode = self.handle(event)?;
        arena.set_mode(self.side, mode);
        Some(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::obstacle::OpenField;
    use crate::render::MaskBuffer;

    #[test]
    fn press_grows_and_release_shrinks() {
        let mut input = InputController::new(Side::Player);
        assert_eq!(input.handle(InputEvent::Press), Some(Mode::Grow));
        assert!(input.is_held());
        assert_eq!(input.handle(InputEvent::Release), Some(Mode::Shrink));
        assert!(!input.is_held());
    }

    #[test]
    fn repeated_events_are_ignored() {
        let mut input = InputController::new(Side::Enemy);
        assert_eq!(input.handle(InputEvent::Press), Some(Mode::Grow));
        assert_eq!(input.handle(InputEvent::Press), None);
        assert_eq!(input.handle(InputEvent::Release), Some(Mode::Shrink));
        assert_eq!(input.handle(InputEvent::Release), None);
    }

    #[test]
    fn apply_switches_only_the_controlled_side() {
        let config = ArenaConfig {
            width: 16,
            height: 8,
            ..ArenaConfig::default()
        };
        let sinks = [MaskBuffer::default(), MaskBuffer::default()];
        let mut arena = Arena::new(&config, &OpenField, sinks).unwrap();
        let enemy_mode = arena.simulation(Side::Enemy).mode();

        let mut input = InputController::new(Side::Player);
        input.apply(&mut arena, InputEvent::Press);
        assert_eq!(arena.simulation(Side::Player).mode(), Mode::Grow);
        assert_eq!(arena.simulation(Side::Enemy).mode(), enemy_mode);

        input.apply(&mut arena, InputEvent::Release);
        assert_eq!(arena.simulation(Side::Player).mode(), Mode::Shrink);
    }
}
