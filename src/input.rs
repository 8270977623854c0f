use std::collections::VecDeque;

use winit::event::ElementState;
use winit::keyboard::{Key, NamedKey};

use crate::camera::CameraMovement;
use crate::light_manager::{Direction, LightCategory};

/// One-shot commands, applied once per key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectCategory(LightCategory),
    SelectNext,
    SelectPrevious,
    IncreaseSpeed,
    DecreaseSpeed,
    SwitchLightState,
    ToggleShadows,
    ToggleSecondaryLights,
    Quit,
}

/// Actions repeated every frame for as long as the key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeldAction {
    MoveLight(Direction),
    MoveCamera(CameraMovement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Command(Command),
    Hold(HeldAction),
}

pub fn binding_for_key(key: &Key) -> Option<Binding> {
    use Binding::{Command as C, Hold as H};

    let binding = match key {
        Key::Named(NamedKey::Escape) => C(Command::Quit),
        Key::Named(NamedKey::ArrowLeft) => C(Command::SelectPrevious),
        Key::Named(NamedKey::ArrowRight) => C(Command::SelectNext),
        Key::Named(NamedKey::Space) => C(Command::ToggleShadows),
        Key::Character(k) => match k.to_lowercase().as_str() {
            "1" => C(Command::SelectCategory(LightCategory::Point)),
            "2" => C(Command::SelectCategory(LightCategory::Spot)),
            "3" => C(Command::SelectCategory(LightCategory::Directional)),
            "4" => C(Command::SelectCategory(LightCategory::Sun)),
            "=" | "+" => C(Command::IncreaseSpeed),
            "-" => C(Command::DecreaseSpeed),
            "p" => C(Command::SwitchLightState),
            "r" => C(Command::ToggleSecondaryLights),
            " " => C(Command::ToggleShadows),
            "u" => H(HeldAction::MoveLight(Direction::Up)),
            "o" => H(HeldAction::MoveLight(Direction::Down)),
            "i" => H(HeldAction::MoveLight(Direction::Forward)),
            "k" => H(HeldAction::MoveLight(Direction::Back)),
            "j" => H(HeldAction::MoveLight(Direction::Left)),
            "l" => H(HeldAction::MoveLight(Direction::Right)),
            "w" => H(HeldAction::MoveCamera(CameraMovement::Forward)),
            "s" => H(HeldAction::MoveCamera(CameraMovement::Backward)),
            "a" => H(HeldAction::MoveCamera(CameraMovement::Left)),
            "d" => H(HeldAction::MoveCamera(CameraMovement::Right)),
            _ => return None,
        },
        _ => return None,
    };
    Some(binding)
}

/// Keyboard state collected between frames. The frame loop drains it
/// completely before updating the scene.
#[derive(Debug, Default)]
pub struct InputQueue {
    commands: VecDeque<Command>,
    held: Vec<HeldAction>,
}

impl InputQueue {
    pub fn on_key(&mut self, key: &Key, state: ElementState, repeat: bool) {
        match (binding_for_key(key), state) {
            (Some(Binding::Command(command)), ElementState::Pressed) if !repeat => {
                self.commands.push_back(command)
            }
            (Some(Binding::Hold(action)), ElementState::Pressed) => {
                if !self.held.contains(&action) {
                    self.held.push(action);
                }
            }
            (Some(Binding::Hold(action)), ElementState::Released) => {
                self.held.retain(|held| *held != action)
            }
            _ => (),
        }
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.commands.drain(..)
    }

    pub fn held(&self) -> &[HeldAction] {
        &self.held
    }

    /// Forgets held keys, e.g. when the window loses focus and the release
    /// events would never arrive.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
