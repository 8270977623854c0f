use log::debug;

use crate::light::LightRegistry;
use crate::settings::{MAX_MOVEMENT_SPEED, MIN_MOVEMENT_SPEED, MOVEMENT_SPEED_STEP};
use crate::sun::SunCycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCategory {
    Point,
    Spot,
    Directional,
    Sun,
}

/// Axis-aligned movement of the selected light, in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    pub fn unit(self) -> glm::Vec3 {
        match self {
            Direction::Up => glm::vec3(0.0, 1.0, 0.0),
            Direction::Down => glm::vec3(0.0, -1.0, 0.0),
            Direction::Forward => glm::vec3(0.0, 0.0, -1.0),
            Direction::Back => glm::vec3(0.0, 0.0, 1.0),
            Direction::Left => glm::vec3(-1.0, 0.0, 0.0),
            Direction::Right => glm::vec3(1.0, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub point: usize,
    pub spot: usize,
    pub directional: usize,
}

/// Tracks which light the user is editing and applies the edits. Also drives
/// the sun, since advancing the day is one of those edits.
#[derive(Debug)]
pub struct LightManager {
    active: Option<LightCategory>,
    selection: Selection,
    movement_speed: f32,
    delta_time: f32,
    sun: SunCycle,
}

fn next_index(index: usize, len: usize) -> usize {
    (index + 1) % len
}

fn previous_index(index: usize, len: usize) -> usize {
    if index == 0 {
        len - 1
    } else {
        (index - 1) % len
    }
}

impl LightManager {
    pub fn new(movement_speed: f32, sun: SunCycle) -> Self {
        Self {
            active: None,
            selection: Selection::default(),
            movement_speed: movement_speed.clamp(MIN_MOVEMENT_SPEED, MAX_MOVEMENT_SPEED),
            delta_time: 0.0,
            sun,
        }
    }

    #[cfg(test)]
    pub fn active(&self) -> Option<LightCategory> {
        self.active
    }

    #[cfg(test)]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[cfg(test)]
    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    #[cfg(test)]
    pub fn sun(&self) -> &SunCycle {
        &self.sun
    }

    pub fn update_delta_time(&mut self, delta_time: f32) {
        self.delta_time = delta_time.max(0.0);
    }

    /// Selecting the already active category deselects it.
    pub fn select_category(&mut self, category: LightCategory) {
        if self.active == Some(category) {
            self.active = None;
        } else {
            self.active = Some(category);
        }
        debug!("active light category: {:?}", self.active);
    }

    pub fn select_next(&mut self, lights: &LightRegistry) {
        self.step_selection(lights, next_index);
    }

    pub fn select_previous(&mut self, lights: &LightRegistry) {
        self.step_selection(lights, previous_index);
    }

    fn step_selection(&mut self, lights: &LightRegistry, step: fn(usize, usize) -> usize) {
        let (index, len) = match self.active {
            Some(LightCategory::Point) => (&mut self.selection.point, lights.point.len()),
            Some(LightCategory::Spot) => (&mut self.selection.spot, lights.spot.len()),
            Some(LightCategory::Directional) => {
                (&mut self.selection.directional, lights.directional.len())
            }
            Some(LightCategory::Sun) | None => return,
        };
        if len == 0 {
            return;
        }
        *index = step(*index, len);
        debug!("selected {:?} light #{}", self.active, *index);
    }

    /// Moves the selected point or spot light by `speed * delta_time`.
    pub fn translate(&self, lights: &mut LightRegistry, direction: Direction) {
        let delta = direction.unit() * (self.movement_speed * self.delta_time);
        let position = match self.active {
            Some(LightCategory::Point) => lights
                .point
                .get_mut(self.selection.point)
                .map(|l| &mut l.position),
            Some(LightCategory::Spot) => lights
                .spot
                .get_mut(self.selection.spot)
                .map(|l| &mut l.position),
            _ => None,
        };
        if let Some(position) = position {
            *position = *position + delta;
        }
    }

    /// Switches the selected light on or off. For the sun this advances the
    /// time of day instead, once the current phase has finished.
    pub fn switch_light_state(&mut self, lights: &mut LightRegistry) {
        let light = match self.active {
            Some(LightCategory::Point) => lights
                .point
                .get_mut(self.selection.point)
                .map(|l| &mut l.light),
            Some(LightCategory::Spot) => lights
                .spot
                .get_mut(self.selection.spot)
                .map(|l| &mut l.light),
            Some(LightCategory::Directional) => lights
                .directional
                .get_mut(self.selection.directional)
                .map(|l| &mut l.light),
            Some(LightCategory::Sun) => {
                if self.sun.try_advance() {
                    debug!("sun phase advanced to {:?}", self.sun.phase());
                }
                None
            }
            None => None,
        };
        if let Some(light) = light {
            light.switch_state();
        }
    }

    pub fn increase_speed(&mut self) {
        self.movement_speed = (self.movement_speed + MOVEMENT_SPEED_STEP).min(MAX_MOVEMENT_SPEED);
        debug!("light movement speed: {}", self.movement_speed);
    }

    pub fn decrease_speed(&mut self) {
        self.movement_speed = (self.movement_speed - MOVEMENT_SPEED_STEP).max(MIN_MOVEMENT_SPEED);
        debug!("light movement speed: {}", self.movement_speed);
    }

    /// Advances the sun animation and writes its colour and direction into
    /// the registry's sun light.
    pub fn update(&mut self, lights: &mut LightRegistry) {
        self.sun.update(self.delta_time);
        lights.sun.light.color = self.sun.color();
        lights.sun.direction = self.sun.direction();
    }
}
