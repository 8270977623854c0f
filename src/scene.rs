use log::debug;

use crate::camera::Camera;
use crate::input::{Command, HeldAction};
use crate::light::{LightRegistry, PointLight};
use crate::light_manager::LightManager;
use crate::loader::{SceneData, SceneObject};
use crate::settings::RenderSettings;
use crate::sun::SunCycle;

/// Everything the update and render stages share. Owned by the app and
/// passed down by reference; nothing here touches the GL context.
pub struct Scene {
    pub camera: Camera,
    pub lights: LightRegistry,
    pub manager: LightManager,
    pub objects: Vec<SceneObject>,
    pub shadows: bool,
    /// When off only the first active point light is rendered.
    pub secondary_lights: bool,
    pub last_mouse: Option<glm::Vec2>,
    delta_time: f32,
}

impl Scene {
    pub fn init(data: SceneData, settings: &RenderSettings) -> Self {
        let sun = SunCycle::new(
            settings.sun_dwell,
            data.lights.sun.light.color,
            data.lights.sun.direction,
        );
        let mut scene = Self {
            camera: Camera::new(glm::vec3(0.0, 0.0, 5.0)),
            lights: data.lights,
            manager: LightManager::new(settings.movement_speed, sun),
            objects: data.objects,
            shadows: true,
            secondary_lights: true,
            last_mouse: None,
            delta_time: 0.0,
        };
        scene.camera.set_aspect(settings.width as f32, settings.height as f32);
        scene
    }

    pub fn update_time(&mut self, delta_time: f32) {
        self.delta_time = delta_time.max(0.0);
        self.manager.update_delta_time(self.delta_time);
    }

    /// Applies a queued command. `Quit` is left to the caller.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SelectCategory(category) => self.manager.select_category(category),
            Command::SelectNext => self.manager.select_next(&self.lights),
            Command::SelectPrevious => self.manager.select_previous(&self.lights),
            Command::IncreaseSpeed => self.manager.increase_speed(),
            Command::DecreaseSpeed => self.manager.decrease_speed(),
            Command::SwitchLightState => self.manager.switch_light_state(&mut self.lights),
            Command::ToggleShadows => {
                self.shadows = !self.shadows;
                debug!("shadows: {}", self.shadows);
            }
            Command::ToggleSecondaryLights => {
                self.secondary_lights = !self.secondary_lights;
                debug!("secondary point lights: {}", self.secondary_lights);
            }
            Command::Quit => (),
        }
    }

    pub fn apply_held(&mut self, action: HeldAction) {
        match action {
            HeldAction::MoveLight(direction) => self.manager.translate(&mut self.lights, direction),
            HeldAction::MoveCamera(movement) => {
                self.camera.process_keyboard(movement, self.delta_time)
            }
        }
    }

    pub fn mouse_moved(&mut self, position: glm::Vec2) {
        if let Some(last) = self.last_mouse {
            let delta = position - last;
            // Screen y grows downwards.
            self.camera.look_controls(delta.x, -delta.y);
        }
        self.last_mouse = Some(position);
    }

    /// Per-frame state update, run after all input has been applied.
    pub fn update(&mut self) {
        self.manager.update(&mut self.lights);
    }

    /// Point lights that get a pass this frame. Switched-off lights keep
    /// theirs so the shared lights are still shaded by the base pass.
    pub fn rendered_point_lights(&self) -> impl Iterator<Item = &PointLight> {
        let limit = if self.secondary_lights { usize::MAX } else { 1 };
        self.lights.point.iter().take(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Attenuation;
    use crate::light_manager::{Direction, LightCategory};

    fn scene(points: usize) -> Scene {
        let mut lights = LightRegistry::default();
        lights.point = (0..points)
            .map(|i| {
                PointLight::new(
                    glm::vec3(i as f32, 0.0, 0.0),
                    glm::vec3(1.0, 1.0, 1.0),
                    Attenuation {
                        constant: 1.0,
                        linear: 0.09,
                        quadratic: 0.032,
                    },
                )
            })
            .collect();
        Scene::init(
            SceneData {
                lights,
                objects: Vec::new(),
            },
            &RenderSettings::default(),
        )
    }

    #[test]
    fn commands_reach_the_light_manager() {
        let mut scene = scene(3);
        scene.apply(Command::SelectCategory(LightCategory::Point));
        scene.apply(Command::SelectPrevious);
        scene.apply(Command::SwitchLightState);
        assert!(!scene.lights.point[2].is_on());
        scene.apply(Command::IncreaseSpeed);
        assert_eq!(scene.manager.movement_speed(), 6.0);
    }

    #[test]
    fn held_light_movement_uses_the_frame_time() {
        let mut scene = scene(1);
        scene.apply(Command::SelectCategory(LightCategory::Point));
        scene.update_time(0.5);
        scene.apply_held(HeldAction::MoveLight(Direction::Up));
        assert_eq!(scene.lights.point[0].position.y, 2.5);
    }

    #[test]
    fn secondary_toggle_limits_rendered_lights() {
        let mut scene = scene(3);
        assert_eq!(scene.rendered_point_lights().count(), 3);
        scene.apply(Command::ToggleSecondaryLights);
        assert_eq!(scene.rendered_point_lights().count(), 1);
        scene.apply(Command::ToggleShadows);
        assert!(!scene.shadows);
    }

    #[test]
    fn switched_off_point_lights_keep_their_pass() {
        let mut scene = scene(2);
        scene.lights.point.iter_mut().for_each(|l| l.light.switch_state());
        let rendered: Vec<_> = scene.rendered_point_lights().collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|l| !l.is_on()));
    }

    #[test]
    fn update_animates_the_sun() {
        let mut scene = scene(0);
        scene.update_time(1.0);
        scene.update();
        assert_eq!(scene.manager.sun().elapsed(), 1.0);
        assert_eq!(scene.lights.sun.direction, glm::vec3(-0.5, 0.5, 0.0));
    }
}
