#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    On,
    Off,
}

impl LightState {
    fn flipped(self) -> Self {
        match self {
            LightState::On => LightState::Off,
            LightState::Off => LightState::On,
        }
    }
}

/// Colour and on/off switch shared by every light kind.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub color: glm::Vec3,
    pub state: LightState,
}

impl Light {
    pub fn new(color: glm::Vec3, state: LightState) -> Self {
        Self { color, state }
    }

    pub fn is_on(&self) -> bool {
        self.state == LightState::On
    }

    pub fn switch_state(&mut self) {
        self.state = self.state.flipped();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub light: Light,
    pub position: glm::Vec3,
    pub attenuation: Attenuation,
}

impl PointLight {
    #[cfg(test)]
    pub fn new(position: glm::Vec3, color: glm::Vec3, attenuation: Attenuation) -> Self {
        Self {
            light: Light::new(color, LightState::On),
            position,
            attenuation,
        }
    }

    pub fn is_on(&self) -> bool {
        self.light.is_on()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub light: Light,
    pub position: glm::Vec3,
    pub direction: glm::Vec3,
    pub attenuation: Attenuation,
    /// Inner and outer cone angles, radians.
    pub cutoff: f32,
    pub outer_cutoff: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub light: Light,
    pub direction: glm::Vec3,
}

impl DirectionalLight {
    pub fn new(direction: glm::Vec3, color: glm::Vec3) -> Self {
        Self {
            light: Light::new(color, LightState::On),
            direction,
        }
    }
}

/// Every light of the scene. Lights are never added or removed after load,
/// only moved and switched.
#[derive(Debug, Clone)]
pub struct LightRegistry {
    pub point: Vec<PointLight>,
    pub spot: Vec<SpotLight>,
    pub directional: Vec<DirectionalLight>,
    pub sun: DirectionalLight,
}

impl LightRegistry {
    pub fn new(sun: DirectionalLight) -> Self {
        Self {
            point: Vec::new(),
            spot: Vec::new(),
            directional: Vec::new(),
            sun,
        }
    }
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new(DirectionalLight::new(
            glm::vec3(0.0, -1.0, 0.0),
            glm::vec3(0.98, 0.831, 0.25),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_state_flips_back_and_forth() {
        let mut light = Light::new(glm::vec3(1.0, 1.0, 1.0), LightState::On);
        light.switch_state();
        assert!(!light.is_on());
        light.switch_state();
        assert!(light.is_on());
    }
}
