/// Maximum light counts. These must match the array sizes in `shader/lighting.frag`.
pub const MAX_POINT_LIGHTS: usize = 32;
pub const MAX_SPOT_LIGHTS: usize = 32;
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Light movement speed range, in world units per second.
pub const MIN_MOVEMENT_SPEED: f32 = 0.0;
pub const MAX_MOVEMENT_SPEED: f32 = 10.0;
pub const MOVEMENT_SPEED_STEP: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub title: &'static str,
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 3],
    pub camera_near: f32,
    pub camera_far: f32,
    pub shadow: ShadowSettings,
    /// Seconds a sun phase keeps interpolating before it may be advanced.
    pub sun_dwell: f32,
    pub movement_speed: f32,
    pub light_data: &'static str,
    pub model_data: &'static str,
    pub diffuse_texture: &'static str,
    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub skybox_faces: [&'static str; 6],
    /// Kept well above the units used by the scene passes.
    pub skybox_texture_unit: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 1024,
            near: 1.0,
            far: 25.0,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            title: "Sunlit Shadows (press Escape to exit)",
            width: 1200,
            height: 720,
            clear_color: [0.1, 0.1, 0.2],
            camera_near: 0.1,
            camera_far: 100.0,
            shadow: ShadowSettings::default(),
            sun_dwell: 2.0,
            movement_speed: 5.0,
            light_data: "data/lights.json",
            model_data: "data/models.json",
            diffuse_texture: "data/textures/container.png",
            skybox_faces: [
                "data/skybox/right.jpg",
                "data/skybox/left.jpg",
                "data/skybox/top.jpg",
                "data/skybox/bottom.jpg",
                "data/skybox/front.jpg",
                "data/skybox/back.jpg",
            ],
            skybox_texture_unit: 15,
        }
    }
}
