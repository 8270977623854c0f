use crate::three_d::LocalToGlobal;

const WORLD_UP: [f32; 3] = [0.0, 1.0, 0.0];
const MOVE_SPEED: f32 = 2.5;
const MOUSE_SENSITIVITY: f32 = 0.1;
const MIN_FOV_DEGREES: f32 = 1.0;
const MAX_FOV_DEGREES: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Fly camera driven by WASD, mouse look and the scroll wheel.
#[derive(Debug)]
pub struct Camera {
    pub position: glm::Vec3,
    pub forward: glm::Vec3,
    /// Vertical field of view, degrees.
    pub fov: f32,
    yaw: f32,
    pitch: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(position: glm::Vec3) -> Self {
        let mut camera = Self {
            position,
            forward: glm::vec3(0.0, 0.0, -1.0),
            fov: MAX_FOV_DEGREES,
            yaw: -90.0,
            pitch: 0.0,
            aspect: 1.0,
        };
        camera.update_forward();
        camera
    }

    pub fn set_aspect(&mut self, w: f32, h: f32) {
        if w == 0.0 || h == 0.0 {
            self.aspect = 1.0;
        } else {
            self.aspect = w / h;
        }
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        glm::ext::look_at(self.position, self.position + self.forward, up())
    }

    pub fn projection_matrix(&self, near: f32, far: f32) -> glm::Mat4 {
        glm::ext::perspective(self.fov.to_radians(), self.aspect, near, far)
    }

    pub fn translate_local(&mut self, dx: f32, dy: f32, dz: f32) {
        let (d, _) = self.to_global(&glm::vec3(dx, dy, dz), &glm::vec3(0.0, 0.0, 0.0));
        self.position = d;
    }

    pub fn process_keyboard(&mut self, movement: CameraMovement, delta_time: f32) {
        let step = MOVE_SPEED * delta_time;
        match movement {
            CameraMovement::Forward => self.translate_local(0.0, 0.0, -step),
            CameraMovement::Backward => self.translate_local(0.0, 0.0, step),
            CameraMovement::Left => self.translate_local(-step, 0.0, 0.0),
            CameraMovement::Right => self.translate_local(step, 0.0, 0.0),
        }
    }

    /// Mouse look. Pitch is kept short of straight up or down so the view
    /// basis never degenerates.
    pub fn look_controls(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch + dy * MOUSE_SENSITIVITY).clamp(-89.0, 89.0);
        self.update_forward();
    }

    pub fn zoom(&mut self, scroll_amount: f32) {
        self.fov = (self.fov - scroll_amount).clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES);
    }

    fn update_forward(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.forward = glm::normalize(glm::vec3(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        ));
    }
}

fn up() -> glm::Vec3 {
    glm::vec3(WORLD_UP[0], WORLD_UP[1], WORLD_UP[2])
}

impl LocalToGlobal for Camera {
    fn to_global(&self, position: &glm::Vec3, direction: &glm::Vec3) -> (glm::Vec3, glm::Vec3) {
        let right = glm::normalize(glm::cross(self.forward, up()));
        let up = glm::normalize(glm::cross(right, self.forward));
        let position =
            self.position + right * position.x + up * position.y - self.forward * position.z;
        let direction = right * direction.x + up * direction.y - self.forward * direction.z;

        (position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: glm::Vec3, b: glm::Vec3) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
    }

    #[test]
    fn starts_looking_down_negative_z() {
        let camera = Camera::new(glm::vec3(0.0, 0.0, 5.0));
        assert!(close(camera.forward, glm::vec3(0.0, 0.0, -1.0)));
    }

    #[test]
    fn forward_moves_along_the_view_direction() {
        let mut camera = Camera::new(glm::vec3(0.0, 0.0, 5.0));
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(close(camera.position, glm::vec3(0.0, 0.0, 2.5)));
        camera.process_keyboard(CameraMovement::Right, 0.4);
        assert!(close(camera.position, glm::vec3(1.0, 0.0, 2.5)));
    }

    #[test]
    fn pitch_and_zoom_are_clamped() {
        let mut camera = Camera::new(glm::vec3(0.0, 0.0, 0.0));
        camera.look_controls(0.0, 10_000.0);
        assert!(camera.forward.y < 1.0);
        assert!(camera.forward.y > 0.99);

        camera.zoom(100.0);
        assert_eq!(camera.fov, MIN_FOV_DEGREES);
        camera.zoom(-100.0);
        assert_eq!(camera.fov, MAX_FOV_DEGREES);
    }

    #[test]
    fn view_matrix_maps_the_eye_to_the_origin() {
        let camera = Camera::new(glm::vec3(1.0, 2.0, 3.0));
        let eye = camera.view_matrix() * glm::vec4(1.0, 2.0, 3.0, 1.0);
        assert!(eye.x.abs() < 1e-5 && eye.y.abs() < 1e-5 && eye.z.abs() < 1e-5);
    }
}
