//! Omnidirectional point-light shadows and the multi-light accumulation
//! pipeline.
//!
//! The scene is rendered once per point light, each time with that light's
//! cubemap shadow. The per-light images are added together through three
//! offscreen targets whose roles rotate every iteration, so no single shader
//! has to handle every shadowed light at once.

use std::mem;

use crate::light::PointLight;
use crate::settings::ShadowSettings;

pub const CUBE_FACES: usize = 6;

/// Look direction and up vector for each cubemap face, in
/// +X, -X, +Y, -Y, +Z, -Z order.
const FACE_ORIENTATIONS: [([f32; 3], [f32; 3]); CUBE_FACES] = [
    ([1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
];

/// View-projection matrices rendering the six cube faces around `position`.
pub fn cube_face_transforms(
    position: glm::Vec3,
    settings: &ShadowSettings,
) -> [glm::Mat4; CUBE_FACES] {
    let projection = glm::ext::perspective(
        std::f32::consts::FRAC_PI_2,
        1.0,
        settings.near,
        settings.far,
    );
    FACE_ORIENTATIONS.map(|(look, up)| {
        let [x, y, z] = look;
        let view = glm::ext::look_at(
            position,
            position + glm::vec3(x, y, z),
            glm::vec3(up[0], up[1], up[2]),
        );
        projection * view
    })
}

/// Which lights a per-light pass shades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightPass {
    /// First pass of the frame: the point light plus ambient, sun,
    /// directional and spot lighting.
    Base,
    /// The point light alone, to be added on top of the base pass.
    Additional,
}

/// GPU side of the accumulation. `Target` is a cheap handle to an
/// offscreen colour + depth target.
pub trait LightPassBackend {
    type Target: Copy;

    /// Renders the scene lit by `light`, with its shadow cubemap, into `target`.
    fn render_light(&mut self, light: &PointLight, target: Self::Target, pass: LightPass);

    /// Writes `light + accumulated` into `destination`.
    fn composite(
        &mut self,
        light: Self::Target,
        accumulated: Self::Target,
        destination: Self::Target,
    );

    /// Resets `target` to the clear colour and far depth.
    fn clear(&mut self, target: Self::Target);

    /// Copies `image` (depth, then colour) to the screen and draws the skybox.
    fn present(&mut self, image: Self::Target);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub lights_rendered: usize,
    pub blend_iterations: usize,
}

/// The three accumulation targets and their current roles.
#[derive(Debug, Clone, Copy)]
pub struct ShadowAccumulator<T> {
    working: T,
    blending: T,
    blended: T,
}

impl<T: Copy> ShadowAccumulator<T> {
    pub fn new(working: T, blending: T, blended: T) -> Self {
        Self {
            working,
            blending,
            blended,
        }
    }

    /// Target holding the composited image after the last `accumulate`.
    #[cfg(test)]
    pub fn blended(&self) -> T {
        self.blended
    }

    #[cfg(test)]
    pub fn working(&self) -> T {
        self.working
    }

    #[cfg(test)]
    pub fn blending(&self) -> T {
        self.blending
    }

    /// Renders and composites one frame. Role changes are handle swaps;
    /// the targets themselves are never reallocated.
    pub fn accumulate<'a, B, I>(&mut self, backend: &mut B, lights: I) -> FrameStats
    where
        B: LightPassBackend<Target = T>,
        I: IntoIterator<Item = &'a PointLight>,
    {
        let mut lights = lights.into_iter();
        let mut stats = FrameStats {
            lights_rendered: 0,
            blend_iterations: 0,
        };

        match lights.next() {
            Some(first) => {
                backend.render_light(first, self.blended, LightPass::Base);
                stats.lights_rendered += 1;
            }
            None => backend.clear(self.blended),
        }

        for light in lights {
            backend.render_light(light, self.working, LightPass::Additional);
            backend.composite(self.working, self.blended, self.blending);
            mem::swap(&mut self.blending, &mut self.blended);
            stats.lights_rendered += 1;
            stats.blend_iterations += 1;
        }

        backend.present(self.blended);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{Attenuation, LightRegistry};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Render { light: i32, target: u32, pass: LightPass },
        Composite { light: u32, accumulated: u32, destination: u32 },
        Clear(u32),
        Present(u32),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<Call>,
    }

    impl LightPassBackend for RecordingBackend {
        type Target = u32;

        fn render_light(&mut self, light: &PointLight, target: u32, pass: LightPass) {
            self.calls.push(Call::Render {
                light: light.position.x as i32,
                target,
                pass,
            });
        }

        fn composite(&mut self, light: u32, accumulated: u32, destination: u32) {
            self.calls.push(Call::Composite {
                light,
                accumulated,
                destination,
            });
        }

        fn clear(&mut self, target: u32) {
            self.calls.push(Call::Clear(target));
        }

        fn present(&mut self, image: u32) {
            self.calls.push(Call::Present(image));
        }
    }

    const WORKING: u32 = 1;
    const BLENDING: u32 = 2;
    const BLENDED: u32 = 3;

    fn lights(count: usize) -> Vec<PointLight> {
        (0..count)
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
            .collect()
    }

    fn accumulator() -> ShadowAccumulator<u32> {
        ShadowAccumulator::new(WORKING, BLENDING, BLENDED)
    }

    #[test]
    fn no_lights_presents_a_cleared_target() {
        let mut backend = RecordingBackend::default();
        let mut acc = accumulator();
        let stats = acc.accumulate(&mut backend, &lights(0));

        assert_eq!(
            stats,
            FrameStats {
                lights_rendered: 0,
                blend_iterations: 0
            }
        );
        assert_eq!(backend.calls, vec![Call::Clear(BLENDED), Call::Present(BLENDED)]);
    }

    #[test]
    fn single_light_renders_straight_into_the_final_target() {
        let mut backend = RecordingBackend::default();
        let mut acc = accumulator();
        let stats = acc.accumulate(&mut backend, &lights(1));

        assert_eq!(stats.blend_iterations, 0);
        assert_eq!(
            backend.calls,
            vec![
                Call::Render {
                    light: 0,
                    target: BLENDED,
                    pass: LightPass::Base
                },
                Call::Present(BLENDED),
            ]
        );
    }

    #[test]
    fn three_lights_ping_pong_between_the_blend_targets() {
        let mut backend = RecordingBackend::default();
        let mut acc = accumulator();
        let stats = acc.accumulate(&mut backend, &lights(3));

        assert_eq!(
            stats,
            FrameStats {
                lights_rendered: 3,
                blend_iterations: 2
            }
        );
        assert_eq!(
            backend.calls,
            vec![
                Call::Render {
                    light: 0,
                    target: BLENDED,
                    pass: LightPass::Base
                },
                Call::Render {
                    light: 1,
                    target: WORKING,
                    pass: LightPass::Additional
                },
                Call::Composite {
                    light: WORKING,
                    accumulated: BLENDED,
                    destination: BLENDING
                },
                Call::Render {
                    light: 2,
                    target: WORKING,
                    pass: LightPass::Additional
                },
                Call::Composite {
                    light: WORKING,
                    accumulated: BLENDING,
                    destination: BLENDED
                },
                Call::Present(BLENDED),
            ]
        );
        assert_eq!(acc.blended(), BLENDED);
        assert_eq!(acc.blending(), BLENDING);
        assert_eq!(acc.working(), WORKING);
    }

    #[test]
    fn roles_carry_over_between_frames() {
        let mut backend = RecordingBackend::default();
        let mut acc = accumulator();
        acc.accumulate(&mut backend, &lights(2));
        assert_eq!(acc.blended(), BLENDING);
        assert_eq!(backend.calls.last(), Some(&Call::Present(BLENDING)));

        backend.calls.clear();
        acc.accumulate(&mut backend, &lights(2));
        assert_eq!(
            backend.calls[2],
            Call::Composite {
                light: WORKING,
                accumulated: BLENDING,
                destination: BLENDED
            }
        );
        assert_eq!(acc.blended(), BLENDED);
    }

    #[test]
    fn composite_never_reads_and_writes_the_same_target() {
        let mut backend = RecordingBackend::default();
        let mut acc = accumulator();
        acc.accumulate(&mut backend, &lights(7));

        let composites: Vec<_> = backend
            .calls
            .iter()
            .filter_map(|c| match *c {
                Call::Composite {
                    light,
                    accumulated,
                    destination,
                } => Some((light, accumulated, destination)),
                _ => None,
            })
            .collect();
        assert_eq!(composites.len(), 6);
        for (light, accumulated, destination) in composites {
            assert_ne!(light, destination);
            assert_ne!(accumulated, destination);
            assert_ne!(light, accumulated);
        }
    }

    #[test]
    fn switched_off_lights_still_run_the_base_pass() {
        let mut registry = LightRegistry::default();
        registry.point = lights(2);
        registry.point.iter_mut().for_each(|l| l.light.switch_state());

        let mut backend = RecordingBackend::default();
        let mut acc = accumulator();
        let stats = acc.accumulate(&mut backend, &registry.point);

        assert_eq!(stats.lights_rendered, 2);
        assert_eq!(
            backend.calls[0],
            Call::Render {
                light: 0,
                target: BLENDED,
                pass: LightPass::Base
            }
        );
        assert!(!backend.calls.contains(&Call::Clear(BLENDED)));
    }

    #[test]
    fn each_face_looks_down_its_axis() {
        let settings = ShadowSettings::default();
        let position = glm::vec3(1.0, 2.0, 3.0);
        let transforms = cube_face_transforms(position, &settings);

        for (transform, (look, _)) in transforms.iter().zip(FACE_ORIENTATIONS) {
            let target = position + glm::vec3(look[0], look[1], look[2]) * 5.0;
            let clip = *transform * glm::vec4(target.x, target.y, target.z, 1.0);
            assert!(clip.w > 0.0, "target behind the face camera");
            assert!((clip.x / clip.w).abs() < 1e-4);
            assert!((clip.y / clip.w).abs() < 1e-4);
            let depth = clip.z / clip.w;
            assert!(depth > -1.0 && depth < 1.0);
        }
    }

    #[test]
    fn points_beyond_the_far_plane_are_clipped() {
        let settings = ShadowSettings::default();
        let transforms = cube_face_transforms(glm::vec3(0.0, 0.0, 0.0), &settings);
        let clip = transforms[0] * glm::vec4(settings.far + 1.0, 0.0, 0.0, 1.0);
        assert!(clip.z / clip.w > 1.0);
    }
}
