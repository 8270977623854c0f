pub trait LocalToGlobal {
    fn to_global(&self, position: &glm::Vec3, direction: &glm::Vec3) -> (glm::Vec3, glm::Vec3);
}

pub fn identity() -> glm::Mat4 {
    glm::Mat4::new(
        glm::vec4(1.0, 0.0, 0.0, 0.0),
        glm::vec4(0.0, 1.0, 0.0, 0.0),
        glm::vec4(0.0, 0.0, 1.0, 0.0),
        glm::vec4(0.0, 0.0, 0.0, 1.0),
    )
}

/// Linear blend that returns `a` at `t == 0` and `b` at `t == 1` exactly.
pub fn mix(a: glm::Vec3, b: glm::Vec3, t: f32) -> glm::Vec3 {
    a * (1.0 - t) + b * t
}

/// Drops the translation column, so the result only rotates.
pub fn strip_translation(m: &glm::Mat4) -> glm::Mat4 {
    let keep = |c: glm::Vec4| glm::vec4(c.x, c.y, c.z, 0.0);
    glm::Mat4::new(
        keep(m.c0),
        keep(m.c1),
        keep(m.c2),
        glm::vec4(0.0, 0.0, 0.0, 1.0),
    )
}

pub fn vec3_from(v: [f32; 3]) -> glm::Vec3 {
    glm::vec3(v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_hits_both_endpoints_exactly() {
        let a = glm::vec3(0.98, 0.81, 0.30);
        let b = glm::vec3(0.96, 0.27, 0.27);
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
    }

    #[test]
    fn strip_translation_keeps_rotation_only() {
        let m = glm::ext::translate(&identity(), glm::vec3(3.0, 4.0, 5.0));
        let stripped = strip_translation(&m);
        let p = stripped * glm::vec4(1.0, 2.0, 3.0, 1.0);
        assert_eq!((p.x, p.y, p.z), (1.0, 2.0, 3.0));
    }
}
