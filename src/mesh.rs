/// Floats per cube vertex: position, normal, texture coordinate.
pub const CUBE_STRIDE: usize = 8;
pub const CUBE_VERTEX_COUNT: usize = 36;

/// Floats per screen quad vertex: position, texture coordinate.
pub const QUAD_STRIDE: usize = 4;
pub const QUAD_VERTEX_COUNT: usize = 6;

/// Unit cube spanning [-1, 1] with outward, counter-clockwise faces. The
/// skybox draws the same positions from the inside.
#[rustfmt::skip]
pub static CUBE_VERTICES: [f32; CUBE_VERTEX_COUNT * CUBE_STRIDE] = [
    // back face
    -1.0, -1.0, -1.0,  0.0,  0.0, -1.0, 0.0, 0.0,
     1.0,  1.0, -1.0,  0.0,  0.0, -1.0, 1.0, 1.0,
     1.0, -1.0, -1.0,  0.0,  0.0, -1.0, 1.0, 0.0,
     1.0,  1.0, -1.0,  0.0,  0.0, -1.0, 1.0, 1.0,
    -1.0, -1.0, -1.0,  0.0,  0.0, -1.0, 0.0, 0.0,
    -1.0,  1.0, -1.0,  0.0,  0.0, -1.0, 0.0, 1.0,
    // front face
    -1.0, -1.0,  1.0,  0.0,  0.0,  1.0, 0.0, 0.0,
     1.0, -1.0,  1.0,  0.0,  0.0,  1.0, 1.0, 0.0,
     1.0,  1.0,  1.0,  0.0,  0.0,  1.0, 1.0, 1.0,
     1.0,  1.0,  1.0,  0.0,  0.0,  1.0, 1.0, 1.0,
    -1.0,  1.0,  1.0,  0.0,  0.0,  1.0, 0.0, 1.0,
    -1.0, -1.0,  1.0,  0.0,  0.0,  1.0, 0.0, 0.0,
    // left face
    -1.0,  1.0,  1.0, -1.0,  0.0,  0.0, 1.0, 0.0,
    -1.0,  1.0, -1.0, -1.0,  0.0,  0.0, 1.0, 1.0,
    -1.0, -1.0, -1.0, -1.0,  0.0,  0.0, 0.0, 1.0,
    -1.0, -1.0, -1.0, -1.0,  0.0,  0.0, 0.0, 1.0,
    -1.0, -1.0,  1.0, -1.0,  0.0,  0.0, 0.0, 0.0,
    -1.0,  1.0,  1.0, -1.0,  0.0,  0.0, 1.0, 0.0,
    // right face
     1.0,  1.0,  1.0,  1.0,  0.0,  0.0, 1.0, 0.0,
     1.0, -1.0, -1.0,  1.0,  0.0,  0.0, 0.0, 1.0,
     1.0,  1.0, -1.0,  1.0,  0.0,  0.0, 1.0, 1.0,
     1.0, -1.0, -1.0,  1.0,  0.0,  0.0, 0.0, 1.0,
     1.0,  1.0,  1.0,  1.0,  0.0,  0.0, 1.0, 0.0,
     1.0, -1.0,  1.0,  1.0,  0.0,  0.0, 0.0, 0.0,
    // bottom face
    -1.0, -1.0, -1.0,  0.0, -1.0,  0.0, 0.0, 1.0,
     1.0, -1.0, -1.0,  0.0, -1.0,  0.0, 1.0, 1.0,
     1.0, -1.0,  1.0,  0.0, -1.0,  0.0, 1.0, 0.0,
     1.0, -1.0,  1.0,  0.0, -1.0,  0.0, 1.0, 0.0,
    -1.0, -1.0,  1.0,  0.0, -1.0,  0.0, 0.0, 0.0,
    -1.0, -1.0, -1.0,  0.0, -1.0,  0.0, 0.0, 1.0,
    // top face
    -1.0,  1.0, -1.0,  0.0,  1.0,  0.0, 0.0, 1.0,
     1.0,  1.0,  1.0,  0.0,  1.0,  0.0, 1.0, 0.0,
     1.0,  1.0, -1.0,  0.0,  1.0,  0.0, 1.0, 1.0,
     1.0,  1.0,  1.0,  0.0,  1.0,  0.0, 1.0, 0.0,
    -1.0,  1.0, -1.0,  0.0,  1.0,  0.0, 0.0, 1.0,
    -1.0,  1.0,  1.0,  0.0,  1.0,  0.0, 0.0, 0.0,
];

#[rustfmt::skip]
pub static SCREEN_QUAD_VERTICES: [f32; QUAD_VERTEX_COUNT * QUAD_STRIDE] = [
    -1.0,  1.0, 0.0, 1.0,
    -1.0, -1.0, 0.0, 0.0,
     1.0, -1.0, 1.0, 0.0,
    -1.0,  1.0, 0.0, 1.0,
     1.0, -1.0, 1.0, 0.0,
     1.0,  1.0, 1.0, 1.0,
];
