use std::ffi::{CStr, CString};
use std::ptr::{null, null_mut};

use glutin::prelude::GlDisplay;
use log::{info, trace};

use crate::error::RenderError;
use crate::light::{LightRegistry, PointLight};
use crate::mesh::{
    CUBE_STRIDE, CUBE_VERTEX_COUNT, CUBE_VERTICES, QUAD_STRIDE, QUAD_VERTEX_COUNT,
    SCREEN_QUAD_VERTICES,
};
use crate::scene::Scene;
use crate::settings::RenderSettings;
use crate::shadow::{cube_face_transforms, LightPass, LightPassBackend, ShadowAccumulator};
use crate::texture;
use crate::three_d::strip_translation;

pub mod gl {
    #![allow(clippy::all)]
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

use gl::types::{GLenum, GLint, GLuint};

/// Offscreen colour texture plus depth renderbuffer. Copying it copies the
/// handles, not the GPU storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    framebuffer: GLuint,
    texture: GLuint,
    depth: GLuint,
}

struct ShadowCubemap {
    framebuffer: GLuint,
    texture: GLuint,
}

struct Mesh {
    vao: GLuint,
    vbo: GLuint,
    count: i32,
}

struct Program {
    id: GLuint,
}

impl Program {
    unsafe fn link(
        gl: &gl::Gl,
        name: &'static str,
        stages: &[(GLenum, &CStr)],
    ) -> Result<Self, RenderError> {
        let id = gl.CreateProgram();
        let mut shaders = Vec::with_capacity(stages.len());
        for &(stage, source) in stages {
            match create_shader(gl, stage, source) {
                Ok(shader) => {
                    gl.AttachShader(id, shader);
                    shaders.push(shader);
                }
                Err(err) => {
                    shaders.iter().for_each(|&s| gl.DeleteShader(s));
                    gl.DeleteProgram(id);
                    return Err(err);
                }
            }
        }
        gl.LinkProgram(id);
        shaders.iter().for_each(|&s| gl.DeleteShader(s));

        let mut success = 1;
        gl.GetProgramiv(id, gl::LINK_STATUS, &mut success);
        if success == 0 {
            let mut len = 0;
            gl.GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut len);
            let mut buffer = vec![0u8; len.max(1) as usize];
            gl.GetProgramInfoLog(id, len, null_mut(), buffer.as_mut_ptr().cast());
            gl.DeleteProgram(id);
            return Err(RenderError::ProgramLink {
                program: name,
                log: info_log(buffer),
            });
        }
        Ok(Self { id })
    }

    fn location(&self, gl: &gl::Gl, name: &str) -> GLint {
        match CString::new(name) {
            Ok(name) => unsafe { gl.GetUniformLocation(self.id, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn set_int(&self, gl: &gl::Gl, name: &str, value: i32) {
        unsafe { gl.Uniform1i(self.location(gl, name), value) }
    }

    fn set_bool(&self, gl: &gl::Gl, name: &str, value: bool) {
        self.set_int(gl, name, value as i32);
    }

    fn set_float(&self, gl: &gl::Gl, name: &str, value: f32) {
        unsafe { gl.Uniform1f(self.location(gl, name), value) }
    }

    fn set_vec3(&self, gl: &gl::Gl, name: &str, value: glm::Vec3) {
        unsafe { gl.Uniform3f(self.location(gl, name), value.x, value.y, value.z) }
    }

    fn set_mat4(&self, gl: &gl::Gl, name: &str, value: &glm::Mat4) {
        let columns = column_major(value);
        unsafe { gl.UniformMatrix4fv(self.location(gl, name), 1, gl::FALSE, columns.as_ptr()) }
    }
}

pub struct Renderer {
    gl: gl::Gl,
    settings: RenderSettings,
    lighting: Program,
    depth: Program,
    accumulate: Program,
    screen: Program,
    skybox: Program,
    cube: Mesh,
    quad: Mesh,
    shadow_map: ShadowCubemap,
    targets: [RenderTarget; 3],
    accumulator: ShadowAccumulator<RenderTarget>,
    diffuse_texture: GLuint,
    skybox_texture: GLuint,
    viewport: (i32, i32),
}

impl Renderer {
    pub fn new<D: GlDisplay>(
        gl_display: &D,
        settings: &RenderSettings,
    ) -> Result<Self, RenderError> {
        info!("Creating OpenGL stuff...");
        unsafe {
            let gl = gl::Gl::load_with(|symbol| match CString::new(symbol) {
                Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()).cast(),
                Err(_) => null(),
            });

            if let Some(renderer) = get_gl_string(&gl, gl::RENDERER) {
                info!("Running on {}", renderer.to_string_lossy());
            }
            if let Some(version) = get_gl_string(&gl, gl::VERSION) {
                info!("OpenGL Version {}", version.to_string_lossy());
            }
            if let Some(shaders_version) = get_gl_string(&gl, gl::SHADING_LANGUAGE_VERSION) {
                info!("Shaders version on {}", shaders_version.to_string_lossy());
            }

            let lighting = Program::link(
                &gl,
                "lighting",
                &[
                    (gl::VERTEX_SHADER, LIGHTING_VERTEX_SOURCE),
                    (gl::FRAGMENT_SHADER, LIGHTING_FRAGMENT_SOURCE),
                ],
            )?;
            let depth = Program::link(
                &gl,
                "depth",
                &[
                    (gl::VERTEX_SHADER, DEPTH_VERTEX_SOURCE),
                    (gl::GEOMETRY_SHADER, DEPTH_GEOMETRY_SOURCE),
                    (gl::FRAGMENT_SHADER, DEPTH_FRAGMENT_SOURCE),
                ],
            )?;
            let accumulate = Program::link(
                &gl,
                "accumulate",
                &[
                    (gl::VERTEX_SHADER, SCREEN_VERTEX_SOURCE),
                    (gl::FRAGMENT_SHADER, ACCUMULATE_FRAGMENT_SOURCE),
                ],
            )?;
            let screen = Program::link(
                &gl,
                "screen",
                &[
                    (gl::VERTEX_SHADER, SCREEN_VERTEX_SOURCE),
                    (gl::FRAGMENT_SHADER, SCREEN_FRAGMENT_SOURCE),
                ],
            )?;
            let skybox = Program::link(
                &gl,
                "skybox",
                &[
                    (gl::VERTEX_SHADER, SKYBOX_VERTEX_SOURCE),
                    (gl::FRAGMENT_SHADER, SKYBOX_FRAGMENT_SOURCE),
                ],
            )?;
            info!("Compiled shaders.");

            // Sampler units never change, so bind them once.
            gl.UseProgram(lighting.id);
            lighting.set_int(&gl, "diffuseTexture", 0);
            lighting.set_int(&gl, "depthMap", 1);
            gl.UseProgram(accumulate.id);
            accumulate.set_int(&gl, "sourceTexture1", 0);
            accumulate.set_int(&gl, "sourceTexture2", 1);
            gl.UseProgram(screen.id);
            screen.set_int(&gl, "sourceTexture", 0);
            gl.UseProgram(skybox.id);
            skybox.set_int(&gl, "skybox", settings.skybox_texture_unit as i32);
            gl.UseProgram(0);

            let cube = create_mesh(&gl, &CUBE_VERTICES, CUBE_STRIDE, &[3, 3, 2], CUBE_VERTEX_COUNT);
            let quad = create_mesh(
                &gl,
                &SCREEN_QUAD_VERTICES,
                QUAD_STRIDE,
                &[2, 2],
                QUAD_VERTEX_COUNT,
            );

            let shadow_map = create_shadow_cubemap(&gl, settings.shadow.map_size)?;
            let (width, height) = (settings.width as i32, settings.height as i32);
            let targets = [
                create_target(&gl, "light", width, height)?,
                create_target(&gl, "blending", width, height)?,
                create_target(&gl, "blended", width, height)?,
            ];
            let accumulator = ShadowAccumulator::new(targets[0], targets[1], targets[2]);

            let diffuse_texture = texture::load_texture(&gl, settings.diffuse_texture);
            let skybox_texture = texture::load_cubemap(&gl, &settings.skybox_faces);

            gl.Enable(gl::DEPTH_TEST);
            gl.Enable(gl::CULL_FACE);

            Ok(Self {
                gl,
                settings: settings.clone(),
                lighting,
                depth,
                accumulate,
                screen,
                skybox,
                cube,
                quad,
                shadow_map,
                targets,
                accumulator,
                diffuse_texture,
                skybox_texture,
                viewport: (width, height),
            })
        }
    }

    /// Renders one frame into the default framebuffer.
    pub fn draw(&mut self, scene: &Scene) {
        let [r, g, b] = self.settings.clear_color;
        unsafe {
            self.gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
            self.gl.Viewport(0, 0, self.viewport.0, self.viewport.1);
            self.gl.ClearColor(r, g, b, 1.0);
            self.gl.Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
        self.upload_shared_lights(&scene.lights);

        let view = scene.camera.view_matrix();
        let (near, far) = (self.settings.camera_near, self.settings.camera_far);
        let projection = scene.camera.projection_matrix(near, far);

        let mut accumulator = self.accumulator;
        let mut pass = FramePass {
            renderer: self,
            scene,
            view,
            projection,
        };
        let stats = accumulator.accumulate(&mut pass, scene.rendered_point_lights());
        self.accumulator = accumulator;
        trace!(
            "frame: {} light passes, {} blends",
            stats.lights_rendered,
            stats.blend_iterations
        );
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.viewport = (width, height);
    }

    /// Sun, directional and spot light arrays. They are only shaded by the
    /// base pass.
    fn upload_shared_lights(&self, lights: &LightRegistry) {
        let (gl, program) = (&self.gl, &self.lighting);
        unsafe { gl.UseProgram(program.id) };

        program.set_vec3(gl, "sun.direction", lights.sun.direction);
        program.set_vec3(gl, "sun.color", lights.sun.light.color);
        program.set_bool(gl, "sun.isOn", lights.sun.light.is_on());

        program.set_int(gl, "dirLightsNumber", lights.directional.len() as i32);
        for (i, light) in lights.directional.iter().enumerate() {
            program.set_vec3(gl, &format!("dirLights[{i}].direction"), light.direction);
            program.set_vec3(gl, &format!("dirLights[{i}].color"), light.light.color);
            program.set_bool(gl, &format!("dirLights[{i}].isOn"), light.light.is_on());
        }

        program.set_int(gl, "spotLightsNumber", lights.spot.len() as i32);
        for (i, light) in lights.spot.iter().enumerate() {
            let field = |name: &str| format!("spotLights[{i}].{name}");
            program.set_vec3(gl, &field("position"), light.position);
            program.set_vec3(gl, &field("direction"), light.direction);
            program.set_vec3(gl, &field("color"), light.light.color);
            program.set_float(gl, &field("constant"), light.attenuation.constant);
            program.set_float(gl, &field("linear"), light.attenuation.linear);
            program.set_float(gl, &field("quadratic"), light.attenuation.quadratic);
            program.set_float(gl, &field("cutOff"), light.cutoff.cos());
            program.set_float(gl, &field("outerCutOff"), light.outer_cutoff.cos());
            program.set_bool(gl, &field("isOn"), light.light.is_on());
        }
    }

    fn draw_objects(&self, program: &Program, scene: &Scene) {
        let gl = &self.gl;
        unsafe { gl.BindVertexArray(self.cube.vao) };
        for object in &scene.objects {
            program.set_mat4(gl, "model", &object.model);
            unsafe {
                if object.inside {
                    gl.Disable(gl::CULL_FACE);
                    program.set_bool(gl, "reverseNormals", true);
                }
                gl.DrawArrays(gl::TRIANGLES, 0, self.cube.count);
                if object.inside {
                    program.set_bool(gl, "reverseNormals", false);
                    gl.Enable(gl::CULL_FACE);
                }
            }
        }
        unsafe { gl.BindVertexArray(0) };
    }

    fn target_size(&self) -> (i32, i32) {
        (self.settings.width as i32, self.settings.height as i32)
    }
}

/// GL implementation of the accumulation steps for one frame.
struct FramePass<'a> {
    renderer: &'a Renderer,
    scene: &'a Scene,
    view: glm::Mat4,
    projection: glm::Mat4,
}

impl LightPassBackend for FramePass<'_> {
    type Target = RenderTarget;

    fn render_light(&mut self, light: &PointLight, target: RenderTarget, pass: LightPass) {
        let r = self.renderer;
        let gl = &r.gl;
        let shadow = r.settings.shadow;
        let transforms = cube_face_transforms(light.position, &shadow);
        let (width, height) = r.target_size();

        unsafe {
            gl.Enable(gl::DEPTH_TEST);

            // Depth cubemap seen from the light. A switched-off light casts
            // nothing, so its pass only carries the shared lights.
            if light.is_on() {
                gl.Viewport(0, 0, shadow.map_size as i32, shadow.map_size as i32);
                gl.BindFramebuffer(gl::FRAMEBUFFER, r.shadow_map.framebuffer);
                gl.Clear(gl::DEPTH_BUFFER_BIT);
                gl.UseProgram(r.depth.id);
                for (i, transform) in transforms.iter().enumerate() {
                    r.depth.set_mat4(gl, &format!("shadowMatrices[{i}]"), transform);
                }
                r.depth.set_float(gl, "farPlane", shadow.far);
                r.depth.set_vec3(gl, "lightPos", light.position);
                r.draw_objects(&r.depth, self.scene);
            }

            // The scene lit by this light, shadowed through the cubemap.
            gl.Viewport(0, 0, width, height);
            gl.BindFramebuffer(gl::FRAMEBUFFER, target.framebuffer);
            gl.ClearColor(0.0, 0.0, 0.0, 1.0);
            gl.Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
            let program = &r.lighting;
            gl.UseProgram(program.id);
            program.set_mat4(gl, "projection", &self.projection);
            program.set_mat4(gl, "view", &self.view);
            program.set_vec3(gl, "viewPos", self.scene.camera.position);
            program.set_vec3(gl, "light.position", light.position);
            program.set_vec3(gl, "light.color", light.light.color);
            program.set_float(gl, "light.constant", light.attenuation.constant);
            program.set_float(gl, "light.linear", light.attenuation.linear);
            program.set_float(gl, "light.quadratic", light.attenuation.quadratic);
            program.set_bool(gl, "light.isOn", light.is_on());
            program.set_float(gl, "farPlane", shadow.far);
            program.set_bool(gl, "shadows", self.scene.shadows);
            program.set_bool(gl, "sharedLights", pass == LightPass::Base);
            gl.ActiveTexture(gl::TEXTURE0);
            gl.BindTexture(gl::TEXTURE_2D, r.diffuse_texture);
            gl.ActiveTexture(gl::TEXTURE1);
            gl.BindTexture(gl::TEXTURE_CUBE_MAP, r.shadow_map.texture);
            r.draw_objects(program, self.scene);

            gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
        }
    }

    fn composite(
        &mut self,
        light: RenderTarget,
        accumulated: RenderTarget,
        destination: RenderTarget,
    ) {
        let r = self.renderer;
        let gl = &r.gl;
        let (width, height) = r.target_size();

        unsafe {
            // Every pass sees the same geometry, so the light's depth is the frame's depth.
            gl.BindFramebuffer(gl::READ_FRAMEBUFFER, light.framebuffer);
            gl.BindFramebuffer(gl::DRAW_FRAMEBUFFER, destination.framebuffer);
            gl.BlitFramebuffer(
                0,
                0,
                width,
                height,
                0,
                0,
                width,
                height,
                gl::DEPTH_BUFFER_BIT,
                gl::NEAREST,
            );

            gl.BindFramebuffer(gl::FRAMEBUFFER, destination.framebuffer);
            gl.Viewport(0, 0, width, height);
            gl.Disable(gl::DEPTH_TEST);
            gl.Clear(gl::COLOR_BUFFER_BIT);
            gl.UseProgram(r.accumulate.id);
            gl.ActiveTexture(gl::TEXTURE0);
            gl.BindTexture(gl::TEXTURE_2D, light.texture);
            gl.ActiveTexture(gl::TEXTURE1);
            gl.BindTexture(gl::TEXTURE_2D, accumulated.texture);
            gl.BindVertexArray(r.quad.vao);
            gl.DrawArrays(gl::TRIANGLES, 0, r.quad.count);
            gl.BindVertexArray(0);
            gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
        }
    }

    fn clear(&mut self, target: RenderTarget) {
        let gl = &self.renderer.gl;
        unsafe {
            gl.BindFramebuffer(gl::FRAMEBUFFER, target.framebuffer);
            gl.ClearColor(0.0, 0.0, 0.0, 1.0);
            gl.Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
            gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
        }
    }

    fn present(&mut self, image: RenderTarget) {
        let r = self.renderer;
        let gl = &r.gl;
        let (width, height) = r.target_size();
        let (screen_width, screen_height) = r.viewport;

        unsafe {
            gl.BindFramebuffer(gl::READ_FRAMEBUFFER, image.framebuffer);
            gl.BindFramebuffer(gl::DRAW_FRAMEBUFFER, 0);
            gl.BlitFramebuffer(
                0,
                0,
                width,
                height,
                0,
                0,
                screen_width,
                screen_height,
                gl::DEPTH_BUFFER_BIT,
                gl::NEAREST,
            );
            gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
            gl.Viewport(0, 0, screen_width, screen_height);

            gl.Disable(gl::DEPTH_TEST);
            gl.UseProgram(r.screen.id);
            gl.ActiveTexture(gl::TEXTURE0);
            gl.BindTexture(gl::TEXTURE_2D, image.texture);
            gl.BindVertexArray(r.quad.vao);
            gl.DrawArrays(gl::TRIANGLES, 0, r.quad.count);
            gl.BindTexture(gl::TEXTURE_2D, 0);
            gl.Enable(gl::DEPTH_TEST);

            // Drawn last, behind everything the blit left in the depth buffer.
            let skybox_view = strip_translation(&self.view);
            gl.UseProgram(r.skybox.id);
            r.skybox.set_mat4(gl, "projection", &self.projection);
            r.skybox.set_mat4(gl, "view", &skybox_view);
            gl.DepthFunc(gl::LEQUAL);
            gl.Disable(gl::CULL_FACE);
            gl.ActiveTexture(gl::TEXTURE0 + r.settings.skybox_texture_unit);
            gl.BindTexture(gl::TEXTURE_CUBE_MAP, r.skybox_texture);
            gl.BindVertexArray(r.cube.vao);
            gl.DrawArrays(gl::TRIANGLES, 0, r.cube.count);
            gl.BindVertexArray(0);
            gl.Enable(gl::CULL_FACE);
            gl.DepthFunc(gl::LESS);
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        unsafe {
            for program in [
                &self.lighting,
                &self.depth,
                &self.accumulate,
                &self.screen,
                &self.skybox,
            ] {
                self.gl.DeleteProgram(program.id);
            }
            for mesh in [&self.cube, &self.quad] {
                self.gl.DeleteBuffers(1, &mesh.vbo);
                self.gl.DeleteVertexArrays(1, &mesh.vao);
            }
            for target in &self.targets {
                self.gl.DeleteFramebuffers(1, &target.framebuffer);
                self.gl.DeleteTextures(1, &target.texture);
                self.gl.DeleteRenderbuffers(1, &target.depth);
            }
            self.gl.DeleteFramebuffers(1, &self.shadow_map.framebuffer);
            self.gl.DeleteTextures(1, &self.shadow_map.texture);
            for texture in [self.diffuse_texture, self.skybox_texture] {
                if texture != 0 {
                    self.gl.DeleteTextures(1, &texture);
                }
            }
        }
    }
}

unsafe fn create_shader(
    gl: &gl::Gl,
    stage: GLenum,
    source: &CStr,
) -> Result<GLuint, RenderError> {
    let shader = gl.CreateShader(stage);
    gl.ShaderSource(shader, 1, [source.as_ptr()].as_ptr(), null());
    gl.CompileShader(shader);

    let mut success = 1;
    gl.GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);

    if success == 0 {
        let mut len = 0;
        gl.GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);

        let mut buffer = vec![0u8; len.max(1) as usize];
        gl.GetShaderInfoLog(shader, len, null_mut(), buffer.as_mut_ptr().cast());
        gl.DeleteShader(shader);

        return Err(RenderError::ShaderCompile {
            stage: stage_name(stage),
            log: info_log(buffer),
        });
    }

    Ok(shader)
}

fn column_major(m: &glm::Mat4) -> [f32; 16] {
    let mut out = [0.0; 16];
    for (i, column) in [m.c0, m.c1, m.c2, m.c3].iter().enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&[column.x, column.y, column.z, column.w]);
    }
    out
}

fn stage_name(stage: GLenum) -> &'static str {
    match stage {
        gl::VERTEX_SHADER => "vertex",
        gl::GEOMETRY_SHADER => "geometry",
        gl::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

fn info_log(mut buffer: Vec<u8>) -> String {
    while buffer.last() == Some(&0) {
        buffer.pop();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

unsafe fn create_mesh(
    gl: &gl::Gl,
    vertices: &[f32],
    stride: usize,
    attributes: &[i32],
    count: usize,
) -> Mesh {
    let mut vao = 0;
    gl.GenVertexArrays(1, &mut vao);
    gl.BindVertexArray(vao);

    let mut vbo = 0;
    gl.GenBuffers(1, &mut vbo);
    gl.BindBuffer(gl::ARRAY_BUFFER, vbo);
    gl.BufferData(
        gl::ARRAY_BUFFER,
        std::mem::size_of_val(vertices) as gl::types::GLsizeiptr,
        vertices.as_ptr().cast(),
        gl::STATIC_DRAW,
    );

    let stride_bytes = (stride * std::mem::size_of::<f32>()) as i32;
    let mut offset = 0;
    for (location, &size) in attributes.iter().enumerate() {
        gl.EnableVertexAttribArray(location as GLuint);
        gl.VertexAttribPointer(
            location as GLuint,
            size,
            gl::FLOAT,
            gl::FALSE,
            stride_bytes,
            (offset * std::mem::size_of::<f32>()) as *const _,
        );
        offset += size as usize;
    }

    gl.BindBuffer(gl::ARRAY_BUFFER, 0);
    gl.BindVertexArray(0);

    Mesh {
        vao,
        vbo,
        count: count as i32,
    }
}

unsafe fn check_framebuffer(gl: &gl::Gl, label: &'static str) -> Result<(), RenderError> {
    let status = gl.CheckFramebufferStatus(gl::FRAMEBUFFER);
    gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
    if status != gl::FRAMEBUFFER_COMPLETE {
        return Err(RenderError::IncompleteFramebuffer { label, status });
    }
    Ok(())
}

unsafe fn create_target(
    gl: &gl::Gl,
    label: &'static str,
    width: i32,
    height: i32,
) -> Result<RenderTarget, RenderError> {
    let mut framebuffer = 0;
    gl.GenFramebuffers(1, &mut framebuffer);
    gl.BindFramebuffer(gl::FRAMEBUFFER, framebuffer);

    // Floating point so additive compositing does not clip at 1.0 per pass.
    let mut texture = 0;
    gl.GenTextures(1, &mut texture);
    gl.BindTexture(gl::TEXTURE_2D, texture);
    gl.TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::RGB16F as GLint,
        width,
        height,
        0,
        gl::RGB,
        gl::FLOAT,
        null(),
    );
    gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
    gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
    gl.FramebufferTexture2D(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::TEXTURE_2D,
        texture,
        0,
    );
    gl.BindTexture(gl::TEXTURE_2D, 0);

    let mut depth = 0;
    gl.GenRenderbuffers(1, &mut depth);
    gl.BindRenderbuffer(gl::RENDERBUFFER, depth);
    gl.RenderbufferStorage(gl::RENDERBUFFER, gl::DEPTH24_STENCIL8, width, height);
    gl.FramebufferRenderbuffer(
        gl::FRAMEBUFFER,
        gl::DEPTH_STENCIL_ATTACHMENT,
        gl::RENDERBUFFER,
        depth,
    );
    gl.BindRenderbuffer(gl::RENDERBUFFER, 0);

    check_framebuffer(gl, label)?;
    Ok(RenderTarget {
        framebuffer,
        texture,
        depth,
    })
}

unsafe fn create_shadow_cubemap(gl: &gl::Gl, size: u32) -> Result<ShadowCubemap, RenderError> {
    let mut texture = 0;
    gl.GenTextures(1, &mut texture);
    gl.BindTexture(gl::TEXTURE_CUBE_MAP, texture);
    for face in 0..6 {
        gl.TexImage2D(
            gl::TEXTURE_CUBE_MAP_POSITIVE_X + face,
            0,
            gl::DEPTH_COMPONENT as GLint,
            size as i32,
            size as i32,
            0,
            gl::DEPTH_COMPONENT,
            gl::FLOAT,
            null(),
        );
    }
    for (param, value) in [
        (gl::TEXTURE_MAG_FILTER, gl::NEAREST),
        (gl::TEXTURE_MIN_FILTER, gl::NEAREST),
        (gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE),
        (gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE),
        (gl::TEXTURE_WRAP_R, gl::CLAMP_TO_EDGE),
    ] {
        gl.TexParameteri(gl::TEXTURE_CUBE_MAP, param, value as GLint);
    }
    gl.BindTexture(gl::TEXTURE_CUBE_MAP, 0);

    let mut framebuffer = 0;
    gl.GenFramebuffers(1, &mut framebuffer);
    gl.BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
    gl.FramebufferTexture(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, texture, 0);
    gl.DrawBuffer(gl::NONE);
    gl.ReadBuffer(gl::NONE);

    check_framebuffer(gl, "point shadow")?;
    Ok(ShadowCubemap {
        framebuffer,
        texture,
    })
}

fn get_gl_string(gl: &gl::Gl, variant: gl::types::GLenum) -> Option<&'static CStr> {
    unsafe {
        let s = gl.GetString(variant);
        (!s.is_null()).then(|| CStr::from_ptr(s.cast()))
    }
}

const LIGHTING_VERTEX_SOURCE: &CStr = crate::macros::include_cstr!("shader/lighting.vert");
const LIGHTING_FRAGMENT_SOURCE: &CStr = crate::macros::include_cstr!("shader/lighting.frag");
const DEPTH_VERTEX_SOURCE: &CStr = crate::macros::include_cstr!("shader/depth.vert");
const DEPTH_GEOMETRY_SOURCE: &CStr = crate::macros::include_cstr!("shader/depth.geom");
const DEPTH_FRAGMENT_SOURCE: &CStr = crate::macros::include_cstr!("shader/depth.frag");
const SCREEN_VERTEX_SOURCE: &CStr = crate::macros::include_cstr!("shader/screen.vert");
const SCREEN_FRAGMENT_SOURCE: &CStr = crate::macros::include_cstr!("shader/screen.frag");
const ACCUMULATE_FRAGMENT_SOURCE: &CStr = crate::macros::include_cstr!("shader/accumulate.frag");
const SKYBOX_VERTEX_SOURCE: &CStr = crate::macros::include_cstr!("shader/skybox.vert");
const SKYBOX_FRAGMENT_SOURCE: &CStr = crate::macros::include_cstr!("shader/skybox.frag");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::three_d::identity;

    #[test]
    fn matrices_upload_column_by_column() {
        let model = glm::ext::translate(&identity(), glm::vec3(1.0, 2.0, 3.0));
        let columns = column_major(&model);
        assert_eq!(&columns[12..], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(&columns[..4], &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn info_log_drops_trailing_nuls() {
        assert_eq!(info_log(b"0:1: error\0\0".to_vec()), "0:1: error");
        assert_eq!(info_log(vec![0]), "");
        assert_eq!(stage_name(gl::GEOMETRY_SHADER), "geometry");
    }
}
