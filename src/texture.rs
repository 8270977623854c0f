use std::path::Path;

use image::{DynamicImage, GenericImageView};
use log::error;

use crate::error::TextureError;
use crate::renderer::gl;

/// Decoded pixels ready for upload.
pub struct Pixels {
    pub width: u32,
    pub height: u32,
    pub format: gl::types::GLenum,
    pub data: Vec<u8>,
}

impl Pixels {
    fn from_image(image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        let (format, data) = match image.color().channel_count() {
            1 => (gl::RED, image.into_luma8().into_raw()),
            4 => (gl::RGBA, image.into_rgba8().into_raw()),
            _ => (gl::RGB, image.into_rgb8().into_raw()),
        };
        Self {
            width,
            height,
            format,
            data,
        }
    }
}

pub fn decode(path: &Path) -> Result<Pixels, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Pixels::from_image(image))
}

/// Decodes all six cubemap faces. Faces must be square and equally sized.
pub fn decode_faces<P: AsRef<Path>>(paths: &[P; 6]) -> Result<Vec<Pixels>, TextureError> {
    let mut faces: Vec<Pixels> = Vec::with_capacity(6);
    for path in paths {
        let path = path.as_ref();
        let face = decode(path)?;
        let expected = faces.first().map_or(face.width, |f| f.width);
        if face.width != face.height || face.width != expected {
            return Err(TextureError::FaceSize {
                path: path.to_path_buf(),
                width: face.width,
                height: face.height,
                expected,
            });
        }
        faces.push(face);
    }
    Ok(faces)
}

/// Loads a mipmapped 2D texture. On failure the error is logged and 0 is
/// returned, which samples as black.
pub fn load_texture(gl: &gl::Gl, path: impl AsRef<Path>) -> gl::types::GLuint {
    let pixels = match decode(path.as_ref()) {
        Ok(pixels) => pixels,
        Err(err) => {
            error!("{err}");
            return 0;
        }
    };
    // Clamp RGBA so semi-transparent borders do not bleed in from the other edge.
    let wrap = if pixels.format == gl::RGBA {
        gl::CLAMP_TO_EDGE
    } else {
        gl::REPEAT
    };

    unsafe {
        let mut texture = 0;
        gl.GenTextures(1, &mut texture);
        gl.BindTexture(gl::TEXTURE_2D, texture);
        gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl.TexImage2D(
            gl::TEXTURE_2D,
            0,
            pixels.format as gl::types::GLint,
            pixels.width as i32,
            pixels.height as i32,
            0,
            pixels.format,
            gl::UNSIGNED_BYTE,
            pixels.data.as_ptr().cast(),
        );
        gl.GenerateMipmap(gl::TEXTURE_2D);
        gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as i32);
        gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as i32);
        gl.TexParameteri(
            gl::TEXTURE_2D,
            gl::TEXTURE_MIN_FILTER,
            gl::LINEAR_MIPMAP_LINEAR as i32,
        );
        gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        gl.BindTexture(gl::TEXTURE_2D, 0);
        texture
    }
}

/// Loads a skybox cubemap from faces in +X, -X, +Y, -Y, +Z, -Z order.
/// Returns 0 after logging if any face is missing or malformed.
pub fn load_cubemap<P: AsRef<Path>>(gl: &gl::Gl, paths: &[P; 6]) -> gl::types::GLuint {
    let faces = match decode_faces(paths) {
        Ok(faces) => faces,
        Err(err) => {
            error!("skybox not loaded: {err}");
            return 0;
        }
    };

    unsafe {
        let mut texture = 0;
        gl.GenTextures(1, &mut texture);
        gl.BindTexture(gl::TEXTURE_CUBE_MAP, texture);
        gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        for (i, face) in faces.iter().enumerate() {
            gl.TexImage2D(
                gl::TEXTURE_CUBE_MAP_POSITIVE_X + i as u32,
                0,
                face.format as gl::types::GLint,
                face.width as i32,
                face.height as i32,
                0,
                face.format,
                gl::UNSIGNED_BYTE,
                face.data.as_ptr().cast(),
            );
        }
        for (param, value) in [
            (gl::TEXTURE_MIN_FILTER, gl::LINEAR),
            (gl::TEXTURE_MAG_FILTER, gl::LINEAR),
            (gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE),
            (gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE),
            (gl::TEXTURE_WRAP_R, gl::CLAMP_TO_EDGE),
        ] {
            gl.TexParameteri(gl::TEXTURE_CUBE_MAP, param, value as i32);
        }
        gl.BindTexture(gl::TEXTURE_CUBE_MAP, 0);
        texture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::{ImageBuffer, Rgb, Rgba};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sunlit_shadows_{}_{name}", std::process::id()))
    }

    fn write_rgb(name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = temp_path(name);
        ImageBuffer::from_pixel(width, height, Rgb([200u8, 100, 50]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn missing_file_is_an_error_not_a_panic() {
        let err = decode(Path::new("does/not/exist.png")).err().unwrap();
        assert!(matches!(err, TextureError::Image { .. }));
        assert!(err.to_string().contains("exist.png"));
    }

    #[test]
    fn decode_picks_the_gl_format_from_the_channel_count() {
        let rgb = write_rgb("rgb.png", 2, 3);
        let pixels = decode(&rgb).unwrap();
        assert_eq!((pixels.width, pixels.height), (2, 3));
        assert_eq!(pixels.format, gl::RGB);
        assert_eq!(pixels.data.len(), 2 * 3 * 3);

        let rgba = temp_path("rgba.png");
        ImageBuffer::from_pixel(2, 2, Rgba([1u8, 2, 3, 4]))
            .save(&rgba)
            .unwrap();
        let pixels = decode(&rgba).unwrap();
        assert_eq!(pixels.format, gl::RGBA);
        assert_eq!(&pixels.data[..4], &[1, 2, 3, 4]);

        std::fs::remove_file(rgb).ok();
        std::fs::remove_file(rgba).ok();
    }

    #[test]
    fn cubemap_rejects_mismatched_faces() {
        let square = write_rgb("face_square.png", 4, 4);
        let small = write_rgb("face_small.png", 2, 2);
        let mut paths: [std::path::PathBuf; 6] = std::array::from_fn(|_| square.clone());
        paths[3] = small.clone();

        let err = decode_faces(&paths).err().unwrap();
        assert!(matches!(
            err,
            TextureError::FaceSize {
                width: 2,
                expected: 4,
                ..
            }
        ));
        paths[3] = square.clone();
        assert_eq!(decode_faces(&paths).unwrap().len(), 6);

        std::fs::remove_file(square).ok();
        std::fs::remove_file(small).ok();
    }
}
