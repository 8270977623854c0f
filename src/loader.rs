//! Scene description loader.
//!
//! A scene is two JSON files: the light data (point, spot and directional
//! lights plus the sun) and the model data (placed cubes).

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::error::LoadError;
use crate::light::{
    Attenuation, DirectionalLight, Light, LightRegistry, LightState, PointLight, SpotLight,
};
use crate::settings::{MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};
use crate::three_d::{identity, vec3_from};

fn default_on() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct AttenuationRecord {
    constant: f32,
    linear: f32,
    quadratic: f32,
}

#[derive(Debug, Deserialize)]
struct PointRecord {
    position: [f32; 3],
    color: [f32; 3],
    #[serde(flatten)]
    attenuation: AttenuationRecord,
    #[serde(default = "default_on")]
    on: bool,
}

#[derive(Debug, Deserialize)]
struct SpotRecord {
    position: [f32; 3],
    direction: [f32; 3],
    color: [f32; 3],
    #[serde(flatten)]
    attenuation: AttenuationRecord,
    /// Degrees.
    cutoff: f32,
    outer_cutoff: f32,
    #[serde(default = "default_on")]
    on: bool,
}

#[derive(Debug, Deserialize)]
struct DirectionalRecord {
    direction: [f32; 3],
    color: [f32; 3],
    #[serde(default = "default_on")]
    on: bool,
}

#[derive(Debug, Default, Deserialize)]
struct LightData {
    #[serde(default)]
    point: Vec<PointRecord>,
    #[serde(default)]
    spot: Vec<SpotRecord>,
    #[serde(default)]
    directional: Vec<DirectionalRecord>,
    sun: Option<DirectionalRecord>,
}

#[derive(Debug, Deserialize)]
struct RotationRecord {
    degrees: f32,
    axis: [f32; 3],
}

#[derive(Debug, Deserialize)]
struct ObjectRecord {
    position: [f32; 3],
    #[serde(default = "unit_scale")]
    scale: f32,
    rotation: Option<RotationRecord>,
    #[serde(default)]
    inside: bool,
}

fn unit_scale() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct ModelData {
    objects: Vec<ObjectRecord>,
}

/// A cube placed in the world.
#[derive(Debug, Clone, Copy)]
pub struct SceneObject {
    pub model: glm::Mat4,
    /// Seen from the inside: drawn without culling and with flipped normals.
    pub inside: bool,
}

fn state(on: bool) -> LightState {
    if on {
        LightState::On
    } else {
        LightState::Off
    }
}

fn attenuation(record: &AttenuationRecord) -> Attenuation {
    Attenuation {
        constant: record.constant,
        linear: record.linear,
        quadratic: record.quadratic,
    }
}

impl From<PointRecord> for PointLight {
    fn from(r: PointRecord) -> Self {
        Self {
            light: Light::new(vec3_from(r.color), state(r.on)),
            position: vec3_from(r.position),
            attenuation: attenuation(&r.attenuation),
        }
    }
}

impl From<SpotRecord> for SpotLight {
    fn from(r: SpotRecord) -> Self {
        Self {
            light: Light::new(vec3_from(r.color), state(r.on)),
            position: vec3_from(r.position),
            direction: vec3_from(r.direction),
            attenuation: attenuation(&r.attenuation),
            cutoff: r.cutoff.to_radians(),
            outer_cutoff: r.outer_cutoff.to_radians(),
        }
    }
}

impl From<DirectionalRecord> for DirectionalLight {
    fn from(r: DirectionalRecord) -> Self {
        Self {
            light: Light::new(vec3_from(r.color), state(r.on)),
            direction: vec3_from(r.direction),
        }
    }
}

impl From<ObjectRecord> for SceneObject {
    fn from(r: ObjectRecord) -> Self {
        let mut model = glm::ext::translate(&identity(), vec3_from(r.position));
        if let Some(rotation) = r.rotation {
            model = glm::ext::rotate(
                &model,
                rotation.degrees.to_radians(),
                glm::normalize(vec3_from(rotation.axis)),
            );
        }
        model = glm::ext::scale(&model, glm::vec3(r.scale, r.scale, r.scale));
        Self {
            model,
            inside: r.inside,
        }
    }
}

fn truncated<T>(mut items: Vec<T>, max: usize, kind: &str) -> Vec<T> {
    if items.len() > max {
        warn!(
            "scene has {} {kind} lights, only the first {max} are used",
            items.len()
        );
        items.truncate(max);
    }
    items
}

pub fn parse_lights(text: &str) -> Result<LightRegistry, serde_json::Error> {
    let data: LightData = serde_json::from_str(text)?;
    let mut registry = match data.sun {
        Some(sun) => LightRegistry::new(sun.into()),
        None => LightRegistry::default(),
    };
    registry.point = truncated(data.point, MAX_POINT_LIGHTS, "point")
        .into_iter()
        .map(PointLight::from)
        .collect();
    registry.spot = truncated(data.spot, MAX_SPOT_LIGHTS, "spot")
        .into_iter()
        .map(SpotLight::from)
        .collect();
    registry.directional = truncated(data.directional, MAX_DIRECTIONAL_LIGHTS, "directional")
        .into_iter()
        .map(DirectionalLight::from)
        .collect();
    Ok(registry)
}

pub fn parse_models(text: &str) -> Result<Vec<SceneObject>, serde_json::Error> {
    let data: ModelData = serde_json::from_str(text)?;
    Ok(data.objects.into_iter().map(SceneObject::from).collect())
}

fn read<T, F>(path: &Path, parse: F) -> Result<T, LoadError>
where
    F: FnOnce(&str) -> Result<T, serde_json::Error>,
{
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub struct SceneData {
    pub lights: LightRegistry,
    pub objects: Vec<SceneObject>,
}

pub fn load_scene(
    light_data: impl AsRef<Path>,
    model_data: impl AsRef<Path>,
) -> Result<SceneData, LoadError> {
    let lights = read(light_data.as_ref(), parse_lights)?;
    let objects = read(model_data.as_ref(), parse_models)?;
    info!(
        "loaded scene: {} point, {} spot, {} directional lights, {} objects",
        lights.point.len(),
        lights.spot.len(),
        lights.directional.len(),
        objects.len()
    );
    Ok(SceneData { lights, objects })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIGHTS: &str = r#"{
        "point": [
            { "position": [0, 2, 0], "color": [1, 1, 1],
              "constant": 1.0, "linear": 0.09, "quadratic": 0.032 },
            { "position": [3, 1, 0], "color": [1, 0, 0],
              "constant": 1.0, "linear": 0.09, "quadratic": 0.032, "on": false }
        ],
        "spot": [
            { "position": [0, 4, 0], "direction": [0, -1, 0], "color": [1, 1, 1],
              "constant": 1.0, "linear": 0.09, "quadratic": 0.032,
              "cutoff": 12.5, "outer_cutoff": 15.0 }
        ],
        "sun": { "direction": [0, -1, 0], "color": [0.5, 0.5, 0.5] }
    }"#;

    #[test]
    fn parses_every_light_kind() {
        let lights = parse_lights(LIGHTS).unwrap();
        assert_eq!(lights.point.len(), 2);
        assert_eq!(lights.point[0].position, glm::vec3(0.0, 2.0, 0.0));
        assert_eq!(lights.point[0].attenuation.quadratic, 0.032);
        assert!(lights.point[0].is_on());
        assert!(!lights.point[1].is_on());

        assert_eq!(lights.spot.len(), 1);
        assert!((lights.spot[0].cutoff - 12.5f32.to_radians()).abs() < 1e-6);
        assert!(lights.spot[0].outer_cutoff > lights.spot[0].cutoff);

        assert!(lights.directional.is_empty());
        assert_eq!(lights.sun.light.color, glm::vec3(0.5, 0.5, 0.5));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let lights = parse_lights("{}").unwrap();
        assert!(lights.point.is_empty() && lights.spot.is_empty());
        assert_eq!(lights.sun.direction, glm::vec3(0.0, -1.0, 0.0));
        assert!(lights.sun.light.is_on());
    }

    #[test]
    fn light_counts_are_capped_at_the_shader_maxima() {
        let record = r#"{ "direction": [0, -1, 0], "color": [1, 1, 1] }"#;
        let list = vec![record; MAX_DIRECTIONAL_LIGHTS + 3].join(",");
        let lights = parse_lights(&format!(r#"{{ "directional": [{list}] }}"#)).unwrap();
        assert_eq!(lights.directional.len(), MAX_DIRECTIONAL_LIGHTS);
    }

    #[test]
    fn malformed_light_data_is_rejected() {
        assert!(parse_lights(r#"{ "point": [ { "position": [0, 0] } ] }"#).is_err());
    }

    #[test]
    fn objects_build_model_matrices() {
        let objects = parse_models(
            r#"{ "objects": [
                { "position": [0, 0, 0], "scale": 10.0, "inside": true },
                { "position": [4, -3.5, 0], "scale": 0.5 },
                { "position": [-1.5, 2, -3], "scale": 0.75,
                  "rotation": { "degrees": 60, "axis": [1, 0, 1] } }
            ] }"#,
        )
        .unwrap();
        assert_eq!(objects.len(), 3);
        assert!(objects[0].inside && !objects[1].inside);

        let corner = objects[1].model * glm::vec4(1.0, 1.0, 1.0, 1.0);
        assert_eq!((corner.x, corner.y, corner.z), (4.5, -3.0, 0.5));
    }

    #[test]
    fn unreadable_files_report_their_path() {
        let err = load_scene("no/such/lights.json", "no/such/models.json")
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("lights.json"));
    }
}
