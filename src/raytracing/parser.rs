use std::fmt;

use serde::Deserialize;

use super::{
    camera::{Camera, Scope},
    core::{Light, Material, Scene},
    error::ConfigError,
    lens::{FisheyeLens, Lens, OrthographicLens, PerspectiveLens},
    lighting::LightingModel,
    solid::{AxisBox, Plane, SceneObject, Solid, Sphere, Triangle},
    Vec3,
};

#[derive(Debug, Clone, Copy)]
struct FilePosition {
    line: usize,
    column: usize,
}

#[derive(Debug)]
pub struct ParserError {
    position: Option<FilePosition>,
    pub message: String,
}

impl ParserError {
    fn from_json(error: serde_json::Error) -> ParserError {
        // serde_json counts lines and columns from 1, 0 means no location
        let position = (error.line() > 0).then(|| FilePosition {
            line: error.line() - 1,
            column: error.column().saturating_sub(1),
        });
        ParserError {
            position,
            message: error.to_string(),
        }
    }

    fn from_config(error: ConfigError) -> ParserError {
        ParserError {
            position: None,
            message: error.to_string(),
        }
    }

    pub fn error_location(&self, content: &str) -> Option<String> {
        let position = self.position?;
        let line = content.lines().nth(position.line)?;
        let spacing = " ".repeat(position.column);
        Some(format!("{}\n{}^", line, spacing))
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "{} at {}:{}",
                self.message,
                position.line + 1,
                position.column + 1
            ),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParserError {}

impl From<ConfigError> for ParserError {
    fn from(error: ConfigError) -> Self {
        ParserError::from_config(error)
    }
}

type ParserResult<T> = Result<T, ParserError>;

pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub camera: Camera,
    pub scene: Scene,
}

#[derive(Debug, Deserialize)]
struct ImageDescription {
    width: u32,
    height: u32,
    camera: CameraDescription,
    scene: SceneDescription,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Projection {
    #[default]
    Orthographic,
    Perspective,
    Fisheye,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CameraDescription {
    position: Vec3,
    target: Option<Vec3>,
    #[serde(default)]
    roll: f64,
    right: Option<Vec3>,
    up: Option<Vec3>,
    forward: Option<Vec3>,
    #[serde(default = "default_anti_aliasing_factor")]
    anti_aliasing_factor: u32,
    #[serde(default)]
    lighting_model: LightingModel,
    #[serde(default)]
    projection: Projection,
    view_width: Option<f64>,
    hfov: Option<f64>,
    focal_length: Option<f64>,
    optical_radius: Option<f64>,
}

fn default_anti_aliasing_factor() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct SceneDescription {
    #[serde(default)]
    materials: Vec<Material>,
    #[serde(default)]
    lights: Vec<Light>,
    #[serde(default)]
    objects: Vec<ObjectDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ObjectDescription {
    Sphere {
        center: Vec3,
        radius: f64,
        material: usize,
    },
    Plane {
        normal: Vec3,
        point: Vec3,
        material: usize,
    },
    Box {
        #[serde(rename = "minCorner")]
        min_corner: Vec3,
        #[serde(rename = "maxCorner")]
        max_corner: Vec3,
        material: usize,
    },
    Triangle {
        #[serde(rename = "A", alias = "a")]
        a: Vec3,
        #[serde(rename = "B", alias = "b")]
        b: Vec3,
        #[serde(rename = "C", alias = "c")]
        c: Vec3,
        material: usize,
    },
}

impl ObjectDescription {
    fn build(self) -> Result<SceneObject, ConfigError> {
        let object = match self {
            ObjectDescription::Sphere {
                center,
                radius,
                material,
            } => SceneObject::new(Solid::Sphere(Sphere { center, radius }), material),
            ObjectDescription::Plane {
                normal,
                point,
                material,
            } => SceneObject::new(Solid::Plane(Plane::new(normal, point)?), material),
            ObjectDescription::Box {
                min_corner,
                max_corner,
                material,
            } => SceneObject::new(Solid::Box(AxisBox::new(min_corner, max_corner)), material),
            ObjectDescription::Triangle { a, b, c, material } => {
                SceneObject::new(Solid::Triangle(Triangle::new(a, b, c)?), material)
            }
        };
        Ok(object)
    }
}

impl CameraDescription {
    fn scope(&self) -> Result<Scope, ConfigError> {
        if let Some(target) = self.target {
            return Scope::look_at(self.position, target, self.roll);
        }
        Scope::from_basis(
            self.position,
            self.right.ok_or(ConfigError::ZeroVector("right"))?,
            self.up.ok_or(ConfigError::ZeroVector("up"))?,
            self.forward.ok_or(ConfigError::ZeroVector("forward"))?,
        )
    }

    fn lens(&self) -> Lens {
        match self.projection {
            Projection::Orthographic => Lens::Orthographic(OrthographicLens::new(self.view_width)),
            Projection::Perspective => Lens::Perspective(PerspectiveLens::new(
                self.hfov,
                self.view_width,
                self.focal_length,
                self.optical_radius,
            )),
            Projection::Fisheye => Lens::Fisheye(FisheyeLens::new(self.hfov)),
        }
    }

    fn build(self) -> Result<Camera, ConfigError> {
        Camera::new(
            self.scope()?,
            self.lens(),
            self.anti_aliasing_factor,
            self.lighting_model,
        )
    }
}

pub struct SceneParser<'a> {
    content: &'a str,
}

impl SceneParser<'_> {
    pub fn new(content: &str) -> SceneParser<'_> {
        SceneParser { content }
    }

    pub fn parse_scene(&self) -> ParserResult<ImageData> {
        let description: ImageDescription =
            serde_json::from_str(self.content).map_err(ParserError::from_json)?;

        let objects = description
            .scene
            .objects
            .into_iter()
            .map(ObjectDescription::build)
            .collect::<Result<Vec<_>, _>>()?;
        let scene = Scene::new(
            description.scene.materials,
            objects,
            description.scene.lights,
        )?;

        let mut camera = description.camera.build()?;
        camera.set_image_size(description.width, description.height)?;

        Ok(ImageData {
            width: description.width,
            height: description.height,
            camera,
            scene,
        })
    }
}
