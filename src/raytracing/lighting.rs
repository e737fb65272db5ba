use serde::Deserialize;

use super::core::{Light, Material};
use super::{Color, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingModel {
    Lambertian,
    #[default]
    Phong,
}

impl LightingModel {
    pub fn shade(
        &self,
        lights: &[&Light],
        ambient_light: Color,
        viewer: Vec3,
        position: Vec3,
        normal: Vec3,
        material: &Material,
    ) -> Color {
        match self {
            LightingModel::Lambertian => lambertian_reflectance(lights, position, normal, material),
            LightingModel::Phong => {
                phong_reflectance(lights, ambient_light, viewer, position, normal, material)
            }
        }
    }
}

/// Unit vector from `position` toward the light,
/// `None` when the light is behind the surface or sits on the point itself.
fn front_facing_light_direction(light: &Light, position: Vec3, normal: Vec3) -> Option<Vec3> {
    let to_light = light.position - position;
    if normal.dot(to_light) <= 0.0 {
        return None;
    }
    to_light.normalize()
}

pub fn lambertian_reflectance(
    lights: &[&Light],
    position: Vec3,
    normal: Vec3,
    material: &Material,
) -> Color {
    let mut color = Color::black();
    for light in lights {
        let Some(light_direction) = front_facing_light_direction(light, position, normal) else {
            continue;
        };
        let surface_light_level = light_direction.dot(normal);
        color += light.diffuse * material.diffuse * surface_light_level;
    }
    color
}

/// Diffuse plus specular highlights plus the global ambient term.
/// `normal` and `viewer` must be unit vectors, `viewer` pointing toward the eye.
pub fn phong_reflectance(
    lights: &[&Light],
    ambient_light: Color,
    viewer: Vec3,
    position: Vec3,
    normal: Vec3,
    material: &Material,
) -> Color {
    let mut color = Color::black();
    for light in lights {
        let Some(light_direction) = front_facing_light_direction(light, position, normal) else {
            continue;
        };
        let Some(reflected_light) = (-light_direction).reflect(normal).normalize() else {
            continue;
        };

        let diffuse_coefficient = light_direction.dot(normal).max(0.0);
        let diffuse = light.diffuse * material.diffuse * diffuse_coefficient;

        let specular_base = reflected_light.dot(viewer).max(0.0);
        // 0^0 would light up surfaces facing away from the highlight
        let specular_coefficient = if specular_base <= 0.0 {
            0.0
        } else {
            specular_base.powf(material.alpha)
        };
        let specular = light.specular * material.specular * specular_coefficient;

        color += diffuse + specular;
    }
    color + ambient_light * material.ambient
}
