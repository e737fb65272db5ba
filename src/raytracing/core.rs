use log::debug;
use serde::Deserialize;

use super::error::ConfigError;
use super::lighting::LightingModel;
use super::solid::{Intersectable, SceneObject};
use super::{Color, Ray, Vec3};

pub const MAX_REFLECTIONS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Material {
    pub specular: Color,
    pub diffuse: Color,
    pub ambient: Color,
    /// Shininess exponent of the specular highlight.
    pub alpha: f64,
    /// Fraction of light carried by the mirror reflection.
    pub reflectance: f64,
}

/// Point light, without distance attenuation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub specular: Color,
    pub diffuse: Color,
    pub ambient: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub object: usize,
}

pub struct Scene {
    materials: Vec<Material>,
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
    ambient_light: Color,
}

impl Scene {
    pub fn new(
        materials: Vec<Material>,
        objects: Vec<SceneObject>,
        lights: Vec<Light>,
    ) -> Result<Scene, ConfigError> {
        let mut scene = Scene {
            materials,
            objects,
            lights,
            ambient_light: Color::black(),
        };
        scene.initialize()?;
        Ok(scene)
    }

    /// Checks the material references and derives the global ambient light,
    /// the mean of the ambient contribution of every light.
    fn initialize(&mut self) -> Result<(), ConfigError> {
        for (i, object) in self.objects.iter().enumerate() {
            let material = object.material_index();
            if material >= self.materials.len() {
                return Err(ConfigError::InvalidMaterial {
                    object: i,
                    material,
                });
            }
        }

        let ambients: Vec<Color> = self.lights.iter().map(|light| light.ambient).collect();
        self.ambient_light = Color::average(&ambients);
        debug!(
            "scene initialized: {} objects, {} materials, {} lights",
            self.objects.len(),
            self.materials.len(),
            self.lights.len()
        );
        Ok(())
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn ambient_light(&self) -> Color {
        self.ambient_light
    }

    pub fn find_intersection(&self, ray: &Ray) -> Option<Intersection> {
        self.find_intersection_within(ray, f64::INFINITY)
    }

    pub fn find_intersection_within(&self, ray: &Ray, max_range: f64) -> Option<Intersection> {
        let mut closest: Option<Intersection> = None;
        let mut closest_t = max_range;
        for (i, object) in self.objects.iter().enumerate() {
            // every test shrinks the range, so only a strictly closer hit can replace the current one
            if let Some(t) = object.solid.intersect(ray, closest_t) {
                closest_t = t;
                closest = Some(Intersection { t, object: i });
            }
        }
        closest
    }

    fn is_light_visible(&self, point: Vec3, light: &Light) -> bool {
        let to_light = light.position - point;
        let distance = to_light.len();
        let Some(direction) = to_light.normalize() else {
            return true;
        };
        let shadow_ray = Ray::new(point, direction);
        self.find_intersection_within(&shadow_ray, distance).is_none()
    }

    /// Traces `ray` to its first hit, shades it with `lighting` and follows the mirror
    /// reflection for at most `remaining_depth` more bounces.
    pub fn trace_ray(
        &self,
        ray: &Ray,
        light_strength: f64,
        remaining_depth: u32,
        lighting: LightingModel,
    ) -> Color {
        let Some(intersection) = self.find_intersection(ray) else {
            return Color::black();
        };

        let object = &self.objects[intersection.object];
        let hit_point = ray.at(intersection.t);
        let normal = object.solid.surface_normal(hit_point, ray.direction);
        let material = &self.materials[object.material_index()];

        let Some(viewer) = (-ray.direction).normalize() else {
            return Color::black();
        };

        let visible_lights: Vec<&Light> = self
            .lights
            .iter()
            .filter(|light| self.is_light_visible(hit_point, light))
            .collect();

        let surface_color = lighting.shade(
            &visible_lights,
            self.ambient_light,
            viewer,
            hit_point,
            normal,
            material,
        );
        let mut color = surface_color * light_strength;

        if remaining_depth > 0 {
            let reflected = ray.direction.reflect(normal).normalize();
            if let Some(direction) = reflected {
                let bounce = Ray::new(hit_point, direction);
                color += self.trace_ray(
                    &bounce,
                    light_strength * material.reflectance,
                    remaining_depth - 1,
                    lighting,
                );
            }
        }
        color
    }
}
