use std::path::Path;
use std::time::Instant;

use image::{ImageBuffer, Rgb, RgbImage};
use log::{debug, info};
use rayon::prelude::*;

use super::core::Scene;
use super::error::{ConfigError, RenderError};
use super::lens::Lens;
use super::lighting::LightingModel;
use super::{Color, Vec3};

/// Camera placement: a position and an orthonormal right/up/forward basis.
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    pub position: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Scope {
    /// Creates a scope that looks at `target` from `position`,
    /// rolled by `roll` degrees around the viewing direction.
    pub fn look_at(position: Vec3, target: Vec3, roll: f64) -> Result<Scope, ConfigError> {
        let world_up = Vec3::y_axis();
        let forward = (target - position)
            .normalize()
            .ok_or(ConfigError::TargetEqualsPosition)?;
        let right = forward.cross(world_up);
        let up = right.cross(forward);
        let up = up
            .rotate(-roll, forward)
            .ok_or(ConfigError::ZeroVector("forward"))?;
        // recompute right so the basis stays orthogonal after the roll
        let right = forward.cross(up);
        Scope::from_basis(position, right, up, forward)
    }

    pub fn from_basis(
        position: Vec3,
        right: Vec3,
        up: Vec3,
        forward: Vec3,
    ) -> Result<Scope, ConfigError> {
        Ok(Scope {
            position,
            right: right.normalize().ok_or(ConfigError::ZeroVector("right"))?,
            up: up.normalize().ok_or(ConfigError::ZeroVector("up"))?,
            forward: forward
                .normalize()
                .ok_or(ConfigError::ZeroVector("forward"))?,
        })
    }
}

pub struct Camera {
    scope: Scope,
    lens: Lens,
    anti_aliasing_factor: u32,
    lighting_model: LightingModel,
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    rendered: bool,
}

impl Camera {
    pub fn new(
        scope: Scope,
        lens: Lens,
        anti_aliasing_factor: u32,
        lighting_model: LightingModel,
    ) -> Result<Camera, ConfigError> {
        if anti_aliasing_factor < 1 {
            return Err(ConfigError::AntiAliasingFactor);
        }
        Ok(Camera {
            scope,
            lens,
            anti_aliasing_factor,
            lighting_model,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            rendered: false,
        })
    }

    pub fn lens_name(&self) -> &'static str {
        self.lens.name()
    }

    pub fn set_image_size(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        // pixel indices are computed in u32
        let pixel_count = match width.checked_mul(height) {
            Some(count) if count > 0 => count,
            _ => return Err(ConfigError::ImageSize { width, height }),
        };
        self.lens.set_aspect_ratio(width as f64 / height as f64)?;
        self.width = width;
        self.height = height;
        self.pixels = vec![Color::black(); pixel_count as usize];
        self.rendered = false;
        Ok(())
    }

    /// Screen coordinates of the `(i, j)` sub-sample of pixel `(x, y)`.
    /// Sub-samples sit at the centers of an N x N grid inside the pixel.
    fn sample_position(&self, x: u32, y: u32, i: u32, j: u32) -> (f64, f64) {
        let step = 1.0 / self.anti_aliasing_factor as f64;
        let pixel_x = (x as f64 + (i as f64 + 0.5) * step) / self.width as f64;
        let pixel_y = (y as f64 + (j as f64 + 0.5) * step) / self.height as f64;
        // row 0 is the top of the image
        (2.0 * pixel_x - 1.0, 1.0 - 2.0 * pixel_y)
    }

    fn render_pixel(&self, scene: &Scene, x: u32, y: u32, max_reflections: u32) -> Color {
        let n = self.anti_aliasing_factor;
        let mut total = Color::black();
        for i in 0..n {
            for j in 0..n {
                let (screen_x, screen_y) = self.sample_position(x, y, i, j);
                let color = match self.lens.generate_light_ray(screen_x, screen_y, &self.scope) {
                    Some(ray) => scene.trace_ray(&ray, 1.0, max_reflections, self.lighting_model),
                    None => Color::black(),
                };
                total += color;
            }
        }
        total / (n as f64).powi(2)
    }

    /// Renders `scene` into the pixel buffer using a pool of `threads` workers
    /// (0 lets rayon pick one per core). Returns once every pixel is written.
    pub fn render(
        &mut self,
        scene: &Scene,
        max_reflections: u32,
        threads: usize,
    ) -> Result<(), RenderError> {
        if self.pixels.is_empty() {
            return Err(RenderError::ImageSizeNotSet);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        debug!(
            "rendering {}x{} with {} workers, {} samples per pixel",
            self.width,
            self.height,
            pool.current_num_threads(),
            (self.anti_aliasing_factor as u64).pow(2)
        );

        let start = Instant::now();
        let mut pixels = std::mem::take(&mut self.pixels);
        let width = self.width as usize;
        let camera = &*self;
        pool.install(|| {
            // one task per pixel, each writes only its own slot
            pixels.par_iter_mut().enumerate().for_each(|(i, pixel)| {
                let x = (i % width) as u32;
                let y = (i / width) as u32;
                *pixel = camera
                    .render_pixel(scene, x, y, max_reflections)
                    .clamp_to_display();
            });
        });
        self.pixels = pixels;
        self.rendered = true;
        info!("rendered {}x{} in {:?}", self.width, self.height, start.elapsed());
        Ok(())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((x + self.width * y) as usize).copied()
    }

    pub fn to_image(&self) -> RgbImage {
        let mut buffer: ImageBuffer<Rgb<u8>, Vec<_>> = ImageBuffer::new(self.width, self.height);
        for (x, y, pixel) in buffer.enumerate_pixels_mut() {
            *pixel = self.pixel(x, y).unwrap_or_default().into();
        }
        buffer
    }

    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        if !self.rendered {
            return Err(RenderError::NotRendered);
        }
        self.to_image().save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracing::core::{Light, Material};
    use crate::raytracing::lens::{OrthographicLens, PerspectiveLens};
    use crate::raytracing::solid::{SceneObject, Solid, Sphere};
    use approx::assert_abs_diff_eq;

    #[test]
    fn look_at_builds_an_orthonormal_basis() {
        let scope = Scope::look_at(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 7.0),
            33.0,
        )
        .unwrap();
        for v in [scope.right, scope.up, scope.forward] {
            assert_abs_diff_eq!(v.len(), 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(scope.right.dot(scope.up), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scope.right.dot(scope.forward), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scope.up.dot(scope.forward), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn roll_turns_the_up_vector() {
        let scope = Scope::look_at(Vec3::zero(), -Vec3::z_axis(), 90.0).unwrap();
        assert_abs_diff_eq!(scope.forward, -Vec3::z_axis(), epsilon = 1e-12);
        assert_abs_diff_eq!(scope.up, -Vec3::x_axis(), epsilon = 1e-12);
        assert_abs_diff_eq!(scope.right, Vec3::y_axis(), epsilon = 1e-12);
    }

    #[test]
    fn coincident_target_is_rejected() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(
            Scope::look_at(p, p, 0.0).err(),
            Some(ConfigError::TargetEqualsPosition)
        );
    }

    #[test]
    fn explicit_basis_is_normalized_and_checked() {
        let scope = Scope::from_basis(
            Vec3::zero(),
            Vec3::x_axis() * 3.0,
            Vec3::y_axis() * 0.5,
            Vec3::z_axis() * 2.0,
        )
        .unwrap();
        assert_abs_diff_eq!(scope.right, Vec3::x_axis());
        assert_abs_diff_eq!(scope.up, Vec3::y_axis());
        assert_abs_diff_eq!(scope.forward, Vec3::z_axis());

        let zero_up = Scope::from_basis(Vec3::zero(), Vec3::x_axis(), Vec3::zero(), Vec3::z_axis());
        assert_eq!(zero_up.err(), Some(ConfigError::ZeroVector("up")));
    }

    fn white_sphere_scene() -> Scene {
        let material = Material {
            specular: Color::black(),
            diffuse: Color::new(1.0, 1.0, 1.0),
            ambient: Color::black(),
            alpha: 1.0,
            reflectance: 0.0,
        };
        let light = Light {
            position: Vec3::zero(),
            specular: Color::new(1.0, 1.0, 1.0),
            diffuse: Color::new(1.0, 1.0, 1.0),
            ambient: Color::black(),
        };
        let sphere = Sphere {
            center: Vec3::new(0.0, 0.0, -10.0),
            radius: 2.0,
        };
        Scene::new(
            vec![material],
            vec![SceneObject::new(Solid::Sphere(sphere), 0)],
            vec![light],
        )
        .unwrap()
    }

    fn orthographic_camera(anti_aliasing_factor: u32, size: u32) -> Camera {
        let scope = Scope::look_at(Vec3::zero(), -Vec3::z_axis(), 0.0).unwrap();
        let lens = Lens::Orthographic(OrthographicLens::new(Some(4.0)));
        let mut camera =
            Camera::new(scope, lens, anti_aliasing_factor, LightingModel::Lambertian).unwrap();
        camera.set_image_size(size, size).unwrap();
        camera
    }

    #[test]
    fn render_requires_image_size() {
        let scope = Scope::look_at(Vec3::zero(), -Vec3::z_axis(), 0.0).unwrap();
        let lens = Lens::Orthographic(OrthographicLens::new(Some(4.0)));
        let mut camera = Camera::new(scope, lens, 1, LightingModel::Phong).unwrap();
        let result = camera.render(&white_sphere_scene(), 3, 2);
        assert!(matches!(result, Err(RenderError::ImageSizeNotSet)));
    }

    #[test]
    fn zero_anti_aliasing_factor_is_rejected() {
        let scope = Scope::look_at(Vec3::zero(), -Vec3::z_axis(), 0.0).unwrap();
        let lens = Lens::Orthographic(OrthographicLens::new(Some(4.0)));
        assert!(Camera::new(scope, lens, 0, LightingModel::Phong).is_err());
    }

    #[test]
    fn sphere_facing_the_camera_renders_lit_center_and_black_corners() {
        let scene = white_sphere_scene();
        let mut camera = orthographic_camera(1, 21);
        camera.render(&scene, 5, 4).unwrap();

        // the near point faces the light head on: L.N = 1
        let center = camera.pixel(10, 10).unwrap();
        assert_abs_diff_eq!(center, Color::new(1.0, 1.0, 1.0), epsilon = 1e-6);

        for (x, y) in [(0, 0), (20, 0), (0, 20), (20, 20)] {
            assert_eq!(camera.pixel(x, y).unwrap(), Color::black());
        }

        let image = camera.to_image();
        assert_eq!(image.dimensions(), (21, 21));
        assert_eq!(*image.get_pixel(10, 10), Rgb([255, 255, 255]));
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn anti_aliasing_only_changes_edges() {
        let scene = white_sphere_scene();
        let size = 32;
        let mut single = orthographic_camera(1, size);
        single.render(&scene, 2, 0).unwrap();
        let mut multi = orthographic_camera(2, size);
        multi.render(&scene, 2, 0).unwrap();

        // pixel bounds in scene units of the 4 wide view, the sphere silhouette is a disc of radius 2
        let to_scene = |p: u32| p as f64 / size as f64 * 4.0 - 2.0;
        let mut differing_edges = 0;
        for y in 0..size {
            for x in 0..size {
                let (x0, x1) = (to_scene(x), to_scene(x + 1));
                let (y0, y1) = (to_scene(y), to_scene(y + 1));
                let nearest = Vec3::new(0.0f64.clamp(x0, x1), 0.0f64.clamp(y0, y1), 0.0);
                let farthest = Vec3::new(x0.abs().max(x1.abs()), y0.abs().max(y1.abs()), 0.0);

                let a = single.pixel(x, y).unwrap();
                let b = multi.pixel(x, y).unwrap();
                if nearest.squared_len() >= 4.0 {
                    assert_eq!(a, Color::black());
                    assert_eq!(b, Color::black());
                } else if farthest.squared_len() < 2.25 {
                    // shading varies smoothly well inside the disc
                    assert_abs_diff_eq!(a, b, epsilon = 0.05);
                } else if !approx::abs_diff_eq!(a, b, epsilon = 1e-3) {
                    differing_edges += 1;
                }
            }
        }
        assert!(differing_edges > 0);
    }

    #[test]
    fn oversized_image_is_rejected() {
        let mut camera = orthographic_camera(1, 4);
        assert_eq!(
            camera.set_image_size(65536, 65537),
            Err(ConfigError::ImageSize {
                width: 65536,
                height: 65537
            })
        );
        assert_eq!(
            camera.set_image_size(0, 10),
            Err(ConfigError::ImageSize {
                width: 0,
                height: 10
            })
        );
    }

    fn pinhole_camera(focal_length: f64) -> Camera {
        let scope = Scope::look_at(Vec3::zero(), -Vec3::z_axis(), 0.0).unwrap();
        let lens = Lens::Perspective(PerspectiveLens::new(None, Some(2.0), Some(focal_length), None));
        let mut camera = Camera::new(scope, lens, 1, LightingModel::Lambertian).unwrap();
        camera.set_image_size(3, 3).unwrap();
        camera
    }

    #[test]
    fn degenerate_primary_ray_renders_black() {
        let scene = white_sphere_scene();

        let mut focused = pinhole_camera(1.0);
        focused.render(&scene, 2, 1).unwrap();
        assert_abs_diff_eq!(focused.pixel(1, 1).unwrap(), Color::new(1.0, 1.0, 1.0), epsilon = 1e-6);

        // with no focal length the center ray has no direction
        let mut flat = pinhole_camera(0.0);
        flat.render(&scene, 2, 1).unwrap();
        assert_eq!(flat.pixel(1, 1).unwrap(), Color::black());
    }

    #[test]
    fn save_requires_a_render() {
        let scope = Scope::look_at(Vec3::zero(), -Vec3::z_axis(), 0.0).unwrap();
        let lens = Lens::Orthographic(OrthographicLens::new(Some(4.0)));
        let mut camera = Camera::new(scope, lens, 1, LightingModel::Phong).unwrap();
        let result = camera.save(Path::new("never-written.png"));
        assert!(matches!(result, Err(RenderError::NotRendered)));
        camera.set_image_size(4, 4).unwrap();
        let result = camera.save(Path::new("never-written.png"));
        assert!(matches!(result, Err(RenderError::NotRendered)));
    }
}
