use super::error::ConfigError;
use super::{Box3, Ray, Vec3};

/// Hits closer than this to the ray origin are ignored (shadow acne).
pub const NEAR_EPSILON: f64 = 1e-4;
/// Below this a ray is considered parallel to a surface.
pub const PARALLEL_TOLERANCE: f64 = 1e-8;

#[inline(always)]
fn within_range(t: f64, max_range: f64) -> Option<f64> {
    if t > NEAR_EPSILON && t < max_range {
        Some(t)
    } else {
        None
    }
}

pub trait Intersectable {
    /// Returns the ray parameter of the nearest hit in `(NEAR_EPSILON, max_range)`.
    /// `None` means there is no hit closer than `max_range`.
    fn intersect(&self, ray: &Ray, max_range: f64) -> Option<f64>;

    /// Unit normal at `point`, a point lying on the surface.
    /// `incoming` is the direction of the ray that reached the point.
    fn surface_normal(&self, point: Vec3, incoming: Vec3) -> Vec3;
}

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Intersectable for Sphere {
    fn intersect(&self, ray: &Ray, max_range: f64) -> Option<f64> {
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * ray.direction.dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t0 = (-b + sqrt_discriminant) / (2.0 * a);
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        within_range(t0.min(t1), max_range)
    }

    fn surface_normal(&self, point: Vec3, _incoming: Vec3) -> Vec3 {
        (point - self.center).normalize().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Plane {
    normal: Vec3,
    point: Vec3,
}

impl Plane {
    pub fn new(normal: Vec3, point: Vec3) -> Result<Plane, ConfigError> {
        let normal = normal
            .normalize()
            .ok_or(ConfigError::ZeroVector("plane normal"))?;
        Ok(Plane { normal, point })
    }
}

impl Intersectable for Plane {
    fn intersect(&self, ray: &Ray, max_range: f64) -> Option<f64> {
        let denominator = ray.direction.dot(self.normal);
        if denominator.abs() < PARALLEL_TOLERANCE {
            return None;
        }
        let t = (self.point - ray.origin).dot(self.normal) / denominator;
        within_range(t, max_range)
    }

    fn surface_normal(&self, _point: Vec3, _incoming: Vec3) -> Vec3 {
        self.normal
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AxisBox {
    bounds: Box3,
}

impl AxisBox {
    pub fn new(min_corner: Vec3, max_corner: Vec3) -> AxisBox {
        AxisBox {
            bounds: Box3::from_corners(min_corner, max_corner),
        }
    }
}

impl Intersectable for AxisBox {
    fn intersect(&self, ray: &Ray, max_range: f64) -> Option<f64> {
        let (tmin, _) = self.bounds.slab_interval(ray)?;
        within_range(tmin, max_range)
    }

    fn surface_normal(&self, point: Vec3, _incoming: Vec3) -> Vec3 {
        self.bounds.face_normal(point)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    a: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    normal: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Result<Triangle, ConfigError> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1
            .cross(edge2)
            .normalize()
            .ok_or(ConfigError::DegenerateTriangle)?;
        Ok(Triangle {
            a,
            edge1,
            edge2,
            normal,
        })
    }
}

impl Intersectable for Triangle {
    fn intersect(&self, ray: &Ray, max_range: f64) -> Option<f64> {
        // https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm
        let ray_cross_e2 = ray.direction.cross(self.edge2);
        let determinant = self.edge1.dot(ray_cross_e2);
        // ray and triangle are parallel if det is close to 0
        if determinant.abs() < PARALLEL_TOLERANCE {
            return None;
        }
        let inverse_determinant = 1.0 / determinant;
        let tvec = ray.origin - self.a;
        let u = tvec.dot(ray_cross_e2) * inverse_determinant;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(self.edge1);
        let v = ray.direction.dot(qvec) * inverse_determinant;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = self.edge2.dot(qvec) * inverse_determinant;
        within_range(t, max_range)
    }

    fn surface_normal(&self, _point: Vec3, incoming: Vec3) -> Vec3 {
        // face the side the ray comes from
        if incoming.dot(self.normal) < 0.0 {
            self.normal
        } else {
            -self.normal
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Solid {
    Sphere(Sphere),
    Plane(Plane),
    Box(AxisBox),
    Triangle(Triangle),
}

impl Intersectable for Solid {
    fn intersect(&self, ray: &Ray, max_range: f64) -> Option<f64> {
        match self {
            Solid::Sphere(sphere) => sphere.intersect(ray, max_range),
            Solid::Plane(plane) => plane.intersect(ray, max_range),
            Solid::Box(axis_box) => axis_box.intersect(ray, max_range),
            Solid::Triangle(triangle) => triangle.intersect(ray, max_range),
        }
    }

    fn surface_normal(&self, point: Vec3, incoming: Vec3) -> Vec3 {
        match self {
            Solid::Sphere(sphere) => sphere.surface_normal(point, incoming),
            Solid::Plane(plane) => plane.surface_normal(point, incoming),
            Solid::Box(axis_box) => axis_box.surface_normal(point, incoming),
            Solid::Triangle(triangle) => triangle.surface_normal(point, incoming),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SceneObject {
    pub solid: Solid,
    pub material: usize,
}

impl SceneObject {
    pub fn new(solid: Solid, material: usize) -> Self {
        SceneObject { solid, material }
    }

    pub fn material_index(&self) -> usize {
        self.material
    }
}
