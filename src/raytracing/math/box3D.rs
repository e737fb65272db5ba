use super::{Ray, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct Box3 {
    pub center: Vec3,
    pub half_extension: Vec3,
}

impl Box3 {
    pub fn from_corners(a: Vec3, b: Vec3) -> Box3 {
        let min = Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let max = Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        Box3 {
            center: (min + max) * 0.5,
            half_extension: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extension
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extension
    }

    /// Slab test. Returns the `(tmin, tmax)` interval of the ray parameter inside the box,
    /// `None` when the three slabs do not overlap.
    pub fn slab_interval(&self, ray: &Ray) -> Option<(f64, f64)> {
        // a zero direction component divides to +-inf, which keeps axis parallel rays correct
        let dirfrac = Vec3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );
        let relative_min_box = self.min() - ray.origin;
        let relative_max_box = self.max() - ray.origin;
        let t1 = relative_min_box.x * dirfrac.x;
        let t2 = relative_max_box.x * dirfrac.x;
        let t3 = relative_min_box.y * dirfrac.y;
        let t4 = relative_max_box.y * dirfrac.y;
        let t5 = relative_min_box.z * dirfrac.z;
        let t6 = relative_max_box.z * dirfrac.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        // if tmin >= tmax, ray doesn't intersect AABB
        if tmin >= tmax {
            return None;
        }
        Some((tmin, tmax))
    }

    pub fn face_normal(&self, point: Vec3) -> Vec3 {
        let relative = point - self.center;
        let signum = |f: f64| if f < 0.0 { -1.0 } else { 1.0 };

        let mut min_distance = (relative.x.abs() - self.half_extension.x).abs();
        let mut normal = Vec3::new(signum(relative.x), 0.0, 0.0);

        let distance = (relative.y.abs() - self.half_extension.y).abs();
        if distance < min_distance {
            min_distance = distance;
            normal = Vec3::new(0.0, signum(relative.y), 0.0);
        }

        let distance = (relative.z.abs() - self.half_extension.z).abs();
        if distance < min_distance {
            normal = Vec3::new(0.0, 0.0, signum(relative.z));
        }
        normal
    }
}
