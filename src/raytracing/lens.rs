use super::camera::Scope;
use super::error::ConfigError;
use super::{Mat3, Ray};

#[derive(Debug, Clone)]
pub struct OrthographicLens {
    pub view_width: Option<f64>,
    view_height: f64,
}

impl OrthographicLens {
    pub fn new(view_width: Option<f64>) -> Self {
        OrthographicLens {
            view_width,
            view_height: 0.0,
        }
    }
}

/// Pinhole projection. Either `view_width` and `focal_length` are given, or `hfov`
/// (degrees) together with one of `focal_length` or `optical_radius`.
#[derive(Debug, Clone)]
pub struct PerspectiveLens {
    pub hfov: Option<f64>,
    pub view_width: Option<f64>,
    pub focal_length: Option<f64>,
    pub optical_radius: Option<f64>,
    view_height: f64,
}

impl PerspectiveLens {
    pub fn new(
        hfov: Option<f64>,
        view_width: Option<f64>,
        focal_length: Option<f64>,
        optical_radius: Option<f64>,
    ) -> Self {
        PerspectiveLens {
            hfov,
            view_width,
            focal_length,
            optical_radius,
            view_height: 0.0,
        }
    }
}

/// Angular projection, the view angles grow linearly with the screen coordinates.
#[derive(Debug, Clone)]
pub struct FisheyeLens {
    pub hfov: Option<f64>,
    vfov: f64,
}

impl FisheyeLens {
    pub fn new(hfov: Option<f64>) -> Self {
        FisheyeLens { hfov, vfov: 0.0 }
    }
}

#[derive(Debug, Clone)]
pub enum Lens {
    Orthographic(OrthographicLens),
    Perspective(PerspectiveLens),
    Fisheye(FisheyeLens),
}

fn lens_error(lens: &'static str, message: &'static str) -> ConfigError {
    ConfigError::Lens { lens, message }
}

impl Lens {
    pub fn name(&self) -> &'static str {
        match self {
            Lens::Orthographic(_) => "orthographic",
            Lens::Perspective(_) => "perspective",
            Lens::Fisheye(_) => "fisheye",
        }
    }

    pub fn set_aspect_ratio(&mut self, ratio: f64) -> Result<(), ConfigError> {
        let name = self.name();
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(lens_error(name, "aspect ratio must be positive"));
        }
        match self {
            Lens::Orthographic(lens) => {
                let view_width = lens
                    .view_width
                    .ok_or_else(|| lens_error(name, "viewWidth must be specified"))?;
                lens.view_height = view_width / ratio;
            }
            Lens::Perspective(lens) => {
                if let Some(hfov) = lens.hfov.filter(|hfov| *hfov != 0.0) {
                    let half_angle = hfov.to_radians() * 0.5;
                    let optical_radius = match (lens.focal_length, lens.optical_radius) {
                        (Some(focal_length), _) => focal_length / half_angle.cos(),
                        (None, Some(optical_radius)) => {
                            lens.focal_length = Some(half_angle.cos() * optical_radius);
                            optical_radius
                        }
                        (None, None) => {
                            return Err(lens_error(
                                name,
                                "with hfov, at least one of focalLength or opticalRadius must be specified",
                            ))
                        }
                    };
                    lens.optical_radius = Some(optical_radius);
                    lens.view_width = Some(half_angle.sin() * optical_radius * 2.0);
                } else if lens.focal_length.is_none() {
                    return Err(lens_error(
                        name,
                        "with viewWidth, focalLength must be specified",
                    ));
                }
                let view_width = lens
                    .view_width
                    .ok_or_else(|| lens_error(name, "either hfov or viewWidth must be specified"))?;
                lens.view_height = view_width / ratio;
            }
            Lens::Fisheye(lens) => {
                let hfov = lens
                    .hfov
                    .ok_or_else(|| lens_error(name, "hfov must be specified"))?;
                lens.vfov = hfov / ratio;
            }
        }
        Ok(())
    }

    /// Primary ray through the screen point `(screen_x, screen_y)`, both in `[-1, 1]`
    /// from the lower left to the upper right corner of the image.
    /// `None` when the direction degenerates.
    pub fn generate_light_ray(&self, screen_x: f64, screen_y: f64, scope: &Scope) -> Option<Ray> {
        match self {
            Lens::Orthographic(lens) => {
                let view_width = lens.view_width?;
                let horizontal = scope.right * (screen_x * view_width * 0.5);
                let vertical = scope.up * (screen_y * lens.view_height * 0.5);
                Some(Ray::new(
                    scope.position + horizontal + vertical,
                    scope.forward,
                ))
            }
            Lens::Perspective(lens) => {
                let direction = scope.forward * lens.focal_length?
                    + scope.right * (screen_x * lens.view_width? * 0.5)
                    + scope.up * (screen_y * lens.view_height * 0.5);
                Some(Ray::new(scope.position, direction.normalize()?))
            }
            Lens::Fisheye(lens) => {
                let horizontal_angle = -screen_x * lens.hfov? * 0.5;
                let vertical_angle = screen_y * lens.vfov * 0.5;
                // tilt around the right axis first, then pan around the up axis
                let rotation = Mat3::rotation(scope.right, vertical_angle)?
                    .then(&Mat3::rotation(scope.up, horizontal_angle)?);
                let direction = rotation.apply(scope.forward).normalize()?;
                Some(Ray::new(scope.position, direction))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracing::Vec3;
    use approx::assert_abs_diff_eq;

    fn scope() -> Scope {
        // looking down -z, right is +x, up is +y
        Scope::look_at(Vec3::zero(), -Vec3::z_axis(), 0.0).unwrap()
    }

    #[test]
    fn orthographic_rays_are_parallel_and_offset() {
        let mut lens = Lens::Orthographic(OrthographicLens::new(Some(4.0)));
        lens.set_aspect_ratio(2.0).unwrap();
        let ray = lens.generate_light_ray(1.0, 1.0, &scope()).unwrap();
        assert_abs_diff_eq!(ray.origin, Vec3::new(2.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(ray.direction, -Vec3::z_axis(), epsilon = 1e-12);
        let ray = lens.generate_light_ray(-1.0, -1.0, &scope()).unwrap();
        assert_abs_diff_eq!(ray.origin, Vec3::new(-2.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn orthographic_requires_view_width() {
        let mut lens = Lens::Orthographic(OrthographicLens::new(None));
        assert!(lens.set_aspect_ratio(1.0).is_err());
    }

    #[test]
    fn perspective_from_view_width() {
        let mut lens = Lens::Perspective(PerspectiveLens::new(None, Some(2.0), Some(1.0), None));
        lens.set_aspect_ratio(1.0).unwrap();
        let center = lens.generate_light_ray(0.0, 0.0, &scope()).unwrap();
        assert_abs_diff_eq!(center.origin, Vec3::zero());
        assert_abs_diff_eq!(center.direction, -Vec3::z_axis(), epsilon = 1e-12);
        // the corner of a 2 wide window at distance 1 is 45 degrees off axis
        let corner = lens.generate_light_ray(1.0, 0.0, &scope()).unwrap();
        let expected = Vec3::new(1.0, 0.0, -1.0).normalize().unwrap();
        assert_abs_diff_eq!(corner.direction, expected, epsilon = 1e-12);
    }

    #[test]
    fn perspective_from_hfov_and_focal_length() {
        let mut lens = Lens::Perspective(PerspectiveLens::new(Some(90.0), None, Some(1.0), None));
        lens.set_aspect_ratio(2.0).unwrap();
        let Lens::Perspective(resolved) = lens else {
            unreachable!()
        };
        assert_abs_diff_eq!(resolved.optical_radius.unwrap(), 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(resolved.view_width.unwrap(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(resolved.view_height, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn perspective_from_hfov_and_optical_radius() {
        let mut lens = Lens::Perspective(PerspectiveLens::new(Some(90.0), None, None, Some(2f64.sqrt())));
        lens.set_aspect_ratio(1.0).unwrap();
        let Lens::Perspective(resolved) = lens else {
            unreachable!()
        };
        assert_abs_diff_eq!(resolved.focal_length.unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(resolved.view_width.unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn perspective_needs_a_focal_length_or_radius() {
        let mut with_hfov = Lens::Perspective(PerspectiveLens::new(Some(60.0), None, None, None));
        assert!(with_hfov.set_aspect_ratio(1.0).is_err());

        let mut with_width = Lens::Perspective(PerspectiveLens::new(None, Some(2.0), None, None));
        assert!(with_width.set_aspect_ratio(1.0).is_err());
    }

    #[test]
    fn fisheye_angles_follow_screen_coordinates() {
        let mut lens = Lens::Fisheye(FisheyeLens::new(Some(180.0)));
        lens.set_aspect_ratio(2.0).unwrap();
        let s = scope();

        let center = lens.generate_light_ray(0.0, 0.0, &s).unwrap();
        assert_abs_diff_eq!(center.direction, -Vec3::z_axis(), epsilon = 1e-12);

        // half of the 180 degree hfov points straight right
        let right = lens.generate_light_ray(1.0, 0.0, &s).unwrap();
        assert_abs_diff_eq!(right.direction, Vec3::x_axis(), epsilon = 1e-12);

        // vfov is 90 degrees, the top edge is tilted up by 45
        let top = lens.generate_light_ray(0.0, 1.0, &s).unwrap();
        let expected = Vec3::new(0.0, 1.0, -1.0).normalize().unwrap();
        assert_abs_diff_eq!(top.direction, expected, epsilon = 1e-12);
    }

    #[test]
    fn fisheye_tilts_before_panning() {
        let mut lens = Lens::Fisheye(FisheyeLens::new(Some(180.0)));
        lens.set_aspect_ratio(2.0).unwrap();
        // tilt up 45 degrees around +x, then pan 90 degrees to the right around +y
        let ray = lens.generate_light_ray(1.0, 1.0, &scope()).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize().unwrap();
        assert_abs_diff_eq!(ray.direction, expected, epsilon = 1e-12);
    }

    #[test]
    fn zero_focal_length_gives_no_center_ray() {
        let mut lens = Lens::Perspective(PerspectiveLens::new(None, Some(2.0), Some(0.0), None));
        lens.set_aspect_ratio(1.0).unwrap();
        assert!(lens.generate_light_ray(0.0, 0.0, &scope()).is_none());
        assert!(lens.generate_light_ray(1.0, 0.0, &scope()).is_some());
    }

    #[test]
    fn fisheye_requires_hfov() {
        let mut lens = Lens::Fisheye(FisheyeLens::new(None));
        assert!(lens.set_aspect_ratio(1.0).is_err());
    }
}
