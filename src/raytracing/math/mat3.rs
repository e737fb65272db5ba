use super::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct Mat3 {
    value: [f64; 9],
}

impl Mat3 {
    pub fn rotation(axis: Vec3, degrees: f64) -> Option<Mat3> {
        // https://en.wikipedia.org/wiki/Rotation_matrix#Rotation_matrix_from_axis_and_angle
        let u = axis.normalize()?;
        let angle = degrees.to_radians();
        let cos_t = angle.cos();
        let sin_t = angle.sin();
        let k = 1.0 - cos_t;
        Some(Mat3 {
            value: [
                cos_t + u.x * u.x * k,
                u.x * u.y * k - u.z * sin_t,
                u.x * u.z * k + u.y * sin_t,
                u.y * u.x * k + u.z * sin_t,
                cos_t + u.y * u.y * k,
                u.y * u.z * k - u.x * sin_t,
                u.z * u.x * k - u.y * sin_t,
                u.z * u.y * k + u.x * sin_t,
                cos_t + u.z * u.z * k,
            ],
        })
    }

    pub fn then(&self, other: &Mat3) -> Mat3 {
        // other * self
        let mut value = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                value[row * 3 + col] = (0..3)
                    .map(|i| other.value[row * 3 + i] * self.value[i * 3 + col])
                    .sum();
            }
        }
        Mat3 { value }
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        let m = &self.value;
        Vec3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[3] * v.x + m[4] * v.y + m[5] * v.z,
            m[6] * v.x + m[7] * v.y + m[8] * v.z,
        )
    }
}
