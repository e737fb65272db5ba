#[allow(non_snake_case)]
pub mod box3D;
pub mod color;
pub mod mat3;
pub mod ray;
pub mod vec3;

pub use box3D::*;
pub use color::*;
pub use mat3::*;
pub use ray::*;
pub use vec3::*;
