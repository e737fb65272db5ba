pub mod camera;
pub mod core;
pub mod error;
pub mod lens;
pub mod lighting;
pub mod math;
pub mod parser;
pub mod solid;

pub use math::*;
