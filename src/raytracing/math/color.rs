use serde::{Deserialize, Serialize};
use std::ops;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ops::Add<Color> for Color {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Color) -> Self::Output {
        Color {
            red: self.red + rhs.red,
            green: self.green + rhs.green,
            blue: self.blue + rhs.blue,
        }
    }
}

impl ops::AddAssign<Color> for Color {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Color) {
        self.red += rhs.red;
        self.green += rhs.green;
        self.blue += rhs.blue;
    }
}

impl ops::Mul<f64> for Color {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f64) -> Self::Output {
        Color {
            red: self.red * rhs,
            green: self.green * rhs,
            blue: self.blue * rhs,
        }
    }
}

impl ops::Mul<Color> for Color {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Color) -> Self::Output {
        Color {
            red: self.red * rhs.red,
            green: self.green * rhs.green,
            blue: self.blue * rhs.blue,
        }
    }
}

impl ops::Div<f64> for Color {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: f64) -> Self::Output {
        Color {
            red: self.red / rhs,
            green: self.green / rhs,
            blue: self.blue / rhs,
        }
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(value: Color) -> Self {
        let to_byte = |channel: f64| (channel.clamp(0.0, 1.0) * 255.0) as u8;
        image::Rgb([
            to_byte(value.red),
            to_byte(value.green),
            to_byte(value.blue),
        ])
    }
}

impl Color {
    #[inline(always)]
    pub fn black() -> Color {
        Color::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub fn new(red: f64, green: f64, blue: f64) -> Color {
        Color { red, green, blue }
    }

    pub fn clamp_to_display(self) -> Color {
        Color::new(
            self.red.clamp(0.0, 1.0),
            self.green.clamp(0.0, 1.0),
            self.blue.clamp(0.0, 1.0),
        )
    }

    pub fn average(colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::black();
        }
        let sum = colors
            .iter()
            .fold(Color::black(), |total, color| total + *color);
        sum / colors.len() as f64
    }
}

#[cfg(test)]
impl approx::AbsDiffEq for Color {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        1e-9
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.red - other.red).abs() <= epsilon
            && (self.green - other.green).abs() <= epsilon
            && (self.blue - other.blue).abs() <= epsilon
    }
}
