//! Parametric 2D maps driven by six coefficients
//!
//! A transform is drawn as a parallelogram: `(a, b)` and `(c, d)` are its two
//! basis vectors and `(e, f)` its center, so the corners are
//! `center ± (v1 + v2)/2` and `center ± (v1 − v2)/2`. The generation mode
//! decides how the coefficients act on a point.

use crate::io::configuration::{
    FIXED_POINT_MAX_ITERATIONS, FIXED_POINT_TOLERANCE, IDENTITY_TOLERANCE,
};
use crate::io::error::{IfsError, Result};
use crate::system::mode::Mode;
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Six-coefficient map `(x, y) → (a·x + c·y + e, b·x + d·y + f)` in linear mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// First basis vector, x component
    pub a: f64,
    /// First basis vector, y component
    pub b: f64,
    /// Second basis vector, x component
    pub c: f64,
    /// Second basis vector, y component
    pub d: f64,
    /// Center, x component
    pub e: f64,
    /// Center, y component
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Precomputed affine inverse of a transform
///
/// Built once with `Transform::inverse` and applied to many points; a change
/// of the source coefficients requires building a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseTransform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    num_x: f64,
    num_y: f64,
    denom: f64,
}

impl InverseTransform {
    /// Map `(x, y)` back through the affine part of the source transform
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (self.d.mul_add(x, -self.c * y) + self.num_x) * self.denom,
            (self.a.mul_add(y, -self.b * x) + self.num_y) * self.denom,
        )
    }

    /// Map a vector back through the linear part only
    pub fn apply_linear(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.d.mul_add(x, -self.c * y) * self.denom,
            self.a.mul_add(y, -self.b * x) * self.denom,
        )
    }
}

impl Transform {
    /// The map leaving every point in place
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    /// Build from coefficients in `a b c d e f` order
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Coefficients as `[a, b, c, d, e, f]`
    pub const fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Build from `[a, b, c, d, e, f]`
    pub const fn from_coefficients(coefficients: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = coefficients;
        Self::new(a, b, c, d, e, f)
    }

    /// Signed area scale `a·d − b·c`
    pub fn determinant(&self) -> f64 {
        self.a.mul_add(self.d, -self.b * self.c)
    }

    /// Area of the parallelogram, used as selection weight
    pub fn surface(&self) -> f64 {
        self.determinant().abs()
    }

    /// Whether iterating the affine part brings points closer together
    pub fn is_contracting(&self) -> bool {
        let norm1 = self.a.mul_add(self.a, self.b * self.b);
        let norm2 = self.c.mul_add(self.c, self.d * self.d);
        let det = self.determinant();
        norm1 < 1.0 && norm2 < 1.0 && norm1 + norm2 < det.mul_add(det, 1.0)
    }

    /// Whether the coefficients differ from identity by more than a small tolerance
    pub fn is_modified(&self) -> bool {
        let distance = (self.a - 1.0).abs()
            + self.b.abs()
            + self.c.abs()
            + (self.d - 1.0).abs()
            + self.e.abs()
            + self.f.abs();
        distance > IDENTITY_TOLERANCE
    }

    /// Image of `(x, y)` under the affine part, whatever the mode
    pub fn apply_affine(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a.mul_add(x, self.c.mul_add(y, self.e)),
            self.b.mul_add(x, self.d.mul_add(y, self.f)),
        )
    }

    /// Image of `(x, y)` under `mode`
    ///
    /// Formula evaluation failures leave the point unchanged. Julia mode
    /// consumes one random draw to pick a square root.
    pub fn next_point<R: Rng + ?Sized>(
        &self,
        mode: &Mode,
        x: f64,
        y: f64,
        rng: &mut R,
    ) -> (f64, f64) {
        match mode {
            Mode::Linear => self.apply_affine(x, y),
            Mode::Sinusoidal => (
                self.a.mul_add(x.cos(), self.c.mul_add(y.sin(), self.e)),
                self.b.mul_add(x.sin(), self.d.mul_add(y.cos(), self.f)),
            ),
            Mode::Julia => {
                let shift = Complex64::new(self.e, self.f).powu(2);
                let re = self.a.mul_add(x, self.c * y) + shift.re;
                let im = self.b.mul_add(x, self.d * y) + shift.im;
                let (root_x, root_y) = principal_sqrt(re, im);
                if rng.random_bool(0.5) {
                    (-root_x, -root_y)
                } else {
                    (root_x, root_y)
                }
            }
            Mode::Formula(formula) => formula
                .apply(x, y, self.coefficients(), rng)
                .unwrap_or((x, y)),
        }
    }

    /// Cached inverse of the affine part, `None` when the determinant is zero
    pub fn inverse(&self) -> Option<InverseTransform> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }
        Some(InverseTransform {
            a: self.a,
            b: self.b,
            c: self.c,
            d: self.d,
            num_x: self.c.mul_add(self.f, -self.d * self.e),
            num_y: self.b.mul_add(self.e, -self.a * self.f),
            denom: 1.0 / det,
        })
    }

    /// Preimage of `(x, y)` under the affine part
    ///
    /// # Errors
    ///
    /// Returns `IfsError::SingularTransform` if the determinant is zero
    pub fn previous_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.inverse()
            .map(|inverse| inverse.apply(x, y))
            .ok_or(IfsError::SingularTransform {
                operation: "previous_point",
            })
    }

    /// Component-wise `rate·f1 + (1 − rate)·f2`
    pub fn weighted_mix(f1: &Self, f2: &Self, rate: f64) -> Self {
        let blend = |p: f64, q: f64| rate.mul_add(p, (1.0 - rate) * q);
        Self::new(
            blend(f1.a, f2.a),
            blend(f1.b, f2.b),
            blend(f1.c, f2.c),
            blend(f1.d, f2.d),
            blend(f1.e, f2.e),
            blend(f1.f, f2.f),
        )
    }

    /// Fixed point of the affine part, found by iteration from the origin
    ///
    /// Stops once both coordinates change by less than `FIXED_POINT_TOLERANCE`
    /// relative to their previous value, or after `FIXED_POINT_MAX_ITERATIONS`.
    pub fn fixed_point(&self) -> (f64, f64) {
        let (mut x, mut y) = (0.0, 0.0);
        for _ in 0..FIXED_POINT_MAX_ITERATIONS {
            let (next_x, next_y) = self.apply_affine(x, y);
            let settled = (next_x - x).abs() <= FIXED_POINT_TOLERANCE * x.abs()
                && (next_y - y).abs() <= FIXED_POINT_TOLERANCE * y.abs();
            x = next_x;
            y = next_y;
            if settled {
                break;
            }
        }
        (x, y)
    }

    /// Log-polar blend of `f1` and `f2` around the fixed point of `f1`
    ///
    /// Base, right and left corners and the center of both parallelograms are
    /// taken relative to the fixed point; magnitudes are blended geometrically
    /// and angles along the shorter arc. At `rate = 0` the result is `f2`, at
    /// `rate = 1` it is `f1` (or `f1∘f1` when `f1` reverses orientation).
    pub fn spiral_mix(f1: &Self, f2: &Self, rate: f64) -> Self {
        let (sx, sy) = f1.fixed_point();
        let spiral = Complex64::new(sx, sy);

        let (center1, right_vector1, left_vector1) = if f1.determinant() >= 0.0 {
            (
                Complex64::new(f1.e, f1.f),
                Complex64::new(f1.a, f1.b),
                Complex64::new(f1.c, f1.d),
            )
        } else {
            // Zoom into the image of f1 by f1, whose determinant is positive
            let (cx, cy) = f1.apply_affine(f1.e, f1.f);
            let (rx, ry) = f1.apply_affine(f1.a, f1.b);
            let (lx, ly) = f1.apply_affine(f1.c, f1.d);
            (
                Complex64::new(cx, cy),
                Complex64::new(rx - f1.e, ry - f1.f),
                Complex64::new(lx - f1.e, ly - f1.f),
            )
        };
        let corners1 = Corners::new(center1, right_vector1, left_vector1);
        let corners2 = Corners::new(
            Complex64::new(f2.e, f2.f),
            Complex64::new(f2.a, f2.b),
            Complex64::new(f2.c, f2.d),
        );

        let blend =
            |z1: Complex64, z2: Complex64| spiral + log_polar_mix(z1 - spiral, z2 - spiral, rate);
        let center = blend(corners1.center, corners2.center);
        let base = blend(corners1.base, corners2.base);
        let right = blend(corners1.right, corners2.right) - base;
        let left = blend(corners1.left, corners2.left) - base;

        Self::new(right.re, right.im, left.re, left.im, center.re, center.im)
    }

    /// Random coefficients: vectors within `vectors_radius`, center within `center_radius`
    ///
    /// In linear mode each basis vector is resampled until its squared norm is
    /// at most 0.999, and both until the transform is contracting.
    pub fn random<R: Rng + ?Sized>(
        mode: &Mode,
        vectors_radius: f64,
        center_radius: f64,
        rng: &mut R,
    ) -> Self {
        let linear = matches!(mode, Mode::Linear);
        let mut uniform = |radius: f64| radius * rng.random::<f64>().mul_add(2.0, -1.0);
        let mut transform = Self::IDENTITY;
        loop {
            loop {
                transform.a = uniform(vectors_radius);
                transform.b = uniform(vectors_radius);
                if !linear || transform.a.mul_add(transform.a, transform.b * transform.b) <= 0.999 {
                    break;
                }
            }
            loop {
                transform.c = uniform(vectors_radius);
                transform.d = uniform(vectors_radius);
                if !linear || transform.c.mul_add(transform.c, transform.d * transform.d) <= 0.999 {
                    break;
                }
            }
            if !linear || transform.is_contracting() {
                break;
            }
        }
        transform.e = uniform(center_radius);
        transform.f = uniform(center_radius);
        transform
    }

    /// Rotate both basis vectors by `alpha` radians, center fixed
    pub fn rotate(&mut self, alpha: f64) {
        let (sin, cos) = alpha.sin_cos();
        let (a, b) = (self.a, self.b);
        self.a = a.mul_add(cos, -b * sin);
        self.b = a.mul_add(sin, b * cos);
        let (c, d) = (self.c, self.d);
        self.c = c.mul_add(cos, -d * sin);
        self.d = c.mul_add(sin, d * cos);
    }

    /// Replace the parallelogram by an axis-aligned square of side `edge`, same center
    pub const fn make_square(&mut self, edge: f64) {
        self.a = edge;
        self.b = 0.0;
        self.c = 0.0;
        self.d = edge;
    }

    /// Express this transform in the local frame of `frame`
    ///
    /// Basis vectors go through the linear inverse of `frame`, the center
    /// through its full affine inverse.
    ///
    /// # Errors
    ///
    /// Returns `IfsError::SingularTransform` if `frame` has a zero determinant
    pub fn subframe(&self, frame: &Self) -> Result<Self> {
        let inverse = frame.inverse().ok_or(IfsError::SingularTransform {
            operation: "subframe",
        })?;
        let (a, b) = inverse.apply_linear(self.a, self.b);
        let (c, d) = inverse.apply_linear(self.c, self.d);
        let (e, f) = inverse.apply(self.e, self.f);
        Ok(Self::new(a, b, c, d, e, f))
    }

    /// Base corner `center − (v1 + v2)/2` of the parallelogram
    pub fn base_corner(&self) -> (f64, f64) {
        (
            (self.a + self.c).mul_add(-0.5, self.e),
            (self.b + self.d).mul_add(-0.5, self.f),
        )
    }
}

/// Corners of a parallelogram as complex numbers
struct Corners {
    center: Complex64,
    base: Complex64,
    right: Complex64,
    left: Complex64,
}

impl Corners {
    fn new(center: Complex64, right_vector: Complex64, left_vector: Complex64) -> Self {
        let base = center - (right_vector + left_vector) / 2.0;
        Self {
            center,
            base,
            right: base + right_vector,
            left: base + left_vector,
        }
    }
}

/// Geometric blend of magnitudes, linear blend of angles along the shorter arc
pub fn log_polar_mix(z1: Complex64, z2: Complex64, rate: f64) -> Complex64 {
    let theta2 = z2.arg();
    let mut theta = z1.arg() - theta2;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta <= -PI {
        theta += 2.0 * PI;
    }
    let magnitude = z2.norm().powf(1.0 - rate) * z1.norm().powf(rate);
    Complex64::from_polar(magnitude, theta.mul_add(rate, theta2))
}

/// Square root of `re + i·im` with non-negative real part sign-adjusted to `im`
fn principal_sqrt(re: f64, im: f64) -> (f64, f64) {
    let modulus = re.hypot(im);
    let x = ((modulus + re) / 2.0).sqrt();
    let y = ((modulus - re) / 2.0).sqrt();
    if im < 0.0 { (-x, y) } else { (x, y) }
}
