//! Single-qubit gate matrices.
//!
//! Row-major `[[m00, m01], [m10, m11]]`, acting on `(|0⟩, |1⟩)`.

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

/// A 2x2 complex matrix.
pub type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Pauli-X.
pub fn x() -> Matrix2 {
    [[ZERO, ONE], [ONE, ZERO]]
}

/// Pauli-Y.
pub fn y() -> Matrix2 {
    [[ZERO, -I], [I, ZERO]]
}

/// Pauli-Z.
pub fn z() -> Matrix2 {
    phase(std::f64::consts::PI)
}

/// Hadamard.
pub fn h() -> Matrix2 {
    let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
    [[s, s], [s, -s]]
}

/// sqrt(X).
pub fn sx() -> Matrix2 {
    let a = Complex64::new(0.5, 0.5);
    let b = Complex64::new(0.5, -0.5);
    [[a, b], [b, a]]
}

/// sqrt(X)-dagger.
pub fn sxdg() -> Matrix2 {
    let a = Complex64::new(0.5, -0.5);
    let b = Complex64::new(0.5, 0.5);
    [[a, b], [b, a]]
}

/// diag(1, e^{iλ}), used for `p`, `u1`, `s`, `t` and their inverses.
pub fn phase(lambda: f64) -> Matrix2 {
    [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, lambda)]]
}

/// Rotation about X.
pub fn rx(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
        [Complex64::new(0.0, -s), Complex64::new(c, 0.0)],
    ]
}

/// Rotation about Y.
pub fn ry(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
        [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
    ]
}

/// Rotation about Z, diag(e^{-iφ/2}, e^{iφ/2}).
pub fn rz(phi: f64) -> Matrix2 {
    [
        [Complex64::from_polar(1.0, -phi / 2.0), ZERO],
        [ZERO, Complex64::from_polar(1.0, phi / 2.0)],
    ]
}

/// The general single-qubit gate U3(θ, φ, λ).
pub fn u3(theta: f64, phi: f64, lambda: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), -Complex64::from_polar(s, lambda)],
        [
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        ],
    ]
}
