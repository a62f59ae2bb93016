//! 3×3 matrix helpers on plain arrays.

use crate::vector::{cross, norm, scale};

/// Row-major 3×3 matrix.
pub type Mat3 = [[f64; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

pub const ZERO: Mat3 = [[0.0; 3]; 3];

pub fn transpose(m: &Mat3) -> Mat3 {
    let mut t = ZERO;
    for (i, row) in m.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            t[j][i] = *value;
        }
    }
    t
}

/// Matrix times vector.
pub fn mxv(m: &Mat3, v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Transpose of matrix times vector.
pub fn mtxv(m: &Mat3, v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[1][0] * v[1] + m[2][0] * v[2],
        m[0][1] * v[0] + m[1][1] * v[1] + m[2][1] * v[2],
        m[0][2] * v[0] + m[1][2] * v[1] + m[2][2] * v[2],
    ]
}

/// Matrix product `a · b`.
pub fn mxm(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = ZERO;
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

pub fn add(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][j] + b[i][j];
        }
    }
    out
}

/// Element-wise `(a - b) * k`.
pub fn scaled_difference(a: &Mat3, b: &Mat3, k: f64) -> Mat3 {
    let mut out = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (a[i][j] - b[i][j]) * k;
        }
    }
    out
}

/// Cross-product matrix: `skew(w) · v == w × v`.
pub fn skew(w: &[f64; 3]) -> Mat3 {
    [[0.0, -w[2], w[1]], [w[2], 0.0, -w[0]], [-w[1], w[0], 0.0]]
}

/// Active rotation of vectors by `angle` radians about `axis` (right-hand rule).
///
/// Returns `None` for a zero-length axis.
pub fn rotation_about_axis(axis: &[f64; 3], angle: f64) -> Option<Mat3> {
    let n = norm(axis);
    if n == 0.0 || !n.is_finite() {
        return None;
    }
    let k = scale(axis, 1.0 / n);
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    Some([
        [
            c + k[0] * k[0] * t,
            k[0] * k[1] * t - k[2] * s,
            k[0] * k[2] * t + k[1] * s,
        ],
        [
            k[1] * k[0] * t + k[2] * s,
            c + k[1] * k[1] * t,
            k[1] * k[2] * t - k[0] * s,
        ],
        [
            k[2] * k[0] * t - k[1] * s,
            k[2] * k[1] * t + k[0] * s,
            c + k[2] * k[2] * t,
        ],
    ])
}

/// Largest deviation of `m · mᵀ` from identity, plus |det - 1|.
pub fn orthonormality_error(m: &Mat3) -> f64 {
    let p = mxm(m, &transpose(m));
    let mut worst: f64 = 0.0;
    for i in 0..3 {
        for j in 0..3 {
            worst = worst.max((p[i][j] - IDENTITY[i][j]).abs());
        }
    }
    let det = crate::vector::dot(&m[0], &cross(&m[1], &m[2]));
    worst.max((det - 1.0).abs())
}

/// Orthonormal with determinant +1 within `tol`.
pub fn is_rotation(m: &Mat3, tol: f64) -> bool {
    m.iter().flatten().all(|v| v.is_finite()) && orthonormality_error(m) <= tol
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-14;

    fn assert_vec_close(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < EPS, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn quarter_turn_about_z() {
        let r = rotation_about_axis(&[0.0, 0.0, 2.0], std::f64::consts::FRAC_PI_2).unwrap();
        assert_vec_close(mxv(&r, &[1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]);
        assert_vec_close(mtxv(&r, &[0.0, 1.0, 0.0]), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_axis_has_no_rotation() {
        assert!(rotation_about_axis(&[0.0; 3], 1.0).is_none());
    }

    #[test]
    fn product_with_transpose_is_identity() {
        let r = rotation_about_axis(&[1.0, -2.0, 0.5], 0.7).unwrap();
        let p = mxm(&r, &transpose(&r));
        for i in 0..3 {
            for j in 0..3 {
                assert!((p[i][j] - IDENTITY[i][j]).abs() < EPS);
            }
        }
        assert!(is_rotation(&r, 1e-12));
    }

    #[test]
    fn reflection_is_not_a_rotation() {
        let m = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]];
        assert!(!is_rotation(&m, 1e-9));
        let stretched = [[2.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(!is_rotation(&stretched, 1e-9));
    }

    #[test]
    fn skew_matches_cross_product() {
        let w = [0.3, -1.2, 2.0];
        let v = [4.0, 0.5, -0.25];
        assert_vec_close(mxv(&skew(&w), &v), cross(&w, &v));
    }
}
