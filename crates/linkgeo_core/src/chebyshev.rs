//! Chebyshev series evaluation for ephemeris records.

/// Evaluate `sum(c_k * T_k(s))` with the Clenshaw recurrence,
/// `s` normalised to `[-1, 1]`.
pub fn clenshaw(coeffs: &[f64], s: f64) -> f64 {
    match coeffs {
        [] => 0.0,
        [c0] => *c0,
        [c0, rest @ ..] => {
            let two_s = 2.0 * s;
            let (b1, b2) = rest
                .iter()
                .rev()
                .fold((0.0, 0.0), |(b1, b2), &c| (two_s * b1 - b2 + c, b1));
            s * b1 - b2 + c0
        }
    }
}

/// Evaluate `sum(c_k * T_k'(s))`.
///
/// Forward recurrence carrying both `T_k` and `T_k'`:
/// ```text
/// T_k'(s) = 2 T_{k-1}(s) + 2 s T_{k-1}'(s) - T_{k-2}'(s)
/// ```
pub fn clenshaw_derivative(coeffs: &[f64], s: f64) -> f64 {
    if coeffs.len() <= 1 {
        return 0.0;
    }
    let two_s = 2.0 * s;
    let (mut t0, mut t1) = (1.0, s);
    let (mut d0, mut d1) = (0.0, 1.0);
    let mut result = coeffs[1];
    for &c in &coeffs[2..] {
        let t = two_s * t1 - t0;
        let d = 2.0 * t1 + two_s * d1 - d0;
        result += c * d;
        (t0, t1) = (t1, t);
        (d0, d1) = (d1, d);
    }
    result
}

/// One Chebyshev record: three coordinate series over
/// `[mid - radius, mid + radius]` TDB seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevRecord {
    pub mid_s: f64,
    pub radius_s: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl ChebyshevRecord {
    pub fn covers(&self, epoch_s: f64) -> bool {
        (epoch_s - self.mid_s).abs() <= self.radius_s
    }

    pub fn start_s(&self) -> f64 {
        self.mid_s - self.radius_s
    }

    pub fn end_s(&self) -> f64 {
        self.mid_s + self.radius_s
    }

    /// Position (km) and velocity (km/s) at `epoch_s`.
    pub fn evaluate(&self, epoch_s: f64) -> ([f64; 3], [f64; 3]) {
        let s = (epoch_s - self.mid_s) / self.radius_s;
        let pos = [
            clenshaw(&self.x, s),
            clenshaw(&self.y, s),
            clenshaw(&self.z, s),
        ];
        let vel = [
            clenshaw_derivative(&self.x, s) / self.radius_s,
            clenshaw_derivative(&self.y, s) / self.radius_s,
            clenshaw_derivative(&self.z, s) / self.radius_s,
        ];
        (pos, vel)
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        self.mid_s.is_finite()
            && self.radius_s.is_finite()
            && self.radius_s > 0.0
            && !self.x.is_empty()
            && self.x.len() == self.y.len()
            && self.x.len() == self.z.len()
            && self
                .x
                .iter()
                .chain(&self.y)
                .chain(&self.z)
                .all(|c| c.is_finite())
    }
}
