//! Scalar primitives shared by every signal component.
//!
//! All fusion math runs through these four functions plus the two streaming
//! states ([`RollingStats`], [`Ema`]). They are total over finite input:
//! degenerate cases (empty window, zero variance) resolve to the documented
//! neutral value, never to NaN or a panic.

pub mod ema;
pub mod rolling;

pub use ema::Ema;
pub use rolling::RollingStats;

/// Saturating clamp into `[0, 1]`.
pub fn clamp_unit(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

/// Tanh squash into `(0, 1)`. Monotonic, symmetric: 0 maps to 0.5.
pub fn squash(x: f64) -> f64 {
    0.5 * (x.tanh() + 1.0)
}

/// Squash a z-score with a tunable divisor. Divisor 2.0 puts |z| = 2
/// at roughly 0.12 / 0.88, keeping one-sigma moves away from saturation.
pub fn squash_z(z: f64, k: f64) -> f64 {
    squash(z / k)
}

/// Linear blend: `(1-w)*a + w*b`, `w` in `[0, 1]`.
pub fn blend(a: f64, b: f64, w: f64) -> f64 {
    (1.0 - w) * a + w * b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_unit_saturates() {
        assert_eq!(clamp_unit(-3.0), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(7.0), 1.0);
    }

    #[test]
    fn squash_is_centered_and_bounded() {
        assert!((squash(0.0) - 0.5).abs() < 1e-12);
        assert!(squash(50.0) <= 1.0);
        assert!(squash(-50.0) >= 0.0);
        // symmetry: squash(x) + squash(-x) == 1
        let x = 1.37;
        assert!((squash(x) + squash(-x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn squash_z_divisor_widens_the_linear_region() {
        // Same z, larger divisor → closer to neutral 0.5
        let tight = squash_z(1.0, 1.0);
        let wide = squash_z(1.0, 2.0);
        assert!(wide < tight);
        assert!(wide > 0.5);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0.2, 0.8, 0.0), 0.2);
        assert_eq!(blend(0.2, 0.8, 1.0), 0.8);
        assert!((blend(0.0, 1.0, 0.25) - 0.25).abs() < 1e-12);
    }
}
