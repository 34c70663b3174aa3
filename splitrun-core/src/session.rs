//! Session weight — a time-of-day proximity curve around an anchor time.
//!
//! The anchor is resolved lazily from the first bar's date and cached for
//! the run. The curve core is one of three shapes, then pre-scaled,
//! clamped, post-scaled, and clamped again. Disabled weighting is the
//! constant 1.0.

use crate::config::{EngineConfig, SessionShape};
use crate::math::clamp_unit;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

#[derive(Debug, Clone)]
pub struct SessionWeight {
    enabled: bool,
    anchor_time: NaiveTime,
    shape: SessionShape,
    window_mins: f64,
    pre_scale: f64,
    post_scale: f64,
    /// Resolved from the first observed bar.
    anchor: Option<DateTime<Utc>>,
}

impl SessionWeight {
    pub fn from_config(config: &EngineConfig) -> Self {
        let anchor_time = NaiveTime::from_hms_opt(config.anchor_hour, config.anchor_minute, 0)
            .unwrap_or(NaiveTime::MIN);
        Self {
            enabled: config.use_session_anchor,
            anchor_time,
            shape: config.session_shape,
            window_mins: config.session_window_mins.max(1.0),
            pre_scale: config.session_pre_scale,
            post_scale: config.session_post_scale,
            anchor: None,
        }
    }

    /// Weight in [0, 1] for the given bar time.
    pub fn weight(&mut self, bar_time: DateTime<Utc>) -> f64 {
        if !self.enabled {
            return 1.0;
        }

        let anchor = *self.anchor.get_or_insert_with(|| {
            Utc.from_utc_datetime(&bar_time.date_naive().and_time(self.anchor_time))
        });

        let delta: Duration = if bar_time >= anchor {
            bar_time - anchor
        } else {
            anchor - bar_time
        };
        let delta_mins = delta.num_seconds() as f64 / 60.0;

        let core = match self.shape {
            SessionShape::Box => {
                if delta_mins <= self.window_mins {
                    1.0
                } else {
                    0.0
                }
            }
            SessionShape::Triangular => (1.0 - delta_mins / self.window_mins).max(0.0),
            SessionShape::Gaussian => {
                let sigma = (self.window_mins / 2.0).max(1e-6);
                (-(delta_mins * delta_mins) / (2.0 * sigma * sigma)).exp()
            }
        };

        // Zero scale factors mean "unscaled", matching the legacy knobs.
        let pre = if self.pre_scale > 0.0 { self.pre_scale } else { 1.0 };
        let post = if self.post_scale > 0.0 { self.post_scale } else { 1.0 };
        clamp_unit(clamp_unit(core * pre) * post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make(shape: SessionShape, window: f64) -> SessionWeight {
        let config = EngineConfig {
            use_session_anchor: true,
            anchor_hour: 9,
            anchor_minute: 30,
            session_shape: shape,
            session_window_mins: window,
            ..Default::default()
        };
        SessionWeight::from_config(&config)
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn disabled_is_constant_one() {
        let mut sw = SessionWeight::from_config(&EngineConfig::default());
        assert_eq!(sw.weight(at(3, 0)), 1.0);
        assert_eq!(sw.weight(at(23, 59)), 1.0);
    }

    #[test]
    fn gaussian_peaks_at_the_anchor() {
        let mut sw = make(SessionShape::Gaussian, 60.0);
        let w = sw.weight(at(9, 30));
        assert!(w > 0.999);
    }

    #[test]
    fn gaussian_decays_far_from_the_anchor() {
        // sigma = 30 mins; 120 mins out is 4 sigma: exp(-8) ≈ 3e-4
        let mut sw = make(SessionShape::Gaussian, 60.0);
        let w = sw.weight(at(11, 30));
        assert!(w < 0.1);
    }

    #[test]
    fn box_is_flat_inside_and_zero_outside() {
        let mut sw = make(SessionShape::Box, 60.0);
        assert_eq!(sw.weight(at(10, 0)), 1.0);
        assert_eq!(sw.weight(at(11, 0)), 0.0);
    }

    #[test]
    fn triangular_is_linear_to_the_window_edge() {
        let mut sw = make(SessionShape::Triangular, 60.0);
        let half = sw.weight(at(10, 0)); // 30 of 60 mins
        assert!((half - 0.5).abs() < 1e-9);
        assert_eq!(sw.weight(at(10, 45)), 0.0); // 75 mins, past the edge
    }

    #[test]
    fn anchor_resolves_from_the_first_bar_date() {
        let mut sw = make(SessionShape::Box, 60.0);
        // First bar on March 4th pins the anchor to that date
        assert_eq!(sw.weight(at(9, 30)), 1.0);
        // A bar the next day is > 60 mins from the cached anchor
        let next_day = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        assert_eq!(sw.weight(next_day), 0.0);
    }

    #[test]
    fn weight_is_symmetric_around_the_anchor() {
        let mut before = make(SessionShape::Gaussian, 60.0);
        let mut after = make(SessionShape::Gaussian, 60.0);
        // Resolve both anchors at 09:30 first
        before.weight(at(9, 30));
        after.weight(at(9, 30));
        let wb = before.weight(at(9, 0));
        let wa = after.weight(at(10, 0));
        assert!((wb - wa).abs() < 1e-12);
    }
}
