pub const NEUTRAL_PRESSURE: f32 = 0.5;

/// Velocity used when a finger slides onto a key from a dead zone.
pub const DEFAULT_VELOCITY: u8 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCurve {
    pub sensitivity: f32,
    pub average: f32,
}

impl Default for VelocityCurve {
    fn default() -> Self {
        VelocityCurve {
            sensitivity: 0.5,
            average: 64.0,
        }
    }
}

impl VelocityCurve {
    pub fn velocity(&self, pressure: f32) -> u8 {
        compute_velocity(self.sensitivity, pressure, self.average)
    }
}

/// `round(sensitivity * (pressure - 0.5) * 127 + average)`, clamped to 1..=127.
/// Devices without pressure sensing report 0.5.
pub fn compute_velocity(sensitivity: f32, pressure: f32, average: f32) -> u8 {
    let pressure = if pressure.is_finite() {
        pressure.clamp(0.0, 1.0)
    } else {
        NEUTRAL_PRESSURE
    };
    let velocity = (sensitivity * (pressure - NEUTRAL_PRESSURE) * 127.0 + average).round();
    if velocity.is_nan() {
        return DEFAULT_VELOCITY;
    }
    velocity.clamp(1.0, 127.0) as u8
}

#[cfg(test)]
mod test {
    use super::*;

    mod compute_velocity {
        use super::*;

        #[test]
        fn ignores_pressure_without_sensitivity() {
            for pressure in [0.0, 0.25, 0.5, 0.9, 1.0].iter() {
                assert_eq!(compute_velocity(0.0, *pressure, 64.0), 64);
            }
        }

        #[test]
        fn clamps_hard_presses_to_127() {
            assert_eq!(compute_velocity(1.0, 1.0, 64.0), 127);
        }

        #[test]
        fn clamps_soft_presses_to_1() {
            assert_eq!(compute_velocity(1.0, 0.0, 64.0), 1);
        }

        #[test]
        fn scales_the_pressure_deviation() {
            // 0.5 * 0.25 * 127 = 15.875
            assert_eq!(compute_velocity(0.5, 0.75, 64.0), 80);
            assert_eq!(compute_velocity(0.5, 0.25, 64.0), 48);
        }

        #[test]
        fn clamps_out_of_range_pressure() {
            assert_eq!(
                compute_velocity(0.5, 7.0, 64.0),
                compute_velocity(0.5, 1.0, 64.0)
            );
            assert_eq!(
                compute_velocity(0.5, -3.0, 64.0),
                compute_velocity(0.5, 0.0, 64.0)
            );
        }

        #[test]
        fn treats_missing_pressure_as_neutral() {
            assert_eq!(compute_velocity(1.0, f32::NAN, 100.0), 100);
        }

        #[test]
        fn never_returns_zero() {
            assert_eq!(compute_velocity(0.0, 0.5, 0.0), 1);
        }
    }

    mod velocity_curve {
        use super::*;

        #[test]
        fn is_reproducible() {
            let curve = VelocityCurve {
                sensitivity: 0.3,
                average: 90.0,
            };
            assert_eq!(curve.velocity(0.8), curve.velocity(0.8));
            assert_eq!(curve.velocity(0.8), compute_velocity(0.3, 0.8, 90.0));
        }
    }
}
