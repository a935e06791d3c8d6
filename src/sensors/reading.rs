use thiserror::Error;

/// Raw value of the 12-bit ADC for a completely dry sensor.
pub const ABSOLUTE_DRYNESS: i32 = 4095;

/// At or above: the sensor is probably unplugged and pulled to the rail.
pub const SENSOR_DISCONNECT_THRESHOLD: i32 = ABSOLUTE_DRYNESS - 20;

/// At or below: the sensor is probably shorted to ground.
pub const SENSOR_MIN_VALID_THRESHOLD: i32 = 10;

/// Largest jump from the last accepted value a suspicious reading may make.
pub const MAX_SUSPICIOUS_JUMP: u32 = 500;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("initial sensor noise or disconnected sensor (raw {raw})")]
    DisconnectedNoHistory { raw: i32 },

    #[error("outlier reading {raw}, {diff} away from last accepted {last}")]
    OutlierJump { raw: i32, last: i32, diff: u32 },
}

/// An accepted sample and its moisture level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub raw: i32,
    pub percentage: u8,
}

fn is_suspicious(raw: i32) -> bool {
    raw >= SENSOR_DISCONNECT_THRESHOLD || raw <= SENSOR_MIN_VALID_THRESHOLD
}

/// Decides whether `raw` can be trusted given the last accepted sample.
///
/// Readings near either ADC rail are only accepted when they stay within
/// [`MAX_SUSPICIOUS_JUMP`] of a previously accepted reading. `Some(0)` is a
/// real previous reading, not the absence of one.
pub fn check_reading(raw: i32, last_accepted: Option<i32>) -> Result<(), Rejection> {
    if !is_suspicious(raw) {
        return Ok(());
    }

    match last_accepted {
        None => Err(Rejection::DisconnectedNoHistory { raw }),
        Some(last) => {
            let diff = raw.abs_diff(last);
            if diff > MAX_SUSPICIOUS_JUMP {
                Err(Rejection::OutlierJump { raw, last, diff })
            } else {
                Ok(())
            }
        }
    }
}

pub fn is_valid(raw: i32, last_accepted: Option<i32>) -> bool {
    check_reading(raw, last_accepted).is_ok()
}

/// Maps a raw sample to a moisture level, 4095 (dry) is 0% and 0 (wet) is 100%.
///
/// The sample is clamped to the ADC range first. Integer division truncates
/// toward zero, so every percentage but 100 covers about 41 raw values.
pub fn to_percentage(raw: i32) -> u8 {
    let raw = raw.clamp(0, ABSOLUTE_DRYNESS);
    ((ABSOLUTE_DRYNESS - raw) * 100 / ABSOLUTE_DRYNESS) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_band_always_valid() {
        for raw in [11, 500, 2048, 4074] {
            assert!(is_valid(raw, None));
            assert!(is_valid(raw, Some(0)));
            assert!(is_valid(raw, Some(4095)));
        }
        assert!((11..=4074).all(|raw| is_valid(raw, None)));
    }

    #[test]
    fn test_suspicious_without_history_rejected() {
        assert!(!is_valid(0, None));
        assert!(!is_valid(10, None));
        assert!(!is_valid(4075, None));
        assert!(!is_valid(4095, None));
        assert_eq!(
            check_reading(4095, None),
            Err(Rejection::DisconnectedNoHistory { raw: 4095 })
        );
    }

    #[test]
    fn test_suspicious_close_to_history_accepted() {
        assert!(is_valid(0, Some(0)));
        assert!(is_valid(4095, Some(4095)));
        assert!(is_valid(5, Some(400)));
        assert!(is_valid(4095, Some(3595)));
    }

    #[test]
    fn test_suspicious_jump_rejected() {
        assert!(!is_valid(4095, Some(3000)));
        assert!(!is_valid(0, Some(501)));
        assert_eq!(
            check_reading(4095, Some(3000)),
            Err(Rejection::OutlierJump {
                raw: 4095,
                last: 3000,
                diff: 1095
            })
        );
    }

    #[test]
    fn test_extreme_values_never_wrap_into_acceptance() {
        assert!(!is_valid(i32::MIN, Some(1)));
        assert!(!is_valid(i32::MAX, Some(1)));
        assert!(!is_valid(i32::MIN, Some(4095)));
        assert!(!is_valid(i32::MAX, Some(4095)));
        assert_eq!(
            check_reading(i32::MIN, Some(4095)),
            Err(Rejection::OutlierJump {
                raw: i32::MIN,
                last: 4095,
                diff: 2_147_487_743
            })
        );
    }

    #[test]
    fn test_zero_history_is_not_missing_history() {
        assert_ne!(is_valid(5, None), is_valid(5, Some(0)));
        assert_ne!(is_valid(0, None), is_valid(0, Some(0)));
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(to_percentage(4095), 0);
        assert_eq!(to_percentage(0), 100);
        assert_eq!(to_percentage(-50), 100);
        assert_eq!(to_percentage(5000), 0);
    }

    #[test]
    fn test_percentage_truncates() {
        // (4095 - 2048) * 100 / 4095 = 49.98
        assert_eq!(to_percentage(2048), 49);
        // (4095 - 41) * 100 / 4095 = 98.99
        assert_eq!(to_percentage(41), 98);
        assert_eq!(to_percentage(4054), 1);
        assert_eq!(to_percentage(4055), 0);
    }

    #[test]
    fn test_percentage_pure_and_monotonic() {
        let mut previous = to_percentage(-100);
        for raw in -99..=5000 {
            let level = to_percentage(raw);
            assert_eq!(level, to_percentage(raw));
            assert!(level <= previous, "raw {raw}: {level} > {previous}");
            assert!(level <= 100);
            previous = level;
        }
    }
}
