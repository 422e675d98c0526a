//! Data-driven physics tuning
//!
//! Defaults equal the constants in `consts`; any field may be overridden from
//! JSON. Loaded values are validated before use.

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Physics parameters used by the actor integrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f32,
    pub move_accel: f32,
    pub max_speed_x: f32,
    pub jump_speed: f32,
    pub friction_ground: f32,
    pub friction_air: f32,
    pub catch_tolerance: f32,
    /// Drop-through window (seconds)
    pub drop_window: f32,
    pub drop_nudge: f32,
    pub drop_min_vy: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            move_accel: MOVE_ACCEL,
            max_speed_x: MAX_SPEED_X,
            jump_speed: JUMP_SPEED,
            friction_ground: FRICTION_GROUND,
            friction_air: FRICTION_AIR,
            catch_tolerance: CATCH_TOLERANCE,
            drop_window: DROP_WINDOW,
            drop_nudge: DROP_NUDGE,
            drop_min_vy: DROP_MIN_VY,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json).map_err(TuningError::Parse)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values the integrator cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("gravity", self.gravity),
            ("move_accel", self.move_accel),
            ("max_speed_x", self.max_speed_x),
            ("jump_speed", self.jump_speed),
            ("drop_window", self.drop_window),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::Invalid(format!(
                    "`{name}` must be a positive number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("friction_ground", self.friction_ground),
            ("friction_air", self.friction_air),
            ("catch_tolerance", self.catch_tolerance),
            ("drop_nudge", self.drop_nudge),
            ("drop_min_vy", self.drop_min_vy),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::Invalid(format!(
                    "`{name}` must be zero or positive, got {value}"
                )));
            }
        }

        Ok(())
    }
}

/// Errors from loading a tuning document
#[derive(Debug)]
pub enum TuningError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for TuningError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(source) => write!(f, "failed to parse tuning: {source}"),
            Self::Invalid(message) => write!(f, "invalid tuning: {message}"),
        }
    }
}

impl Error for TuningError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(source) => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let t = Tuning::default();
        assert_eq!(t.gravity, 2000.0);
        assert_eq!(t.jump_speed, 800.0);
        assert_eq!(t.drop_window, 0.25);
    }

    #[test]
    fn test_partial_override() {
        let t = Tuning::from_json(r#"{ "gravity": 1500.0, "jump_speed": 600 }"#).unwrap();
        assert_eq!(t.gravity, 1500.0);
        assert_eq!(t.jump_speed, 600.0);
        assert_eq!(t.max_speed_x, MAX_SPEED_X);
    }

    #[test]
    fn test_round_trip_json() {
        let t = Tuning::default();
        assert_eq!(Tuning::from_json(&t.to_json()).unwrap(), t);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "gravity": -1 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
        assert!(err.to_string().contains("gravity"));

        let err = Tuning::from_json(r#"{ "friction_air": -0.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));

        let err = Tuning::from_json("not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }
}
