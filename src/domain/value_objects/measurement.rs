use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalKind {
    HeartRate,
    Spo2,
    BodyTemperature,
    RespiratoryRate,
    BloodGlucose,
}

impl VitalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalKind::HeartRate => "heart_rate",
            VitalKind::Spo2 => "spo2",
            VitalKind::BodyTemperature => "body_temperature",
            VitalKind::RespiratoryRate => "respiratory_rate",
            VitalKind::BloodGlucose => "blood_glucose",
        }
    }

    /// Unit applied when the telemetry source omits one.
    pub fn default_unit(&self) -> &'static str {
        match self {
            VitalKind::HeartRate => "bpm",
            VitalKind::Spo2 => "%",
            VitalKind::BodyTemperature => "degC",
            VitalKind::RespiratoryRate => "breaths/min",
            VitalKind::BloodGlucose => "mg/dL",
        }
    }
}

impl FromStr for VitalKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "heart_rate" => Ok(VitalKind::HeartRate),
            "spo2" => Ok(VitalKind::Spo2),
            "body_temperature" => Ok(VitalKind::BodyTemperature),
            "respiratory_rate" => Ok(VitalKind::RespiratoryRate),
            "blood_glucose" => Ok(VitalKind::BloodGlucose),
            other => Err(format!("Unknown vital kind: {other}")),
        }
    }
}

impl fmt::Display for VitalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentKind {
    Temperature,
    Humidity,
    AirPressure,
    Illuminance,
    Co2Level,
}

impl EnvironmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentKind::Temperature => "temperature",
            EnvironmentKind::Humidity => "humidity",
            EnvironmentKind::AirPressure => "air_pressure",
            EnvironmentKind::Illuminance => "illuminance",
            EnvironmentKind::Co2Level => "co2_level",
        }
    }

    pub fn default_unit(&self) -> &'static str {
        match self {
            EnvironmentKind::Temperature => "degC",
            EnvironmentKind::Humidity => "%",
            EnvironmentKind::AirPressure => "hPa",
            EnvironmentKind::Illuminance => "lx",
            EnvironmentKind::Co2Level => "ppm",
        }
    }
}

impl FromStr for EnvironmentKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "temperature" => Ok(EnvironmentKind::Temperature),
            "humidity" => Ok(EnvironmentKind::Humidity),
            "air_pressure" => Ok(EnvironmentKind::AirPressure),
            "illuminance" => Ok(EnvironmentKind::Illuminance),
            "co2_level" => Ok(EnvironmentKind::Co2Level),
            other => Err(format!("Unknown environment kind: {other}")),
        }
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vital_kind_round_trips_through_str() {
        for kind in [
            VitalKind::HeartRate,
            VitalKind::Spo2,
            VitalKind::BodyTemperature,
            VitalKind::RespiratoryRate,
            VitalKind::BloodGlucose,
        ] {
            assert_eq!(kind.as_str().parse::<VitalKind>().unwrap(), kind);
        }
        assert!("step_count".parse::<VitalKind>().is_err());
    }

    #[test]
    fn test_environment_kind_round_trips_through_str() {
        for kind in [
            EnvironmentKind::Temperature,
            EnvironmentKind::Humidity,
            EnvironmentKind::AirPressure,
            EnvironmentKind::Illuminance,
            EnvironmentKind::Co2Level,
        ] {
            assert_eq!(kind.as_str().parse::<EnvironmentKind>().unwrap(), kind);
        }
    }
}
