//! Loading an outbreak configuration from a JSON file.
//!
//! Every field is optional. A minimal file looks like:
//!
//! ```json
//! {
//!     "origin": { "lat": 51.5, "lng": -0.12 },
//!     "pathogen": "influenza",
//!     "mitigations": { "mask_usage": true, "vaccination": 30 },
//!     "max_days": 60
//! }
//! ```
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::GeoSpreadError;
use crate::geo::GeoPoint;
use crate::parameters::{MitigationMeasures, Pathogen, SimulationParameters};
use crate::spread::SpreadLimits;

/// Wuhan, China.
pub const DEFAULT_ORIGIN: GeoPoint = GeoPoint::new(30.5928, 114.3055);

/// Simulated days per unit of context time.
pub const DEFAULT_SIMULATION_SPEED: f64 = 5.0;
pub const MIN_SIMULATION_SPEED: f64 = 0.5;
pub const MAX_SIMULATION_SPEED: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutbreakConfig {
    pub origin: GeoPoint,
    /// Preset parameters, used when `parameters` is absent.
    pub pathogen: Option<Pathogen>,
    pub parameters: Option<SimulationParameters>,
    pub mitigations: MitigationMeasures,
    pub simulation_speed: f64,
    /// The last day to simulate. `None` runs until stopped.
    pub max_days: Option<u32>,
    pub limits: SpreadLimits,
}

impl Default for OutbreakConfig {
    fn default() -> Self {
        OutbreakConfig {
            origin: DEFAULT_ORIGIN,
            pathogen: None,
            parameters: None,
            mitigations: MitigationMeasures::default(),
            simulation_speed: DEFAULT_SIMULATION_SPEED,
            max_days: None,
            limits: SpreadLimits::default(),
        }
    }
}

impl OutbreakConfig {
    /// Explicit parameters, else the pathogen preset, else the defaults.
    #[must_use]
    pub fn simulation_parameters(&self) -> SimulationParameters {
        match (&self.parameters, self.pathogen) {
            (Some(parameters), _) => parameters.clone(),
            (None, Some(pathogen)) => pathogen.parameters(),
            (None, None) => SimulationParameters::default(),
        }
    }
}

/// Clamps a speed to the supported range; a non-finite speed becomes 1 day per time unit.
#[must_use]
pub fn clamp_simulation_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(MIN_SIMULATION_SPEED, MAX_SIMULATION_SPEED)
    } else {
        1.0
    }
}

/// Reads an `OutbreakConfig` from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid configuration.
pub fn load_config(path: &Path) -> Result<OutbreakConfig, GeoSpreadError> {
    info!("loading outbreak configuration from {}", path.display());
    let contents = fs::read_to_string(path)?;
    let config: OutbreakConfig = serde_json::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_object_gives_defaults() {
        let file = write_config("{}");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, OutbreakConfig::default());
        assert_approx_eq!(config.simulation_parameters().r0, 2.0);
    }

    #[test]
    fn reads_every_section() {
        let file = write_config(
            r#"{
                "origin": { "lat": 51.5, "lng": -0.12 },
                "parameters": { "r0": 3.0, "incubation_period": 4.0 },
                "mitigations": { "travel_restrictions": true, "vaccination": 25 },
                "simulation_speed": 2.5,
                "max_days": 30,
                "limits": { "max_new_sites_per_step": 5 }
            }"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_approx_eq!(config.origin.lat, 51.5);
        assert_approx_eq!(config.simulation_parameters().r0, 3.0);
        assert!(config.mitigations.travel_restrictions);
        assert_approx_eq!(config.mitigations.vaccination, 25.0);
        assert_approx_eq!(config.simulation_speed, 2.5);
        assert_eq!(config.max_days, Some(30));
        assert_eq!(config.limits.max_new_sites_per_step, 5);
        assert_eq!(config.limits.max_sites, 150);
    }

    #[test]
    fn pathogen_applies_when_parameters_are_absent() {
        let file = write_config(r#"{ "pathogen": "measles" }"#);
        let config = load_config(file.path()).unwrap();
        assert_approx_eq!(config.simulation_parameters().r0, 15.0);

        let file = write_config(r#"{ "pathogen": "measles", "parameters": { "r0": 1.1 } }"#);
        let config = load_config(file.path()).unwrap();
        assert_approx_eq!(config.simulation_parameters().r0, 1.1);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write_config(r#"{ "orign": { "lat": 1, "lng": 2 } }"#);
        assert!(matches!(
            load_config(file.path()),
            Err(GeoSpreadError::JsonError(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_config(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(GeoSpreadError::IoError(_))));
    }

    #[test]
    fn speed_is_clamped() {
        assert_approx_eq!(clamp_simulation_speed(0.1), 0.5);
        assert_approx_eq!(clamp_simulation_speed(10.0), 5.0);
        assert_approx_eq!(clamp_simulation_speed(2.0), 2.0);
        assert_approx_eq!(clamp_simulation_speed(f64::NAN), 1.0);
    }
}
