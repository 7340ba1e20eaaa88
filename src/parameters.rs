//! User-adjustable epidemiological parameters and mitigation measures.
//!
//! Only `r0` and the mitigation toggles drive the spread model. The remaining
//! parameter fields describe the pathogen for display and are carried through
//! unchanged.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_R0: f64 = 2.0;

/// Multiplier on R₀ when social distancing is in force.
pub const SOCIAL_DISTANCING_FACTOR: f64 = 0.7;
/// Multiplier on R₀ when masks are in use.
pub const MASK_USAGE_FACTOR: f64 = 0.8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub r0: f64,
    /// Days from exposure to symptoms.
    pub incubation_period: Option<f64>,
    /// Percentage of cases that are fatal.
    pub mortality_rate: Option<f64>,
    pub transmission_method: Option<String>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            r0: DEFAULT_R0,
            incubation_period: None,
            mortality_rate: None,
            transmission_method: None,
        }
    }
}

impl SimulationParameters {
    /// The R₀ the model uses: `r0` if it is a positive finite number, otherwise the default.
    #[must_use]
    pub fn basic_r0(&self) -> f64 {
        if self.r0.is_finite() && self.r0 > 0.0 {
            self.r0
        } else {
            DEFAULT_R0
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationMeasures {
    pub travel_restrictions: bool,
    pub social_distancing: bool,
    pub mask_usage: bool,
    /// Percentage of the population vaccinated, in `[0, 100]`.
    pub vaccination: f64,
}

impl MitigationMeasures {
    /// Vaccination as a fraction in `[0, 1]`. Values outside the percentage range are clamped
    /// and a non-finite value counts as no vaccination.
    #[must_use]
    pub fn vaccinated_fraction(&self) -> f64 {
        if self.vaccination.is_finite() {
            self.vaccination.clamp(0.0, 100.0) / 100.0
        } else {
            0.0
        }
    }

    /// Applies every active measure to `r0`. The factors are independent, so the order in
    /// which they apply does not matter.
    #[must_use]
    pub fn effective_r0(&self, r0: f64) -> f64 {
        let mut effective_r0 = r0;
        if self.social_distancing {
            effective_r0 *= SOCIAL_DISTANCING_FACTOR;
        }
        if self.mask_usage {
            effective_r0 *= MASK_USAGE_FACTOR;
        }
        effective_r0 * (1.0 - self.vaccinated_fraction())
    }
}

/// Pathogens with typical parameter values, selectable by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Pathogen {
    Covid19,
    Influenza,
    Measles,
    Ebola,
}

impl Pathogen {
    #[must_use]
    pub fn parameters(self) -> SimulationParameters {
        let (r0, incubation_period, mortality_rate, transmission_method) = match self {
            Pathogen::Covid19 => (2.5, 5.1, 2.0, "respiratory droplets"),
            Pathogen::Influenza => (1.3, 2.0, 0.1, "respiratory droplets"),
            Pathogen::Measles => (15.0, 12.0, 0.2, "airborne"),
            Pathogen::Ebola => (1.8, 10.0, 50.0, "bodily fluids"),
        };
        SimulationParameters {
            r0,
            incubation_period: Some(incubation_period),
            mortality_rate: Some(mortality_rate),
            transmission_method: Some(transmission_method.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn no_measures_leave_r0_unchanged() {
        assert_approx_eq!(MitigationMeasures::default().effective_r0(2.0), 2.0);
    }

    #[test]
    fn all_measures_multiply() {
        let measures = MitigationMeasures {
            travel_restrictions: false,
            social_distancing: true,
            mask_usage: true,
            vaccination: 50.0,
        };
        assert_approx_eq!(measures.effective_r0(2.0), 0.56);
    }

    #[test]
    fn travel_restrictions_do_not_change_r0() {
        let measures = MitigationMeasures {
            travel_restrictions: true,
            ..MitigationMeasures::default()
        };
        assert_approx_eq!(measures.effective_r0(3.0), 3.0);
    }

    #[test]
    fn vaccination_is_clamped() {
        let over = MitigationMeasures {
            vaccination: 150.0,
            ..MitigationMeasures::default()
        };
        assert_approx_eq!(over.effective_r0(2.0), 0.0);

        let under = MitigationMeasures {
            vaccination: -20.0,
            ..MitigationMeasures::default()
        };
        assert_approx_eq!(under.effective_r0(2.0), 2.0);

        let nan = MitigationMeasures {
            vaccination: f64::NAN,
            ..MitigationMeasures::default()
        };
        assert_approx_eq!(nan.effective_r0(2.0), 2.0);
    }

    #[test]
    fn invalid_r0_falls_back_to_default() {
        for r0 in [f64::NAN, f64::INFINITY, 0.0, -1.0] {
            let parameters = SimulationParameters {
                r0,
                ..SimulationParameters::default()
            };
            assert_approx_eq!(parameters.basic_r0(), DEFAULT_R0);
        }
    }

    #[test]
    fn deserializes_partial_json() {
        let parameters: SimulationParameters =
            serde_json::from_str(r#"{"r0": 3.5, "mortality_rate": 5.0}"#).unwrap();
        assert_approx_eq!(parameters.r0, 3.5);
        assert_eq!(parameters.mortality_rate, Some(5.0));
        assert_eq!(parameters.incubation_period, None);

        let measures: MitigationMeasures =
            serde_json::from_str(r#"{"mask_usage": true}"#).unwrap();
        assert!(measures.mask_usage);
        assert!(!measures.social_distancing);
    }

    #[test]
    fn pathogen_presets() {
        let measles = Pathogen::Measles.parameters();
        assert_approx_eq!(measles.r0, 15.0);
        assert_eq!(measles.transmission_method.as_deref(), Some("airborne"));

        let pathogen: Pathogen = serde_json::from_str(r#""covid19""#).unwrap();
        assert_eq!(pathogen, Pathogen::Covid19);
    }
}
