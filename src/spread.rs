//! The spread engine: advances the set of infection sites by one simulated day.
//!
//! Each running day, new sites are spawned by jittering the location of randomly chosen
//! existing sites. How many are spawned scales with the existing site count and the
//! effective R₀, but never exceeds a small per-day cap. Once the set reaches its maximum
//! size it is compacted to the most recent sites instead of growing.
//!
//! The engine is a pure function of its inputs and an injected random source; the caller
//! owns the day counter and the running flag (see `crate::outbreak`).

use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geo::{to_geo, to_sphere, GeoPoint, SpherePoint};
use crate::parameters::{MitigationMeasures, SimulationParameters};

/// One rendered infection event.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfectionSite {
    pub position: SpherePoint,
    /// The simulated day on which the site appeared; the origin is day 0.
    pub day: u32,
    /// Marker opacity, in `(0, 1]`.
    pub intensity: f64,
    /// Marker radius, in globe units.
    pub radius: f64,
}

/// The constants that bound the model. The defaults reproduce the stock globe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadLimits {
    /// Site count at which the set is compacted instead of grown.
    pub max_sites: usize,
    /// Site count kept by a compaction.
    pub retained_sites: usize,
    /// Upper bound on new sites per day regardless of R₀ or site count.
    pub max_new_sites_per_step: usize,
    /// Maximum jitter in degrees applied to latitude and longitude.
    pub spread_distance: f64,
    /// Jitter used instead while travel restrictions are in force.
    pub restricted_spread_distance: f64,
    /// New sites are kept away from the poles, where longitude degenerates.
    pub max_abs_latitude: f64,
    /// Radius of the sphere the markers sit on, just above the globe surface.
    pub marker_altitude: f64,
    /// Marker radius of the origin site.
    pub origin_radius: f64,
    /// How many sites the renderer draws.
    pub visible_sites: usize,
    /// Divides effective R₀ to give the per-site spawn rate.
    pub r0_divisor: f64,
}

impl Default for SpreadLimits {
    fn default() -> Self {
        SpreadLimits {
            max_sites: 150,
            retained_sites: 140,
            max_new_sites_per_step: 3,
            spread_distance: 40.0,
            restricted_spread_distance: 20.0,
            max_abs_latitude: 85.0,
            marker_altitude: 1.01,
            origin_radius: 0.03,
            visible_sites: 150,
            r0_divisor: 5.0,
        }
    }
}

impl SpreadLimits {
    /// Jitter in degrees for the given measures.
    #[must_use]
    pub fn spread_distance(&self, mitigations: &MitigationMeasures) -> f64 {
        if mitigations.travel_restrictions {
            self.restricted_spread_distance
        } else {
            self.spread_distance
        }
    }
}

/// Everything one step depends on apart from the current sites and the random source.
#[derive(Clone, Debug)]
pub struct StepInput<'a> {
    pub day: u32,
    pub running: bool,
    pub origin: GeoPoint,
    pub parameters: &'a SimulationParameters,
    pub mitigations: &'a MitigationMeasures,
}

/// Advances infection sites one day at a time under a fixed set of `SpreadLimits`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpreadEngine {
    limits: SpreadLimits,
}

impl SpreadEngine {
    #[must_use]
    pub fn new(limits: SpreadLimits) -> Self {
        SpreadEngine { limits }
    }

    #[must_use]
    pub fn limits(&self) -> &SpreadLimits {
        &self.limits
    }

    /// The single-site set shown while the simulation is idle.
    #[must_use]
    pub fn reset_to_origin(&self, origin: GeoPoint) -> Vec<InfectionSite> {
        vec![InfectionSite {
            position: to_sphere(origin.lat, origin.lng, self.limits.marker_altitude),
            day: 0,
            intensity: 1.0,
            radius: self.limits.origin_radius,
        }]
    }

    /// How many sites a day spawns from `site_count` existing sites.
    #[must_use]
    pub fn new_site_count(&self, site_count: usize, effective_r0: f64) -> usize {
        let spread_factor = effective_r0 / self.limits.r0_divisor;
        #[allow(clippy::cast_precision_loss)]
        let uncapped = (site_count as f64 * spread_factor).floor();
        if uncapped.is_nan() || uncapped < 1.0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let uncapped = uncapped.min(usize::MAX as f64) as usize;
        uncapped.min(self.limits.max_new_sites_per_step)
    }

    /// Keeps the `retained_sites` most recent sites, latest day first. Sites from the same
    /// day keep their relative order.
    #[must_use]
    pub fn compact(&self, mut sites: Vec<InfectionSite>) -> Vec<InfectionSite> {
        sites.sort_by(|a, b| b.day.cmp(&a.day));
        sites.truncate(self.limits.retained_sites);
        sites
    }

    /// Produces the site set for `input.day` from the current `sites`.
    ///
    /// Idle always yields the origin alone. Day 0 of a running simulation leaves the set
    /// unchanged. A full set is compacted and gains nothing that day.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        mut sites: Vec<InfectionSite>,
        input: &StepInput<'_>,
        rng: &mut R,
    ) -> Vec<InfectionSite> {
        if !input.running {
            return self.reset_to_origin(input.origin);
        }
        if input.day == 0 {
            return sites;
        }
        if sites.len() >= self.limits.max_sites {
            debug!(
                "day {}: compacting {} sites to {}",
                input.day,
                sites.len(),
                self.limits.retained_sites
            );
            return self.compact(sites);
        }

        let effective_r0 = input
            .mitigations
            .effective_r0(input.parameters.basic_r0());
        // Never grow past `max_sites`; the next day compacts instead.
        let new_site_count = self
            .new_site_count(sites.len(), effective_r0)
            .min(self.limits.max_sites - sites.len());
        let spread_distance = self.limits.spread_distance(input.mitigations);
        trace!(
            "day {}: effective R0 {effective_r0:.3}, spawning {new_site_count} sites within {spread_distance} degrees",
            input.day
        );

        let mut new_sites = Vec::with_capacity(new_site_count);
        for _ in 0..new_site_count {
            if sites.is_empty() {
                break;
            }
            let source = &sites[rng.random_range(0..sites.len())];
            new_sites.push(self.spawn_near(source, input.day, spread_distance, rng));
        }

        sites.extend(new_sites);
        sites
    }

    fn spawn_near<R: Rng + ?Sized>(
        &self,
        source: &InfectionSite,
        day: u32,
        spread_distance: f64,
        rng: &mut R,
    ) -> InfectionSite {
        let source = to_geo(&source.position, self.limits.marker_altitude);
        let lat = source.lat + (rng.random::<f64>() - 0.5) * spread_distance;
        let lng = source.lng + (rng.random::<f64>() - 0.5) * spread_distance;

        let max_lat = self.limits.max_abs_latitude;
        InfectionSite {
            position: to_sphere(
                lat.clamp(-max_lat, max_lat),
                lng.clamp(-180.0, 180.0),
                self.limits.marker_altitude,
            ),
            day,
            intensity: rng.random::<f64>() * 0.8 + 0.2,
            radius: rng.random::<f64>() * 0.02 + 0.01,
        }
    }
}

/// [`SpreadEngine::reset_to_origin`] with the default limits.
#[must_use]
pub fn reset_to_origin(origin: GeoPoint) -> Vec<InfectionSite> {
    SpreadEngine::default().reset_to_origin(origin)
}

/// [`SpreadEngine::advance`] with the default limits.
pub fn advance_simulation<R: Rng + ?Sized>(
    sites: Vec<InfectionSite>,
    input: &StepInput<'_>,
    rng: &mut R,
) -> Vec<InfectionSite> {
    SpreadEngine::default().advance(sites, input, rng)
}
