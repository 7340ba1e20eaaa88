//! The outbreak driver: the state machine that owns the infection sites and advances them
//! once per simulated day.
//!
//! The driver keeps `{origin, sites, running, day, parameters, mitigations, speed}` in a data
//! plugin on the `Context`. While running, a single tick plan is kept scheduled
//! `1 / simulation_speed` time units ahead; each tick increments the day and calls the spread
//! engine with the `SpreadRng` stream. Stopping cancels the pending tick and puts the origin
//! back as the only site, so idle never shows a paused spread.
use std::fmt::{self, Display};
use std::sync::LazyLock;

use log::{debug, info};
use serde::Serialize;

use crate::config::{clamp_simulation_speed, OutbreakConfig};
use crate::context::Context;
use crate::geo::{to_geo, GeoPoint, SpherePoint, GLOBE_RADIUS};
use crate::parameters::{MitigationMeasures, SimulationParameters};
use crate::plan::PlanId;
use crate::random::ContextRandomExt;
use crate::spread::{InfectionSite, SpreadEngine, StepInput};
use crate::{define_data_plugin, define_rng};

define_rng!(SpreadRng);

/// Days of history kept per run; older summaries are dropped first.
pub const MAX_HISTORY_DAYS: usize = 1000;

/// What the globe overlay shows while a simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutbreakStatus {
    pub day: u32,
    pub running: bool,
    pub site_count: usize,
    pub r0: f64,
    pub effective_r0: f64,
}

impl Display for OutbreakStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Day: {}", self.day)?;
        writeln!(f, "Infections: {}", self.site_count)?;
        write!(f, "R₀: {:.1}", self.r0)
    }
}

/// One entry of the per-run history, recorded after each simulated day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailySummary {
    pub day: u32,
    /// Context time at which the day was simulated.
    pub time: f64,
    pub new_sites: usize,
    pub site_count: usize,
    /// Whether the day compacted the site set instead of growing it.
    pub compacted: bool,
    /// Largest great-circle distance from the origin to any site, in degrees.
    pub farthest_spread: f64,
}

struct OutbreakData {
    engine: SpreadEngine,
    origin: GeoPoint,
    parameters: SimulationParameters,
    mitigations: MitigationMeasures,
    simulation_speed: f64,
    max_days: Option<u32>,
    running: bool,
    day: u32,
    sites: Vec<InfectionSite>,
    /// The pending plan that simulates the next day, first day included.
    next_tick: Option<PlanId>,
    /// The most recent `MAX_HISTORY_DAYS` days of the current run.
    history: Vec<DailySummary>,
}

impl OutbreakData {
    fn new(config: &OutbreakConfig) -> Self {
        let engine = SpreadEngine::new(config.limits.clone());
        let sites = engine.reset_to_origin(config.origin);
        OutbreakData {
            engine,
            origin: config.origin,
            parameters: config.simulation_parameters(),
            mitigations: config.mitigations,
            simulation_speed: clamp_simulation_speed(config.simulation_speed),
            max_days: config.max_days,
            running: false,
            day: 0,
            sites,
            next_tick: None,
            history: Vec::new(),
        }
    }

    fn reset_sites(&mut self) {
        self.sites = self.engine.reset_to_origin(self.origin);
    }

    fn status(&self) -> OutbreakStatus {
        let r0 = self.parameters.basic_r0();
        OutbreakStatus {
            day: self.day,
            running: self.running,
            site_count: self.sites.len(),
            r0,
            effective_r0: self.mitigations.effective_r0(r0),
        }
    }

    fn farthest_spread(&self) -> f64 {
        let altitude = self.engine.limits().marker_altitude;
        self.sites
            .iter()
            .map(|site| self.origin.angular_distance(&to_geo(&site.position, altitude)))
            .fold(0.0, f64::max)
    }
}

define_data_plugin!(
    OutbreakPlugin,
    OutbreakData,
    OutbreakData::new(&OutbreakConfig::default())
);

// What readers see before anything has configured the driver.
static DEFAULT_OUTBREAK: LazyLock<OutbreakData> =
    LazyLock::new(|| OutbreakData::new(&OutbreakConfig::default()));

fn outbreak_data(context: &Context) -> &OutbreakData {
    context
        .get_data(OutbreakPlugin)
        .unwrap_or_else(|| &*DEFAULT_OUTBREAK)
}

/// Runs the spread engine for the current day and stores the result.
fn step_outbreak(context: &mut Context) {
    let time = context.get_current_time();
    let data = context.get_data_mut(OutbreakPlugin);
    if !data.running {
        // Superseded by a stop; idle shows the origin only.
        data.reset_sites();
        return;
    }

    let sites = std::mem::take(&mut data.sites);
    let before = sites.len();
    let engine = data.engine.clone();
    let parameters = data.parameters.clone();
    let mitigations = data.mitigations;
    let input = StepInput {
        day: data.day,
        running: true,
        origin: data.origin,
        parameters: &parameters,
        mitigations: &mitigations,
    };
    let sites = context.sample(SpreadRng, |rng| engine.advance(sites, &input, rng));

    let data = context.get_data_mut(OutbreakPlugin);
    let compacted = sites.len() < before;
    data.sites = sites;
    let summary = DailySummary {
        day: data.day,
        time,
        new_sites: if compacted { 0 } else { data.sites.len() - before },
        site_count: data.sites.len(),
        compacted,
        farthest_spread: data.farthest_spread(),
    };
    debug!(
        "day {}: {} new sites, {} total, farthest {:.1} degrees",
        summary.day, summary.new_sites, summary.site_count, summary.farthest_spread
    );
    if data.history.len() >= MAX_HISTORY_DAYS {
        let excess = data.history.len() + 1 - MAX_HISTORY_DAYS;
        data.history.drain(..excess);
    }
    data.history.push(summary);
}

fn first_day(context: &mut Context) {
    let data = context.get_data_mut(OutbreakPlugin);
    data.next_tick = None;
    if !data.running {
        return;
    }
    step_outbreak(context);
    schedule_next_tick(context);
}

fn tick(context: &mut Context) {
    let data = context.get_data_mut(OutbreakPlugin);
    data.next_tick = None;
    if !data.running {
        return;
    }
    data.day += 1;
    step_outbreak(context);
    schedule_next_tick(context);
}

fn schedule_next_tick(context: &mut Context) {
    let data = outbreak_data(context);
    if data.max_days.is_some_and(|max_days| data.day >= max_days) {
        info!("reached final day {}", data.day);
        return;
    }
    let time = context.get_current_time() + 1.0 / data.simulation_speed;
    let id = context.add_plan(time, tick);
    context.get_data_mut(OutbreakPlugin).next_tick = Some(id);
}

pub trait ContextOutbreakExt {
    /// Replaces the driver's configuration and returns it to idle at day 0.
    fn init_outbreak(&mut self, config: &OutbreakConfig);

    /// Sets the origin. While idle the sites are reset to it immediately; while running it
    /// takes effect at the next reset.
    fn set_origin(&mut self, origin: GeoPoint);

    /// Takes a point where the host's ray hit the globe and makes it the origin. Returns the
    /// new origin, or `None` while running, when the globe does not accept picks.
    fn select_origin(&mut self, hit_point: &SpherePoint) -> Option<GeoPoint>;

    fn set_simulation_parameters(&mut self, parameters: SimulationParameters);

    fn set_mitigation_measures(&mut self, mitigations: MitigationMeasures);

    /// Sets simulated days per unit of context time, clamped to `[0.5, 5]`. An already
    /// scheduled tick keeps its time.
    fn set_simulation_speed(&mut self, speed: f64);

    /// Starts at day 1: the first day is simulated at the current time once the context runs
    /// and later days follow at the simulation speed. With `max_days` of 0 the run starts at
    /// day 0 and simulates nothing. Does nothing if already running.
    fn start_outbreak(&mut self);

    /// Stops ticking and resets the sites to the origin. Does nothing if idle.
    fn stop_outbreak(&mut self);

    fn toggle_outbreak(&mut self);

    fn is_outbreak_running(&self) -> bool;

    fn outbreak_origin(&self) -> GeoPoint;

    fn outbreak_day(&self) -> u32;

    /// Every live site, in insertion order.
    fn infection_sites(&self) -> &[InfectionSite];

    /// The leading slice of sites the renderer draws.
    fn visible_infection_sites(&self) -> &[InfectionSite];

    fn outbreak_status(&self) -> OutbreakStatus;

    /// One summary per simulated day of the current run.
    fn outbreak_history(&self) -> &[DailySummary];
}

impl ContextOutbreakExt for Context {
    fn init_outbreak(&mut self, config: &OutbreakConfig) {
        self.stop_outbreak();
        info!(
            "outbreak configured at ({:.4}, {:.4})",
            config.origin.lat, config.origin.lng
        );
        *self.get_data_mut(OutbreakPlugin) = OutbreakData::new(config);
    }

    fn set_origin(&mut self, origin: GeoPoint) {
        let data = self.get_data_mut(OutbreakPlugin);
        data.origin = if origin.is_finite() {
            origin
        } else {
            GeoPoint::default()
        };
        info!("origin set to ({:.4}, {:.4})", data.origin.lat, data.origin.lng);
        if !data.running {
            data.reset_sites();
        }
    }

    fn select_origin(&mut self, hit_point: &SpherePoint) -> Option<GeoPoint> {
        if self.is_outbreak_running() {
            debug!("ignoring origin pick while running");
            return None;
        }
        let origin = to_geo(hit_point, GLOBE_RADIUS);
        self.set_origin(origin);
        Some(origin)
    }

    fn set_simulation_parameters(&mut self, parameters: SimulationParameters) {
        self.get_data_mut(OutbreakPlugin).parameters = parameters;
    }

    fn set_mitigation_measures(&mut self, mitigations: MitigationMeasures) {
        self.get_data_mut(OutbreakPlugin).mitigations = mitigations;
    }

    fn set_simulation_speed(&mut self, speed: f64) {
        self.get_data_mut(OutbreakPlugin).simulation_speed = clamp_simulation_speed(speed);
    }

    fn start_outbreak(&mut self) {
        let data = self.get_data_mut(OutbreakPlugin);
        if data.running {
            return;
        }
        data.running = true;
        data.history.clear();
        data.reset_sites();
        info!(
            "outbreak started at ({:.4}, {:.4}) with R0 {}",
            data.origin.lat,
            data.origin.lng,
            data.parameters.basic_r0()
        );
        if data.max_days == Some(0) {
            data.day = 0;
            info!("max_days is 0; no day will be simulated");
            return;
        }
        data.day = 1;
        let now = self.get_current_time();
        let id = self.add_plan(now, first_day);
        self.get_data_mut(OutbreakPlugin).next_tick = Some(id);
    }

    fn stop_outbreak(&mut self) {
        let Some(data) = self.get_data(OutbreakPlugin) else {
            return;
        };
        if !data.running {
            return;
        }
        let next_tick = data.next_tick;
        if let Some(id) = next_tick {
            if self.is_plan_pending(&id) {
                self.cancel_plan(&id);
            }
        }
        let data = self.get_data_mut(OutbreakPlugin);
        data.running = false;
        data.next_tick = None;
        data.reset_sites();
        info!("outbreak stopped on day {}", data.day);
    }

    fn toggle_outbreak(&mut self) {
        if self.is_outbreak_running() {
            self.stop_outbreak();
        } else {
            self.start_outbreak();
        }
    }

    fn is_outbreak_running(&self) -> bool {
        outbreak_data(self).running
    }

    fn outbreak_origin(&self) -> GeoPoint {
        outbreak_data(self).origin
    }

    fn outbreak_day(&self) -> u32 {
        outbreak_data(self).day
    }

    fn infection_sites(&self) -> &[InfectionSite] {
        &outbreak_data(self).sites
    }

    fn visible_infection_sites(&self) -> &[InfectionSite] {
        let data = outbreak_data(self);
        let visible = data.engine.limits().visible_sites.min(data.sites.len());
        &data.sites[..visible]
    }

    fn outbreak_status(&self) -> OutbreakStatus {
        outbreak_data(self).status()
    }

    fn outbreak_history(&self) -> &[DailySummary] {
        &outbreak_data(self).history
    }
}
