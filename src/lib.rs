//! A geodesic outbreak-spread simulator for globe visualizations
//!
//! Geospread maps geographic coordinates onto a sphere and grows a set of infection
//! sites outward from an origin, one simulated day at a time. The number of new sites
//! each day follows the pathogen's reproduction number after mitigation measures, and
//! the total is kept bounded so a renderer can draw every site.
//!
//! The central object is the `Context`, a small discrete-event executor that holds the
//! simulation state in data plugins and runs planned callbacks in time order. The
//! outbreak driver (see [`outbreak::ContextOutbreakExt`]) schedules one tick per
//! simulated day on the `Context` and feeds the [`spread::SpreadEngine`] from an
//! independently seeded random stream.
//!
//! The engine itself is a pure function of the current sites, the day and the
//! parameters, so hosts that own their own clock can call
//! [`spread::advance_simulation`] directly.
pub mod config;
pub mod context;
pub mod error;
pub mod geo;
pub mod hashing;
pub mod log;
pub mod outbreak;
pub mod parameters;
pub mod plan;
pub mod random;
pub mod runner;
pub mod spread;

pub use crate::config::{load_config, OutbreakConfig};
pub use crate::context::Context;
pub use crate::error::GeoSpreadError;
pub use crate::geo::{
    compute_geo_position, compute_sphere_position, to_geo, to_sphere, GeoPoint, SpherePoint,
};
pub use crate::outbreak::{ContextOutbreakExt, DailySummary, OutbreakStatus};
pub use crate::parameters::{MitigationMeasures, Pathogen, SimulationParameters};
pub use crate::random::ContextRandomExt;
pub use crate::runner::{run_with_args, BaseArgs};
pub use crate::spread::{
    advance_simulation, reset_to_origin, InfectionSite, SpreadEngine, SpreadLimits, StepInput,
};

// Re-exported for use in macros
pub use paste;
pub use rand;

pub mod prelude;
