pub use crate::config::{load_config, OutbreakConfig};
pub use crate::context::Context;
pub use crate::error::GeoSpreadError;
pub use crate::geo::{to_geo, to_sphere, GeoPoint, SpherePoint};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::outbreak::ContextOutbreakExt;
pub use crate::parameters::{MitigationMeasures, Pathogen, SimulationParameters};
pub use crate::random::ContextRandomExt;
pub use crate::spread::{InfectionSite, SpreadLimits};
pub use crate::{define_data_plugin, define_rng};
