//! Named, independently seeded random number streams.
//!
//! Each stream is identified by a type created with [`define_rng!`]. Streams are
//! created lazily from the base seed passed to `init_random` plus a hash of the
//! stream's name, so adding draws to one stream never perturbs another.
mod context_ext;
mod macros;

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

pub use context_ext::ContextRandomExt;
pub use macros::define_rng;

use crate::define_data_plugin;
use crate::rand::SeedableRng;

pub trait RngId: Copy + Clone {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// Holds any `SeedableRng`; the concrete type is recovered by downcasting with
// the `RngId`'s associated type.
struct RngHolder {
    rng: Box<dyn Any>,
}

struct RngData {
    base_seed: u64,
    rng_holders: RefCell<HashMap<TypeId, RngHolder>>,
}

// The holders map sits in a RefCell so a stream can be borrowed mutably
// through a shared reference to the Context.
define_data_plugin!(
    RngPlugin,
    RngData,
    RngData {
        base_seed: 0,
        rng_holders: RefCell::new(HashMap::new()),
    }
);
