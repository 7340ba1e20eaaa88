//! The `Context` is the single-threaded executor that owns all simulation state.
//!
//! State lives in typed *data plugins* (see [`define_data_plugin!`]) and behavior is
//! expressed as callbacks: either queued to run as soon as possible, or planned to
//! run at a future simulation time. `execute` drains callbacks first, then runs the
//! earliest plan, and repeats until nothing is left or `shutdown` is requested.
use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};

use log::{debug, trace};

use crate::plan::{ExecutionPhase, PlanId, Queue};

/// A type whose single instance owns a data container stored in the `Context`.
pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

/// Defines a unit struct that keys a data container of the given type in the `Context`.
/// The third argument is the expression used to create the container on first access.
#[macro_export]
macro_rules! define_data_plugin {
    ($plugin:ident, $data_container:ty, $default: expr) => {
        #[derive(Copy, Clone)]
        struct $plugin;

        impl $crate::context::DataPlugin for $plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

type Callback = dyn FnOnce(&mut Context);

pub struct Context {
    plan_queue: Queue<Box<Callback>>,
    callback_queue: VecDeque<Box<Callback>>,
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
    current_time: f64,
    shutdown_requested: bool,
}

impl Context {
    #[must_use]
    pub fn new() -> Context {
        Context {
            plan_queue: Queue::new(),
            callback_queue: VecDeque::new(),
            data_plugins: HashMap::new(),
            current_time: 0.0,
            shutdown_requested: false,
        }
    }

    /// Schedules `callback` to run at `time` in the normal phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is not finite or is earlier than the current time.
    pub fn add_plan(&mut self, time: f64, callback: impl FnOnce(&mut Context) + 'static) -> PlanId {
        self.add_plan_with_phase(time, callback, ExecutionPhase::Normal)
    }

    /// Schedules `callback` to run at `time` in the given phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is not finite or is earlier than the current time.
    pub fn add_plan_with_phase(
        &mut self,
        time: f64,
        callback: impl FnOnce(&mut Context) + 'static,
        phase: ExecutionPhase,
    ) -> PlanId {
        assert!(
            time.is_finite() && time >= self.current_time,
            "Time is invalid: {time}"
        );
        self.plan_queue.add_plan(time, Box::new(callback), phase)
    }

    /// Cancels a plan that has not run yet.
    ///
    /// # Panics
    ///
    /// Panics if the plan has already run or been cancelled.
    pub fn cancel_plan(&mut self, id: &PlanId) {
        self.plan_queue.cancel_plan(id);
    }

    #[must_use]
    pub fn is_plan_pending(&self, id: &PlanId) -> bool {
        self.plan_queue.is_pending(id)
    }

    #[must_use]
    pub fn remaining_plan_count(&self) -> usize {
        self.plan_queue.remaining_plan_count()
    }

    /// Queues `callback` to run before the next plan.
    pub fn queue_callback(&mut self, callback: impl FnOnce(&mut Context) + 'static) {
        self.callback_queue.push_back(Box::new(callback));
    }

    /// Returns the data container for `plugin`, creating it on first access.
    ///
    /// # Panics
    ///
    /// Panics if two plugins share a `TypeId` with different container types, which
    /// `define_data_plugin!` rules out.
    pub fn get_data_mut<T: DataPlugin>(&mut self, _plugin: T) -> &mut T::DataContainer {
        self.data_plugins
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::create_data_container()))
            .downcast_mut::<T::DataContainer>()
            .expect("data plugin container has the wrong type")
    }

    /// Returns the data container for `plugin`, or `None` if nothing has created it yet.
    #[must_use]
    pub fn get_data<T: DataPlugin>(&self, _plugin: T) -> Option<&T::DataContainer> {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .and_then(|container| container.downcast_ref::<T::DataContainer>())
    }

    #[must_use]
    pub fn get_current_time(&self) -> f64 {
        self.current_time
    }

    /// Stops `execute` after the callback currently running. Pending plans and
    /// callbacks are discarded.
    pub fn shutdown(&mut self) {
        debug!("shutdown requested at t={}", self.current_time);
        self.shutdown_requested = true;
    }

    pub fn execute(&mut self) {
        trace!("entering event loop");
        loop {
            if self.shutdown_requested {
                self.callback_queue.clear();
                self.plan_queue.clear();
                self.shutdown_requested = false;
                break;
            }

            if let Some(callback) = self.callback_queue.pop_front() {
                callback(self);
                continue;
            }

            match self.plan_queue.get_next_plan() {
                Some(plan) => {
                    self.current_time = plan.time;
                    (plan.data)(self);
                }
                None => break,
            }
        }
        trace!("event loop finished at t={}", self.current_time);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
