//! A priority queue of timed callbacks
//!
//! Defines a `Queue<T>` that stores items of type `T` sorted by `f64` time and
//! by `ExecutionPhase`, called 'plans'. Adding a plan is *O*(log(*n*)) while
//! cancellation is *O*(1); cancelled plans are skipped lazily on retrieval.
//!
//! `Context` uses this queue to store the periodic day ticks that drive an
//! outbreak, along with any other callback that must run at a future time.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::trace;

/// The phase in which a plan runs relative to other plans scheduled for the
/// same time. Plans in `First` run before `Normal`, which run before `Last`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExecutionPhase {
    First,
    #[default]
    Normal,
    Last,
}

/// A priority queue that stores arbitrary data sorted by time
///
/// When plans are created they are sequentially assigned a `PlanId`. If two
/// plans are scheduled for the same time the one in the earlier phase is
/// placed first; if they also share a phase, the one added first wins.
///
/// The time, id, and phase live in a binary heap of `Entry` objects. The
/// payload is stored in a hash map by plan id, and cancelling a plan removes
/// its payload only.
pub struct Queue<T> {
    queue: BinaryHeap<Entry>,
    data_map: HashMap<u64, T>,
    plan_counter: u64,
}

impl<T> Queue<T> {
    /// Create a new empty `Queue<T>`
    #[must_use]
    pub fn new() -> Queue<T> {
        Queue {
            queue: BinaryHeap::new(),
            data_map: HashMap::new(),
            plan_counter: 0,
        }
    }

    /// Add a plan to the queue at the specified time and phase
    ///
    /// Returns a `PlanId` that can be used to cancel the plan.
    pub fn add_plan(&mut self, time: f64, data: T, phase: ExecutionPhase) -> PlanId {
        trace!("adding plan at {time}");
        let id = self.plan_counter;
        self.queue.push(Entry { time, id, phase });
        self.data_map.insert(id, data);
        self.plan_counter += 1;
        PlanId(id)
    }

    /// Cancel a plan that has been added to the queue
    ///
    /// # Panics
    ///
    /// This function panics if you cancel a plan which has already
    /// been cancelled or executed.
    pub fn cancel_plan(&mut self, id: &PlanId) {
        trace!("cancelling plan {id:?}");
        self.data_map.remove(&id.0).expect("Plan does not exist");
    }

    /// Returns `true` if the plan is still waiting to run.
    #[must_use]
    pub fn is_pending(&self, id: &PlanId) -> bool {
        self.data_map.contains_key(&id.0)
    }

    /// Retrieve the earliest plan in the queue, or `None` if it is empty
    pub fn get_next_plan(&mut self) -> Option<Plan<T>> {
        while let Some(entry) = self.queue.pop() {
            if let Some(data) = self.data_map.remove(&entry.id) {
                return Some(Plan {
                    time: entry.time,
                    data,
                });
            }
        }
        None
    }

    /// The time of the earliest plan that has not been cancelled.
    #[must_use]
    pub fn next_time(&self) -> Option<f64> {
        self.queue
            .iter()
            .filter(|entry| self.data_map.contains_key(&entry.id))
            .max()
            .map(|entry| entry.time)
    }

    /// Drops every remaining plan.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.data_map.clear();
    }

    /// The number of plans that will still run.
    #[must_use]
    pub fn remaining_plan_count(&self) -> usize {
        self.data_map.len()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordering key for a plan. Entries compare in reverse so that the max-heap
/// pops the earliest time, then the earliest phase, then the lowest id.
#[derive(PartialEq, Debug)]
struct Entry {
    time: f64,
    id: u64,
    phase: ExecutionPhase,
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Times are validated as finite before they reach the queue.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.phase.cmp(&self.phase))
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// A unique identifier for a plan added to a `Queue<T>`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlanId(u64);

/// A plan that holds data of type `T` intended to be used at the specified time
pub struct Plan<T> {
    pub time: f64,
    pub data: T,
}
