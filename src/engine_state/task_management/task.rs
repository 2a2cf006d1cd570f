//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which runs chunk builds on background threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the thread that owns the world
//! 5. The result can mutate the world and spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the owning thread
//! - Only `handle_result` may touch the `World`

use crate::engine_state::voxels::world::World;

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks own all the data they need. They never see the world; anything they
/// produce is carried back in their result.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a worker thread.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be applied on the world's thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// A trait representing the result of processing a `Task`.
pub trait TaskResult: Send {
    /// Applies the result to the world.
    ///
    /// Called on the thread that owns the world, so this is the only place
    /// task output is allowed to mutate registry state.
    ///
    /// # Returns
    /// New tasks to schedule (can be empty).
    fn handle_result(self: Box<Self>, world: &mut World) -> Vec<Box<dyn Task + Send>>;
}
