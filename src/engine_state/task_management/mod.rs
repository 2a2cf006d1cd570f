//! # Task Management System
//!
//! This module runs chunk builds on a pool of worker threads while keeping
//! every mutation of the world on the thread that owns it.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, applied to the world
//! - `TaskChannel`: The sending half of one worker's task queue
//!
//! Each worker has its own task channel. All workers report back on a single
//! shared result channel, tagging every result with their index, so the owner
//! can block on "the next result from anyone".
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands them to workers round-robin, up to
//!    `MAX_TASKS_IN_FLIGHT` per worker, and queues the rest in FIFO order
//! 3. Workers process tasks and send back results
//! 4. Results are applied to the world in `process_completed_tasks()` or
//!    `wait_for_completed_task()`
//! 5. Results can spawn new tasks
//!
//! A manager with zero workers runs every task inline on the owning thread
//! when queued tasks are processed.
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In the streaming loop:
//! task_manager.process_completed_tasks(&mut world);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

use super::voxels::world::World;

/// What a worker sends back: its index and the result, or `None` if the
/// task panicked.
type WorkerReport = (usize, Option<Box<dyn TaskResult + Send>>);

/// A communication channel between the owning thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the owning thread to the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and managing worker threads
/// - Distributing tasks across available workers
/// - Collecting results and applying them to the world
/// - Queuing tasks when all workers are busy
///
/// Worker threads exit when the manager is dropped and their task channels
/// close.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    result_receiver: Receiver<WorkerReport>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,

    /// Results of tasks run inline when there are no workers.
    inline_results: VecDeque<Box<dyn TaskResult + Send>>,

    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a slow chunk never holds up work queued behind it on the
/// same worker.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. Zero runs tasks
    ///   inline. Workers that fail to spawn are logged and skipped.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);
        let (result_tx, result_rx) = channel::<WorkerReport>();

        info!(
            "Starting {} chunk workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let result_tx = result_tx.clone();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| task.process())).ok();
                    if result_tx.send((worker_index, result)).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("chunk-worker-{}", worker_index))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    num_tasks_in_flight: 0,
                    _worker: worker,
                }),
                Err(err) => error!("Failed to spawn chunk worker {}: {}", worker_index, err),
            }
        }

        TaskManager {
            channels,
            result_receiver: result_rx,
            queued_tasks: VecDeque::new(),
            inline_results: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of running worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks handed to workers whose results have not been applied yet.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum::<usize>()
            + self.inline_results.len()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Whether no task is queued, running, or waiting to be applied.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker has disconnected
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel that can accept a new task.
    ///
    /// Round-robin starting from the channel after the last one used.
    /// Channels that have reached `MAX_TASKS_IN_FLIGHT` are skipped.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|idx| self.channels[*idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    warn!("Chunk worker {} disconnected; queuing task", channel_idx);
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to free workers, oldest first, until either the
    /// queue is empty or every worker is busy.
    ///
    /// Without workers, runs every queued task inline.
    pub fn process_queued_tasks(&mut self) {
        if self.channels.is_empty() {
            while let Some(task) = self.queued_tasks.pop_front() {
                match panic::catch_unwind(AssertUnwindSafe(|| task.process())) {
                    Ok(result) => self.inline_results.push_back(result),
                    Err(_) => warn!("Inline task panicked; dropping it"),
                }
            }
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Applies every result that is ready without blocking.
    ///
    /// # Returns
    /// The number of results applied.
    pub fn process_completed_tasks(&mut self, world: &mut World) -> usize {
        let mut tasks_to_queue = Vec::new();
        let mut handled = 0;

        while let Some(result) = self.inline_results.pop_front() {
            tasks_to_queue.extend(result.handle_result(world));
            handled += 1;
        }

        while let Ok(report) = self.result_receiver.try_recv() {
            if let Some(result) = self.accept_report(report) {
                tasks_to_queue.extend(result.handle_result(world));
            }
            handled += 1;
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
        handled
    }

    /// Blocks until one more task completes and applies its result.
    ///
    /// Queued tasks are dispatched first so the wait cannot starve.
    ///
    /// # Returns
    /// `false` if nothing was queued or running, so there was nothing to
    /// wait for.
    pub fn wait_for_completed_task(&mut self, world: &mut World) -> bool {
        self.process_queued_tasks();

        if let Some(result) = self.inline_results.pop_front() {
            for task in result.handle_result(world) {
                self.publish_task(task);
            }
            return true;
        }

        if self.tasks_in_flight() == 0 {
            return false;
        }

        match self.result_receiver.recv() {
            Ok(report) => {
                if let Some(result) = self.accept_report(report) {
                    for task in result.handle_result(world) {
                        self.publish_task(task);
                    }
                }
                true
            }
            Err(_) => {
                error!("All chunk workers disconnected");
                false
            }
        }
    }

    /// Books a worker report against its channel.
    fn accept_report(&mut self, report: WorkerReport) -> Option<Box<dyn TaskResult + Send>> {
        let (worker_index, result) = report;
        if let Some(channel) = self.channels.get_mut(worker_index) {
            channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
        }
        if result.is_none() {
            warn!("Task on chunk worker {} panicked; dropping it", worker_index);
        } else {
            debug!("Chunk worker {} finished a task", worker_index);
        }
        result
    }
}
