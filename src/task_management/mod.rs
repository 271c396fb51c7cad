//! # Task Management System
//!
//! A small worker pool for running chunk generation and chunk meshing off the
//! caller's thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the owning thread and one worker
//!
//! Each worker is a `std::thread` with a dedicated task channel and result
//! channel. Every worker owns one [`MeshScratch`], so mesh tasks never share
//! mask buffers.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands them to workers round-robin, at most
//!    `MAX_TASKS_IN_FLIGHT` per worker, and queues the rest in FIFO order
//! 3. Workers process tasks and send back results
//! 4. Results are handled on the owning thread in `process_completed_tasks()`
//! 5. Handling a result may publish follow-up tasks
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers, context);
//!
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In your main loop:
//! task_manager.process_completed_tasks();
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use crate::meshing::MeshScratch;

use task::{Task, TaskContext, TaskResult};

#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    /// Cleared once the worker thread is found to have exited.
    alive: bool,
    _worker: JoinHandle<()>,
}

impl TaskChannel {
    fn is_available(&self) -> bool {
        self.alive && self.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
    }
}

pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    context: TaskContext,
}

pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Spawns `num_workers` worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads; with 0 every task stays queued
    /// * `context` - State handed to task results on the owning thread
    pub fn new(num_workers: usize, context: TaskContext) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {num_workers} workers, available parallelism: {:?}",
            thread::available_parallelism()
        );

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                let mut scratch = MeshScratch::new();
                while let Ok(task) = task_rx.recv() {
                    let result = task.process(&mut scratch);
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
                debug!("Worker {index} shutting down");
            };

            let worker = thread::Builder::new()
                .name(format!("chunk-worker-{index}"))
                .spawn(task_closure);

            match worker {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    alive: true,
                    _worker: worker,
                }),
                Err(err) => error!("Failed to spawn worker {index}: {err}"),
            }
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            context,
        }
    }

    pub fn context(&self) -> &TaskContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut TaskContext {
        &mut self.context
    }

    /// Whether any worker thread is still running.
    pub fn has_live_workers(&self) -> bool {
        self.channels.iter().any(|channel| channel.alive)
    }

    /// Whether no task is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty()
            && self
                .channels
                .iter()
                .all(|channel| channel.num_tasks_in_flight == 0)
    }

    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                error!("Worker {channel_idx} has exited, requeueing its task");
                channel.alive = false;
                Err(task.0)
            }
        }
    }

    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }

        // Find next available channel using round-robin
        let start_channel = self.current_channel;
        let mut current = start_channel;
        loop {
            if self.channels[current].is_available() {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Hands a task to the next free worker, or queues it.
    ///
    /// # Returns
    /// `true` if a worker took the task, `false` if it was queued.
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let mut task = task;
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                // The worker is gone; try the next one.
                Err(returned) => task = returned,
            }
        }

        self.queued_tasks.push_back(task);
        false
    }

    /// Moves queued tasks to free workers, oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Handles every result the workers have sent so far and publishes the
    /// follow-up tasks they produce.
    pub fn process_completed_tasks(&mut self) {
        let mut tasks_to_queue = Vec::new();
        for (channel_idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                        tasks_to_queue.extend(result.handle_result(&mut self.context));
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.alive {
                            error!(
                                "Worker {channel_idx} stopped with {} task(s) in flight",
                                channel.num_tasks_in_flight
                            );
                        }
                        channel.alive = false;
                        channel.num_tasks_in_flight = 0;
                        break;
                    }
                }
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }
}
