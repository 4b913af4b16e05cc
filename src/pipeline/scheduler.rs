//! Background job scheduling for pipeline runs.
//!
//! A full noise-plus-mesh pipeline run is cheap enough to offload but too
//! slow to block an interactive loop. Work is submitted against a
//! [`JobQueue`], runs to completion on its own thread, and is collected
//! by draining the queue once per scheduling tick. Completions are
//! delivered in submission order per queue; no ordering holds across
//! queues. There is no cancellation and no timeout: a submitted job
//! always runs, and its result (or its panic) is always delivered.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use thiserror::Error;

use crate::mesh::{LevelOfDetail, MeshBuffers, MeshError};

use super::{MapData, TerrainGenerator};

/// Identifies a submitted job within its queue.
pub type JobId = u64;

/// Errors surfaced when draining a queue.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("worker thread panicked: {0}")]
    WorkerPanicked(String),
}

/// A finished job handed back by [`JobQueue::drain`].
#[derive(Debug)]
pub struct CompletedJob<T> {
    pub id: JobId,
    pub result: Result<T, JobError>,
}

/// A FIFO queue of background jobs with in-order delivery.
///
/// Results arriving out of order are buffered until every earlier
/// submission has completed, so `drain` never reorders. The payloads are
/// immutable once produced; the channel provides the only mutual
/// exclusion the queue needs.
pub struct JobQueue<T> {
    sender: Sender<(JobId, Result<T, JobError>)>,
    receiver: Receiver<(JobId, Result<T, JobError>)>,
    next_id: JobId,
    next_delivery: JobId,
    arrived: BTreeMap<JobId, Result<T, JobError>>,
}

impl<T: Send + 'static> JobQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            next_id: 0,
            next_delivery: 0,
            arrived: BTreeMap::new(),
        }
    }

    /// Submits a job for background execution and returns its handle.
    ///
    /// A panicking job is reported at drain time as
    /// [`JobError::WorkerPanicked`] rather than being dropped.
    pub fn submit<F>(&mut self, job: F) -> JobId
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job))
                .map_err(|payload| JobError::WorkerPanicked(panic_message(&payload)));
            // The queue may have been dropped; nothing left to deliver to.
            let _ = sender.send((id, result));
        });

        id
    }

    /// Collects every job that can be delivered without violating
    /// submission order. Non-blocking; call once per scheduling tick.
    pub fn drain(&mut self) -> Vec<CompletedJob<T>> {
        while let Ok((id, result)) = self.receiver.try_recv() {
            self.arrived.insert(id, result);
        }

        let mut completed = Vec::new();
        while let Some(result) = self.arrived.remove(&self.next_delivery) {
            completed.push(CompletedJob {
                id: self.next_delivery,
                result,
            });
            self.next_delivery += 1;
        }
        completed
    }

    /// Number of submitted jobs not yet delivered.
    pub fn in_flight(&self) -> usize {
        (self.next_id - self.next_delivery) as usize
    }
}

impl<T: Send + 'static> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The two delivery queues of the terrain pipeline.
///
/// Height data and mesh data complete independently: each queue delivers
/// in its own submission order, and a consumer drains both once per tick.
pub struct TerrainScheduler {
    map_data_jobs: JobQueue<MapData>,
    mesh_jobs: JobQueue<Result<MeshBuffers, MeshError>>,
}

impl TerrainScheduler {
    /// Creates a scheduler with empty queues.
    pub fn new() -> Self {
        Self {
            map_data_jobs: JobQueue::new(),
            mesh_jobs: JobQueue::new(),
        }
    }

    /// Schedules a full height-grid generation run.
    ///
    /// The generator is snapshotted at submission; later configuration
    /// changes do not affect in-flight jobs.
    pub fn request_map_data(&mut self, generator: &TerrainGenerator) -> JobId {
        let mut generator = generator.clone();
        self.map_data_jobs.submit(move || generator.generate_map_data())
    }

    /// Schedules mesh construction for previously generated map data.
    pub fn request_mesh(
        &mut self,
        generator: &TerrainGenerator,
        map_data: MapData,
        lod: LevelOfDetail,
    ) -> JobId {
        let generator = generator.clone();
        self.mesh_jobs
            .submit(move || generator.generate_mesh(&map_data, lod))
    }

    /// Delivers completed height-grid jobs in submission order.
    pub fn drain_map_data(&mut self) -> Vec<CompletedJob<MapData>> {
        self.map_data_jobs.drain()
    }

    /// Delivers completed mesh jobs in submission order.
    pub fn drain_meshes(&mut self) -> Vec<CompletedJob<Result<MeshBuffers, MeshError>>> {
        self.mesh_jobs.drain()
    }

    /// Total jobs submitted but not yet delivered, across both queues.
    pub fn in_flight(&self) -> usize {
        self.map_data_jobs.in_flight() + self.mesh_jobs.in_flight()
    }
}

impl Default for TerrainScheduler {
    fn default() -> Self {
        Self::new()
    }
}
