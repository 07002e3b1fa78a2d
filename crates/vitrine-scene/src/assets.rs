//! Decoration texture loading.
//!
//! The scene never decodes image data. It sends a [`LoadRequest`] per
//! (entity, zone) and receives an opaque [`TextureHandle`] back, possibly many
//! frames later. Each request carries a ticket so results superseded by a
//! newer request can be told apart and dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use thiserror::Error;
use tracing::debug;
use vitrine_palette::{DecorationRef, EntityId, ZoneId};

/// Opaque handle to a loaded decoration texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Errors from decoration loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset does not exist.
    #[error("decoration asset not found: {0}")]
    NotFound(String),

    /// The asset exists but could not be decoded.
    #[error("failed to decode {asset}: {reason}")]
    Decode { asset: String, reason: String },

    /// The request queue is full; retry on a later cycle.
    #[error("decoration loader queue is full")]
    QueueFull,

    /// The worker thread has stopped.
    #[error("decoration loader worker has shut down")]
    Disconnected,

    /// The worker thread could not be started.
    #[error("failed to spawn decoration loader: {0}")]
    Spawn(#[source] std::io::Error),
}

/// One decoration load.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    /// Monotonic id assigned by the scene.
    pub ticket: u64,
    pub entity: EntityId,
    pub zone: ZoneId,
    pub decoration: DecorationRef,
}

/// A finished decoration load.
#[derive(Debug)]
pub struct LoadResult {
    pub ticket: u64,
    pub entity: EntityId,
    pub zone: ZoneId,
    pub decoration: DecorationRef,
    pub result: Result<TextureHandle, AssetError>,
}

impl LoadResult {
    fn finish(request: LoadRequest, result: Result<TextureHandle, AssetError>) -> Self {
        Self {
            ticket: request.ticket,
            entity: request.entity,
            zone: request.zone,
            decoration: request.decoration,
            result,
        }
    }
}

/// Asynchronous decoration loader contract.
pub trait DecorationLoader {
    /// Queue a load. Must not block.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetError`] if the request could not be queued.
    fn request(&mut self, request: LoadRequest) -> Result<(), AssetError>;

    /// Drain every finished load. Called once per frame.
    fn poll(&mut self) -> Vec<LoadResult>;
}

/// Loader backed by a named worker thread and bounded channels.
///
/// Dropping the loader closes the request channel, which ends the worker.
pub struct ChannelLoader {
    request_sender: Sender<LoadRequest>,
    result_receiver: Receiver<LoadResult>,
    in_flight: Arc<AtomicU64>,
}

impl ChannelLoader {
    /// Start a worker that runs `load` for every request.
    ///
    /// `capacity` bounds both the request queue and the result queue.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Spawn`] if the thread cannot be created.
    pub fn spawn<F>(load: F, capacity: usize) -> Result<Self, AssetError>
    where
        F: Fn(&DecorationRef) -> Result<TextureHandle, AssetError> + Send + 'static,
    {
        let (request_sender, request_receiver) = bounded::<LoadRequest>(capacity.max(1));
        let (result_sender, result_receiver) = bounded::<LoadResult>(capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));
        let worker_in_flight = Arc::clone(&in_flight);

        std::thread::Builder::new()
            .name("decoration-loader".into())
            .spawn(move || {
                while let Ok(request) = request_receiver.recv() {
                    let result = load(&request.decoration);
                    let finished = LoadResult::finish(request, result);
                    worker_in_flight.fetch_sub(1, Ordering::Relaxed);
                    if result_sender.send(finished).is_err() {
                        break;
                    }
                }
                debug!("decoration loader worker exiting");
            })
            .map_err(AssetError::Spawn)?;

        Ok(Self {
            request_sender,
            result_receiver,
            in_flight,
        })
    }

    /// Requests queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }
}

impl DecorationLoader for ChannelLoader {
    fn request(&mut self, request: LoadRequest) -> Result<(), AssetError> {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.request_sender.try_send(request).map_err(|e| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            match e {
                TrySendError::Full(_) => AssetError::QueueFull,
                TrySendError::Disconnected(_) => AssetError::Disconnected,
            }
        })
    }

    fn poll(&mut self) -> Vec<LoadResult> {
        let mut results = Vec::new();
        loop {
            match self.result_receiver.try_recv() {
                Ok(result) => results.push(result),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        results
    }
}

/// Loader that runs `load` synchronously inside `request` and hands the
/// result out on the next `poll`. Deterministic; used by tests and
/// single-threaded hosts.
pub struct InlineLoader<F> {
    load: F,
    ready: Vec<LoadResult>,
    requested: u64,
}

impl<F> InlineLoader<F>
where
    F: FnMut(&DecorationRef) -> Result<TextureHandle, AssetError>,
{
    pub fn new(load: F) -> Self {
        Self {
            load,
            ready: Vec::new(),
            requested: 0,
        }
    }

    /// Total requests received.
    pub fn requested_count(&self) -> u64 {
        self.requested
    }
}

impl<F> DecorationLoader for InlineLoader<F>
where
    F: FnMut(&DecorationRef) -> Result<TextureHandle, AssetError>,
{
    fn request(&mut self, request: LoadRequest) -> Result<(), AssetError> {
        self.requested += 1;
        let result = (self.load)(&request.decoration);
        self.ready.push(LoadResult::finish(request, result));
        Ok(())
    }

    fn poll(&mut self) -> Vec<LoadResult> {
        std::mem::take(&mut self.ready)
    }
}
