// Vehicle actor directory: one live actor per vehicle id, spawned on demand

use crate::config::ActorConfig;
use crate::vehicle::{InitError, VehicleActor, VehicleHandle, VehicleId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};


/// Spawn failures reported by `resolve`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("failed to start actor for vehicle {id} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        id: VehicleId,
        attempts: u32,
        last_error: InitError,
    },
}

/// Builds actor instances for the directory
pub trait ActorFactory: Send + Sync + 'static {
    /// Create a new, not yet started, actor for `id`
    fn create(&self, id: &VehicleId) -> Result<VehicleActor, InitError>;
}

/// Factory producing actors with a fixed history retention
pub struct DefaultActorFactory {
    history_limit: Option<usize>,
}

impl DefaultActorFactory {
    pub fn new(history_limit: Option<usize>) -> Self {
        Self { history_limit }
    }
}

impl ActorFactory for DefaultActorFactory {
    fn create(&self, _id: &VehicleId) -> Result<VehicleActor, InitError> {
        Ok(VehicleActor::new(self.history_limit))
    }
}

/// Write-side view of the directory (resolve or spawn)
pub trait VehicleResolver: Send + Sync {
    fn resolve(&self, id: &VehicleId) -> Result<VehicleHandle, SpawnError>;
}

/// Read-side view of the directory (never spawns)
pub trait VehicleLookup: Send + Sync {
    fn lookup(&self, id: &str) -> Option<VehicleHandle>;

    /// Point-in-time snapshot of registered actors, unspecified order
    fn list_live(&self) -> Vec<VehicleHandle>;

    fn live_count(&self) -> usize;
}

/// Directory of vehicle actors
///
/// The map is the only state shared between ingestion and queries. An actor
/// is started outside any shard guard, then spawned and registered inside a
/// single `entry` call, so concurrent resolves of an unseen id cannot both
/// spawn.
pub struct ActorDirectory {
    pub(crate) actors: DashMap<VehicleId, VehicleHandle>,

    factory: Arc<dyn ActorFactory>,

    mailbox_capacity: usize,

    spawn_max_retries: u32,

    /// Actors spawned since startup
    spawned_total: AtomicU64,
}

impl ActorDirectory {
    /// Create a directory using the default actor factory
    pub fn new(config: &ActorConfig) -> Self {
        Self::with_factory(
            config,
            Arc::new(DefaultActorFactory::new(config.history_limit)),
        )
    }

    /// Create a directory with a custom actor factory
    pub fn with_factory(config: &ActorConfig, factory: Arc<dyn ActorFactory>) -> Self {
        Self {
            actors: DashMap::new(),
            factory,
            mailbox_capacity: config.mailbox_capacity,
            spawn_max_retries: config.spawn_max_retries.max(1),
            spawned_total: AtomicU64::new(0),
        }
    }

    /// Return the actor for `id`, spawning it on first reference
    pub fn resolve(&self, id: &VehicleId) -> Result<VehicleHandle, SpawnError> {
        if let Some(handle) = self.actors.get(id.as_str()) {
            return Ok(handle.clone());
        }

        // Factory, start hook and retries run without holding a shard guard
        let actor = self.start_actor(id)?;

        match self.actors.entry(id.clone()) {
            // Lost the race: the started actor was never spawned and is dropped here
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let handle = actor.spawn(self.mailbox_capacity);
                entry.insert(handle.clone());

                self.spawned_total.fetch_add(1, Ordering::Relaxed);
                debug!(vehicle_id = %id, "Vehicle actor registered");
                Ok(handle)
            }
        }
    }

    /// Run the factory and start hook, retrying up to the configured budget
    fn start_actor(&self, id: &VehicleId) -> Result<VehicleActor, SpawnError> {
        let mut last_error = InitError::Rejected("no attempt made".to_string());

        for attempt in 1..=self.spawn_max_retries {
            let started = self.factory.create(id).and_then(|mut actor| {
                actor.pre_start(id.clone())?;
                Ok(actor)
            });

            match started {
                Ok(actor) => return Ok(actor),
                Err(e) => {
                    warn!(
                        vehicle_id = %id,
                        attempt = attempt,
                        max_attempts = self.spawn_max_retries,
                        error = %e,
                        "Vehicle actor initialization failed"
                    );
                    last_error = e;
                }
            }
        }

        Err(SpawnError::RetriesExhausted {
            id: id.clone(),
            attempts: self.spawn_max_retries,
            last_error,
        })
    }

    /// Existing actor for `id`, if any
    pub fn lookup(&self, id: &str) -> Option<VehicleHandle> {
        self.actors.get(id).map(|h| h.clone())
    }

    /// Snapshot of all registered actors
    pub fn list_live(&self) -> Vec<VehicleHandle> {
        self.actors.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Actors spawned since startup
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total.load(Ordering::Relaxed)
    }

    /// Drop every registered handle.
    ///
    /// Each actor finishes what is already queued, runs its stop hook and exits
    /// once the last outstanding handle is gone.
    pub fn shutdown(&self) {
        let count = self.actors.len();
        self.actors.clear();
        info!(actors = count, "Actor directory shut down");
    }
}

impl VehicleResolver for ActorDirectory {
    fn resolve(&self, id: &VehicleId) -> Result<VehicleHandle, SpawnError> {
        ActorDirectory::resolve(self, id)
    }
}

impl VehicleLookup for ActorDirectory {
    fn lookup(&self, id: &str) -> Option<VehicleHandle> {
        ActorDirectory::lookup(self, id)
    }

    fn list_live(&self) -> Vec<VehicleHandle> {
        ActorDirectory::list_live(self)
    }

    fn live_count(&self) -> usize {
        self.len()
    }
}
