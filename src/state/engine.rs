use crate::config::NearbyConfig;
use crate::contact::{validate_new_contact, Contact, NearbyContact, NewContact, ValidationError};
use crate::geo::Coordinate;
use crate::location::{locate, PositionFix, PositionProvider};
use crate::radar::{self, RadarBlip, RadarSurface};
use crate::simulation::{self, SimulationParams};
use crate::state::ticker::run_ticker;
use crate::state::update::{RadarSnapshot, RadarUpdate, TrackingStatus};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

/// Tunables for the engine, usually taken from [`NearbyConfig`]
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub params: SimulationParams,
    pub tick_interval: Duration,
    pub location_timeout: Duration,
    pub fallback: Coordinate,
    pub seed: Option<u64>,
}

impl EngineOptions {
    pub fn from_config(config: &NearbyConfig) -> Self {
        Self {
            params: config.radar.simulation_params(),
            tick_interval: config.radar.tick_interval(),
            location_timeout: config.location.timeout(),
            fallback: config.location.fallback(),
            seed: config.radar.seed,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&NearbyConfig::default())
    }
}

/// Why `start_tracking` produced no session
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// Tracking was stopped while the position was resolving
    Superseded,
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::Superseded => {
                write!(f, "tracking was stopped before the position resolved")
            }
        }
    }
}

impl std::error::Error for TrackingError {}

struct TrackingSession {
    generation: u64,
    fix: PositionFix,
    started_at: DateTime<Utc>,
}

struct RadarState {
    contacts: Vec<Contact>,
    session: Option<TrackingSession>,
    nearby: Vec<NearbyContact>,
    ticks: u64,
}

/// Owns the roster, the user position and the derived nearby set.
///
/// All mutation goes through the methods below; readers get clones.
pub struct RadarEngine {
    state: RwLock<RadarState>,

    options: EngineOptions,

    /// Default position source for `start_tracking`
    provider: Arc<dyn PositionProvider>,

    /// Bumped when a session starts and on every stop; a tick from an older
    /// generation is discarded
    generation: AtomicU64,

    /// Bumped only by `stop_tracking`; a position fix requested before the
    /// latest stop is discarded
    stops: AtomicU64,

    /// Running ticker for the current session
    ticker: Mutex<Option<JoinHandle<()>>>,

    rng: Mutex<StdRng>,

    update_tx: broadcast::Sender<RadarUpdate>,
}

impl RadarEngine {
    pub fn new(
        options: EngineOptions,
        provider: Arc<dyn PositionProvider>,
        contacts: Vec<Contact>,
    ) -> Self {
        let (update_tx, _) = broadcast::channel(256);
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: RwLock::new(RadarState {
                contacts,
                session: None,
                nearby: Vec::new(),
                ticks: 0,
            }),
            options,
            provider,
            generation: AtomicU64::new(0),
            stops: AtomicU64::new(0),
            ticker: Mutex::new(None),
            rng: Mutex::new(rng),
            update_tx,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RadarState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RadarState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn ticker_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn radius_km(&self) -> f64 {
        self.options.params.radius_km
    }

    /// Subscribe to radar updates
    pub fn subscribe(&self) -> broadcast::Receiver<RadarUpdate> {
        self.update_tx.subscribe()
    }

    pub fn snapshot(&self) -> RadarSnapshot {
        let state = self.read();
        RadarSnapshot {
            status: status_of(&state),
            fix: state.session.as_ref().map(|s| s.fix),
            tracking_since: state.session.as_ref().map(|s| s.started_at),
            contacts: state.contacts.clone(),
            nearby: state.nearby.clone(),
            ticks: state.ticks,
        }
    }

    pub fn status(&self) -> TrackingStatus {
        status_of(&self.read())
    }

    pub fn user_position(&self) -> Option<Coordinate> {
        self.read().session.as_ref().map(|s| s.fix.position)
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.read().contacts.clone()
    }

    pub fn contact(&self, contact_id: &str) -> Option<Contact> {
        self.read()
            .contacts
            .iter()
            .find(|c| c.id == contact_id)
            .cloned()
    }

    /// Nearby set from the latest tick (empty while idle)
    pub fn nearby(&self) -> Vec<NearbyContact> {
        self.read().nearby.clone()
    }

    pub fn nearby_contact(&self, contact_id: &str) -> Option<NearbyContact> {
        self.read()
            .nearby
            .iter()
            .find(|n| n.contact.id == contact_id)
            .cloned()
    }

    /// Project the nearby set onto `surface`; None while idle
    pub fn radar(&self, surface: &RadarSurface) -> Option<Vec<RadarBlip>> {
        let state = self.read();
        let session = state.session.as_ref()?;
        Some(radar::project(
            session.fix.position,
            &state.nearby,
            surface,
            self.options.params.radius_km,
        ))
    }

    /// Append a contact to the roster.
    ///
    /// Without an explicit position the contact is placed at the user's
    /// position, or at the fallback coordinate while idle.
    pub fn add_contact(&self, new: NewContact) -> Result<Contact, ValidationError> {
        let contact = {
            let mut state = self.write();
            let origin = state
                .session
                .as_ref()
                .map(|s| s.fix.position)
                .unwrap_or(self.options.fallback);
            let contact = validate_new_contact(new, origin)?;
            state.contacts.push(contact.clone());
            contact
        };

        info!(
            contact_id = %contact.id,
            registered = contact.registered,
            "Contact added"
        );

        let _ = self.update_tx.send(RadarUpdate::ContactAdded {
            contact: contact.clone(),
            timestamp: Utc::now(),
        });

        Ok(contact)
    }

    /// Idle → Tracking.
    ///
    /// Resolves a position from `provider` (or the engine default), falling
    /// back to the configured coordinate, then starts the ticker. Calling
    /// this while already tracking returns the current fix, as does losing a
    /// race with a concurrent start. Only a stop while the position is
    /// resolving makes the request fail.
    pub async fn start_tracking(
        self: &Arc<Self>,
        provider: Option<Arc<dyn PositionProvider>>,
    ) -> Result<PositionFix, TrackingError> {
        let current = self.read().session.as_ref().map(|s| s.fix);
        if let Some(fix) = current {
            return Ok(fix);
        }

        let stops = self.stops.load(Ordering::SeqCst);
        let provider = provider.unwrap_or_else(|| Arc::clone(&self.provider));

        let fix = locate(
            provider.as_ref(),
            self.options.location_timeout,
            self.options.fallback,
        )
        .await;

        let started_at = Utc::now();
        let generation = {
            let mut ticker = self.ticker_slot();
            let mut state = self.write();

            if self.stops.load(Ordering::SeqCst) != stops {
                info!("Discarding position fix for a tracking request stopped while resolving");
                return Err(TrackingError::Superseded);
            }

            if let Some(session) = state.session.as_ref() {
                info!(
                    generation = session.generation,
                    "Concurrent start already tracking, keeping its session"
                );
                return Ok(session.fix);
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.session = Some(TrackingSession {
                generation,
                fix,
                started_at,
            });
            state.nearby.clear();
            state.ticks = 0;
            drop(state);

            if let Some(old) = ticker.take() {
                old.abort();
            }
            *ticker = Some(tokio::spawn(run_ticker(
                Arc::clone(self),
                generation,
                self.options.tick_interval,
            )));
            generation
        };

        info!(
            generation = generation,
            position = %fix.position,
            source = ?fix.source,
            "Tracking started"
        );

        let _ = self.update_tx.send(RadarUpdate::TrackingStarted {
            fix,
            timestamp: started_at,
        });

        Ok(fix)
    }

    /// Tracking → Idle.
    ///
    /// Cancels the ticker and invalidates any in-flight start request.
    /// Returns false if the engine was already idle.
    pub fn stop_tracking(&self) -> bool {
        let was_tracking = {
            let mut ticker = self.ticker_slot();
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.stops.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = ticker.take() {
                handle.abort();
            }

            let mut state = self.write();
            state.nearby.clear();
            state.session.take().is_some()
        };

        if was_tracking {
            info!("Tracking stopped");
            let _ = self.update_tx.send(RadarUpdate::TrackingStopped {
                timestamp: Utc::now(),
            });
        }

        was_tracking
    }

    /// Apply one simulation tick for session `generation`.
    ///
    /// Returns false, without touching state, if that session is no longer
    /// current.
    pub(crate) fn tick_session(&self, generation: u64) -> bool {
        let update = {
            let mut state = self.write();

            let user = match state.session.as_ref() {
                Some(s) if s.generation == generation => s.fix.position,
                _ => return false,
            };
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }

            let now = Utc::now();
            let outcome = {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                simulation::step(&state.contacts, user, &self.options.params, &mut *rng, now)
            };

            state.contacts = outcome.contacts;
            state.nearby = outcome.nearby;
            state.ticks += 1;
            tracing::debug!(tick = state.ticks, nearby = state.nearby.len(), "Radar tick");

            RadarUpdate::Tick {
                tick: state.ticks,
                user_position: user,
                nearby: state.nearby.clone(),
                timestamp: now,
            }
        };

        // No subscribers is fine
        let _ = self.update_tx.send(update);
        true
    }

    /// Generation of the current tracking session, if any
    #[cfg(test)]
    pub(crate) fn session_generation(&self) -> Option<u64> {
        self.read().session.as_ref().map(|s| s.generation)
    }
}

impl Drop for RadarEngine {
    fn drop(&mut self) {
        if let Ok(mut ticker) = self.ticker.lock() {
            if let Some(handle) = ticker.take() {
                handle.abort();
            }
        }
    }
}

fn status_of(state: &RadarState) -> TrackingStatus {
    if state.session.is_some() {
        TrackingStatus::Tracking
    } else {
        TrackingStatus::Idle
    }
}
