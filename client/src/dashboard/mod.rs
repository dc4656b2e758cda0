//! Dashboard orchestration
//!
//! Fans out the reads a dashboard needs, lets each one settle into its own
//! [`Slice`] as soon as it completes, and publishes the result through a
//! `watch` channel.
//!
//! Results are tagged with the generation current when the fetch started.
//! [`DashboardOrchestrator::invalidate`] bumps the generation, so anything
//! still in flight at teardown is dropped instead of applied.

pub mod refresh;
pub mod slice;

pub use refresh::RefreshHandle;
pub use slice::{DashboardSnapshot, Mutation, Slice, SliceKind};

use crate::error::RequestResult;
use crate::http::ResilientClient;
use crate::services::{
    AdherenceService, AssessmentApi, ConnectionApi, DayOverview, ProfileApi, SessionApi,
};
use chrono::{Local, Utc};
use peak_partner_shared::{ConnectionStatus, Role};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Per-role dashboard aggregator; clones share state
#[derive(Clone)]
pub struct DashboardOrchestrator {
    client: ResilientClient,
    role: Role,
    state: Arc<watch::Sender<DashboardSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl DashboardOrchestrator {
    pub fn new(client: ResilientClient, role: Role) -> Self {
        let (state, _) = watch::channel(DashboardSnapshot::new(role));
        Self {
            client,
            role,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified after every applied slice update.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.state.subscribe()
    }

    /// Discard every result from fetches started before this call.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Refresh every slice of this role concurrently.
    ///
    /// Each slice is applied the moment its own fetch completes; a slow or
    /// failing fetch does not hold back the others.
    pub async fn refresh_all(&self) {
        let generation = self.generation.load(Ordering::SeqCst);
        debug!(role = %self.role, generation, "Refreshing dashboard");

        tokio::join!(
            self.load(SliceKind::Profile, generation),
            self.load(SliceKind::ClientCount, generation),
            self.load(SliceKind::UpcomingSessions, generation),
            self.load(SliceKind::PendingReschedules, generation),
            self.load(SliceKind::Connections, generation),
            self.load(SliceKind::Assessments, generation),
            self.load(SliceKind::TodayAdherence, generation),
        );
    }

    /// Re-fetch one slice, e.g. after a mutation that only affects it.
    pub async fn refresh_slice(&self, kind: SliceKind) {
        let generation = self.generation.load(Ordering::SeqCst);
        self.load(kind, generation).await;
    }

    /// Re-fetch only the slices `mutation` can have changed. Slices outside
    /// this role are skipped.
    pub async fn after_mutation(&self, mutation: Mutation) {
        let generation = self.generation.load(Ordering::SeqCst);
        debug!(role = %self.role, ?mutation, "Refreshing slices after mutation");

        let mut loads = JoinSet::new();
        for kind in mutation.affected_slices() {
            let dashboard = self.clone();
            let kind = *kind;
            loads.spawn(async move { dashboard.load(kind, generation).await });
        }
        while let Some(joined) = loads.join_next().await {
            if let Err(err) = joined {
                warn!(?mutation, error = %err, "Dashboard refresh task failed");
            }
        }
    }

    async fn load(&self, kind: SliceKind, generation: u64) {
        if !kind.applies_to(self.role) {
            return;
        }

        let client = &self.client;
        match kind {
            SliceKind::Profile => {
                let result = ProfileApi::me(client).await;
                self.settle(kind, generation, result, |s| &mut s.profile);
            }
            SliceKind::ClientCount => {
                let result = ConnectionApi::active_client_count(client).await;
                self.settle(kind, generation, result, |s| &mut s.client_count);
            }
            SliceKind::UpcomingSessions => {
                let result = SessionApi::upcoming_list(client).await;
                self.settle(kind, generation, result, |s| &mut s.upcoming_sessions);
            }
            SliceKind::PendingReschedules => {
                let result = SessionApi::pending_reschedules(client).await;
                self.settle(kind, generation, result, |s| &mut s.pending_reschedules);
            }
            SliceKind::Connections => {
                let result = ConnectionApi::list(client, None).await;
                self.settle(kind, generation, result, |s| &mut s.connections);
            }
            SliceKind::Assessments => {
                let result = AssessmentApi::list(client).await;
                self.settle(kind, generation, result, |s| &mut s.assessments);
            }
            SliceKind::TodayAdherence => {
                let result = self.today_overview().await;
                self.settle(kind, generation, result, |s| &mut s.today);
            }
        }
    }

    /// Adherence for the client's accepted connection, if there is one.
    async fn today_overview(&self) -> RequestResult<Option<DayOverview>> {
        let connections = ConnectionApi::list(&self.client, Some(ConnectionStatus::Accepted)).await?;
        let Some(connection) = connections.first() else {
            return Ok(None);
        };

        let today = Local::now().date_naive();
        let overview = AdherenceService::day_overview(&self.client, connection.id, today).await?;
        Ok(Some(overview))
    }

    fn settle<T>(
        &self,
        kind: SliceKind,
        generation: u64,
        result: RequestResult<T>,
        slice: impl FnOnce(&mut DashboardSnapshot) -> &mut Slice<T>,
    ) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(slice = %kind, generation, "Dropping stale dashboard result");
            return;
        }

        match &result {
            Ok(_) => debug!(slice = %kind, "Dashboard slice refreshed"),
            Err(err) if err.is_auth() => info!(slice = %kind, "Dashboard slice needs sign-in"),
            Err(err) => warn!(slice = %kind, error = %err, "Dashboard slice failed"),
        }

        let now = Utc::now();
        self.state.send_modify(|snapshot| slice(snapshot).apply(result, now));
    }
}
