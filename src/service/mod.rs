//! Hosted governance service.
//!
//! Mutations are serialized by a writer gate and, when a store is
//! configured, by the store's lock, which other processes sharing the
//! snapshot also take. Under that lock a mutation starts from the stored
//! snapshot, runs against a copy, persists the copy and only then publishes
//! it. A failed check or a failed write leaves the stored state untouched.
//!
//! Readers clone the published `Arc` and never wait on a writer's disk I/O
//! or see a half-applied operation. Committed events are broadcast to
//! subscribers after publication.

pub mod traits;

use crate::governance::{
    EventQuery, EventRecord, ExecutionOutcome, GovernanceEngine, GovernanceError, MemberCounts,
    Price, Proposal, ProposalId, VoteChoice, WorkflowPhase,
};
use crate::identity::AccountId;
use crate::persistence::{PersistenceError, SnapshotStore};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

pub use traits::{FixedPrice, PriceSource};

/// Buffered events per subscriber before it starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl ServiceError {
    /// The governance rejection, if that is what this is.
    pub fn governance(&self) -> Option<&GovernanceError> {
        match self {
            Self::Governance(e) => Some(e),
            Self::Persistence(_) => None,
        }
    }
}

pub struct GovernanceService {
    published: RwLock<Arc<GovernanceEngine>>,
    writer: Mutex<()>,
    store: Option<Arc<dyn SnapshotStore>>,
    events: broadcast::Sender<EventRecord>,
}

impl GovernanceService {
    /// Host an engine without persistence.
    pub fn new(engine: GovernanceEngine) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            published: RwLock::new(Arc::new(engine)),
            writer: Mutex::new(()),
            store: None,
            events,
        }
    }

    /// Host an engine and persist every committed mutation to `store`.
    pub fn with_store(engine: GovernanceEngine, store: Arc<dyn SnapshotStore>) -> Self {
        let mut service = Self::new(engine);
        service.store = Some(store);
        service
    }

    /// Load the engine from `store`, or build it with `init` and save it when
    /// the store is empty.
    pub async fn open<F>(store: Arc<dyn SnapshotStore>, init: F) -> ServiceResult<Self>
    where
        F: FnOnce() -> Result<GovernanceEngine, GovernanceError>,
    {
        let engine = {
            let _lock = store.lock().await?;
            match store.load().await? {
                Some(engine) => engine,
                None => {
                    let engine = init()?;
                    store.save(&engine).await?;
                    engine
                }
            }
        };
        Ok(Self::with_store(engine, store))
    }

    /// Receiver of every event committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// [`Self::subscribe`] as a stream; records dropped by lag are skipped.
    pub fn event_stream(&self) -> impl Stream<Item = EventRecord> {
        BroadcastStream::new(self.subscribe()).filter_map(|item| item.ok())
    }

    async fn current(&self) -> Arc<GovernanceEngine> {
        self.published.read().await.clone()
    }

    async fn publish(&self, engine: GovernanceEngine) {
        *self.published.write().await = Arc::new(engine);
    }

    async fn mutate<T, F>(&self, operation: &'static str, apply: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut GovernanceEngine) -> Result<T, GovernanceError>,
    {
        let _writer = self.writer.lock().await;
        let _lock = match &self.store {
            Some(store) => Some(store.lock().await?),
            None => None,
        };

        // Another process may have committed since this one last looked.
        let stored = match &self.store {
            Some(store) => store.load().await?,
            None => None,
        };
        let refreshed = stored.is_some();
        let mut next = match stored {
            Some(engine) => engine,
            None => self.current().await.as_ref().clone(),
        };
        let offset = next.events().len();

        let value = match apply(&mut next) {
            Ok(value) => value,
            Err(e) => {
                warn!(operation, error = e.kind(), "operation rejected");
                if refreshed {
                    self.publish(next).await;
                }
                return Err(e.into());
            }
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&next).await {
                warn!(operation, error = %e, "snapshot write failed, operation discarded");
                return Err(e.into());
            }
        }

        let committed: Vec<EventRecord> = next.events().since(offset).to_vec();
        self.publish(next).await;

        for record in committed {
            // No subscribers is not an error.
            let _ = self.events.send(record);
        }
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub async fn add_member(
        &self,
        caller: &AccountId,
        identity: AccountId,
        is_producer: bool,
    ) -> ServiceResult<()> {
        self.mutate("add_member", |e| e.add_member(caller, identity, is_producer))
            .await
    }

    pub async fn remove_member(&self, caller: &AccountId, identity: &AccountId) -> ServiceResult<()> {
        self.mutate("remove_member", |e| e.remove_member(caller, identity))
            .await
    }

    pub async fn grant_administrator(&self, caller: &AccountId, identity: AccountId) -> ServiceResult<()> {
        self.mutate("grant_administrator", |e| {
            e.grant_administrator(caller, identity)
        })
        .await
    }

    pub async fn revoke_administrator(&self, caller: &AccountId, identity: &AccountId) -> ServiceResult<()> {
        self.mutate("revoke_administrator", |e| {
            e.revoke_administrator(caller, identity)
        })
        .await
    }

    pub async fn start_proposal_registration(&self, caller: &AccountId) -> ServiceResult<()> {
        self.mutate("start_proposal_registration", |e| {
            e.start_proposal_registration(caller)
        })
        .await
    }

    pub async fn create_proposal(&self, caller: &AccountId, value: Price) -> ServiceResult<ProposalId> {
        self.mutate("create_proposal", |e| e.create_proposal(caller, value))
            .await
    }

    pub async fn end_proposal_registration(&self, caller: &AccountId) -> ServiceResult<()> {
        self.mutate("end_proposal_registration", |e| {
            e.end_proposal_registration(caller)
        })
        .await
    }

    pub async fn start_voting_session(&self, caller: &AccountId) -> ServiceResult<()> {
        self.mutate("start_voting_session", |e| e.start_voting_session(caller))
            .await
    }

    pub async fn vote(&self, caller: &AccountId, choice: VoteChoice) -> ServiceResult<()> {
        self.mutate("vote", |e| e.vote(caller, choice)).await
    }

    pub async fn end_voting_session(&self, caller: &AccountId) -> ServiceResult<()> {
        self.mutate("end_voting_session", |e| e.end_voting_session(caller))
            .await
    }

    pub async fn execute_proposal(&self, caller: &AccountId) -> ServiceResult<ExecutionOutcome> {
        self.mutate("execute_proposal", |e| e.execute_proposal(caller))
            .await
    }

    pub async fn reset_workflow(&self, caller: &AccountId) -> ServiceResult<()> {
        self.mutate("reset_workflow", |e| e.reset_workflow(caller))
            .await
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Run a read-only closure against the published engine.
    pub async fn read<T>(&self, f: impl FnOnce(&GovernanceEngine) -> T) -> T {
        let engine = self.current().await;
        f(&engine)
    }

    pub async fn snapshot(&self) -> GovernanceEngine {
        self.read(|e| e.clone()).await
    }

    pub async fn get_vote(&self, proposal_id: ProposalId, voter: &AccountId) -> VoteChoice {
        self.read(|e| e.get_vote(proposal_id, voter)).await
    }

    pub async fn get_proposal(&self, proposal_id: ProposalId) -> Option<Proposal> {
        self.read(|e| e.get_proposal(proposal_id).cloned()).await
    }

    pub async fn phase(&self) -> WorkflowPhase {
        self.read(|e| e.phase()).await
    }

    pub async fn member_counts(&self) -> MemberCounts {
        self.read(|e| e.member_counts()).await
    }

    pub async fn query_events(&self, query: &EventQuery) -> Vec<EventRecord> {
        self.read(|e| e.query_events(query)).await
    }
}

#[async_trait]
impl PriceSource for GovernanceService {
    async fn current_price(&self) -> Price {
        self.read(|e| e.current_price()).await
    }
}
