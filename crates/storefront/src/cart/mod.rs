//! Cart state, backing stores, and the sync orchestrator.
//!
//! # Consistency model
//!
//! The cart runs on a single logical thread of control: UI events issue
//! operations, each of which may suspend at a remote call. Three rules keep
//! the cart consistent without explicit locking at call sites:
//!
//! 1. **One authoritative store.** Identity alone picks the backing store
//!    (remote table when signed in, local snapshot when anonymous); only
//!    [`CartService`] switches it.
//! 2. **Serialized mutations.** add/remove/update/clear take an internal
//!    async mutex for their full duration, so a write-through always acts
//!    on the latest in-memory state and two rapid clicks cannot lose an
//!    update.
//! 3. **Epoch staleness check.** Every identity transition bumps an epoch.
//!    A mutation whose write-through resolves under an older epoch is
//!    discarded instead of being applied to the new identity's cart.
//!
//! Writes go through to the store *before* the in-memory commit: a failed
//! remote write leaves the visible cart exactly as it was.

pub mod local;
pub mod state;
pub mod store;

pub use local::{CART_KEY, CacheError, FileCache, KeyValueCache, MemoryCache};
pub use state::{CartLine, CartState};
pub use store::{CartStore, LocalCartStore, RemoteCartStore, StoreError};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use amastore_core::{Price, ProductId, UserId};

use crate::models::Product;
use crate::supabase::{CartItemsApi, ProductsApi, SupabaseClient};

/// Errors surfaced to the UI layer.
///
/// Every variant is recoverable; the UI shows a notification and lets the
/// user retry. Nothing here should ever crash the caller.
#[derive(Debug, Error)]
pub enum CartError {
    /// The authoritative store failed; in-memory state is unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A hydration pass is still in flight; retry once it settles.
    #[error("cart is still loading")]
    HydrationInProgress,
}

/// Builds the authoritative store for an identity.
type StoreFactory = dyn Fn(Option<UserId>) -> Arc<dyn CartStore> + Send + Sync;

struct CartCell {
    state: CartState,
    identity: Option<UserId>,
    /// Bumped on every identity transition; stale completions compare
    /// against it and discard themselves.
    epoch: u64,
    hydrating: bool,
}

/// The cart sync orchestrator.
///
/// Owns the in-memory [`CartState`], decides which backing store is
/// authoritative, and notifies subscribers after every committed change.
/// Cheaply cloneable; all clones share one cart.
#[derive(Clone)]
pub struct CartService {
    inner: Arc<CartServiceInner>,
}

struct CartServiceInner {
    stores: Box<StoreFactory>,
    cell: Mutex<CartCell>,
    /// Serializes mutations end to end, including their write-through.
    op_lock: tokio::sync::Mutex<()>,
    changes: watch::Sender<CartState>,
}

impl CartService {
    /// Create a service over the hosted backend and a local cache.
    ///
    /// The cart starts empty and anonymous; call [`Self::set_identity`] to
    /// hydrate.
    #[must_use]
    pub fn new(client: &SupabaseClient, cache: Arc<dyn KeyValueCache>) -> Self {
        let items = CartItemsApi::new(client.clone());
        let products = ProductsApi::new(client.clone());

        Self::with_stores(Box::new(move |identity| match identity {
            Some(user) => {
                Arc::new(RemoteCartStore::new(items.clone(), products.clone(), user))
                    as Arc<dyn CartStore>
            }
            None => Arc::new(LocalCartStore::new(cache.clone())) as Arc<dyn CartStore>,
        }))
    }

    /// Create a service with a custom store selection.
    ///
    /// Used by tests and by embedders that bring their own persistence.
    #[must_use]
    pub fn with_stores(stores: Box<StoreFactory>) -> Self {
        let (changes, _) = watch::channel(CartState::empty());

        Self {
            inner: Arc::new(CartServiceInner {
                stores,
                cell: Mutex::new(CartCell {
                    state: CartState::empty(),
                    identity: None,
                    epoch: 0,
                    hydrating: false,
                }),
                op_lock: tokio::sync::Mutex::new(()),
                changes,
            }),
        }
    }

    fn cell(&self) -> MutexGuard<'_, CartCell> {
        self.inner
            .cell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Switch identity and hydrate from the new authoritative store.
    ///
    /// Exactly one hydration pass runs per transition. The prior state
    /// stays visible until the new state is fully assembled, then the swap
    /// is wholesale - never a merge. Mutations in flight across the
    /// transition are discarded when they resolve.
    ///
    /// # Errors
    ///
    /// A load failure leaves the cart empty and returns the error; it never
    /// panics the caller.
    #[instrument(skip(self), fields(identity = ?identity))]
    pub async fn set_identity(&self, identity: Option<UserId>) -> Result<(), CartError> {
        let store = (self.inner.stores)(identity);

        let epoch = {
            let mut cell = self.cell();
            cell.epoch += 1;
            cell.identity = identity;
            cell.hydrating = true;
            cell.epoch
        };

        let loaded = store.load().await;

        {
            let mut cell = self.cell();
            if cell.epoch != epoch {
                // A newer transition superseded this hydration.
                debug!("discarding stale hydration result");
                return Ok(());
            }
            cell.hydrating = false;

            match loaded {
                Ok(state) => {
                    cell.state = state.clone();
                    drop(cell);
                    self.inner.changes.send_replace(state);
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "cart hydration failed; starting empty");
                    cell.state = CartState::empty();
                    drop(cell);
                    self.inner.changes.send_replace(CartState::empty());
                    Err(e.into())
                }
            }
        }
    }

    /// Spawn a task that re-hydrates the cart whenever the identity
    /// provider publishes a change.
    pub fn drive_identity(
        &self,
        mut identities: watch::Receiver<Option<UserId>>,
    ) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            while identities.changed().await.is_ok() {
                let identity = *identities.borrow_and_update();
                if let Err(e) = service.set_identity(identity).await {
                    warn!(error = %e, "cart hydration after identity change failed");
                }
            }
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// On write-through failure the in-memory state is unchanged and the
    /// store error is returned.
    #[instrument(skip(self, product), fields(product = %product.id))]
    pub async fn add(&self, product: Product) -> Result<(), CartError> {
        let _op = self.inner.op_lock.lock().await;
        let (store, epoch, mut candidate) = self.begin()?;

        candidate.add_one(product);
        store.save(&candidate).await?;

        self.commit(epoch, candidate);
        Ok(())
    }

    /// Remove a product's line from the cart.
    ///
    /// Removing a product that is not in the cart is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// On write-through failure the in-memory state is unchanged and the
    /// store error is returned.
    #[instrument(skip(self), fields(product = %product))]
    pub async fn remove(&self, product: ProductId) -> Result<(), CartError> {
        let _op = self.inner.op_lock.lock().await;
        let (store, epoch, mut candidate) = self.begin()?;

        if !candidate.remove(product) {
            return Ok(());
        }
        store.remove(product).await?;

        self.commit(epoch, candidate);
        Ok(())
    }

    /// Set the quantity of an existing line; 0 behaves as [`Self::remove`].
    ///
    /// Updating a product that has no line is a no-op - an update never
    /// inserts.
    ///
    /// # Errors
    ///
    /// On write-through failure the in-memory state is unchanged and the
    /// store error is returned.
    #[instrument(skip(self), fields(product = %product, quantity))]
    pub async fn update_quantity(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(product).await;
        }

        let _op = self.inner.op_lock.lock().await;
        let (store, epoch, mut candidate) = self.begin()?;

        if !candidate.set_quantity(product, quantity) {
            return Ok(());
        }
        store.save(&candidate).await?;

        self.commit(epoch, candidate);
        Ok(())
    }

    /// Empty the cart, in the authoritative store first.
    ///
    /// # Errors
    ///
    /// On write-through failure the in-memory state is unchanged and the
    /// store error is returned.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        let _op = self.inner.op_lock.lock().await;
        let (store, epoch, _) = self.begin()?;

        store.clear().await?;

        self.commit(epoch, CartState::empty());
        Ok(())
    }

    /// Snapshot the current store, epoch, and state for a mutation.
    fn begin(&self) -> Result<(Arc<dyn CartStore>, u64, CartState), CartError> {
        let cell = self.cell();
        if cell.hydrating {
            return Err(CartError::HydrationInProgress);
        }
        let store = (self.inner.stores)(cell.identity);
        Ok((store, cell.epoch, cell.state.clone()))
    }

    /// Commit a candidate state unless the identity changed mid-flight.
    fn commit(&self, epoch: u64, candidate: CartState) {
        let mut cell = self.cell();
        if cell.epoch != epoch {
            debug!("discarding cart mutation; identity changed while write was in flight");
            return;
        }
        cell.state = candidate.clone();
        drop(cell);
        self.inner.changes.send_replace(candidate);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current cart state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.cell().state.clone()
    }

    /// The current identity, if signed in.
    #[must_use]
    pub fn identity(&self) -> Option<UserId> {
        self.cell().identity
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cell().state.item_count()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cell().state.subtotal()
    }

    /// Subscribe to committed state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.changes.subscribe()
    }
}
