// SPDX-License-Identifier: GPL-3.0-only

//! Product lookup state machine
//!
//! One [`ProductLookup`] per product screen. A request is split into
//! [`ProductLookup::begin`], which hands out a [`PendingLookup`] that can run
//! on any task, and [`ProductLookup::apply`], which accepts the result only
//! if it belongs to the latest request and the screen is still mounted.
//! A request whose pending handle, future or completion is dropped without
//! being applied no longer blocks a retry.

use super::{CatalogClient, Product};
use crate::app::scan::ProductCode;
use crate::errors::LookupError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Why a lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailure {
    NotFound,
    Transport,
}

impl LookupFailure {
    /// Message shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            LookupFailure::NotFound => "Product not found",
            LookupFailure::Transport => "Failed to fetch product data",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Loading,
    Error(LookupFailure),
    Ready(Product),
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading)
    }

    pub fn product(&self) -> Option<&Product> {
        match self {
            LookupState::Ready(product) => Some(product),
            _ => None,
        }
    }
}

/// A started catalog request, detached from the screen state
pub struct PendingLookup<C> {
    catalog: Arc<C>,
    code: ProductCode,
    generation: u64,
    unmounted: Arc<AtomicBool>,
    /// Held until the result is applied or abandoned
    token: Arc<()>,
}

impl<C: CatalogClient> PendingLookup<C> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the owning screen is gone
    pub fn is_cancelled(&self) -> bool {
        self.unmounted.load(Ordering::Acquire)
    }

    /// Perform the request
    ///
    /// Returns `None` when the screen was unmounted before the request
    /// started or before it finished.
    pub async fn run(self) -> Option<LookupCompletion> {
        if self.is_cancelled() {
            debug!(code = %self.code, "Screen gone before lookup started");
            return None;
        }
        let result = self.catalog.fetch_product(&self.code).await;
        if self.is_cancelled() {
            debug!(code = %self.code, generation = self.generation, "Dropping lookup result after unmount");
            return None;
        }
        Some(LookupCompletion {
            generation: self.generation,
            result,
            _token: self.token,
        })
    }
}

/// Result of a [`PendingLookup`], to be handed back to [`ProductLookup::apply`]
#[derive(Debug, Clone)]
pub struct LookupCompletion {
    generation: u64,
    result: Result<Product, LookupError>,
    _token: Arc<()>,
}

impl LookupCompletion {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Lookup of one product code for one screen lifetime
pub struct ProductLookup<C> {
    catalog: Arc<C>,
    code: ProductCode,
    state: LookupState,
    generation: u64,
    in_flight: Option<InFlight>,
    unmounted: Arc<AtomicBool>,
}

/// The outstanding request. It stops counting once every handle to it
/// (pending request, running future, completion) is gone.
#[derive(Debug)]
struct InFlight {
    generation: u64,
    alive: Weak<()>,
}

impl<C> std::fmt::Debug for ProductLookup<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductLookup")
            .field("code", &self.code)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("in_flight", &self.live_generation())
            .finish()
    }
}

impl<C> ProductLookup<C> {
    fn live_generation(&self) -> Option<u64> {
        self.in_flight
            .as_ref()
            .filter(|request| request.alive.strong_count() > 0)
            .map(|request| request.generation)
    }
}

impl<C: CatalogClient> ProductLookup<C> {
    pub fn new(catalog: Arc<C>, code: ProductCode) -> Self {
        Self {
            catalog,
            code,
            state: LookupState::Loading,
            generation: 0,
            in_flight: None,
            unmounted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the first request
    ///
    /// `None` if a request was already started; use [`begin_retry`](Self::begin_retry)
    /// to ask again.
    pub fn begin(&mut self) -> Option<PendingLookup<C>> {
        if self.generation > 0 {
            return None;
        }
        self.start()
    }

    /// Start a user-requested retry, unless a request is outstanding
    pub fn begin_retry(&mut self) -> Option<PendingLookup<C>> {
        if self.generation > 0 && self.live_generation().is_none() {
            info!(code = %self.code, "Retrying product lookup");
        }
        self.start()
    }

    fn start(&mut self) -> Option<PendingLookup<C>> {
        if self.is_unmounted() {
            return None;
        }
        if let Some(generation) = self.live_generation() {
            debug!(code = %self.code, generation, "Lookup already in flight");
            return None;
        }
        if let Some(abandoned) = self.in_flight.take() {
            debug!(
                code = %self.code,
                generation = abandoned.generation,
                "Previous lookup was abandoned"
            );
        }

        let token = Arc::new(());
        self.generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            alive: Arc::downgrade(&token),
        });
        self.state = LookupState::Loading;
        Some(PendingLookup {
            catalog: Arc::clone(&self.catalog),
            code: self.code.clone(),
            generation: self.generation,
            unmounted: Arc::clone(&self.unmounted),
            token,
        })
    }

    /// Generation of the outstanding request, if anything still holds it
    /// Apply a finished request; returns whether the state changed
    ///
    /// Results for a superseded request, or arriving after unmount, are
    /// discarded.
    pub fn apply(&mut self, completion: LookupCompletion) -> bool {
        if self.is_unmounted() {
            debug!(code = %self.code, "Discarding lookup result after unmount");
            return false;
        }
        let current = self.in_flight.as_ref().map(|request| request.generation);
        if current != Some(completion.generation) {
            debug!(
                code = %self.code,
                generation = completion.generation,
                current = self.generation,
                "Discarding stale lookup result"
            );
            return false;
        }

        self.in_flight = None;
        self.state = match completion.result {
            Ok(product) => LookupState::Ready(product),
            Err(LookupError::NotFound) => {
                info!(code = %self.code, "Product not in catalog");
                LookupState::Error(LookupFailure::NotFound)
            }
            Err(LookupError::Transport(reason)) => {
                warn!(code = %self.code, %reason, "Product lookup failed");
                LookupState::Error(LookupFailure::Transport)
            }
        };
        true
    }

    /// Run the first request to completion
    pub async fn fetch(&mut self) -> &LookupState {
        if let Some(pending) = self.begin() {
            self.finish(pending).await;
        }
        &self.state
    }

    /// Reset to loading and ask the catalog again
    pub async fn retry(&mut self) -> &LookupState {
        if let Some(pending) = self.begin_retry() {
            self.finish(pending).await;
        }
        &self.state
    }

    async fn finish(&mut self, pending: PendingLookup<C>) {
        if let Some(completion) = pending.run().await {
            self.apply(completion);
        }
    }

    /// Stop accepting results; in-flight requests are dropped when they land
    pub fn unmount(&mut self) {
        if !self.unmounted.swap(true, Ordering::AcqRel) {
            debug!(code = %self.code, "Product lookup unmounted");
        }
        self.in_flight = None;
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::Acquire)
    }

    pub fn is_in_flight(&self) -> bool {
        self.live_generation().is_some()
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn code(&self) -> &ProductCode {
        &self.code
    }
}

impl<C> Drop for ProductLookup<C> {
    fn drop(&mut self) {
        self.unmounted.store(true, Ordering::Release);
    }
}
