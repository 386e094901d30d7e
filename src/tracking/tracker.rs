use crate::reconcile::classify::ReturnParams;
use crate::tracking::event::{LineItem, PurchaseEvent};
use crate::tracking::order_store::{OrderStore, PendingOrder};
use crate::tracking::sink::AnalyticsSink;
use crate::tracking::sources::{first_usable, order_from_params};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Checked-and-set as one atomic step before any emission. One latch per
/// tracker instance; a fresh instance gets a fresh latch.
#[derive(Default)]
pub struct TrackLatch {
    fired: AtomicBool,
}

impl TrackLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Recorded,
    AlreadyRecorded,
    NoData,
}

/// Emits at most one purchase event per instance, sourcing the order from
/// whichever channel survived the redirect.
pub struct PurchaseTracker {
    sink: Arc<dyn AnalyticsSink>,
    stores: Vec<Arc<dyn OrderStore>>,
    latch: TrackLatch,
}

impl PurchaseTracker {
    pub fn new(sink: Arc<dyn AnalyticsSink>, stores: Vec<Arc<dyn OrderStore>>) -> Self {
        Self {
            sink,
            stores,
            latch: TrackLatch::new(),
        }
    }

    /// Source precedence: stored slots in configured order, then directly
    /// passed order context, then URL parameters. Every probed slot is
    /// consumed so a later navigation cannot re-emit from stale data.
    pub async fn track(
        &self,
        direct: Option<PendingOrder>,
        params: &ReturnParams,
    ) -> anyhow::Result<TrackingState> {
        if !self.latch.try_acquire() {
            return Ok(TrackingState::AlreadyRecorded);
        }

        let mut candidates = Vec::with_capacity(self.stores.len() + 2);
        for store in &self.stores {
            match store.consume().await {
                Ok(slot) => candidates.push(slot),
                Err(e) => {
                    tracing::warn!("pending-order slot unavailable: {:#}", e);
                    candidates.push(None);
                }
            }
        }
        candidates.push(direct);
        candidates.push(order_from_params(params));

        let Some(order) = first_usable(candidates) else {
            return Ok(TrackingState::NoData);
        };

        let event = build_event(order, params);
        self.sink.record(&event).await?;
        Ok(TrackingState::Recorded)
    }
}

fn build_event(order: PendingOrder, params: &ReturnParams) -> PurchaseEvent {
    let transaction_id = params
        .merchant_transaction_id
        .clone()
        .or_else(|| order.merchant_transaction_id.clone())
        .unwrap_or_else(|| format!("txn_{}", Uuid::new_v4().simple()));

    // Partial data still produces a non-empty item list; suppressing the
    // event would undercount revenue.
    let items = if !order.files.is_empty() {
        order
            .files
            .iter()
            .map(|file| LineItem {
                item_id: file.file_id.clone(),
                item_name: file.name.clone(),
                category: Some("mouza_map".to_string()),
                quantity: 1,
                price_minor: file.price_minor,
            })
            .collect()
    } else {
        let name = order
            .package_name
            .clone()
            .unwrap_or_else(|| "Map files".to_string());
        vec![LineItem {
            item_id: order.package_name.clone().unwrap_or_else(|| "map-files".to_string()),
            item_name: name,
            category: Some("mouza_map".to_string()),
            quantity: params.file_count.unwrap_or(1).max(1),
            price_minor: order.amount_minor,
        }]
    };

    PurchaseEvent {
        transaction_id,
        value_minor: order.amount_minor,
        currency: order.currency,
        items,
        recorded_at: chrono::Utc::now(),
    }
}
