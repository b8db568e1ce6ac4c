use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::dispatch::notify::Notifier;
use crate::models::booking::Booking;
use crate::models::event::BookingEvent;
use crate::models::partner::{Customer, Partner};
use crate::models::wallet::{PartnerWallet, RechargePlan, WalletTransaction};
use crate::observability::metrics::Metrics;

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub radius_meters: f64,
    /// 0 means unlimited.
    pub max_fanout: usize,
    pub notify_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            radius_meters: 10_000.0,
            max_fanout: 0,
            notify_timeout: Duration::from_secs(3),
        }
    }
}

pub struct AppState {
    pub customers: DashMap<Uuid, Customer>,
    pub partners: DashMap<Uuid, Partner>,
    pub bookings: DashMap<Uuid, Booking>,
    /// Keyed by partner id; one wallet per partner.
    pub wallets: DashMap<Uuid, PartnerWallet>,
    pub transactions: DashMap<Uuid, WalletTransaction>,
    pub plans: Vec<RechargePlan>,
    pub dispatch_tx: mpsc::Sender<Uuid>,
    pub booking_events_tx: broadcast::Sender<BookingEvent>,
    pub notifier: Arc<dyn Notifier>,
    pub dispatch: DispatchSettings,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        dispatch_queue_size: usize,
        event_buffer_size: usize,
        dispatch: DispatchSettings,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, mpsc::Receiver<Uuid>) {
        let (dispatch_tx, dispatch_rx) = mpsc::channel(dispatch_queue_size);
        let (booking_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                customers: DashMap::new(),
                partners: DashMap::new(),
                bookings: DashMap::new(),
                wallets: DashMap::new(),
                transactions: DashMap::new(),
                plans: RechargePlan::catalog(),
                dispatch_tx,
                booking_events_tx,
                notifier,
                dispatch,
                metrics: Metrics::new(),
            },
            dispatch_rx,
        )
    }
}
