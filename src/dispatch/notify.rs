use futures::future::BoxFuture;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Push payload delivered to a partner device for a new booking.
#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    pub booking_id: Uuid,
    pub pickup_address: String,
    pub drop_address: String,
    pub fare: Decimal,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("push endpoint rejected send: {0}")]
    Rejected(String),
}

/// Fire-and-forget push sender. Implementations must not share mutable
/// process state; credentials are injected at construction.
pub trait Notifier: Send + Sync {
    fn send(&self, channel: &str, payload: PushPayload)
        -> BoxFuture<'static, Result<(), NotifyError>>;
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    pub endpoint: String,
    pub api_key: String,
}

/// Default notifier: logs the payload instead of hitting a push gateway.
/// Stands in for the real gateway in local and test deployments.
pub struct LogNotifier {
    config: PushConfig,
}

impl LogNotifier {
    pub fn new(config: PushConfig) -> Self {
        Self { config }
    }
}

impl Notifier for LogNotifier {
    fn send(
        &self,
        channel: &str,
        payload: PushPayload,
    ) -> BoxFuture<'static, Result<(), NotifyError>> {
        let endpoint = self.config.endpoint.clone();
        let channel = channel.to_string();

        Box::pin(async move {
            info!(
                endpoint,
                channel,
                booking_id = %payload.booking_id,
                fare = %payload.fare,
                "push notification sent"
            );
            Ok(())
        })
    }
}
