use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub dispatches_total: IntCounterVec,
    pub bookings_in_queue: IntGauge,
    pub dispatch_latency_seconds: HistogramVec,
    pub notifications_total: IntCounterVec,
    pub wallet_rides_remaining: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let dispatches_total = IntCounterVec::new(
            Opts::new("dispatches_total", "Total dispatch fan-outs by outcome"),
            &["outcome"],
        )
        .expect("valid dispatches_total metric");

        let bookings_in_queue =
            IntGauge::new("bookings_in_queue", "Current number of bookings awaiting dispatch")
                .expect("valid bookings_in_queue metric");

        let dispatch_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of dispatch fan-out processing in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let notifications_total = IntCounterVec::new(
            Opts::new(
                "notifications_total",
                "Partner push notifications by outcome",
            ),
            &["outcome"],
        )
        .expect("valid notifications_total metric");

        let wallet_rides_remaining = GaugeVec::new(
            Opts::new(
                "wallet_rides_remaining",
                "Ride credits remaining per partner wallet",
            ),
            &["partner_id"],
        )
        .expect("valid wallet_rides_remaining metric");

        registry
            .register(Box::new(dispatches_total.clone()))
            .expect("register dispatches_total");
        registry
            .register(Box::new(bookings_in_queue.clone()))
            .expect("register bookings_in_queue");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(notifications_total.clone()))
            .expect("register notifications_total");
        registry
            .register(Box::new(wallet_rides_remaining.clone()))
            .expect("register wallet_rides_remaining");

        Self {
            registry,
            dispatches_total,
            bookings_in_queue,
            dispatch_latency_seconds,
            notifications_total,
            wallet_rides_remaining,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
