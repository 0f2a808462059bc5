use crate::ice::IceError;
use metrics::{counter, describe_counter, describe_gauge, gauge};

pub fn register_metrics() {
    IceMetrics::register();
    RtcConfigMetrics::register();
}

pub struct IceMetrics;

impl IceMetrics {
    pub fn refreshed(ice_servers: usize) {
        counter!("turnstile_ice_refresh_total", "status" => "success").increment(1);
        gauge!("turnstile_ice_snapshot_servers").set(ice_servers as f64);
    }

    pub fn refresh_failed(err: &IceError) {
        counter!("turnstile_ice_refresh_total", "status" => "failure").increment(1);
        counter!("turnstile_ice_refresh_failures_total", "reason" => err.as_metric_label())
            .increment(1);
    }

    fn register() {
        describe_counter!(
            "turnstile_ice_refresh_total",
            "Total ICE server refresh cycles, labeled by success/failure"
        );
        describe_counter!(
            "turnstile_ice_refresh_failures_total",
            "ICE server refresh failures by reason"
        );
        describe_gauge!(
            "turnstile_ice_snapshot_servers",
            "Number of ICE servers in the current snapshot"
        );
    }
}

pub struct RtcConfigMetrics;

impl RtcConfigMetrics {
    pub fn served(available: bool) {
        let label = if available { "ok" } else { "unavailable" };
        counter!("turnstile_rtc_config_requests_total", "status" => label).increment(1);
    }

    fn register() {
        describe_counter!(
            "turnstile_rtc_config_requests_total",
            "Requests for the RTC configuration, labeled by whether ICE servers were available"
        );
    }
}
