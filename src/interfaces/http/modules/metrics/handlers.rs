//! Prometheus exposition endpoint

use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Monitoring",
    responses((status = 200, description = "Prometheus exposition format"))
)]
pub async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
