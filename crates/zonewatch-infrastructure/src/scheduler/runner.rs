//! One analysis cycle for one zone
//!
//! capture frame -> build request -> dispatch -> enqueue state

use tracing::{Instrument, debug, info, info_span, warn};
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::events::{OutboundMessage, ZoneStatePayload};
use zonewatch_domain::value_objects::{AnalysisRequest, AnalysisResult};

use super::single_flight::InFlightGuard;
use crate::context::ServiceContext;

/// Run a cycle for the zone held by `guard`.
///
/// Reads the configuration snapshot once at the start; a reload during the
/// cycle does not affect it. Errors only for a missing zone or a failed
/// capture. Exhausted providers are a normal, unsuccessful result.
pub async fn run_cycle(context: &ServiceContext, guard: InFlightGuard) -> Result<AnalysisResult> {
    let span = info_span!("zone_cycle", zone = %guard.zone(), sequence = guard.sequence());
    async move {
        let config = context.config()?;
        let zone = config
            .zone(guard.zone())
            .ok_or_else(|| Error::not_found(format!("zone {}", guard.zone())))?;

        let frame = context.frames().capture(&zone.camera_entity).await?;
        debug!(bytes = frame.data.len(), "Frame captured");

        let request = AnalysisRequest::new(zone, frame, guard.sequence());
        let result = context
            .dispatcher()
            .dispatch(config.providers(), &request)
            .await;

        let payload = ZoneStatePayload::from_result(&result, zone.todo_list_entity.clone());
        match OutboundMessage::json(context.topics().zone_state(&zone.name), &payload) {
            Ok(message) => {
                context.enqueue(message);
            }
            Err(e) => warn!(error = %e, "Zone state not serialized"),
        }

        if result.success {
            info!(
                provider = result.provider_id.as_deref().unwrap_or_default(),
                tasks = result.output().map_or(0, |o| o.tasks.len()),
                latency_ms = result.latency.as_millis() as u64,
                "Zone analysis finished"
            );
        } else if let Some(err) = result.error() {
            warn!(
                attempts = result.attempts().len(),
                kind = %err.kind(),
                error = %err,
                "Zone analysis failed"
            );
        }
        drop(guard);
        Ok(result)
    }
    .instrument(span)
    .await
}
