use tracing::info;

use crate::domain::events::ReservationEvent;
use crate::domain::ports::EventPublisher;

/// Event publisher that surfaces domain events on the tracing pipeline.
pub struct TracingEventPublisher;

impl EventPublisher<ReservationEvent> for TracingEventPublisher {
    fn publish(&self, event: &ReservationEvent) {
        info!(?event, "reservation domain event");
    }
}
