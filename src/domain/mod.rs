//! Domain layer: the invoice record, the late-penalty schedule, and the ports
//! through which settlement reaches storage and time.

pub mod invoice;
pub mod penalty;
pub mod ports;
