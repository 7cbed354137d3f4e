pub mod sequencer;
pub mod speed;
pub mod tracker;

pub use sequencer::{RequestSequencer, RequestTicket};
pub use speed::{estimate_speed_kmh, FleetMotion, SpeedModel, VehicleMotion};
pub use tracker::{LiveVehicleTracker, PollStatus, Snapshot, SnapshotBuffer, VehicleGlyph};
