pub mod colors;
pub mod dataset;
pub mod flight;
pub mod registration;
pub mod timeline;

pub use colors::{ColorBy, ColorSettings, ColorStore, JsonColorStore};
pub use dataset::{ActivityEntry, FlightDataset};
pub use flight::{Flight, FlightField, FlightPositioning, FlightStatus, FlightType};
pub use registration::{Registration, RegistrationDraft, RegistrationStatus};
pub use timeline::TimelineViewport;
