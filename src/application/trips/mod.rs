pub mod service;
pub mod snapping;

pub use service::{
    CreateTripInput, ManifestEntry, ReserveInput, SuggestPickupInput, TariffAttachment,
    TripListing, TripService, TripShape,
};
pub use snapping::snap_route_to_stops;
