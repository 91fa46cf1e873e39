// Service exports
pub mod friends;
pub mod geocoder;
pub mod memory;
pub mod postgres;
pub mod store;

pub use friends::{FriendService, FriendServiceError, Recorded};
pub use geocoder::{Geocoder, GeocodeError, HttpGeocoder};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use store::{DecisionStore, RecordOutcome, StoreError, UserDirectory};
