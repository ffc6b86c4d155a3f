pub mod clients;
pub mod correlation;
pub mod extract;
pub mod matcher;
pub mod pending;
pub mod resolver;
pub mod search;

pub use clients::{BookingForwarder, EmitError, FlightSearchClient, SearchError};
pub use correlation::{Coordinator, FirstArrivalRole, HandleError, Outcome};
pub use pending::{PendingBooking, PendingStore};
pub use resolver::FlightResolver;
pub use search::{FlightCandidate, FlightQuery, QueryError};
