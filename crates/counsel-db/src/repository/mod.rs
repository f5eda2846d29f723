//! SurrealDB repository implementations.

mod cancellation;
mod rating;
mod session;

pub use cancellation::SurrealCancellationRepository;
pub use rating::SurrealRatingRepository;
pub use session::SurrealSessionRepository;
