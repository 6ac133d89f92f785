//! Subscription infrastructure: repositories and the subscription service.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresSubscriptionRepository;
pub use repository::InMemorySubscriptionRepository;
pub use service::{
    BulkOperation, BulkOperationRequest, CreateSubscriptionRequest, SubscriptionService,
    SubscriptionSummary,
};
