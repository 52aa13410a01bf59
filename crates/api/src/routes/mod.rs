pub mod health;
pub mod metrics;
pub mod pets;
pub mod users;
