#![warn(clippy::all, rust_2018_idioms)]

pub mod cloud;
pub mod error;
pub mod memory;
pub mod model;
pub mod service;

pub use cloud::CloudPubsub;
pub use error::{ServiceError, ServiceResult};
pub use memory::InMemoryPubsub;
pub use service::PubsubService;
