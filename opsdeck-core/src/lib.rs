pub mod confirm;
pub mod error;
pub mod query;
pub mod roles;
pub mod store;
pub mod users;

pub use error::{CoreError, CoreResult};
