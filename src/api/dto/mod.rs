//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain documents are returned as-is; these types cover request bodies,
//! query strings and responses that have no domain counterpart.

pub mod account_dto;
pub mod application_dto;
pub mod common_dto;
pub mod payment_dto;
pub mod tuition_dto;

pub use account_dto::*;
pub use application_dto::*;
pub use common_dto::*;
pub use payment_dto::*;
pub use tuition_dto::*;
