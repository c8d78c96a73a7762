pub mod codec;
pub mod schema;

pub use codec::*;
pub use schema::*;
