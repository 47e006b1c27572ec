//! HTTP transport for the pulse market pipeline
//!
//! Every route answers 200; business failures are reported in an `error`
//! field of the JSON body.

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
