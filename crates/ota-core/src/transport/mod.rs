//! HTTP transport layer for OTA payload delivery.

mod http;
mod mock;
mod traits;

pub use http::HttpTransport;
pub use mock::{MockTransport, RecordedPost};
pub use traits::{EXCERPT_LEN, OtaTransport, PostResponse, TransportError, excerpt};
