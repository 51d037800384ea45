//! Upstream relay
//!
//! Client side of the `/httpbin` route: fetches a resource from the
//! configured upstream so it can be streamed back as a chunked response.

pub mod upstream;

pub use upstream::{Upstream, UpstreamResponse};
