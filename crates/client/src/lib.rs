// Cloudflare zone administration client

pub mod transport;
pub mod zone;

pub use transport::{ApiRequest, HttpTransport, Method, Transport};
pub use zone::ZoneClient;
