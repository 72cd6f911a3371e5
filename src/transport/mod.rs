//! HTTP transport layer for the Gemini streaming client.

mod http;
mod error;
mod reqwest;
mod request;

pub use http::{HttpTransport, HttpMethod, HttpRequest, ChunkedStream};
pub use error::TransportError;
pub use self::reqwest::ReqwestTransport;
pub use request::{stream_generate_content_path, RequestBuilder};
