// [libs/domain/handshake/src/lib.rs]
mod errors;
mod handshake;
mod query;
mod stages;
mod transport;
mod wire;

pub use errors::{StageFailed, STAGE_ALERT_CHECK, STAGE_REGISTER, STAGE_SIGN};
pub use handshake::{run, run_with_transport};
pub use transport::{HandshakeTransport, HttpRequest, HttpResponse, Method, ReqwestTransport, TransportError};
