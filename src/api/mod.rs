//! Query core: request composition, the transport session, and the
//! decode pipeline that turns responses into typed records.

mod cancel;
mod client;
mod decode;
mod pipeline;
mod request;
mod session;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::CancelFlag;
pub use client::Client;
pub use decode::{decompress, handle_response, parse, typed_list};
pub use pipeline::QueryFuture;
pub use request::{build_request, Request};
pub use transport::{
    with_checkpoints, Checkpoint, HttpTransport, Next, Progress, Response, Transport,
    PROGRESS_INTERVAL,
};
