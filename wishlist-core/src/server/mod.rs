use std::io;
use std::panic::{self, AssertUnwindSafe};

use log::{error, info, warn};
use serde_json::json;

use crate::error::WishlistError;
use crate::protocol::{self, Response};
use crate::services::dispatcher::Dispatcher;

pub mod transport;
pub use transport::{LineTransport, MemoryTransport, StdioTransport, TcpTransport, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Processing,
}

/// The receive/process/reply loop. Owns its transport; one request is in
/// flight at a time.
pub struct Service<T> {
    transport: T,
    dispatcher: Dispatcher,
    state: LoopState,
}

impl<T: Transport> Service<T> {
    pub fn new(transport: T, dispatcher: Dispatcher) -> Self {
        Service {
            transport,
            dispatcher,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Serves until the transport closes. Returns an error only when a reply
    /// cannot be delivered.
    pub fn run(&mut self) -> io::Result<()> {
        info!("wishlist service is listening for requests");
        while self.serve_one()? {}
        info!("request channel closed, shutting down");
        Ok(())
    }

    /// Handles a single request. `Ok(false)` once the transport is closed.
    pub fn serve_one(&mut self) -> io::Result<bool> {
        self.state = LoopState::Idle;

        let received = match self.transport.recv() {
            Ok(Some(line)) => Ok(line),
            Ok(None) => return Ok(false),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(e),
            Err(e) => {
                error!("failed to receive request: {e}");
                return Ok(true);
            }
        };

        self.state = LoopState::Processing;

        let reply = match received {
            Ok(line) => {
                let dispatcher = &self.dispatcher;
                panic::catch_unwind(AssertUnwindSafe(|| protocol::handle(dispatcher, &line)))
                    .unwrap_or_else(|_| {
                        error!("request handler panicked");
                        json!({ "message": "Error: internal service error" }).to_string()
                    })
            }
            Err(e) => {
                warn!("rejected undecodable request: {e}");
                protocol::encode(&Response::error(&WishlistError::InvalidEncoding))
            }
        };

        let sent = self.transport.send(&reply);
        self.state = LoopState::Idle;

        if let Err(e) = sent {
            error!("failed to send reply: {e}");
            return Err(e);
        }

        Ok(true)
    }
}
