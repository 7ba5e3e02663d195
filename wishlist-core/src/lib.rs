//! Wishlist service core: a flat-file card wishlist behind a synchronous
//! JSON request/reply loop.

pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod server;
pub mod services;

pub use config::Config;
pub use error::{WishlistError, WishlistResult};
pub use model::card::{Card, CardPatch};
pub use protocol::{Command, EditFields, Request, Response};
pub use server::{LoopState, MemoryTransport, Service, StdioTransport, TcpTransport, Transport};
pub use services::{dispatcher::Dispatcher, store::RecordStore};
