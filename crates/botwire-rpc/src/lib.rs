//! Request marshalling and dispatch for the Bot API.
//!
//! Every API operation runs through the same pipeline:
//!
//! 1. a [`ParameterBag`] of scalars, entities, lists and file references is
//!    normalized into a [`TransportRequest`] ([`normalize`])
//! 2. a [`Transport`] sends it exactly once
//! 3. the response envelope is unwrapped and the `result` decoded into at
//!    most one declared [`ResultShape`] ([`Dispatcher`])
//!
//! All failures surface as [`Error`].
//!
//! # Architecture
//!
//! - [`protocol`]: parameter, request and response shapes
//! - [`normalize`]: parameter bag to transport request
//! - [`dispatch`]: one call end to end
//! - [`transport`]: the network boundary and the HTTPS implementation
//! - [`methods`]: generated typed operations
//! - [`client`]: the [`Bot`] client
//! - [`config`]: config file and environment handling
//! - [`error`]: error types
//!
//! # Example
//!
//! ```no_run
//! use botwire_rpc::{Bot, TransportConfig};
//! use botwire_rpc::methods::SendMessage;
//! use botwire_types::ParseMode;
//!
//! # async fn example() -> botwire_rpc::Result<()> {
//! let bot = Bot::new(TransportConfig::new("123456:ABC-DEF"))?;
//!
//! let me = bot.get_me().await?;
//! println!("Running as @{}", me.username.unwrap_or_default());
//!
//! let sent = bot
//!     .execute(SendMessage::new(-1001234567890_i64, "<b>hello</b>").parse_mode(ParseMode::Html))
//!     .await?;
//! println!("Sent message {}", sent.message_id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod methods;
pub mod normalize;
pub mod protocol;
pub mod transport;

pub use client::Bot;
pub use config::{Config, ConfigError};
pub use dispatch::{Dispatcher, unwrap_envelope};
pub use error::{Error, Result, TransportError};
pub use methods::Method;
pub use normalize::{normalize, resolve_file};
pub use protocol::{
    ApiResponse, FilePart, IntoParam, ParamValue, ParameterBag, PlainData, Reply, ResultShape,
    Returns, TransportRequest, TransportValue,
};
pub use transport::{HttpTransport, Transport, TransportConfig};
