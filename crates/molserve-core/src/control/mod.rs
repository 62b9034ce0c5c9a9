//! # Command Ingestion and Shutdown
//!
//! Three loops drive a running server:
//!
//! - [`socket::SocketProducer`] accepts one line per TCP connection on a worker thread,
//! - [`console::ConsoleProducer`] reads lines from an async reader,
//! - [`coordinator::ShutdownCoordinator`] polls the [`shutdown::ShutdownFlag`] and tears
//!   the other parts down once it is set.
//!
//! Both producers share the grammar in [`command`]: the quit token, an empty
//! line, or a structure path handed to the session controller.

pub mod command;
pub mod console;
pub mod coordinator;
pub mod error;
pub mod shutdown;
pub mod socket;

pub use command::{Command, DEFAULT_QUIT_TOKEN};
pub use console::{ConsoleConfig, ConsoleExit, ConsoleProducer};
pub use coordinator::ShutdownCoordinator;
pub use error::GatewayError;
pub use shutdown::ShutdownFlag;
pub use socket::{SocketConfig, SocketHandle, SocketProducer};
