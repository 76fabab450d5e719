#![cfg(target_os = "linux")]
mod linux;
mod sockets;

#[cfg(feature = "tokio-support")]
mod tokio_sockets;

pub use linux::ETH_P_PAE;
pub use sockets::{interface_index, Addr, BoundSocket, Socket};
#[cfg(feature = "tokio-support")]
pub use tokio_sockets::AsyncBoundSocket;
