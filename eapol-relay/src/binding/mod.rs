//! The capability a forwarding loop needs from a network interface: receive a frame, send a
//! frame. `AfPacketBinding` provides it over a raw `AF_PACKET` socket; tests substitute an
//! in-memory binding.

mod socket;

pub use socket::AfPacketBinding;

use eapol_packets::{MacAddr, PAE_GROUP_ADDR};
use futures::future::BoxFuture;
use std::{fmt, io};

/// Size of the receive buffer. Jumbo frames are truncated to this.
pub const MTU: usize = 1500;

/// How a binding decides which frames reach it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiveFilter {
    /// Accept everything on the wire.
    Promiscuous,
    /// Join reception for one multicast destination address.
    MulticastGroup(MacAddr),
}

impl ReceiveFilter {
    /// The filter selected by the process-wide promiscuous flag.
    pub fn from_promiscuous(promiscuous: bool) -> ReceiveFilter {
        if promiscuous {
            ReceiveFilter::Promiscuous
        } else {
            ReceiveFilter::MulticastGroup(PAE_GROUP_ADDR)
        }
    }
}

impl fmt::Display for ReceiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiveFilter::Promiscuous => f.write_str("promiscuous"),
            ReceiveFilter::MulticastGroup(addr) => write!(f, "multicast {}", addr),
        }
    }
}

pub trait Binding: Send + Sync + 'static {
    /// Name of the interface, as used in log lines.
    fn name(&self) -> &str;

    /// Waits for the next frame, copies it into `buf` and returns its length along with the
    /// sender's hardware address. Frames longer than `buf` are truncated.
    fn recv<'a>(&'a self, buf: &'a mut [u8]) -> BoxFuture<'a, io::Result<(usize, MacAddr)>>;

    /// Writes `frame` onto the wire exactly as given.
    fn send<'a>(&'a self, frame: &'a [u8]) -> BoxFuture<'a, io::Result<usize>>;

    /// Leaves the receive filter. Calling it more than once does nothing.
    fn close(&self) -> io::Result<()>;
}
