use crate::sockets;
use std::{ffi::CStr, io};
use tokio::io::unix::AsyncFd;

/// Represents a bound `AF_PACKET` socket for use with Tokio. At this phase in a
/// socket's lifecycle, it can be read and written from.
///
/// Every operation takes `&self`, so one task may receive while another sends on the
/// same socket through an `Arc`.
pub struct AsyncBoundSocket {
    sock: AsyncFd<sockets::BoundSocket>,
}

impl AsyncBoundSocket {
    /// Constructs an `AsyncBoundSocket` from a network interface name, restricted to frames
    /// carrying `protocol` as their ethertype.
    pub fn from_interface(iface: impl AsRef<CStr>, protocol: u16) -> io::Result<Self> {
        Self::from_index(sockets::interface_index(iface)?, protocol)
    }

    /// Like `from_interface`, for an interface already resolved with `interface_index`.
    pub fn from_index(ifindex: i32, protocol: u16) -> io::Result<Self> {
        let mut sock = sockets::Socket::new(protocol)?;
        sock.set_nonblocking(true)?;
        let sock = sock.bind_index(ifindex)?;
        Ok(Self {
            sock: AsyncFd::new(sock)?,
        })
    }

    /// Index of the interface this socket is bound to.
    pub fn ifindex(&self) -> i32 {
        self.sock.get_ref().ifindex()
    }

    /// Turns promsicuous mode on or off on this NIC. Useful for recieving all packets on an
    /// interface, including those not addressed to the device.
    pub fn set_promiscuous(&self, p: bool) -> io::Result<()> {
        self.sock.get_ref().set_promiscuous(p)
    }

    /// Joins reception of frames addressed to a multicast hardware address.
    pub fn add_multicast(&self, addr: [u8; 6]) -> io::Result<()> {
        self.sock.get_ref().add_multicast(addr)
    }

    /// Leaves reception of frames addressed to a multicast hardware address.
    pub fn drop_multicast(&self, addr: [u8; 6]) -> io::Result<()> {
        self.sock.get_ref().drop_multicast(addr)
    }

    /// Sends a frame, waiting until there is room in the transmit queue.
    pub async fn send(&self, frame: &[u8]) -> io::Result<usize> {
        loop {
            let mut guard = self.sock.writable().await?;
            match guard.try_io(|sock| sock.get_ref().send(frame)) {
                Ok(result) => return result,
                Err(_would_block) => continue,
            }
        }
    }

    /// Receives a frame, waiting until one is available.
    pub async fn recv(&self, frame: &mut [u8]) -> io::Result<(usize, sockets::Addr)> {
        loop {
            let mut guard = self.sock.readable().await?;
            match guard.try_io(|sock| sock.get_ref().recv(frame)) {
                Ok(result) => return result,
                Err(_would_block) => continue,
            }
        }
    }
}
