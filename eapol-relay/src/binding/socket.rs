use super::{Binding, ReceiveFilter};
use crate::error::{RelayError, Result};
use ::afpacket::AsyncBoundSocket;
use eapol_packets::MacAddr;
use futures::future::BoxFuture;
use std::{
    ffi::CString,
    io,
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::debug;

/// A network interface opened for raw link-layer I/O through an `AF_PACKET` socket.
pub struct AfPacketBinding {
    name: String,
    sock: AsyncBoundSocket,
    filter: Option<ReceiveFilter>,
    closed: AtomicBool,
}

impl AfPacketBinding {
    /// Resolves `name` and opens a socket on it that only receives frames of `ether_type`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(name: &str, ether_type: u16) -> Result<AfPacketBinding> {
        let not_found = |source: io::Error| RelayError::InterfaceNotFound {
            name: name.to_string(),
            source,
        };
        if name.is_empty() {
            return Err(not_found(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty interface name",
            )));
        }
        let iface = CString::new(name).map_err(|err| not_found(err.into()))?;

        // The lookup needs no privilege, opening the socket does. Resolve first.
        let ifindex = ::afpacket::interface_index(&iface).map_err(|source| {
            match source.raw_os_error() {
                Some(libc::ENODEV) | Some(libc::ENXIO) => not_found(source),
                _ if source.kind() == io::ErrorKind::InvalidInput => not_found(source),
                _ => socket_error(name, source),
            }
        })?;
        let sock = AsyncBoundSocket::from_index(ifindex, ether_type)
            .map_err(|source| socket_error(name, source))?;
        debug!("{}: bound to ifindex {}", name, sock.ifindex());

        Ok(AfPacketBinding {
            name: name.to_string(),
            sock,
            filter: None,
            closed: AtomicBool::new(false),
        })
    }

    /// Applies the receive filter. A binding gets exactly one filter for its whole life.
    pub fn set_receive_filter(&mut self, filter: ReceiveFilter) -> Result<()> {
        ensure_no_filter(&self.name, self.filter)?;
        let applied = match filter {
            ReceiveFilter::Promiscuous => self.sock.set_promiscuous(true),
            ReceiveFilter::MulticastGroup(addr) => self.sock.add_multicast(addr.bytes),
        };
        applied.map_err(|source| socket_error(&self.name, source))?;
        self.filter = Some(filter);
        Ok(())
    }
}

fn socket_error(name: &str, source: io::Error) -> RelayError {
    RelayError::Socket {
        name: name.to_string(),
        source,
    }
}

fn ensure_no_filter(name: &str, active: Option<ReceiveFilter>) -> Result<()> {
    match active {
        Some(active) => Err(RelayError::Config(format!(
            "{} already has a {} receive filter",
            name, active
        ))),
        None => Ok(()),
    }
}

impl Binding for AfPacketBinding {
    fn name(&self) -> &str {
        &self.name
    }

    fn recv<'a>(&'a self, buf: &'a mut [u8]) -> BoxFuture<'a, io::Result<(usize, MacAddr)>> {
        Box::pin(async move {
            let (len, addr) = self.sock.recv(buf).await?;
            Ok((len, MacAddr::new(addr.hardware_addr())))
        })
    }

    fn send<'a>(&'a self, frame: &'a [u8]) -> BoxFuture<'a, io::Result<usize>> {
        Box::pin(self.sock.send(frame))
    }

    fn close(&self) -> io::Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match self.filter {
            Some(ReceiveFilter::Promiscuous) => self.sock.set_promiscuous(false),
            Some(ReceiveFilter::MulticastGroup(addr)) => self.sock.drop_multicast(addr.bytes),
            None => Ok(()),
        }
    }
}
