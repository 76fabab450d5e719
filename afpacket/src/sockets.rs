#![deny(missing_docs)]

use crate::linux;
use libc;
use std::{
    ffi::CStr,
    fmt, io,
    mem::{self, MaybeUninit},
    os::unix::io::{AsRawFd, RawFd},
};

/// The link-layer address a frame was received from.
#[derive(Clone, Copy)]
pub struct Addr {
    inner: libc::sockaddr_ll,
}

impl Addr {
    /// Index of the interface the frame arrived on.
    pub fn ifindex(&self) -> i32 {
        self.inner.sll_ifindex
    }

    /// Ethertype the kernel matched the frame with.
    pub fn protocol(&self) -> u16 {
        u16::from_be(self.inner.sll_protocol)
    }

    /// Hardware address of the sender. Only Ethernet-sized addresses are meaningful here.
    pub fn hardware_addr(&self) -> [u8; 6] {
        let mut bytes = [0; 6];
        let len = (self.inner.sll_halen as usize).min(bytes.len());
        bytes[..len].copy_from_slice(&self.inner.sll_addr[..len]);
        bytes
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Addr")
            .field("ifindex", &self.ifindex())
            .field("protocol", &format_args!("{:#06x}", self.protocol()))
            .field("hardware_addr", &self.hardware_addr())
            .finish()
    }
}

/// Represents an unbound `AF_PACKET` socket.  At this phase of a socket's lifecycle, it can be
/// configured.
pub struct Socket {
    fd: libc::c_int,
    protocol: u16,
}

/// Represents a bound `AF_PACKET` socket. At this phase of a socket's lifecycle, it can be read
/// to/written from.
pub struct BoundSocket {
    fd: libc::c_int,
    send_addr: libc::sockaddr_ll,
}

/// Looks up the index of a network interface by name. Unlike opening a socket, this needs no
/// privilege, so a missing interface is reported as `ENODEV` even for unprivileged callers.
pub fn interface_index(iface: impl AsRef<CStr>) -> io::Result<i32> {
    let name = iface.as_ref();
    if name.to_bytes_with_nul().len() > libc::IFNAMSIZ {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "interface name is longer than IFNAMSIZ",
        ));
    }
    // Resources:
    // man 3 if_nametoindex
    let ifindex = unsafe { libc::if_nametoindex(name.as_ptr()) };
    if ifindex == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ifindex as i32)
}

impl Socket {
    /// Creates a new unbound socket that only sees frames carrying the given ethertype.
    pub fn new(protocol: u16) -> io::Result<Self> {
        // This block must be marked as unsafe because it uses FFI with C code. We believe the code
        // in this block to be safe because it does not interact with any memory owned by Rust
        // code, nor does it violate the invariant of the Socket type -- namely, that it return an
        // Err if it fails to initialize.
        let fd = unsafe {
            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#socket
            // man 7 packet
            let fd = libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                libc::c_int::from(protocol.to_be()),
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        Ok(Self { fd, protocol })
    }

    /// Binds the socket to a network interface. This function consumes the `Socket` instance, as
    /// no more configuration options may be safely changed.
    pub fn bind(self, iface: impl AsRef<CStr>) -> io::Result<BoundSocket> {
        let ifindex = interface_index(iface)?;
        self.bind_index(ifindex)
    }

    /// Binds the socket to the interface with the given index, as returned by
    /// `interface_index`.
    pub fn bind_index(self, ifindex: i32) -> io::Result<BoundSocket> {
        // This block is marked as unsafe because it uses FFI, however, we believe it to be safe
        // because it handles FFI failures in accordance with the bound API's conventions and only
        // passes the kernel a fully initialized sockaddr_ll owned by this frame.
        let send_addr = unsafe {
            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#bind
            // man 7 packet regarding sockaddr_ll
            let mut ll: libc::sockaddr_ll = MaybeUninit::zeroed().assume_init();
            ll.sll_family = libc::AF_PACKET as libc::c_ushort;
            ll.sll_protocol = self.protocol.to_be();
            ll.sll_ifindex = ifindex;
            let err = libc::bind(
                self.fd,
                &ll as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            );
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
            ll
        };
        let fd = self.fd;
        // The file descriptor now belongs to the BoundSocket; forget `self` so its Drop does not
        // close it.
        mem::forget(self);
        Ok(BoundSocket { fd, send_addr })
    }

    /// Configures the socket's non-blocking status.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        // Resources used to write syscall code:
        // https://beej.us/guide/bgnet/html/multi/advanced.html#blocking
        // man 2 fcntl
        unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            let new_flags = if nonblocking {
                flags | libc::O_NONBLOCK
            } else {
                flags & (!libc::O_NONBLOCK)
            };
            let err = libc::fcntl(self.fd, libc::F_SETFL, new_flags);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

impl BoundSocket {
    /// Index of the interface this socket is bound to.
    pub fn ifindex(&self) -> i32 {
        self.send_addr.sll_ifindex
    }

    /// Turns promiscuous mode on or off for the bound NIC. The kernel reference-counts this per
    /// membership, so turning it off only undoes what this socket turned on.
    pub fn set_promiscuous(&self, promiscuous: bool) -> io::Result<()> {
        let op = if promiscuous {
            linux::PACKET_ADD_MEMBERSHIP
        } else {
            linux::PACKET_DROP_MEMBERSHIP
        };
        self.membership(op, linux::PACKET_MR_PROMISC, None)
    }

    /// Starts receiving frames sent to the given multicast hardware address.
    pub fn add_multicast(&self, addr: [u8; 6]) -> io::Result<()> {
        self.membership(
            linux::PACKET_ADD_MEMBERSHIP,
            linux::PACKET_MR_MULTICAST,
            Some(addr),
        )
    }

    /// Stops receiving frames sent to the given multicast hardware address.
    pub fn drop_multicast(&self, addr: [u8; 6]) -> io::Result<()> {
        self.membership(
            linux::PACKET_DROP_MEMBERSHIP,
            linux::PACKET_MR_MULTICAST,
            Some(addr),
        )
    }

    fn membership(
        &self,
        op: libc::c_int,
        mr_type: libc::c_ushort,
        addr: Option<[u8; 6]>,
    ) -> io::Result<()> {
        let mut mreq = linux::packet_mreq {
            mr_ifindex: self.ifindex(),
            mr_type,
            mr_alen: 0,
            mr_address: [0; 8],
        };
        if let Some(addr) = addr {
            mreq.mr_alen = addr.len() as libc::c_ushort;
            mreq.mr_address[..addr.len()].copy_from_slice(&addr);
        }
        // Resources:
        // man 7 packet, "Socket options"
        let err = unsafe {
            libc::setsockopt(
                self.fd,
                linux::SOL_PACKET,
                op,
                &mreq as *const _ as *const libc::c_void,
                mem::size_of::<linux::packet_mreq>() as libc::socklen_t,
            )
        };
        if err < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Sends a frame to the NIC. The frame is written exactly as given, including its Ethernet
    /// header.
    pub fn send(&self, frame: &[u8]) -> io::Result<usize> {
        // This block is marked as unsafe because it uses FFI. We believe this code to be safe,
        // because it safely borrows the Rust-owned frame and passes the length of the frame to the
        // libc function, so it should not exhibit any C-side undefined behaviour.
        unsafe {
            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#sendtorecv
            let bytes = libc::sendto(
                self.fd,
                frame.as_ptr() as *const _,
                frame.len(),
                0,
                &self.send_addr as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            );
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(bytes as usize)
            }
        }
    }

    /// Receives a frame from the NIC. Frames longer than `frame` are truncated.
    pub fn recv(&self, frame: &mut [u8]) -> io::Result<(usize, Addr)> {
        // Note comment in `send` call.
        unsafe {
            let mut storage = MaybeUninit::<libc::sockaddr_ll>::zeroed();
            let mut addrlen = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

            // Resources:
            // https://beej.us/guide/bgnet/html/multi/syscalls.html#sendtorecv
            let bytes = libc::recvfrom(
                self.fd,
                frame.as_mut_ptr() as *mut _,
                frame.len(),
                0,
                storage.as_mut_ptr() as *mut libc::sockaddr,
                &mut addrlen,
            );
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok((
                    bytes as usize,
                    Addr {
                        inner: storage.assume_init(),
                    },
                ))
            }
        }
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl AsRawFd for BoundSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn overlong_name_is_rejected() {
        let name = CString::new("x".repeat(libc::IFNAMSIZ)).unwrap();
        let err = interface_index(&name).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn unknown_name_is_enodev() {
        let name = CString::new("eapol-nonexist").unwrap();
        let err = interface_index(&name).err().unwrap();
        assert_eq!(err.raw_os_error(), Some(libc::ENODEV));
    }

    #[test]
    fn loopback_has_an_index() {
        let name = CString::new("lo").unwrap();
        assert!(interface_index(&name).unwrap() > 0);
    }

    #[test]
    fn addr_reports_hardware_address() {
        let mut inner: libc::sockaddr_ll = unsafe { MaybeUninit::zeroed().assume_init() };
        inner.sll_ifindex = 3;
        inner.sll_protocol = linux::ETH_P_PAE.to_be();
        inner.sll_halen = 6;
        inner.sll_addr = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x11, 0x22];
        let addr = Addr { inner };
        assert_eq!(addr.ifindex(), 3);
        assert_eq!(addr.protocol(), 0x888E);
        assert_eq!(addr.hardware_addr(), [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }
}
