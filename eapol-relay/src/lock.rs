use crate::error::{RelayError, Result};
use std::io;
use std::os::linux::net::SocketAddrExt;
use std::os::unix::net::{SocketAddr, UnixListener};

/// Abstract socket name held for the lifetime of the process.
pub const LOCK_NAME: &str = "/run/eapol-relay.lock";

/// Single-instance guard. Binding a name in the abstract Unix socket namespace fails while
/// another process holds it, and the kernel releases it when the holder exits, however it
/// exits.
#[derive(Debug)]
pub struct InstanceLock {
    _listener: UnixListener,
}

impl InstanceLock {
    pub fn acquire(name: &str) -> Result<InstanceLock> {
        let addr = SocketAddr::from_abstract_name(name.as_bytes())?;
        match UnixListener::bind_addr(&addr) {
            Ok(listener) => Ok(InstanceLock {
                _listener: listener,
            }),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse => Err(RelayError::AlreadyRunning),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(test: &str) -> String {
        format!("/run/eapol-relay-test-{}-{}.lock", test, std::process::id())
    }

    #[test]
    fn second_acquire_is_refused() {
        let name = unique_name("refused");
        let _held = InstanceLock::acquire(&name).unwrap();
        match InstanceLock::acquire(&name) {
            Err(RelayError::AlreadyRunning) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn released_on_drop() {
        let name = unique_name("released");
        drop(InstanceLock::acquire(&name).unwrap());
        InstanceLock::acquire(&name).unwrap();
    }
}
