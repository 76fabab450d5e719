//! eapol-relay forwards IEEE 802.1X EAPOL frames between a WAN interface facing an ONT and a
//! router interface, so that a router of the operator's choice can answer the ONT's
//! authentication handshake. Every other frame is left alone.

/// A binding is one network interface opened for EAPOL: it receives frames for the relay and
/// writes frames handed to it. The relay only talks to interfaces through the `Binding` trait, so
/// tests run the full forwarding logic against in-memory bindings.
pub mod binding;

/// Version and build stamp printed by `--version`.
pub mod build_info;

/// Decides whether raw bytes are an EAPOL frame and extracts the header fields used in log lines.
pub mod classify;

/// Command line parsing into a validated `RelayConfig`.
pub mod config;

/// Owns both bindings and runs one forwarding loop per direction until asked to stop.
pub mod engine;

pub mod error;

/// A forwarding loop reads from one binding, drops everything that is not EAPOL and writes the
/// rest unchanged to the other binding. Read faults back off and retry, write faults drop the
/// frame.
pub mod forward;

/// Keeps a second relay from starting on the same host.
pub mod lock;

/// Console or syslog output for `tracing`.
pub mod logging;

pub mod shutdown;
