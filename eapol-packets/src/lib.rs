//! Zero-copy views over the link-layer frames an 802.1X relay cares about: Ethernet (with
//! optional 802.1Q tags), EAPOL and the EAP message an EAPOL-Packet carries.
//!
//! Every view is generic over its storage. Borrowed slices are enough for reading; owned
//! `Vec<u8>` views can additionally be built up with setters.

mod types;
pub use self::types::*;

mod ethernet;
pub use self::ethernet::*;

mod eapol;
pub use self::eapol::*;

mod eap;
pub use self::eap::*;
