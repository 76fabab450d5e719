#![allow(non_camel_case_types)]

use libc;

/// Ethertype of 802.1X Port Access Entity frames (EAPOL).
pub const ETH_P_PAE: u16 = 0x888E;

// from <linux/if_packet.h>
pub(crate) const SOL_PACKET: libc::c_int = 263;
pub(crate) const PACKET_ADD_MEMBERSHIP: libc::c_int = 1;
pub(crate) const PACKET_DROP_MEMBERSHIP: libc::c_int = 2;
pub(crate) const PACKET_MR_MULTICAST: libc::c_ushort = 0;
pub(crate) const PACKET_MR_PROMISC: libc::c_ushort = 1;

/// `struct packet_mreq` from `man 7 packet`.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct packet_mreq {
    pub(crate) mr_ifindex: libc::c_int,
    pub(crate) mr_type: libc::c_ushort,
    pub(crate) mr_alen: libc::c_ushort,
    pub(crate) mr_address: [libc::c_uchar; 8],
}
