use std::fmt;

/// Ethertype of EAPOL frames.
pub const ETHERTYPE_EAPOL: u16 = 0x888E;
/// Ethertype of an 802.1Q VLAN tag.
pub const ETHERTYPE_VLAN: u16 = 0x8100;
/// Ethertype of an 802.1ad service tag.
pub const ETHERTYPE_QINQ: u16 = 0x88A8;

/// The 802.1X Port Access Entity group address EAPOL frames are sent to.
pub const PAE_GROUP_ADDR: MacAddr = MacAddr {
    bytes: [0x01, 0x80, 0xc2, 0x00, 0x00, 0x03],
};

//Most significant byte is 0th
#[derive(Eq, Clone, Copy, Hash, PartialEq)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    pub fn is_multicast(&self) -> bool {
        self.bytes[0] & 0x01 == 0x01
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}
