use crate::*;
use std::convert::TryInto;

/// Maximum number of stacked VLAN tags looked through before giving up on a frame.
const MAX_VLAN_TAGS: usize = 2;

#[derive(Clone, Debug)]
pub struct EthernetFrame<T: AsRef<[u8]>> {
    pub data: T,
    pub layer2_offset: usize,
    pub payload_offset: usize,
}

impl<T: AsRef<[u8]>> EthernetFrame<T> {
    pub fn from_buffer(frame: T, layer2_offset: usize) -> Result<EthernetFrame<T>, &'static str> {
        // Ethernet II frames must be at least the header, which is 14bytes
        // 0                    6                    12                      14
        // |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
        // An 802.1Q tag sits in front of the EtherType and adds 4 bytes per tag.
        let data = frame.as_ref();
        if data.len() < layer2_offset + 14 {
            return Err("Frame is less than the minimum of 14 bytes");
        }

        let mut payload_offset = layer2_offset + 14;
        let mut tags = 0;
        loop {
            let ether_type = u16::from_be_bytes(
                data[payload_offset - 2..payload_offset].try_into().unwrap(),
            );
            if ether_type != ETHERTYPE_VLAN && ether_type != ETHERTYPE_QINQ {
                break;
            }
            if tags == MAX_VLAN_TAGS {
                return Err("Frame carries too many VLAN tags");
            }
            if data.len() < payload_offset + 4 {
                return Err("Frame is too short for its VLAN tag");
            }
            payload_offset += 4;
            tags += 1;
        }

        Ok(EthernetFrame {
            data: frame,
            layer2_offset,
            payload_offset,
        })
    }

    pub fn dest_mac(&self) -> MacAddr {
        let start = self.layer2_offset;
        MacAddr::new(self.data.as_ref()[start..start + 6].try_into().unwrap())
    }

    pub fn src_mac(&self) -> MacAddr {
        let start = self.layer2_offset + 6;
        MacAddr::new(self.data.as_ref()[start..start + 6].try_into().unwrap())
    }

    /// The EtherType of the payload, after any VLAN tags.
    pub fn ether_type(&self) -> u16 {
        let end = self.payload_offset;
        u16::from_be_bytes(self.data.as_ref()[end - 2..end].try_into().unwrap())
    }

    /// The VLAN id of the outermost tag, if the frame is tagged.
    pub fn vlan_id(&self) -> Option<u16> {
        if self.payload_offset == self.layer2_offset + 14 {
            return None;
        }
        let tci_offset = self.layer2_offset + 14;
        let tci = u16::from_be_bytes(
            self.data.as_ref()[tci_offset..tci_offset + 2]
                .try_into()
                .unwrap(),
        );
        Some(tci & 0x0fff)
    }

    pub fn payload(&self) -> &[u8] {
        &self.data.as_ref()[self.payload_offset..]
    }
}

impl EthernetFrame<Vec<u8>> {
    /// Returns an empty EthernetFrame where all values all populated to zero. This function allocates a
    /// new array to hold the header.
    pub fn empty() -> EthernetFrame<Vec<u8>> {
        EthernetFrame::from_buffer(vec![0; 14], 0).unwrap()
    }

    pub fn set_dest_mac(&mut self, mac: MacAddr) {
        let start = self.layer2_offset;
        self.data[start..start + 6].copy_from_slice(&mac.bytes);
    }

    pub fn set_src_mac(&mut self, mac: MacAddr) {
        let start = self.layer2_offset + 6;
        self.data[start..start + 6].copy_from_slice(&mac.bytes);
    }

    pub fn set_ether_type(&mut self, ether_type: u16) {
        let end = self.payload_offset;
        self.data[end - 2..end].copy_from_slice(&ether_type.to_be_bytes());
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.data.truncate(self.payload_offset);
        self.data.extend_from_slice(payload);
    }

    pub fn encap_eapol(eapol: EapolFrame<Vec<u8>>) -> EthernetFrame<Vec<u8>> {
        let mut frame = EthernetFrame::empty();
        frame.set_payload(&eapol.data[eapol.eapol_offset..]);
        frame.set_ether_type(ETHERTYPE_EAPOL);
        frame
    }
}

/// EthernetFrames are considered the same if they have the same data from the layer 2
/// header and onward. This function does not consider the data before the start of the
/// Ethernet header
impl<T: AsRef<[u8]>> PartialEq for EthernetFrame<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data.as_ref()[self.layer2_offset..] == other.data.as_ref()[other.layer2_offset..]
    }
}

impl<T: AsRef<[u8]>> Eq for EthernetFrame<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethernet_frame() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6, 0, 0];
        let frame = EthernetFrame::from_buffer(&data[..], 0).unwrap();
        assert_eq!(
            frame.dest_mac(),
            MacAddr::new([0xde, 0xad, 0xbe, 0xef, 0xff, 0xff])
        );
        assert_eq!(frame.src_mac(), MacAddr::new([1, 2, 3, 4, 5, 6]));
        assert_eq!(frame.ether_type(), 0);
        assert_eq!(frame.vlan_id(), None);
        assert_eq!(frame.payload().len(), 0);
    }

    #[test]
    fn invalid_data_length() {
        let data: Vec<u8> = vec![0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 1, 2, 3, 4, 5, 6];
        let err = EthernetFrame::from_buffer(data, 0).unwrap_err();
        assert_eq!(err, "Frame is less than the minimum of 14 bytes");
    }

    #[test]
    fn vlan_tagged_frame() {
        let data: Vec<u8> = vec![
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x03, 1, 2, 3, 4, 5, 6, 0x81, 0x00, 0x00, 0x0a, 0x88,
            0x8e, 0x02, 0x01, 0x00, 0x00,
        ];
        let frame = EthernetFrame::from_buffer(&data[..], 0).unwrap();
        assert_eq!(frame.vlan_id(), Some(10));
        assert_eq!(frame.ether_type(), ETHERTYPE_EAPOL);
        assert_eq!(frame.payload(), &[0x02, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn truncated_vlan_tag() {
        let data: Vec<u8> = vec![
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x03, 1, 2, 3, 4, 5, 6, 0x81, 0x00, 0x00,
        ];
        assert!(EthernetFrame::from_buffer(&data[..], 0).is_err());
    }

    #[test]
    fn set_payload() {
        let mut frame = EthernetFrame::empty();
        assert_eq!(frame.payload().len(), 0);

        let new_payload: Vec<u8> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9];
        frame.set_payload(&new_payload);
        assert_eq!(frame.payload(), &new_payload[..]);
        assert_eq!(frame.payload()[2], 3);
    }

    #[test]
    fn set_macs() {
        let mut frame = EthernetFrame::empty();
        let new_dest = MacAddr::new([0x98, 0x88, 0x18, 0x12, 0xb4, 0xdf]);
        frame.set_dest_mac(new_dest);
        frame.set_src_mac(PAE_GROUP_ADDR);
        assert_eq!(frame.dest_mac(), new_dest);
        assert_eq!(frame.src_mac(), PAE_GROUP_ADDR);
    }

    #[test]
    fn encap_eapol() {
        let frame = EthernetFrame::encap_eapol(EapolFrame::start(2));
        assert_eq!(frame.layer2_offset, 0);
        assert_eq!(frame.payload_offset, 14);
        assert_eq!(frame.ether_type(), ETHERTYPE_EAPOL);
        assert_eq!(frame.payload(), &[0x02, 0x01, 0x00, 0x00]);
    }
}
