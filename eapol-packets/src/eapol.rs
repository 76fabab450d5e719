use crate::*;
use std::convert::{TryFrom, TryInto};
use std::fmt;

/// Packet type field of an EAPOL header (IEEE 802.1X-2010, table 11-3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EapolType {
    EapPacket,
    Start,
    Logoff,
    Key,
    EncapsulatedAsfAlert,
    Mka,
    AnnouncementGeneric,
    AnnouncementSpecific,
    AnnouncementReq,
    Unknown(u8),
}

impl From<u8> for EapolType {
    fn from(value: u8) -> Self {
        match value {
            0 => EapolType::EapPacket,
            1 => EapolType::Start,
            2 => EapolType::Logoff,
            3 => EapolType::Key,
            4 => EapolType::EncapsulatedAsfAlert,
            5 => EapolType::Mka,
            6 => EapolType::AnnouncementGeneric,
            7 => EapolType::AnnouncementSpecific,
            8 => EapolType::AnnouncementReq,
            other => EapolType::Unknown(other),
        }
    }
}

impl From<EapolType> for u8 {
    fn from(value: EapolType) -> Self {
        match value {
            EapolType::EapPacket => 0,
            EapolType::Start => 1,
            EapolType::Logoff => 2,
            EapolType::Key => 3,
            EapolType::EncapsulatedAsfAlert => 4,
            EapolType::Mka => 5,
            EapolType::AnnouncementGeneric => 6,
            EapolType::AnnouncementSpecific => 7,
            EapolType::AnnouncementReq => 8,
            EapolType::Unknown(other) => other,
        }
    }
}

impl fmt::Display for EapolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EapolType::EapPacket => f.write_str("EAP-Packet"),
            EapolType::Start => f.write_str("Start"),
            EapolType::Logoff => f.write_str("Logoff"),
            EapolType::Key => f.write_str("Key"),
            EapolType::EncapsulatedAsfAlert => f.write_str("Encapsulated-ASF-Alert"),
            EapolType::Mka => f.write_str("MKA"),
            EapolType::AnnouncementGeneric => f.write_str("Announcement-Generic"),
            EapolType::AnnouncementSpecific => f.write_str("Announcement-Specific"),
            EapolType::AnnouncementReq => f.write_str("Announcement-Req"),
            EapolType::Unknown(other) => write!(f, "Unknown({})", other),
        }
    }
}

/// An EAPOL PDU.
///
/// ```text
/// 0         1       2               4
/// |-version-|-type--|--body length--|--body...
/// ```
#[derive(Clone, Debug)]
pub struct EapolFrame<T: AsRef<[u8]>> {
    pub data: T,
    pub layer2_offset: Option<usize>,
    pub eapol_offset: usize,
    pub body_offset: usize,
}

impl<T: AsRef<[u8]>> EapolFrame<T> {
    pub fn from_buffer(
        data: T,
        layer2_offset: Option<usize>,
        eapol_offset: usize,
    ) -> Result<EapolFrame<T>, &'static str> {
        if data.as_ref().len() < eapol_offset + 4 {
            return Err("Data is too short to be an EAPOL frame");
        }

        Ok(EapolFrame {
            data,
            layer2_offset,
            eapol_offset,
            body_offset: eapol_offset + 4,
        })
    }

    pub fn version(&self) -> u8 {
        self.data.as_ref()[self.eapol_offset]
    }

    pub fn packet_type(&self) -> EapolType {
        EapolType::from(self.data.as_ref()[self.eapol_offset + 1])
    }

    /// The body length announced by the header. It may disagree with the bytes actually present.
    pub fn body_len(&self) -> u16 {
        let start = self.eapol_offset + 2;
        u16::from_be_bytes(self.data.as_ref()[start..start + 2].try_into().unwrap())
    }

    /// The body, cut to the announced length so that Ethernet padding is left out. If fewer
    /// bytes are present than announced, whatever is present is returned.
    pub fn body(&self) -> &[u8] {
        let data = self.data.as_ref();
        let end = (self.body_offset + self.body_len() as usize).min(data.len());
        &data[self.body_offset..end]
    }
}

impl EapolFrame<Vec<u8>> {
    pub fn new(version: u8, packet_type: EapolType) -> EapolFrame<Vec<u8>> {
        let data = vec![version, packet_type.into(), 0, 0];
        EapolFrame::from_buffer(data, None, 0).unwrap()
    }

    pub fn start(version: u8) -> EapolFrame<Vec<u8>> {
        EapolFrame::new(version, EapolType::Start)
    }

    pub fn logoff(version: u8) -> EapolFrame<Vec<u8>> {
        EapolFrame::new(version, EapolType::Logoff)
    }

    pub fn encap_eap(version: u8, eap: EapPacket<Vec<u8>>) -> EapolFrame<Vec<u8>> {
        let mut frame = EapolFrame::new(version, EapolType::EapPacket);
        frame.set_body(&eap.data[eap.eap_offset..]);
        frame
    }

    pub fn set_version(&mut self, version: u8) {
        self.data[self.eapol_offset] = version;
    }

    pub fn set_packet_type(&mut self, packet_type: EapolType) {
        self.data[self.eapol_offset + 1] = packet_type.into();
    }

    pub fn set_body_len(&mut self, len: u16) {
        let start = self.eapol_offset + 2;
        self.data[start..start + 2].copy_from_slice(&len.to_be_bytes());
    }

    /// Replaces the body and updates the announced length to match.
    pub fn set_body(&mut self, body: &[u8]) {
        self.data.truncate(self.body_offset);
        self.data.extend_from_slice(body);
        self.set_body_len(body.len() as u16);
    }
}

impl<T: AsRef<[u8]>> TryFrom<EthernetFrame<T>> for EapolFrame<T> {
    type Error = &'static str;

    fn try_from(frame: EthernetFrame<T>) -> Result<Self, Self::Error> {
        if frame.ether_type() != ETHERTYPE_EAPOL {
            return Err("Frame does not contain an EAPOL frame");
        }
        EapolFrame::from_buffer(frame.data, Some(frame.layer2_offset), frame.payload_offset)
    }
}
