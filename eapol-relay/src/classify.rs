use eapol_packets::{
    EapCode, EapPacket, EapolFrame, EapolType, EthernetFrame, MacAddr, ETHERTYPE_EAPOL,
};
use std::convert::TryFrom;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EthernetHeader {
    pub src: MacAddr,
    pub dst: MacAddr,
    pub ether_type: u16,
    pub vlan_id: Option<u16>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EapolHeader {
    pub version: u8,
    pub packet_type: EapolType,
    pub length: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EapMessage {
    pub code: EapCode,
    pub identifier: u8,
    pub length: u16,
}

/// The decoded headers of a frame that passed classification. The EAP part is only present on
/// EAP-Packets whose EAP message could be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifiedFrame {
    pub ethernet: EthernetHeader,
    pub eapol: EapolHeader,
    pub eap: Option<EapMessage>,
}

/// Decodes `data` as an Ethernet frame carrying EAPOL.
///
/// Returns `None` ("not EAPOL") for anything else, malformed input included.
pub fn classify(data: &[u8]) -> Option<ClassifiedFrame> {
    let frame = EthernetFrame::from_buffer(data, 0).ok()?;
    // The socket filter already restricts the ethertype, but promiscuous capture hands us
    // whatever is on the wire, so check again.
    if frame.ether_type() != ETHERTYPE_EAPOL {
        return None;
    }
    let ethernet = EthernetHeader {
        src: frame.src_mac(),
        dst: frame.dest_mac(),
        ether_type: frame.ether_type(),
        vlan_id: frame.vlan_id(),
    };

    let eapol = EapolFrame::try_from(frame).ok()?;
    let header = EapolHeader {
        version: eapol.version(),
        packet_type: eapol.packet_type(),
        length: eapol.body_len(),
    };

    let eap = if header.packet_type == EapolType::EapPacket {
        EapPacket::try_from(eapol).ok().map(|eap| EapMessage {
            code: eap.code(),
            identifier: eap.identifier(),
            length: eap.length(),
        })
    } else {
        None
    };

    Some(ClassifiedFrame {
        ethernet,
        eapol: header,
        eap,
    })
}

/// Log name of an EAP code. Only used for readability, never for forwarding decisions.
pub fn eap_code_name(code: u8) -> &'static str {
    EapCode::from(code).name()
}

impl ClassifiedFrame {
    /// A one-line, human readable description of this frame moving from `src` to `dst`.
    pub fn summary<'a>(&'a self, src: &'a str, dst: &'a str) -> Summary<'a> {
        Summary {
            frame: self,
            src,
            dst,
        }
    }
}

pub struct Summary<'a> {
    frame: &'a ClassifiedFrame,
    src: &'a str,
    dst: &'a str,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ClassifiedFrame {
            ethernet,
            eapol,
            eap,
        } = self.frame;
        write!(
            f,
            "{}: {} > {}, {} v{}, len {}",
            self.src, ethernet.src, ethernet.dst, eapol.packet_type, eapol.version, eapol.length
        )?;
        if let Some(eap) = eap {
            let code = u8::from(eap.code);
            write!(
                f,
                ", {} ({}) id {}",
                eap_code_name(code),
                code,
                eap.identifier
            )?;
        }
        write!(f, " > {}", self.dst)
    }
}
