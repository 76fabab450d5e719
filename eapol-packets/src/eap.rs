use crate::*;
use std::convert::{TryFrom, TryInto};
use std::fmt;

/// Code field of an EAP message (RFC 3748, section 4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EapCode {
    Request,
    Response,
    Success,
    Failure,
    Unknown(u8),
}

impl EapCode {
    pub fn name(&self) -> &'static str {
        match self {
            EapCode::Request => "Request",
            EapCode::Response => "Response",
            EapCode::Success => "Success",
            EapCode::Failure => "Failure",
            EapCode::Unknown(_) => "Unknown",
        }
    }
}

impl From<u8> for EapCode {
    fn from(value: u8) -> Self {
        match value {
            1 => EapCode::Request,
            2 => EapCode::Response,
            3 => EapCode::Success,
            4 => EapCode::Failure,
            other => EapCode::Unknown(other),
        }
    }
}

impl From<EapCode> for u8 {
    fn from(value: EapCode) -> Self {
        match value {
            EapCode::Request => 1,
            EapCode::Response => 2,
            EapCode::Success => 3,
            EapCode::Failure => 4,
            EapCode::Unknown(other) => other,
        }
    }
}

impl fmt::Display for EapCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An EAP message.
///
/// ```text
/// 0       1             2           4
/// |-code--|-identifier--|--length---|--type (Request/Response only)--|--type data...
/// ```
#[derive(Clone, Debug)]
pub struct EapPacket<T: AsRef<[u8]>> {
    pub data: T,
    pub eap_offset: usize,
}

impl<T: AsRef<[u8]>> EapPacket<T> {
    pub fn from_buffer(data: T, eap_offset: usize) -> Result<EapPacket<T>, &'static str> {
        let bytes = data.as_ref();
        if bytes.len() < eap_offset + 4 {
            return Err("Data is too short to be an EAP packet");
        }
        let length = u16::from_be_bytes(
            bytes[eap_offset + 2..eap_offset + 4].try_into().unwrap(),
        ) as usize;
        if length < 4 {
            return Err("EAP packet has invalid length field");
        }
        if bytes.len() < eap_offset + length {
            return Err("EAP packet is shorter than its length field");
        }

        Ok(EapPacket { data, eap_offset })
    }

    pub fn code(&self) -> EapCode {
        EapCode::from(self.data.as_ref()[self.eap_offset])
    }

    pub fn identifier(&self) -> u8 {
        self.data.as_ref()[self.eap_offset + 1]
    }

    pub fn length(&self) -> u16 {
        let start = self.eap_offset + 2;
        u16::from_be_bytes(self.data.as_ref()[start..start + 2].try_into().unwrap())
    }

    /// The method type of a Request or Response, when the message carries one.
    pub fn eap_type(&self) -> Option<u8> {
        if self.length() > 4 {
            Some(self.data.as_ref()[self.eap_offset + 4])
        } else {
            None
        }
    }
}

impl EapPacket<Vec<u8>> {
    pub fn new(code: EapCode, identifier: u8) -> EapPacket<Vec<u8>> {
        EapPacket::from_buffer(vec![code.into(), identifier, 0x00, 0x04], 0).unwrap()
    }

    /// Appends a method type and its data and updates the length field.
    pub fn set_type_data(&mut self, eap_type: u8, type_data: &[u8]) {
        self.data.truncate(self.eap_offset + 4);
        self.data.push(eap_type);
        self.data.extend_from_slice(type_data);
        let length = (self.data.len() - self.eap_offset) as u16;
        let start = self.eap_offset + 2;
        self.data[start..start + 2].copy_from_slice(&length.to_be_bytes());
    }
}

impl<T: AsRef<[u8]>> TryFrom<EapolFrame<T>> for EapPacket<T> {
    type Error = &'static str;

    fn try_from(frame: EapolFrame<T>) -> Result<Self, Self::Error> {
        if frame.packet_type() != EapolType::EapPacket {
            return Err("EAPOL frame does not carry an EAP packet");
        }
        if frame.body_len() < 4 {
            return Err("EAPOL body is too short for an EAP packet");
        }
        EapPacket::from_buffer(frame.data, frame.body_offset)
    }
}
