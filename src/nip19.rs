//! NIP-19 bech32 addresses for addressable events (`naddr`) and plain
//! events (`nevent`).
//!
//! The parsers only need the [`AddressCodec`] seam; [`Nip19Codec`] is the
//! TLV/bech32 backend used by default.

use bech32::{Bech32, Hrp};
use thiserror::Error;

pub const NADDR_HRP: &str = "naddr";
pub const NEVENT_HRP: &str = "nevent";

const TLV_SPECIAL: u8 = 0;
const TLV_RELAY: u8 = 1;
const TLV_AUTHOR: u8 = 2;
const TLV_KIND: u8 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("{field} must be 32 bytes, got {got}")]
    InvalidLength { field: &'static str, got: usize },

    #[error("TLV value too long ({0} bytes, max 255)")]
    TlvTooLong(usize),

    #[error("truncated TLV record")]
    TruncatedTlv,

    #[error("missing required TLV field: {0}")]
    MissingField(&'static str),

    #[error("unsupported bech32 prefix: {0}")]
    UnknownPrefix(String),

    #[error("bech32 encoding error: {0}")]
    Bech32Encode(String),

    #[error("bech32 decoding error: {0}")]
    Bech32Decode(String),
}

/// Coordinates of an addressable event: `kind:pubkey:identifier` plus relays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPointer {
    pub kind: u32,
    pub pubkey: String,
    pub identifier: String,
    pub relays: Vec<String>,
}

/// Pointer to a single event by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPointer {
    pub id: String,
    pub author: Option<String>,
    pub kind: Option<u32>,
    pub relays: Vec<String>,
}

/// A decoded NIP-19 entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nip19Entity {
    Address(AddressPointer),
    Event(EventPointer),
}

/// Produces canonical, relay-aware encodings of repository and event
/// coordinates.
pub trait AddressCodec {
    fn encode_address(&self, pointer: &AddressPointer) -> Result<String, AddressError>;

    fn encode_event(&self, pointer: &EventPointer) -> Result<String, AddressError>;
}

/// Bech32 TLV encoding as defined by NIP-19.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nip19Codec;

impl AddressCodec for Nip19Codec {
    fn encode_address(&self, pointer: &AddressPointer) -> Result<String, AddressError> {
        encode_naddr(pointer)
    }

    fn encode_event(&self, pointer: &EventPointer) -> Result<String, AddressError> {
        encode_nevent(pointer)
    }
}

pub fn encode_naddr(pointer: &AddressPointer) -> Result<String, AddressError> {
    let mut tlv = Vec::new();
    push_tlv(&mut tlv, TLV_SPECIAL, pointer.identifier.as_bytes())?;
    for relay in &pointer.relays {
        push_tlv(&mut tlv, TLV_RELAY, relay.as_bytes())?;
    }
    push_tlv(&mut tlv, TLV_AUTHOR, &decode_key("pubkey", &pointer.pubkey)?)?;
    push_tlv(&mut tlv, TLV_KIND, &pointer.kind.to_be_bytes())?;
    encode_bech32(NADDR_HRP, &tlv)
}

pub fn encode_nevent(pointer: &EventPointer) -> Result<String, AddressError> {
    let mut tlv = Vec::new();
    push_tlv(&mut tlv, TLV_SPECIAL, &decode_key("event id", &pointer.id)?)?;
    for relay in &pointer.relays {
        push_tlv(&mut tlv, TLV_RELAY, relay.as_bytes())?;
    }
    if let Some(author) = &pointer.author {
        push_tlv(&mut tlv, TLV_AUTHOR, &decode_key("author", author)?)?;
    }
    if let Some(kind) = pointer.kind {
        push_tlv(&mut tlv, TLV_KIND, &kind.to_be_bytes())?;
    }
    encode_bech32(NEVENT_HRP, &tlv)
}

/// Decode an `naddr` or `nevent` string. A leading `nostr:` is accepted.
pub fn decode(encoded: &str) -> Result<Nip19Entity, AddressError> {
    let encoded = encoded.strip_prefix("nostr:").unwrap_or(encoded);
    let (hrp, data) =
        bech32::decode(encoded).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;
    let records = read_tlv(&data)?;

    let mut special: Option<Vec<u8>> = None;
    let mut relays = Vec::new();
    let mut author = None;
    let mut kind = None;
    for (typ, value) in records {
        match typ {
            // only the first occurrence of a singleton field counts
            TLV_SPECIAL if special.is_none() => special = Some(value.to_vec()),
            TLV_RELAY => relays.push(String::from_utf8_lossy(value).into_owned()),
            TLV_AUTHOR if author.is_none() => {
                if value.len() != 32 {
                    return Err(AddressError::InvalidLength { field: "author", got: value.len() });
                }
                author = Some(hex::encode(value));
            }
            TLV_KIND if kind.is_none() => {
                let bytes: [u8; 4] = value
                    .try_into()
                    .map_err(|_| AddressError::InvalidLength { field: "kind", got: value.len() })?;
                kind = Some(u32::from_be_bytes(bytes));
            }
            _ => {}
        }
    }
    let special = special.ok_or(AddressError::MissingField("special"))?;

    match hrp.to_string().to_lowercase().as_str() {
        NADDR_HRP => Ok(Nip19Entity::Address(AddressPointer {
            kind: kind.ok_or(AddressError::MissingField("kind"))?,
            pubkey: author.ok_or(AddressError::MissingField("author"))?,
            identifier: String::from_utf8_lossy(&special).into_owned(),
            relays,
        })),
        NEVENT_HRP => {
            if special.len() != 32 {
                return Err(AddressError::InvalidLength { field: "event id", got: special.len() });
            }
            Ok(Nip19Entity::Event(EventPointer {
                id: hex::encode(special),
                author,
                kind,
                relays,
            }))
        }
        other => Err(AddressError::UnknownPrefix(other.to_string())),
    }
}

fn decode_key(field: &'static str, value: &str) -> Result<Vec<u8>, AddressError> {
    let bytes = hex::decode(value).map_err(|e| AddressError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;
    if bytes.len() != 32 {
        return Err(AddressError::InvalidLength { field, got: bytes.len() });
    }
    Ok(bytes)
}

fn push_tlv(out: &mut Vec<u8>, typ: u8, value: &[u8]) -> Result<(), AddressError> {
    let len = u8::try_from(value.len()).map_err(|_| AddressError::TlvTooLong(value.len()))?;
    out.push(typ);
    out.push(len);
    out.extend_from_slice(value);
    Ok(())
}

fn read_tlv(mut data: &[u8]) -> Result<Vec<(u8, &[u8])>, AddressError> {
    let mut records = Vec::new();
    while !data.is_empty() {
        let [typ, len, rest @ ..] = data else {
            return Err(AddressError::TruncatedTlv);
        };
        let len = *len as usize;
        if rest.len() < len {
            return Err(AddressError::TruncatedTlv);
        }
        records.push((*typ, &rest[..len]));
        data = &rest[len..];
    }
    Ok(records)
}

fn encode_bech32(hrp: &str, data: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(hrp).map_err(|e| AddressError::Bech32Encode(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| AddressError::Bech32Encode(e.to_string()))
}
