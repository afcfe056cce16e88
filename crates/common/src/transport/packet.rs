use bytes::{BufMut, Bytes, BytesMut};

use crate::crypto::{PublicKey, PUBLIC_KEY_SIZE};
use crate::identity::{AddressHash, ADDRESS_HASH_SIZE};

const PATH_REQUEST: u8 = 0x01;
const ANNOUNCE: u8 = 0x02;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,
    #[error("unknown packet type {0:#04x}")]
    UnknownType(u8),
    #[error("packet type {kind:#04x} expects {expected} bytes, got {got}")]
    Length { kind: u8, expected: usize, got: usize },
    #[error("announced public key is invalid")]
    InvalidKey,
    #[error("announced key does not hash to {0}")]
    AddressMismatch(AddressHash),
}

/// Messages exchanged with the shared instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// Ask the network for the identity behind an address
    PathRequest { address: AddressHash },
    /// An identity became known to the shared instance
    Announce {
        address: AddressHash,
        public_key: PublicKey,
    },
}

impl Packet {
    pub fn encode(&self) -> Bytes {
        match self {
            Packet::PathRequest { address } => {
                let mut out = BytesMut::with_capacity(1 + ADDRESS_HASH_SIZE);
                out.put_u8(PATH_REQUEST);
                out.put_slice(address.as_bytes());
                out.freeze()
            }
            Packet::Announce {
                address,
                public_key,
            } => {
                let mut out = BytesMut::with_capacity(1 + ADDRESS_HASH_SIZE + PUBLIC_KEY_SIZE);
                out.put_u8(ANNOUNCE);
                out.put_slice(address.as_bytes());
                out.put_slice(&public_key.to_bytes());
                out.freeze()
            }
        }
    }

    /// Decode a frame payload
    ///
    /// Announces are only accepted when the key actually hashes to the
    /// announced address.
    pub fn decode(payload: &[u8]) -> Result<Self, PacketError> {
        let (&kind, body) = payload.split_first().ok_or(PacketError::Empty)?;

        match kind {
            PATH_REQUEST => {
                let address = read_address(kind, body, ADDRESS_HASH_SIZE)?;
                Ok(Packet::PathRequest { address })
            }
            ANNOUNCE => {
                let address = read_address(kind, body, ADDRESS_HASH_SIZE + PUBLIC_KEY_SIZE)?;
                let public_key = PublicKey::try_from(&body[ADDRESS_HASH_SIZE..])
                    .map_err(|_| PacketError::InvalidKey)?;
                if AddressHash::from_public_key(&public_key) != address {
                    return Err(PacketError::AddressMismatch(address));
                }
                Ok(Packet::Announce {
                    address,
                    public_key,
                })
            }
            other => Err(PacketError::UnknownType(other)),
        }
    }
}

fn read_address(kind: u8, body: &[u8], expected: usize) -> Result<AddressHash, PacketError> {
    if body.len() != expected {
        return Err(PacketError::Length {
            kind,
            expected,
            got: body.len(),
        });
    }
    let mut bytes = [0u8; ADDRESS_HASH_SIZE];
    bytes.copy_from_slice(&body[..ADDRESS_HASH_SIZE]);
    Ok(AddressHash::from(bytes))
}
