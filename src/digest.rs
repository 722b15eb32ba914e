use crate::maybestd::{fmt, str::FromStr, string::String};

/// The length of a digest in bytes
pub const HASH_LEN: usize = 32;
/// The length of an account address in bytes
pub const ADDRESS_LEN: usize = 20;

/// A 32 byte keccak256 output. Ordering is byte-lexicographic, which is the
/// same as comparing the digests as big-endian `uint256`s on-chain.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
#[cfg_attr(
    any(test, feature = "borsh"),
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
pub struct Digest(pub [u8; HASH_LEN]);

impl Digest {
    /// Construct a digest from raw bytes
    pub const fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the digest
    pub const fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Returns the lowercase hex encoding of the digest, without a `0x` prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<[u8; HASH_LEN]> for Digest {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for [u8; HASH_LEN] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = ParseError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(fixed_bytes(value)?))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl FromStr for Digest {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(parse_hex(s)?))
    }
}

/// A 20 byte account address, hashed as a Solidity `address`
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
#[cfg_attr(
    any(test, feature = "borsh"),
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The zero address
    pub const ZERO: Address = Address([0; ADDRESS_LEN]);

    /// Construct an address from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = ParseError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(fixed_bytes(value)?))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Parses an address from hex. The EIP-55 checksum casing is accepted but not validated.
impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(parse_hex(s)?))
    }
}

/// The error returned when failing to read a digest or address
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum ParseError {
    /// The input contained a character outside of `[0-9a-fA-F]`, or had an odd number of digits
    #[error("invalid hex string")]
    InvalidHex,
    /// The input decoded to the wrong number of bytes
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The number of bytes the type holds
        expected: usize,
        /// The number of bytes provided
        actual: usize,
    },
}

fn fixed_bytes<const N: usize>(value: &[u8]) -> Result<[u8; N], ParseError> {
    value.try_into().map_err(|_| ParseError::InvalidLength {
        expected: N,
        actual: value.len(),
    })
}

fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(ParseError::InvalidHex);
    }
    if digits.len() != 2 * N {
        return Err(ParseError::InvalidLength {
            expected: N,
            actual: digits.len() / 2,
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|_| ParseError::InvalidHex)?;
    Ok(out)
}

#[cfg(feature = "serde")]
mod serde_impls {
    //! Human readable formats get `0x`-prefixed hex strings, binary formats get a fixed-size tuple.
    use super::{parse_hex, Address, Digest, ADDRESS_LEN, HASH_LEN};
    use crate::maybestd::{fmt, marker::PhantomData};
    use serde::{
        de::{self, SeqAccess, Visitor},
        ser::SerializeTuple,
        Deserializer, Serializer,
    };

    fn serialize_fixed<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            return serializer.collect_str(&format_args!("0x{}", hex::encode(bytes)));
        }
        let mut seq = serializer.serialize_tuple(N)?;
        for byte in bytes {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }

    struct FixedBytesVisitor<const N: usize> {
        _data: PhantomData<[u8; N]>,
    }

    impl<'de, const N: usize> Visitor<'de> for FixedBytesVisitor<N> {
        type Value = [u8; N];

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a hex string or an array of {} bytes", N)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_hex(v).map_err(E::custom)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut out = [0u8; N];
            for (i, byte) in out.iter_mut().enumerate() {
                *byte = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(i, &self))?;
            }
            Ok(out)
        }
    }

    fn deserialize_fixed<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let visitor = FixedBytesVisitor::<N> { _data: PhantomData };
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(visitor)
        } else {
            deserializer.deserialize_tuple(N, visitor)
        }
    }

    impl serde::Serialize for Digest {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_fixed::<S, HASH_LEN>(&self.0, serializer)
        }
    }

    impl<'de> serde::Deserialize<'de> for Digest {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserialize_fixed::<D, HASH_LEN>(deserializer).map(Digest)
        }
    }

    impl serde::Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_fixed::<S, ADDRESS_LEN>(&self.0, serializer)
        }
    }

    impl<'de> serde::Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserialize_fixed::<D, ADDRESS_LEN>(deserializer).map(Address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_hex_roundtrip() {
        let text = "0x980caa019e608b9e2fd2bf59ba120e527eb9f3d9350c6a78f8a292f5b7e2cdf9";
        let digest: Digest = text.parse().unwrap();
        assert_eq!(digest.0[0], 0x98);
        assert_eq!(crate::maybestd::string::ToString::to_string(&digest), text);
        assert_eq!(digest.to_hex(), &text[2..]);

        let upper: Digest = text[2..].to_uppercase().parse().unwrap();
        assert_eq!(upper, digest);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "0x1234".parse::<Digest>(),
            Err(ParseError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
        assert_eq!("0x123".parse::<Address>(), Err(ParseError::InvalidHex));
        assert_eq!(
            "0xzz00000000000000000000000000000000000000".parse::<Address>(),
            Err(ParseError::InvalidHex)
        );
        assert_eq!(
            Digest::try_from([0u8; 20].as_ref()),
            Err(ParseError::InvalidLength {
                expected: 32,
                actual: 20
            })
        );
    }

    #[test]
    fn test_digest_ordering_is_big_endian() {
        let mut low = [0xffu8; 32];
        low[0] = 0x00;
        let mut high = [0u8; 32];
        high[0] = 0x01;
        assert!(Digest(low) < Digest(high));
    }

    #[test]
    fn test_address_borsh() {
        let address: Address = "0xAAbbccddeeff00112233445566778899aabbccdd".parse().unwrap();

        let serialized = borsh::to_vec(&address).expect("Serialization to vec must succeed");
        assert_eq!(serialized.len(), ADDRESS_LEN);

        let got: Address = borsh::from_slice(&serialized).expect("serialized address is correct");
        assert_eq!(got, address);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_digest_serde_json() {
        let digest = Digest([8u8; 32]);

        let serialized = serde_json::to_string(&digest).expect("Serialization to string must succeed");
        assert_eq!(serialized, format!("\"0x{}\"", "08".repeat(32)));

        let got: Digest = serde_json::from_str(&serialized).expect("serialized digest is correct");
        assert_eq!(got, digest);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_digest_serde_postcard() {
        use crate::maybestd::vec::Vec;

        let digest = Digest([8u8; 32]);

        let serialized: Vec<u8> =
            postcard::to_allocvec(&digest).expect("Serialization to vec must succeed");
        assert_eq!(serialized.len(), HASH_LEN);
        let got: Digest = postcard::from_bytes(&serialized[..]).expect("serialized digest is correct");

        assert_eq!(got, digest);
    }
}
