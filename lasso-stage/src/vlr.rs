use bytes::{Buf, BufMut, Bytes, BytesMut};
use lasso_error::{LassoResult, lasso_bail};

/// Width of the user identifier field of a [`VariableLengthRecord`].
pub const USER_ID_SIZE: usize = 16;
/// Width of the description field of a [`VariableLengthRecord`].
pub const DESCRIPTION_SIZE: usize = 32;
/// Size of the fixed part of an encoded [`VariableLengthRecord`].
pub const VLR_HEADER_SIZE: usize = 2 + USER_ID_SIZE + 2 + 2 + DESCRIPTION_SIZE;

const PROJECTION_USER_ID: &str = "LASF_Projection";

/// Copy `bytes` into a fixed-width field, truncating or zero-padding as needed.
pub fn pad_or_truncate<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut field = [0u8; N];
    let len = bytes.len().min(N);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

fn trim_nul(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// An opaque metadata record attached to the header of a point source.
///
/// The fixed-width fields follow the LAS variable length record header. The payload is kept
/// verbatim; `record_length` is the length the source declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLengthRecord {
    reserved: u16,
    user_id: [u8; USER_ID_SIZE],
    record_id: u16,
    description: [u8; DESCRIPTION_SIZE],
    data: Bytes,
    record_length: u16,
}

impl VariableLengthRecord {
    pub fn new(
        reserved: u16,
        user_id: &[u8],
        record_id: u16,
        description: &[u8],
        data: impl Into<Bytes>,
        record_length: u16,
    ) -> Self {
        Self {
            reserved,
            user_id: pad_or_truncate(user_id),
            record_id,
            description: pad_or_truncate(description),
            data: data.into(),
            record_length,
        }
    }

    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    pub fn user_id(&self) -> &[u8; USER_ID_SIZE] {
        &self.user_id
    }

    /// The user identifier up to its first NUL byte.
    pub fn user_id_str(&self) -> String {
        trim_nul(&self.user_id)
    }

    pub fn record_id(&self) -> u16 {
        self.record_id
    }

    pub fn description(&self) -> &[u8; DESCRIPTION_SIZE] {
        &self.description
    }

    /// The description up to its first NUL byte.
    pub fn description_str(&self) -> String {
        trim_nul(&self.description)
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// The payload length declared by the source, which may differ from `data().len()`.
    pub fn record_length(&self) -> u16 {
        self.record_length
    }

    /// Whether this record carries coordinate system information.
    pub fn is_projection_record(&self) -> bool {
        self.user_id_str() == PROJECTION_USER_ID
    }

    /// Encode the record in LAS order: reserved, user id, record id, record length,
    /// description, then the payload.
    ///
    /// Fails if the payload does not match the declared record length.
    pub fn to_bytes(&self) -> LassoResult<Bytes> {
        if self.data.len() != usize::from(self.record_length) {
            lasso_bail!(
                "VLR declares {} payload bytes but holds {}",
                self.record_length,
                self.data.len()
            );
        }

        let mut buffer = BytesMut::with_capacity(VLR_HEADER_SIZE + self.data.len());
        buffer.put_u16_le(self.reserved);
        buffer.put_slice(&self.user_id);
        buffer.put_u16_le(self.record_id);
        buffer.put_u16_le(self.record_length);
        buffer.put_slice(&self.description);
        buffer.put_slice(&self.data);
        Ok(buffer.freeze())
    }

    /// Decode a record written by [`VariableLengthRecord::to_bytes`].
    ///
    /// Bytes beyond the declared payload are ignored.
    pub fn try_from_bytes(bytes: &[u8]) -> LassoResult<Self> {
        if bytes.len() < VLR_HEADER_SIZE {
            lasso_bail!(
                "VLR header needs {} bytes, got {}",
                VLR_HEADER_SIZE,
                bytes.len()
            );
        }

        let mut buf = bytes;
        let reserved = buf.get_u16_le();
        let user_id = pad_or_truncate(&buf[..USER_ID_SIZE]);
        buf.advance(USER_ID_SIZE);
        let record_id = buf.get_u16_le();
        let record_length = buf.get_u16_le();
        let description = pad_or_truncate(&buf[..DESCRIPTION_SIZE]);
        buf.advance(DESCRIPTION_SIZE);

        let payload_len = usize::from(record_length);
        if buf.remaining() < payload_len {
            lasso_bail!(
                "VLR declares {} payload bytes, only {} remain",
                payload_len,
                buf.remaining()
            );
        }

        Ok(Self {
            reserved,
            user_id,
            record_id,
            description,
            data: Bytes::copy_from_slice(&buf[..payload_len]),
            record_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use lasso_error::LassoError;

    use super::*;

    #[test]
    fn long_user_id_is_truncated() {
        let vlr = VariableLengthRecord::new(
            0,
            b"a user id that is far too long",
            1,
            b"",
            Bytes::new(),
            0,
        );
        assert_eq!(vlr.user_id().len(), 16);
        assert_eq!(vlr.user_id(), b"a user id that i");
        assert_eq!(vlr.user_id_str(), "a user id that i");
    }

    #[test]
    fn short_description_is_zero_padded() {
        let vlr = VariableLengthRecord::new(0, b"id", 1, b"short", Bytes::new(), 0);
        assert_eq!(vlr.description().len(), 32);
        assert_eq!(&vlr.description()[..5], b"short");
        assert!(vlr.description()[5..].iter().all(|b| *b == 0));
        assert_eq!(vlr.description_str(), "short");
    }

    #[test]
    fn wire_layout() {
        let vlr = VariableLengthRecord::new(
            0xAABB,
            b"LASF_Projection",
            34735,
            b"GeoKeyDirectoryTag",
            vec![1u8, 2, 3, 4],
            4,
        );
        assert!(vlr.is_projection_record());

        let bytes = vlr.to_bytes().unwrap();
        assert_eq!(bytes.len(), VLR_HEADER_SIZE + 4);
        assert_eq!(&bytes[0..2], &0xAABBu16.to_le_bytes());
        assert_eq!(&bytes[2..17], b"LASF_Projection");
        assert_eq!(bytes[17], 0);
        assert_eq!(&bytes[18..20], &34735u16.to_le_bytes());
        assert_eq!(&bytes[20..22], &4u16.to_le_bytes());
        assert_eq!(&bytes[22..40], b"GeoKeyDirectoryTag");
        assert_eq!(&bytes[54..], &[1, 2, 3, 4]);

        assert_eq!(VariableLengthRecord::try_from_bytes(&bytes).unwrap(), vlr);
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            VariableLengthRecord::try_from_bytes(&[0; 10]).unwrap_err(),
            LassoError::InvalidArgument(..)
        ));

        let vlr = VariableLengthRecord::new(0, b"id", 1, b"", vec![9u8; 8], 8);
        let bytes = vlr.to_bytes().unwrap();
        assert!(VariableLengthRecord::try_from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn mismatched_length_does_not_encode() {
        let vlr = VariableLengthRecord::new(0, b"id", 1, b"", vec![1u8, 2], 5);
        assert_eq!(vlr.record_length(), 5);
        assert_eq!(vlr.data().len(), 2);
        assert!(vlr.to_bytes().is_err());
    }
}
