use crate::core::ParseError;

/// Codec for RFC 868 time responses
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeCodec;

impl TimeCodec {
    /// Size of a response on the wire
    pub const RESPONSE_SIZE: usize = 4;

    pub fn encode_request() -> [u8; 4] {
        [0; 4]
    }

    /// Reads seconds since 1900 and converts them to Unix seconds
    pub fn decode_response(buf: &[u8]) -> Result<i64, ParseError> {
        let bytes: [u8; 4] = buf.try_into().map_err(|_| ParseError::IncompleteResponse {
            expected: Self::RESPONSE_SIZE,
            actual: buf.len(),
        })?;
        Ok(super::from_ntp_seconds(u32::from_be_bytes(bytes)))
    }
}
