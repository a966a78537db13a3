use bytes::{Buf, BufMut, BytesMut};

use crate::core::ParseError;

/// NTP timestamp as whole seconds and a binary fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NtpTimestamp {
    pub seconds: u32,
    pub fraction: u32,
}

/// NTP packet header, 48 bytes big-endian on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NtpPacket {
    /// Leap indicator (2 bits), version (3 bits) and mode (3 bits)
    pub li_vn_mode: u8,
    pub stratum: u8,
    pub poll: u8,
    pub precision: u8,
    pub root_delay: u32,
    pub root_dispersion: u32,
    pub ref_id: u32,
    pub reference: NtpTimestamp,
    pub originate: NtpTimestamp,
    pub receive: NtpTimestamp,
    /// Only `transmit.seconds` is consumed by the client
    pub transmit: NtpTimestamp,
}

impl NtpPacket {
    /// Size of the packet on the wire
    pub const SIZE: usize = 48;

    /// LI 0, VN 3, mode 3 (client)
    pub const CLIENT_REQUEST: u8 = 0x1B;

    /// Zero-filled client request
    pub fn client_request() -> Self {
        NtpPacket {
            li_vn_mode: Self::CLIENT_REQUEST,
            ..Default::default()
        }
    }

    pub fn leap_indicator(&self) -> u8 {
        self.li_vn_mode >> 6
    }

    pub fn version(&self) -> u8 {
        (self.li_vn_mode >> 3) & 0x07
    }

    pub fn mode(&self) -> u8 {
        self.li_vn_mode & 0x07
    }

    /// Writes the packet in network byte order
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(Self::SIZE);
        dst.put_u8(self.li_vn_mode);
        dst.put_u8(self.stratum);
        dst.put_u8(self.poll);
        dst.put_u8(self.precision);
        dst.put_u32(self.root_delay);
        dst.put_u32(self.root_dispersion);
        dst.put_u32(self.ref_id);
        for ts in [self.reference, self.originate, self.receive, self.transmit] {
            dst.put_u32(ts.seconds);
            dst.put_u32(ts.fraction);
        }
    }

    /// Reads a packet, requiring the full 48 bytes
    pub fn decode(mut src: &[u8]) -> Result<Self, ParseError> {
        if src.len() < Self::SIZE {
            return Err(ParseError::IncompleteResponse {
                expected: Self::SIZE,
                actual: src.len(),
            });
        }

        fn timestamp(src: &mut &[u8]) -> NtpTimestamp {
            NtpTimestamp {
                seconds: src.get_u32(),
                fraction: src.get_u32(),
            }
        }

        let li_vn_mode = src.get_u8();
        let stratum = src.get_u8();
        let poll = src.get_u8();
        let precision = src.get_u8();
        let root_delay = src.get_u32();
        let root_dispersion = src.get_u32();
        let ref_id = src.get_u32();
        let reference = timestamp(&mut src);
        let originate = timestamp(&mut src);
        let receive = timestamp(&mut src);
        let transmit = timestamp(&mut src);

        Ok(NtpPacket {
            li_vn_mode,
            stratum,
            poll,
            precision,
            root_delay,
            root_dispersion,
            ref_id,
            reference,
            originate,
            receive,
            transmit,
        })
    }
}

/// Codec for NTP client-mode queries
#[derive(Debug, Clone, Copy, Default)]
pub struct NtpCodec;

impl NtpCodec {
    /// Builds a 48-byte client request
    pub fn encode_request() -> BytesMut {
        let mut buf = BytesMut::with_capacity(NtpPacket::SIZE);
        NtpPacket::client_request().encode(&mut buf);
        buf
    }

    /// Extracts the transmit timestamp as Unix seconds
    pub fn decode_response(buf: &[u8]) -> Result<i64, ParseError> {
        let packet = NtpPacket::decode(buf)?;
        Ok(super::from_ntp_seconds(packet.transmit.seconds))
    }
}
