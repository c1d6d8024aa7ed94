//! Frame encoding/decoding
//!
//! Builds and validates complete UBX frames, including the 8-bit Fletcher
//! checksum over class, ID, length and payload.

use byteorder::{ByteOrder, LittleEndian};

use super::{UbxError, UBX_FRAME_SIZE, UBX_HEAD_SIZE, UBX_MAX_PAYLOAD_SIZE, UBX_SYNC_1, UBX_SYNC_2};

/// A decoded UBX frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbxFrame {
    /// Message class
    pub cls: u8,
    /// Message ID
    pub id: u8,
    /// Frame payload
    pub payload: Vec<u8>,
}

impl UbxFrame {
    /// Create a new frame with the given payload
    pub fn new(cls: u8, id: u8, payload: Vec<u8>) -> Self {
        Self { cls, id, payload }
    }

    /// Decode a frame from raw bytes
    ///
    /// The buffer must contain exactly one frame.
    pub fn from_bytes(data: &[u8]) -> Result<Self, UbxError> {
        if data.len() < UBX_FRAME_SIZE {
            return Err(UbxError::TooShort {
                needed: UBX_FRAME_SIZE,
                actual: data.len(),
            });
        }
        if data[0] != UBX_SYNC_1 || data[1] != UBX_SYNC_2 {
            return Err(UbxError::BadSync(data[0], data[1]));
        }

        let length = LittleEndian::read_u16(&data[4..6]) as usize;
        if length > UBX_MAX_PAYLOAD_SIZE {
            return Err(UbxError::PayloadTooLarge(length));
        }
        if data.len() != length + UBX_FRAME_SIZE {
            return Err(UbxError::LengthMismatch {
                declared: length,
                available: data.len() - UBX_FRAME_SIZE,
            });
        }

        let end = UBX_HEAD_SIZE + length;
        let expected = checksum(&data[2..end]);
        let actual = [data[end], data[end + 1]];
        if expected != actual {
            return Err(UbxError::ChecksumMismatch { expected, actual });
        }

        Ok(Self {
            cls: data[2],
            id: data[3],
            payload: data[UBX_HEAD_SIZE..end].to_vec(),
        })
    }

    /// Encode the frame to raw bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, UbxError> {
        make_message(self.cls, self.id, &self.payload)
    }

    /// Get the total encoded size
    pub fn encoded_size(&self) -> usize {
        self.payload.len() + UBX_FRAME_SIZE
    }
}

/// Make a UBX message from class, ID and payload (which may be empty)
pub fn make_message(cls: u8, id: u8, payload: &[u8]) -> Result<Vec<u8>, UbxError> {
    if payload.len() > UBX_MAX_PAYLOAD_SIZE {
        return Err(UbxError::PayloadTooLarge(payload.len()));
    }
    let mut msg = vec![0u8; payload.len() + UBX_FRAME_SIZE];
    msg[UBX_HEAD_SIZE..UBX_HEAD_SIZE + payload.len()].copy_from_slice(payload);
    encode_into(&mut msg, cls, id, payload.len())?;
    Ok(msg)
}

/// Make a UBX message in place
///
/// The payload must already be positioned at offset [`UBX_HEAD_SIZE`] of `buf`,
/// which must hold at least `payload_len + UBX_FRAME_SIZE` bytes. Header and
/// checksum are written around it. Returns the frame size.
pub fn encode_into(buf: &mut [u8], cls: u8, id: u8, payload_len: usize) -> Result<usize, UbxError> {
    if payload_len > UBX_MAX_PAYLOAD_SIZE {
        return Err(UbxError::PayloadTooLarge(payload_len));
    }
    let size = payload_len + UBX_FRAME_SIZE;
    if buf.len() < size {
        return Err(UbxError::TooShort {
            needed: size,
            actual: buf.len(),
        });
    }

    buf[0] = UBX_SYNC_1;
    buf[1] = UBX_SYNC_2;
    buf[2] = cls;
    buf[3] = id;
    LittleEndian::write_u16(&mut buf[4..6], payload_len as u16);

    let end = UBX_HEAD_SIZE + payload_len;
    let [ck_a, ck_b] = checksum(&buf[2..end]);
    buf[end] = ck_a;
    buf[end + 1] = ck_b;

    Ok(size)
}

/// Calculate the UBX checksum (8-bit Fletcher) of the given bytes
pub fn checksum(data: &[u8]) -> [u8; 2] {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for &b in data {
        ck_a = ck_a.wrapping_add(b);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    [ck_a, ck_b]
}

/// Builder for constructing UBX payloads
pub struct PayloadBuilder {
    payload: Vec<u8>,
}

impl PayloadBuilder {
    /// Create a new payload builder
    pub fn new() -> Self {
        Self { payload: Vec::new() }
    }

    /// Add a single byte
    pub fn u8(mut self, b: u8) -> Self {
        self.payload.push(b);
        self
    }

    /// Add a 16-bit value (little-endian)
    pub fn u16_le(mut self, value: u16) -> Self {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.payload.extend_from_slice(&bytes);
        self
    }

    /// Add a 32-bit value (little-endian)
    pub fn u32_le(mut self, value: u32) -> Self {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.payload.extend_from_slice(&bytes);
        self
    }

    /// Add raw bytes
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.payload.extend_from_slice(data);
        self
    }

    /// Build the payload
    pub fn build(self) -> Vec<u8> {
        self.payload
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}
