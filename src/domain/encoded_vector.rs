// Encoded vectors - base64 packed little-endian numeric arrays
use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("decoded length {len} is not a multiple of {element_size} bytes")]
    MalformedVector { len: usize, element_size: usize },
    #[error("unsupported dtype '{0}'")]
    UnsupportedDtype(String),
}

/// Element type of an encoded vector, named by its numpy-style type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    F8,
    F4,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
}

impl Dtype {
    pub fn parse(code: &str) -> Result<Self, DecodeError> {
        match code {
            "f8" => Ok(Dtype::F8),
            "f4" => Ok(Dtype::F4),
            "i1" => Ok(Dtype::I1),
            "u1" => Ok(Dtype::U1),
            "i2" => Ok(Dtype::I2),
            "u2" => Ok(Dtype::U2),
            "i4" => Ok(Dtype::I4),
            "u4" => Ok(Dtype::U4),
            other => Err(DecodeError::UnsupportedDtype(other.to_string())),
        }
    }

    pub fn element_size(self) -> usize {
        match self {
            Dtype::F8 => 8,
            Dtype::F4 | Dtype::I4 | Dtype::U4 => 4,
            Dtype::I2 | Dtype::U2 => 2,
            Dtype::I1 | Dtype::U1 => 1,
        }
    }

    /// Read one element; `chunk` is exactly `element_size()` bytes.
    fn read(self, chunk: &[u8]) -> f64 {
        match self {
            Dtype::F8 => f64::from_le_bytes(le_bytes(chunk)),
            Dtype::F4 => f32::from_le_bytes(le_bytes(chunk)) as f64,
            Dtype::I1 => i8::from_le_bytes(le_bytes(chunk)) as f64,
            Dtype::U1 => u8::from_le_bytes(le_bytes(chunk)) as f64,
            Dtype::I2 => i16::from_le_bytes(le_bytes(chunk)) as f64,
            Dtype::U2 => u16::from_le_bytes(le_bytes(chunk)) as f64,
            Dtype::I4 => i32::from_le_bytes(le_bytes(chunk)) as f64,
            Dtype::U4 => u32::from_le_bytes(le_bytes(chunk)) as f64,
        }
    }
}

fn le_bytes<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(chunk);
    buf
}

/// Decode a base64 string of packed little-endian float64 values.
pub fn decode_f64_le(bdata: &str) -> Result<Vec<f64>, DecodeError> {
    decode_with_dtype(bdata, Dtype::F8)
}

/// Decode a base64 string of packed little-endian values of `dtype`, widened to f64.
///
/// The decoded byte length must be a whole number of elements; a trailing
/// partial element is rejected rather than truncated.
pub fn decode_with_dtype(bdata: &str, dtype: Dtype) -> Result<Vec<f64>, DecodeError> {
    let bytes = STANDARD.decode(bdata)?;
    let element_size = dtype.element_size();

    if bytes.len() % element_size != 0 {
        return Err(DecodeError::MalformedVector {
            len: bytes.len(),
            element_size,
        });
    }

    Ok(bytes
        .chunks_exact(element_size)
        .map(|chunk| dtype.read(chunk))
        .collect())
}
