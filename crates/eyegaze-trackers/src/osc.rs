//! Minimal OSC 1.0 codec.
//!
//! Decodes messages and (nested) bundles as sent by Steam Link's eye
//! tracking output. All numeric arguments are big-endian and every field is
//! padded to a multiple of four bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use glam::Vec3;
use thiserror::Error;

pub const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Deepest bundle nesting accepted by [`decode_packet`].
pub const MAX_BUNDLE_DEPTH: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum OscError {
    #[error("packet too short: {0} bytes remaining, need {1}")]
    TooShort(usize, usize),

    #[error("packet length {0} is not a multiple of 4")]
    Misaligned(usize),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid address pattern: {0:?}")]
    InvalidAddress(String),

    #[error("type tag string does not start with ','")]
    InvalidTypeTags,

    #[error("unsupported type tag: {0:?}")]
    UnsupportedTypeTag(char),

    #[error("invalid bundle element size: {0}")]
    InvalidElementSize(i32),

    #[error("bundles nested deeper than {0}")]
    TooDeep(usize),

    #[error("unexpected arguments for {address}: {tags}")]
    UnexpectedArguments { address: String, tags: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    String(String),
    Blob(Bytes),
    Long(i64),
    Double(f64),
    TimeTag(u64),
    True,
    False,
    Nil,
    Impulse,
}

impl OscArg {
    pub fn tag(&self) -> char {
        match self {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::String(_) => 's',
            OscArg::Blob(_) => 'b',
            OscArg::Long(_) => 'h',
            OscArg::Double(_) => 'd',
            OscArg::TimeTag(_) => 't',
            OscArg::True => 'T',
            OscArg::False => 'F',
            OscArg::Nil => 'N',
            OscArg::Impulse => 'I',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn type_tags(&self) -> String {
        std::iter::once(',')
            .chain(self.args.iter().map(OscArg::tag))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OscPacket {
    Message(OscMessage),
    Bundle { time_tag: u64, content: Vec<OscPacket> },
}

impl OscPacket {
    /// Every message in the packet, bundles flattened in order.
    pub fn into_messages(self) -> Vec<OscMessage> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages(self, out: &mut Vec<OscMessage>) {
        match self {
            OscPacket::Message(msg) => out.push(msg),
            OscPacket::Bundle { content, .. } => {
                for packet in content {
                    packet.collect_messages(out);
                }
            }
        }
    }
}

pub fn decode_packet(data: &[u8]) -> Result<OscPacket, OscError> {
    decode_at_depth(data, 0)
}

fn decode_at_depth(data: &[u8], depth: usize) -> Result<OscPacket, OscError> {
    if data.len() % 4 != 0 {
        return Err(OscError::Misaligned(data.len()));
    }
    if data.starts_with(BUNDLE_TAG) {
        if depth >= MAX_BUNDLE_DEPTH {
            return Err(OscError::TooDeep(MAX_BUNDLE_DEPTH));
        }
        decode_bundle(&data[BUNDLE_TAG.len()..], depth)
    } else {
        decode_message(data).map(OscPacket::Message)
    }
}

fn decode_bundle(mut buf: &[u8], depth: usize) -> Result<OscPacket, OscError> {
    ensure(buf, 8)?;
    let time_tag = buf.get_u64();

    let mut content = Vec::new();
    while buf.has_remaining() {
        ensure(buf, 4)?;
        let size = buf.get_i32();
        if size < 0 || size % 4 != 0 || size as usize > buf.remaining() {
            return Err(OscError::InvalidElementSize(size));
        }
        let (element, rest) = buf.split_at(size as usize);
        content.push(decode_at_depth(element, depth + 1)?);
        buf = rest;
    }

    Ok(OscPacket::Bundle { time_tag, content })
}

pub fn decode_message(data: &[u8]) -> Result<OscMessage, OscError> {
    let mut buf = data;
    let address = read_string(&mut buf)?;
    if !address.starts_with('/') {
        return Err(OscError::InvalidAddress(address));
    }

    // Very old senders omit the type tag string when there are no arguments.
    if !buf.has_remaining() {
        return Ok(OscMessage {
            address,
            args: Vec::new(),
        });
    }

    let tags = read_string(&mut buf)?;
    let Some(tags) = tags.strip_prefix(',') else {
        return Err(OscError::InvalidTypeTags);
    };

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => {
                ensure(buf, 4)?;
                OscArg::Int(buf.get_i32())
            }
            'f' => {
                ensure(buf, 4)?;
                OscArg::Float(buf.get_f32())
            }
            's' | 'S' => OscArg::String(read_string(&mut buf)?),
            'b' => OscArg::Blob(read_blob(&mut buf)?),
            'h' => {
                ensure(buf, 8)?;
                OscArg::Long(buf.get_i64())
            }
            'd' => {
                ensure(buf, 8)?;
                OscArg::Double(buf.get_f64())
            }
            't' => {
                ensure(buf, 8)?;
                OscArg::TimeTag(buf.get_u64())
            }
            'T' => OscArg::True,
            'F' => OscArg::False,
            'N' => OscArg::Nil,
            'I' => OscArg::Impulse,
            other => return Err(OscError::UnsupportedTypeTag(other)),
        };
        args.push(arg);
    }

    Ok(OscMessage { address, args })
}

/// Extracts `(x, y, z)` from a message carrying exactly three floats.
pub fn gaze_point(msg: &OscMessage) -> Result<Vec3, OscError> {
    match msg.args.as_slice() {
        [OscArg::Float(x), OscArg::Float(y), OscArg::Float(z)] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(OscError::UnexpectedArguments {
            address: msg.address.clone(),
            tags: msg.type_tags(),
        }),
    }
}

pub fn encode_message(address: &str, args: &[OscArg]) -> Bytes {
    let mut out = BytesMut::new();
    put_string(&mut out, address);
    let tags: String = std::iter::once(',').chain(args.iter().map(OscArg::tag)).collect();
    put_string(&mut out, &tags);

    for arg in args {
        match arg {
            OscArg::Int(v) => out.put_i32(*v),
            OscArg::Float(v) => out.put_f32(*v),
            OscArg::String(v) => put_string(&mut out, v),
            OscArg::Blob(v) => {
                out.put_i32(v.len() as i32);
                out.put_slice(v);
                out.put_bytes(0, pad_len(v.len()) - v.len());
            }
            OscArg::Long(v) => out.put_i64(*v),
            OscArg::Double(v) => out.put_f64(*v),
            OscArg::TimeTag(v) => out.put_u64(*v),
            OscArg::True | OscArg::False | OscArg::Nil | OscArg::Impulse => {}
        }
    }

    out.freeze()
}

/// Wraps already encoded packets into a bundle.
pub fn encode_bundle(time_tag: u64, elements: &[Bytes]) -> Bytes {
    let mut out = BytesMut::new();
    out.put_slice(BUNDLE_TAG);
    out.put_u64(time_tag);
    for element in elements {
        out.put_i32(element.len() as i32);
        out.put_slice(element);
    }
    out.freeze()
}

fn ensure(buf: &[u8], needed: usize) -> Result<(), OscError> {
    if buf.remaining() < needed {
        return Err(OscError::TooShort(buf.remaining(), needed));
    }
    Ok(())
}

fn pad_len(len: usize) -> usize {
    (len + 3) & !3
}

fn read_string(buf: &mut &[u8]) -> Result<String, OscError> {
    let nul = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(OscError::UnterminatedString)?;
    let padded = pad_len(nul + 1);
    ensure(buf, padded)?;

    let value = std::str::from_utf8(&buf[..nul])
        .map_err(|_| OscError::InvalidUtf8)?
        .to_string();
    buf.advance(padded);
    Ok(value)
}

fn read_blob(buf: &mut &[u8]) -> Result<Bytes, OscError> {
    ensure(buf, 4)?;
    let len = buf.get_i32();
    if len < 0 {
        return Err(OscError::InvalidElementSize(len));
    }
    let len = len as usize;
    let padded = pad_len(len);
    ensure(buf, padded)?;

    let blob = Bytes::copy_from_slice(&buf[..len]);
    buf.advance(padded);
    Ok(blob)
}

fn put_string(out: &mut BytesMut, value: &str) {
    out.put_slice(value.as_bytes());
    let len = value.len();
    out.put_bytes(0, pad_len(len + 1) - len);
}
