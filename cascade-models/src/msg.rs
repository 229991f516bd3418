// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Messages exchanged by the models.
//!
//! Memory messages carry a `tag` that is copied unchanged from request to
//! response and a `port` that the [funnel](cascade_components::funnel) sets
//! so that the [router](cascade_components::router) can return the response
//! to the master that issued the request.

use std::fmt;

use cascade_engine::traits::{Routable, SimObject};
use cascade_engine::types::MsgType;
use cascade_track::id::{Id, Unique};

/// Data words that a [`Memory`](crate::memory::Memory) can transfer.
pub trait MemData:
    Copy + Default + fmt::Debug + fmt::Display + fmt::LowerHex + PartialEq + 'static
{
    /// Width of the data word in bytes.
    const NUM_BYTES: usize;

    /// Build a word from little-endian bytes. Missing upper bytes are zero.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// The little-endian bytes of the word.
    fn to_le_vec(self) -> Vec<u8>;
}

macro_rules! impl_mem_data {
    ($t:ty) => {
        impl MemData for $t {
            const NUM_BYTES: usize = std::mem::size_of::<$t>();

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                <$t>::from_le_bytes(buf)
            }

            fn to_le_vec(self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }
        }
    };
}

impl_mem_data!(u32);
impl_mem_data!(u128);

/// A memory request.
///
/// A `len` of 0 accesses the full data width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemReq<D>
where
    D: MemData,
{
    pub msg_type: MsgType,
    pub tag: u8,
    pub addr: u32,
    pub len: u8,
    pub data: D,
    pub port: usize,
}

impl<D> MemReq<D>
where
    D: MemData,
{
    #[must_use]
    pub fn read(tag: u8, addr: u32, len: u8) -> Self {
        Self {
            msg_type: MsgType::Read,
            tag,
            addr,
            len,
            data: D::default(),
            port: 0,
        }
    }

    #[must_use]
    pub fn write(tag: u8, addr: u32, len: u8, data: D) -> Self {
        Self {
            msg_type: MsgType::Write,
            tag,
            addr,
            len,
            data,
            port: 0,
        }
    }

    /// Number of bytes accessed.
    #[must_use]
    pub fn num_bytes(&self) -> usize {
        if self.len == 0 {
            D::NUM_BYTES
        } else {
            usize::from(self.len)
        }
    }
}

impl<D> fmt::Display for MemReq<D>
where
    D: MemData,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02x}:{:08x}:{}:{:x}",
            self.msg_type, self.tag, self.addr, self.len, self.data
        )
    }
}

impl<D> Unique for MemReq<D>
where
    D: MemData,
{
    fn id(&self) -> Id {
        Id((u64::from(self.addr) << 8) | u64::from(self.tag))
    }
}

impl<D> Routable for MemReq<D>
where
    D: MemData,
{
    fn port(&self) -> usize {
        self.port
    }

    fn set_port(&mut self, port: usize) {
        self.port = port;
    }
}

impl<D> SimObject for MemReq<D> where D: MemData {}

/// A memory response.
///
/// `port` is copied from the request. A write response carries no data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemResp<D>
where
    D: MemData,
{
    pub msg_type: MsgType,
    pub tag: u8,
    pub len: u8,
    pub data: D,
    pub port: usize,
}

impl<D> MemResp<D>
where
    D: MemData,
{
    #[must_use]
    pub fn read(tag: u8, len: u8, data: D) -> Self {
        Self {
            msg_type: MsgType::Read,
            tag,
            len,
            data,
            port: 0,
        }
    }

    #[must_use]
    pub fn write(tag: u8, len: u8) -> Self {
        Self {
            msg_type: MsgType::Write,
            tag,
            len,
            data: D::default(),
            port: 0,
        }
    }

    /// The same response addressed to a different port.
    #[must_use]
    pub fn with_port(mut self, port: usize) -> Self {
        self.port = port;
        self
    }
}

impl<D> fmt::Display for MemResp<D>
where
    D: MemData,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02x}:{}:{:x}",
            self.msg_type, self.tag, self.len, self.data
        )
    }
}

impl<D> Unique for MemResp<D>
where
    D: MemData,
{
    fn id(&self) -> Id {
        Id(u64::from(self.tag))
    }
}

impl<D> Routable for MemResp<D>
where
    D: MemData,
{
    fn port(&self) -> usize {
        self.port
    }

    fn set_port(&mut self, port: usize) {
        self.port = port;
    }
}

impl<D> SimObject for MemResp<D> where D: MemData {}

/// A request to an accelerator register.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct XcelReq {
    pub msg_type: MsgType,
    pub addr: u8,
    pub data: u32,
}

impl XcelReq {
    #[must_use]
    pub fn read(addr: u8) -> Self {
        Self {
            msg_type: MsgType::Read,
            addr,
            data: 0,
        }
    }

    #[must_use]
    pub fn write(addr: u8, data: u32) -> Self {
        Self {
            msg_type: MsgType::Write,
            addr,
            data,
        }
    }
}

impl fmt::Display for XcelReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02x}:{:08x}", self.msg_type, self.addr, self.data)
    }
}

impl Unique for XcelReq {
    fn id(&self) -> Id {
        Id(u64::from(self.addr))
    }
}

impl SimObject for XcelReq {}

/// The response to an [`XcelReq`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct XcelResp {
    pub msg_type: MsgType,
    pub data: u32,
}

impl XcelResp {
    #[must_use]
    pub fn read(data: u32) -> Self {
        Self {
            msg_type: MsgType::Read,
            data,
        }
    }

    /// Write responses always carry zero data.
    #[must_use]
    pub fn write() -> Self {
        Self {
            msg_type: MsgType::Write,
            data: 0,
        }
    }
}

impl fmt::Display for XcelResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:08x}", self.msg_type, self.data)
    }
}

impl Unique for XcelResp {
    fn id(&self) -> Id {
        Id(u64::from(self.data))
    }
}

impl SimObject for XcelResp {}

/// Operands for the integer multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MulReq {
    pub a: u32,
    pub b: u32,
}

impl MulReq {
    #[must_use]
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    /// The low 32 bits of the product.
    #[must_use]
    pub fn product(&self) -> MulResp {
        MulResp(self.a.wrapping_mul(self.b))
    }
}

impl fmt::Display for MulReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}*{:08x}", self.a, self.b)
    }
}

impl Unique for MulReq {
    fn id(&self) -> Id {
        Id((u64::from(self.a) << 32) | u64::from(self.b))
    }
}

impl SimObject for MulReq {}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MulResp(pub u32);

impl fmt::Display for MulResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl Unique for MulResp {
    fn id(&self) -> Id {
        Id(u64::from(self.0))
    }
}

impl SimObject for MulResp {}
