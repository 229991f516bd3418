// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Accumulator accelerator.
//!
//! Sums an array of 32-bit words held in memory. It is configured through
//! three registers:
//!
//! | register | write                         | read       |
//! |----------|-------------------------------|------------|
//! | `xr0`    | start the accumulation (go)   | the result |
//! | `xr1`    | base address of the array     | -          |
//! | `xr2`    | number of elements            | -          |
//!
//! Every accepted write is acknowledged with a write response. Accessing any
//! other register is a protocol violation that stops the simulation.
//!
//! # Ports
//!
//! Every level has the same ports:
//!  - `xcel_rx`/`xcel_tx`: [`XcelReq`]s in and [`XcelResp`]s out.
//!  - `mem_tx`/`mem_rx`: [`MemReq`]s out and [`MemResp`]s in.
//!
//! # State machine
//!
//! ```text
//!            go (size > 0)              mem_tx fired
//!   CONFIG ----------------> MEM_READ ----------------> COMPUTE
//!      ^                        ^                          |
//!      |                        |  idx < size - 1          |
//!      |                        +--------------------------+
//!      |                 last element                      |
//!      +---------------------------------------------------+
//! ```
//!
//! Only one memory read is outstanding at a time. Every read is issued with
//! tag 0 for address `base + 4 * idx`.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use cascade_engine::engine::Engine;
use cascade_engine::port::PortStateResult;
use cascade_engine::sim_error;
use cascade_engine::types::{MsgType, SimError, SimResult};
use cascade_track::entity::Entity;
use serde::{Deserialize, Serialize};

use crate::msg::{MemReq, MemResp, XcelReq, XcelResp};

pub mod cl;
pub mod fl;
pub mod rtl;

pub use cl::AccumXcelCl;
pub use fl::AccumXcelFl;
pub use rtl::AccumXcelRtl;

/// Register holding the result. Writing it starts the accumulation.
pub const XR_GO: u8 = 0;
/// Register holding the base address.
pub const XR_BASE: u8 = 1;
/// Register holding the number of elements.
pub const XR_SIZE: u8 = 2;

/// Bytes between consecutive elements.
pub const ELEMENT_BYTES: u32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum XcelState {
    #[default]
    Config,
    MemRead,
    Compute,
}

impl fmt::Display for XcelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XcelState::Config => write!(f, "CONFIG"),
            XcelState::MemRead => write!(f, "MEM_READ"),
            XcelState::Compute => write!(f, "COMPUTE"),
        }
    }
}

/// The architectural registers of an accelerator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XcelRegs {
    pub base: u32,
    pub size: u32,
    pub idx: u32,
    pub acc: u32,
}

/// A decoded register access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Go,
    SetBase(u32),
    SetSize(u32),
    ReadResult,
}

impl Command {
    /// Decode a request. Unmapped accesses are protocol violations.
    pub fn decode(request: &XcelReq) -> Result<Self, SimError> {
        match (request.msg_type, request.addr) {
            (MsgType::Write, XR_GO) => Ok(Command::Go),
            (MsgType::Write, XR_BASE) => Ok(Command::SetBase(request.data)),
            (MsgType::Write, XR_SIZE) => Ok(Command::SetSize(request.data)),
            (MsgType::Read, XR_GO) => Ok(Command::ReadResult),
            (msg_type, addr) => sim_error!(format!(
                "Protocol violation: {msg_type} of unmapped register xr{addr}"
            )),
        }
    }

    /// The response to this command given the current result.
    #[must_use]
    pub fn response(&self, acc: u32) -> XcelResp {
        match self {
            Command::ReadResult => XcelResp::read(acc),
            Command::Go | Command::SetBase(_) | Command::SetSize(_) => XcelResp::write(),
        }
    }
}

/// The memory read for element `idx` of the array at `base`.
#[must_use]
pub fn element_read(base: u32, idx: u32) -> MemReq<u32> {
    MemReq::read(0, base.wrapping_add(ELEMENT_BYTES.wrapping_mul(idx)), 0)
}

/// Whether element `idx` is the last of `size`.
#[must_use]
pub fn is_last(idx: u32, size: u32) -> bool {
    idx >= size.saturating_sub(1)
}

/// Level of detail of a model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Fl,
    Cl,
    Rtl,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Fl, Level::Cl, Level::Rtl];
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Fl => write!(f, "fl"),
            Level::Cl => write!(f, "cl"),
            Level::Rtl => write!(f, "rtl"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fl" => Ok(Level::Fl),
            "cl" => Ok(Level::Cl),
            "rtl" => Ok(Level::Rtl),
            _ => Err(format!("Unknown level '{s}' (expected fl, cl or rtl)")),
        }
    }
}

/// The ports and observable state shared by all accelerator levels.
pub trait Accelerator {
    fn port_xcel_rx(&self) -> PortStateResult<XcelReq>;
    fn connect_port_xcel_tx(&self, port_state: PortStateResult<XcelResp>) -> SimResult;
    fn port_mem_rx(&self) -> PortStateResult<MemResp<u32>>;
    fn connect_port_mem_tx(&self, port_state: PortStateResult<MemReq<u32>>) -> SimResult;

    fn state(&self) -> XcelState;
    fn regs(&self) -> XcelRegs;
}

/// Create and register an accumulator at the given level.
pub fn new_accum_xcel(
    engine: &Engine,
    parent: &Rc<Entity>,
    name: &str,
    level: Level,
) -> Result<Rc<dyn Accelerator>, SimError> {
    let xcel: Rc<dyn Accelerator> = match level {
        Level::Fl => AccumXcelFl::new_and_register(engine, parent, name)?,
        Level::Cl => AccumXcelCl::new_and_register(engine, parent, name)?,
        Level::Rtl => AccumXcelRtl::new_and_register(engine, parent, name)?,
    };
    Ok(xcel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_register_map() {
        assert_eq!(Command::decode(&XcelReq::write(0, 0)).unwrap(), Command::Go);
        assert_eq!(
            Command::decode(&XcelReq::write(1, 0x1000)).unwrap(),
            Command::SetBase(0x1000)
        );
        assert_eq!(
            Command::decode(&XcelReq::write(2, 4)).unwrap(),
            Command::SetSize(4)
        );
        assert_eq!(
            Command::decode(&XcelReq::read(0)).unwrap(),
            Command::ReadResult
        );
    }

    #[test]
    fn unmapped_registers() {
        let err = Command::decode(&XcelReq::write(3, 0)).unwrap_err();
        assert_eq!(
            format!("{err}"),
            "Error: Protocol violation: wr of unmapped register xr3"
        );
        assert!(Command::decode(&XcelReq::read(1)).is_err());
    }

    #[test]
    fn level_names() {
        for level in Level::ALL {
            assert_eq!(format!("{level}").parse::<Level>().unwrap(), level);
        }
        assert_eq!("RTL".parse::<Level>().unwrap(), Level::Rtl);
        assert!("gate".parse::<Level>().is_err());
    }

    #[test]
    fn element_addresses() {
        assert_eq!(element_read(0x1000, 0).addr, 0x1000);
        assert_eq!(element_read(0x1000, 3).addr, 0x100c);
        assert!(!is_last(0, 4));
        assert!(is_last(3, 4));
        assert!(is_last(0, 1));
    }
}
