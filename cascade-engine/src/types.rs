// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use crate::traits::Evaluate;

/// The type of a component that can be registered with the `Engine` so that
/// it is evaluated every cycle.
pub type Component = Rc<dyn Evaluate + 'static>;

// Simulation errors

#[macro_export]
/// Build a [SimError] from a message that supports `to_string`
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError($msg.to_string()))
    };
}

/// The `SimError` is what should be returned in the case of an error
#[derive(Debug, Clone, PartialEq)]
pub struct SimError(pub String);

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl Error for SimError {}

/// The SimResult is the return type for most simulation functions
pub type SimResult = Result<(), SimError>;

/// Message types carried by requests and responses.
///
/// The discriminants match the 4-bit `type` field of the memory wire format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MsgType {
    #[default]
    Read = 0,
    Write = 1,
}

impl MsgType {
    /// Decode the wire value of a message type.
    pub fn from_bits(bits: u8) -> Result<Self, SimError> {
        match bits {
            0 => Ok(MsgType::Read),
            1 => Ok(MsgType::Write),
            _ => sim_error!(format!("Unknown message type {bits}")),
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MsgType::Read => {
                write!(f, "rd")
            }
            MsgType::Write => {
                write!(f, "wr")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_type_wire_values() {
        assert_eq!(MsgType::Read as u8, 0);
        assert_eq!(MsgType::Write as u8, 1);
        assert_eq!(MsgType::from_bits(1), Ok(MsgType::Write));
        assert!(MsgType::from_bits(7).is_err());
    }

    #[test]
    fn error_display() {
        let result: SimResult = sim_error!("bad address 3");
        assert_eq!(format!("{}", result.unwrap_err()), "Error: bad address 3");
    }
}
