// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! 32-bit integer multiplier.
//!
//! All variants accept a [`MulReq`] on `rx` and return the low 32 bits of
//! `a * b` as a [`MulResp`] on `tx`, in request order:
//!
//! | variant                  | latency                    | in flight |
//! |--------------------------|----------------------------|-----------|
//! | [`IntMulFl`]             | 0 (combinational)          | 0         |
//! | [`cl::new_fixed_lat`]    | [`cl::FIXED_LATENCY`]      | 1         |
//! | [`cl::new_var_lat`]      | number of bits set in `b`  | 1         |
//! | [`cl::new_nstage`]       | `nstages`                  | `nstages` |
//! | [`IntMulNstageRtl`]      | `nstages`                  | `nstages` |

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use cascade_components::traits::Minion;
use cascade_engine::engine::Engine;
use cascade_engine::types::SimError;
use cascade_track::entity::Entity;

use crate::msg::{MulReq, MulResp};

pub mod cl;
pub mod fl;
pub mod rtl;

pub use fl::IntMulFl;
pub use rtl::IntMulNstageRtl;

/// Selects a multiplier variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntMulModel {
    Fl,
    FixedLatCl,
    VarLatCl,
    NstageCl(usize),
    NstageRtl(usize),
}

impl fmt::Display for IntMulModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntMulModel::Fl => write!(f, "fl"),
            IntMulModel::FixedLatCl => write!(f, "fixed-lat-cl"),
            IntMulModel::VarLatCl => write!(f, "var-lat-cl"),
            IntMulModel::NstageCl(n) => write!(f, "{n}-stage-cl"),
            IntMulModel::NstageRtl(n) => write!(f, "{n}-stage-rtl"),
        }
    }
}

impl FromStr for IntMulModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        match s.as_str() {
            "fl" => return Ok(IntMulModel::Fl),
            "fixed-lat-cl" => return Ok(IntMulModel::FixedLatCl),
            "var-lat-cl" => return Ok(IntMulModel::VarLatCl),
            _ => {}
        }

        let staged = s
            .strip_suffix("-stage-cl")
            .map(|n| (n, IntMulModel::NstageCl as fn(usize) -> IntMulModel))
            .or_else(|| {
                s.strip_suffix("-stage-rtl")
                    .map(|n| (n, IntMulModel::NstageRtl as fn(usize) -> IntMulModel))
            });
        match staged {
            Some((n, variant)) => n
                .parse()
                .map(variant)
                .map_err(|e| format!("Bad stage count in '{s}': {e}")),
            None => Err(format!("Unknown multiplier '{s}'")),
        }
    }
}

/// Create and register the selected multiplier variant.
pub fn new_int_mul(
    engine: &Engine,
    parent: &Rc<Entity>,
    name: &str,
    model: IntMulModel,
) -> Result<Rc<dyn Minion<MulReq, MulResp>>, SimError> {
    let multiplier: Rc<dyn Minion<MulReq, MulResp>> = match model {
        IntMulModel::Fl => IntMulFl::new_and_register(engine, parent, name)?,
        IntMulModel::FixedLatCl => cl::new_fixed_lat(engine, parent, name)?,
        IntMulModel::VarLatCl => cl::new_var_lat(engine, parent, name)?,
        IntMulModel::NstageCl(nstages) => cl::new_nstage(engine, parent, name, nstages)?,
        IntMulModel::NstageRtl(nstages) => {
            IntMulNstageRtl::new_and_register(engine, parent, name, nstages)?
        }
    };
    Ok(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for model in [
            IntMulModel::Fl,
            IntMulModel::FixedLatCl,
            IntMulModel::VarLatCl,
            IntMulModel::NstageCl(4),
            IntMulModel::NstageRtl(8),
        ] {
            assert_eq!(format!("{model}").parse::<IntMulModel>().unwrap(), model);
        }
        assert!("x-stage-rtl".parse::<IntMulModel>().is_err());
        assert!("booth".parse::<IntMulModel>().is_err());
    }
}
