// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Roles a component can take in a request/response interface.

use cascade_engine::port::PortStateResult;
use cascade_engine::traits::SimObject;
use cascade_engine::types::SimResult;

/// The serving side of a request/response interface.
///
/// A minion consumes requests on `rx` and produces exactly one response on
/// `tx` for each request that fires.
pub trait Minion<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    fn port_rx(&self) -> PortStateResult<Req>;
    fn connect_port_tx(&self, port_state: PortStateResult<Resp>) -> SimResult;
}
