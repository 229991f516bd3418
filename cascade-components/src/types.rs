// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Shared types.

/// The `DataGenerator` is what a [source](crate::source) uses
/// to generate data values to send.
pub type DataGenerator<T> = Box<dyn Iterator<Item = T> + 'static>;

/// The function a unit applies to each request to produce its response.
pub type Transform<Req, Resp> = Box<dyn Fn(&Req) -> Resp + 'static>;
