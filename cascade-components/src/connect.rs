// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Helper connection macros

pub use paste::paste;

#[macro_export]
/// Connect an [OutPort](cascade_engine::port::OutPort) port to an
/// [InPort](cascade_engine::port::InPort)
///
/// Evaluates to the [SimResult](cascade_engine::types::SimResult) of the
/// connection.
macro_rules! connect_port {
    ($from:expr, $from_port_name:ident => $to:expr, $to_port_name:ident) => {{
        $crate::connect::paste! {
            $from.[< connect_port_ $from_port_name >]($to.[< port_ $to_port_name >]())
        }
    }};
    ($from:expr, $from_port_name:ident, $from_index:expr => $to:expr, $to_port_name:ident) => {{
        let from_index: usize = $from_index;
        $crate::connect::paste! {
            $from.[< connect_port_ $from_port_name _i >](
                from_index,
                $to.[< port_ $to_port_name >](),
            )
        }
    }};
    ($from:expr, $from_port_name:ident => $to:expr, $to_port_name:ident, $to_index:expr) => {{
        let to_index: usize = $to_index;
        $crate::connect::paste! {
            $from.[< connect_port_ $from_port_name >]($to.[< port_ $to_port_name _i >](to_index))
        }
    }};
    (
        $from:expr, $from_port_name:ident, $from_index:expr =>
        $to:expr, $to_port_name:ident, $to_index:expr
    ) => {{
        let from_index: usize = $from_index;
        let to_index: usize = $to_index;
        $crate::connect::paste! {
            $from.[< connect_port_ $from_port_name _i >](
                from_index,
                $to.[< port_ $to_port_name _i >](to_index),
            )
        }
    }};
}
