// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Model builder

extern crate proc_macro;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{self, Data, DeriveInput, Fields, parse_macro_input};

/// Create a std::fmt::Display implementation for a struct with an Entity.
#[proc_macro_derive(EntityDisplay)]
pub fn entity_display(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let DeriveInput {
        ident, generics, ..
    } = parse_macro_input!(input);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let output = quote! {
        impl #impl_generics std::fmt::Display for #ident #ty_generics #where_clause {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.entity.fmt(f)
            }
        }
    };

    output.into()
}

/// Create `latch_registers()` and `reset_registers()` for a struct whose
/// register fields are marked with `#[register]`.
///
/// Each marked field must provide `latch()` and `reset()` (for example
/// `cascade_engine::register::Reg`).
#[proc_macro_derive(Registers, attributes(register))]
pub fn registers(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = parse_macro_input!(input);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let registers = register_fields(&data);

    let output = quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Move every register's next value into its output.
            fn latch_registers(&self) {
                #( self.#registers.latch(); )*
            }

            /// Return every register to its reset value.
            fn reset_registers(&self) {
                #( self.#registers.reset(); )*
            }
        }
    };

    output.into()
}

fn register_fields(data: &Data) -> Vec<TokenStream> {
    let Data::Struct(data) = data else {
        return Vec::new();
    };
    let Fields::Named(fields) = &data.fields else {
        return Vec::new();
    };

    fields
        .named
        .iter()
        .filter(|field| {
            field
                .attrs
                .iter()
                .any(|attr| attr.path.is_ident("register"))
        })
        .filter_map(|field| field.ident.as_ref())
        .map(|ident| quote! { #ident })
        .collect()
}
