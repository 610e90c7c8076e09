// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Per-field options from `#[typewalk(...)]`.
#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    dynamic: bool,
    skip: bool,
}

fn parse_field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("typewalk") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                options.rename = Some(name.value());
                Ok(())
            } else if meta.path.is_ident("dynamic") {
                options.dynamic = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `rename = \"...\"`, `dynamic` or `skip`"))
            }
        })?;
    }
    Ok(options)
}

/// `#[derive(Described)]` macro: generates a static `TypeDescriptor`.
///
/// Every field type must implement `typewalk::Field`: `i32`, `f32`,
/// `FixedString<N>`, fixed arrays of those, or another `#[derive(Described)]`
/// struct (nested composite). Offsets come from `core::mem::offset_of!`, so
/// the descriptor always matches the compiler's layout, and each field's
/// `Field` width is checked against its `size_of` at compile time.
///
/// Field attributes:
/// - `#[typewalk(rename = "name")]`: entry name differs from the Rust field
/// - `#[typewalk(dynamic)]`: a `[T; N]` field is a bounded dynamic array
/// - `#[typewalk(skip)]`: no entry is emitted (bookkeeping such as array lengths)
///
/// Example:
/// ```ignore
/// use typewalk::{Described, FixedString};
///
/// #[derive(Described)]
/// #[repr(C)]
/// struct Example {
///     data: i32,
///     name: FixedString<11>,
/// }
/// ```
#[proc_macro_derive(Described, attributes(typewalk))]
pub fn derive_described(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let type_name = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Described cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Only structs are supported",
            ))
        }
    };

    let mut entries = Vec::with_capacity(fields.len());
    let mut width_checks = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let options = parse_field_options(field)?;
        if options.skip {
            continue;
        }
        let entry_name = options.rename.unwrap_or_else(|| ident.to_string());
        let ty = &field.ty;

        let cardinality = if options.dynamic {
            quote! {
                match <#ty as ::typewalk::Field>::CARDINALITY {
                    ::typewalk::Cardinality::FixedArray(max_len) => {
                        ::typewalk::Cardinality::DynamicArray { max_len }
                    }
                    other => other,
                }
            }
        } else {
            quote! { <#ty as ::typewalk::Field>::CARDINALITY }
        };

        let message = format!(
            "`{}::{}`: Field metadata does not match the field's size",
            type_name, ident
        );
        width_checks.push(quote! {
            assert!(
                ::core::mem::size_of::<#ty>() == ::typewalk::field_width::<#ty>(),
                #message
            );
        });

        entries.push(quote! {
            ::typewalk::TypeEntry {
                name: #entry_name,
                offset: ::core::mem::offset_of!(#name, #ident),
                kind: <#ty as ::typewalk::Field>::KIND,
                cardinality: #cardinality,
                max_size: <#ty as ::typewalk::Field>::MAX_SIZE,
            }
        });
    }

    Ok(quote! {
        #[automatically_derived]
        unsafe impl ::typewalk::Described for #name {
            const DESCRIPTOR: &'static ::typewalk::TypeDescriptor = &::typewalk::TypeDescriptor {
                name: #type_name,
                size: ::core::mem::size_of::<#name>(),
                entries: &[#(#entries),*],
            };
        }

        const _: () = {
            #(#width_checks)*
        };

        // SAFETY: a composite spans exactly its descriptor's `size`.
        #[automatically_derived]
        unsafe impl ::typewalk::Field for #name {
            const KIND: ::typewalk::EntryKind = ::typewalk::EntryKind::Composite(
                <#name as ::typewalk::Described>::DESCRIPTOR,
            );
        }
    })
}
