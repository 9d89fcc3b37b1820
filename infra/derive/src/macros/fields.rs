//! Field handling shared by the `Family` and `Variant` derives.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, Type};

/// The struct layout both derives rely on: one `Seal` field plus defaulted fields.
pub struct SealedFields<'a> {
    pub seal: &'a Ident,
    pub rest: Vec<&'a Ident>,
}

pub fn sealed_fields<'a>(input: &'a DeriveInput, derive: &str) -> Result<SealedFields<'a>, syn::Error> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} can only be derived for structs"),
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} requires named fields with a `Seal` field"),
        ));
    };

    let (seals, rest): (Vec<_>, Vec<_>) = fields.named.iter().partition(|f| is_seal(&f.ty));
    let [seal] = seals.as_slice() else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} requires exactly one field of type `Seal<..>`"),
        ));
    };

    Ok(SealedFields {
        seal: seal.ident.as_ref().ok_or_else(|| syn::Error::new_spanned(seal, "unnamed field"))?,
        rest: rest.iter().filter_map(|f| f.ident.as_ref()).collect(),
    })
}

/// Body of the generated `init`: either a user initializer or field defaults.
pub fn init_body(fields: &SealedFields<'_>, claim: &TokenStream, init: Option<&syn::Path>) -> TokenStream {
    if let Some(path) = init {
        return quote! {
            let seal = #claim?;
            #path(seal).map_err(::core::convert::Into::into)
        };
    }

    let seal = fields.seal;
    let rest = &fields.rest;
    quote! {
        ::core::result::Result::Ok(Self {
            #seal: #claim?,
            #( #rest: ::core::default::Default::default(), )*
        })
    }
}

fn is_seal(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Seal")
}
