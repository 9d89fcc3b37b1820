use crate::macros::fields::{init_body, sealed_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Path};

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let (family, init) = parse_args(input)?;
    let fields = sealed_fields(input, "Variant")?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let seal = fields.seal;
    let claim = quote! { ::sealed_enum::Seal::<#family>::new::<Self>() };
    let body = init_body(&fields, &claim, init.as_ref());

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::sealed_enum::Variant for #name #ty_generics #where_clause {
            type Family = #family;

            fn init() -> ::core::result::Result<Self, ::sealed_enum::InitError> {
                #body
            }

            fn seal(&self) -> &::sealed_enum::Seal<#family> {
                &self.#seal
            }

            fn upcast(&'static self) -> &'static <#family as ::sealed_enum::Family>::Member {
                self
            }
        }
    })
}

fn parse_args(input: &DeriveInput) -> Result<(Path, Option<Path>), syn::Error> {
    let mut family = None;
    let mut init = None;

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("variant")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("family") {
                family = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("init") {
                init = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("expected `family` or `init`"));
            }
            Ok(())
        })?;
    }

    let family = family.ok_or_else(|| {
        syn::Error::new_spanned(&input.ident, "Variant requires `#[variant(family = Path)]`")
    })?;
    Ok((family, init))
}
