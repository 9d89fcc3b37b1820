use crate::macros::fields::{init_body, sealed_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Path, Type};

#[derive(Default)]
struct FamilyArgs {
    member: Option<Type>,
    variants: Vec<Path>,
    init: Option<Path>,
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let args = parse_args(input)?;
    if args.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Family requires `#[family(variants(...))]` with at least one variant",
        ));
    }
    let fields = sealed_fields(input, "Family")?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let seal = fields.seal;
    let member = args.member.map_or_else(
        || quote! { dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync },
        |ty| quote! { #ty },
    );
    let claim = quote! { ::sealed_enum::Seal::<Self>::family() };
    let body = init_body(&fields, &claim, args.init.as_ref());
    let variants = &args.variants;

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::sealed_enum::Family for #name #ty_generics #where_clause {
            type Member = #member;

            fn init() -> ::core::result::Result<Self, ::sealed_enum::InitError> {
                #body
            }

            fn seal(&self) -> &::sealed_enum::Seal<Self> {
                &self.#seal
            }

            fn members(members: &mut ::sealed_enum::Members<Self>) {
                #( members.add::<#variants>(); )*
            }
        }
    })
}

fn parse_args(input: &DeriveInput) -> Result<FamilyArgs, syn::Error> {
    let mut args = FamilyArgs::default();

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("family")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("member") {
                args.member = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("variants") {
                meta.parse_nested_meta(|variant| {
                    args.variants.push(variant.path);
                    Ok(())
                })?;
            } else if meta.path.is_ident("init") {
                args.init = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("expected `member`, `variants` or `init`"));
            }
            Ok(())
        })?;
    }

    Ok(args)
}
