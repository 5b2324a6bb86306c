use proc_macro::TokenStream;
use proc_macro2::{Ident, Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::{parse::Parse, parse_macro_input, spanned::Spanned, Attribute, Data, DeriveInput};

#[derive(Debug, Clone)]
enum ToFromValue {
    Character(char),
    String(String),
}

impl Parse for ToFromValue {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let value = input.parse::<Literal>()?;
        if !input.is_empty() {
            return Err(syn::Error::new(
                input.span(),
                "to_from only accepts one argument",
            ));
        }

        match litrs::Literal::from(&value) {
            litrs::Literal::Char(c) => Ok(Self::Character(c.value())),
            litrs::Literal::String(s) => Ok(Self::String(s.value().to_owned())),
            _ => Err(syn::Error::new(
                value.span(),
                "to_from is not implemented for this kind of value",
            )),
        }
    }
}

impl ToFromValue {
    fn parse_attr(attr: &Attribute) -> Option<syn::Result<Self>> {
        if !attr.path().is_ident("to_from") {
            return None;
        }

        Some(attr.parse_args())
    }
}

fn impl_char_enum(ident: &Ident, variants: &[(Ident, char)]) -> TokenStream2 {
    let from_items = variants.iter().map(|(name, value)| {
        quote! { #value => Ok(Self::#name), }
    });
    let to_items = variants.iter().map(|(name, value)| {
        quote! { Self::#name => #value, }
    });

    quote! {
        impl ::core::convert::TryFrom<char> for #ident {
            type Error = ();

            fn try_from(value: char) -> Result<Self, ()> {
                match value {
                    #(#from_items)*
                    _ => Err(())
                }
            }
        }

        impl #ident {
            pub const fn as_char(&self) -> char {
                match self {
                    #(#to_items)*
                }
            }
        }
    }
}

fn impl_str_enum(ident: &Ident, variants: &[(Ident, String)]) -> TokenStream2 {
    let from_items = variants.iter().map(|(name, value)| {
        quote! { #value => Ok(Self::#name), }
    });
    let to_items = variants.iter().map(|(name, value)| {
        quote! { Self::#name => #value, }
    });

    quote! {
        impl ::core::convert::TryFrom<&str> for #ident {
            type Error = ();

            fn try_from(value: &str) -> Result<Self, ()> {
                match value {
                    #(#from_items)*
                    _ => Err(())
                }
            }
        }

        impl #ident {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    #(#to_items)*
                }
            }
        }
    }
}

fn impl_to_from(ident: &Ident, variants: &[(Ident, ToFromValue)]) -> syn::Result<TokenStream2> {
    let chars = variants
        .iter()
        .filter_map(|(name, value)| match value {
            ToFromValue::Character(c) => Some((name.clone(), *c)),
            ToFromValue::String(_) => None,
        })
        .collect::<Vec<_>>();
    let strings = variants
        .iter()
        .filter_map(|(name, value)| match value {
            ToFromValue::String(s) => Some((name.clone(), s.clone())),
            ToFromValue::Character(_) => None,
        })
        .collect::<Vec<_>>();

    match (chars.is_empty(), strings.is_empty()) {
        (false, true) => Ok(impl_char_enum(ident, &chars)),
        (true, false) => Ok(impl_str_enum(ident, &strings)),
        (true, true) => Ok(TokenStream2::new()),
        (false, false) => Err(syn::Error::new(
            ident.span(),
            "to_from values must be all characters or all strings",
        )),
    }
}

#[proc_macro_derive(ToFromEnum, attributes(to_from))]
pub fn to_from_enum(input: TokenStream) -> TokenStream {
    let DeriveInput { ident, data, .. } = parse_macro_input!(input);

    let Data::Enum(data) = data else {
        return syn::Error::new(ident.span(), "ToFromEnum only supports enums")
            .to_compile_error()
            .into();
    };

    let mut errors = TokenStream2::new();
    let mut variants = vec![];
    for variant in data.variants {
        let to_from = variant
            .attrs
            .iter()
            .filter_map(ToFromValue::parse_attr)
            .collect::<Result<Vec<_>, _>>();

        match to_from {
            Ok(items) => match items.len() {
                0 => errors.extend(
                    syn::Error::new(variant.span(), "No to_from attribute specified")
                        .to_compile_error(),
                ),
                1 => variants.push((variant.ident, items[0].clone())),
                _ => errors.extend(
                    syn::Error::new(variant.span(), "Multiple to_from attributes")
                        .to_compile_error(),
                ),
            },
            Err(e) => errors.extend(e.to_compile_error()),
        }
    }

    let mut output = TokenStream2::new();
    if errors.is_empty() {
        match impl_to_from(&ident, &variants) {
            Ok(items) => output.extend(items),
            Err(e) => errors.extend(e.to_compile_error()),
        }
    }
    output.extend(errors);

    output.into()
}
