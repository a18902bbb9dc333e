use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Lit};

/// Derive macro that reads `#[pattern(bytes = "...")]` on a unit struct
/// and implements `BytePattern` for it.
///
/// # Example
/// ```rust,ignore
/// #[derive(BytePattern)]
/// #[pattern(bytes = "GET /")]
/// pub struct GetPrefix;
/// ```
#[proc_macro_derive(BytePattern, attributes(pattern))]
pub fn derive_byte_pattern(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match impl_byte_pattern(&input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn impl_byte_pattern(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let bytes_str = extract_bytes_attr(&input.attrs)?;
    if bytes_str.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "pattern bytes must have >=1 bytes",
        ));
    }

    let byte_tokens = bytes_str.bytes().map(|b| quote! { #b });
    let len = bytes_str.len();

    Ok(quote! {
        impl #impl_generics ::signedhash::BytePattern for #name #ty_generics #where_clause {
            const BYTES: &'static [u8] = &[#(#byte_tokens),*];

            fn sequence() -> ::signedhash::SequenceMatcher {
                ::signedhash::SequenceMatcher::from_bytes(Self::BYTES)
                    .expect("pattern bytes always yield a non-empty sequence")
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            #[doc(hidden)]
            const _BYTE_PATTERN_LEN_CHECK: usize = #len;
        }
    })
}

// ---------------------------------------------------------------------------
// Attribute parsing
// ---------------------------------------------------------------------------

fn extract_bytes_attr(attrs: &[syn::Attribute]) -> syn::Result<String> {
    for attr in attrs {
        if !attr.path().is_ident("pattern") {
            continue;
        }

        let mut found: Option<String> = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("bytes") {
                let value = meta.value()?; // consumes `=`
                let lit: Lit = value.parse()?;
                if let Lit::Str(ls) = lit {
                    found = Some(ls.value());
                    Ok(())
                } else {
                    Err(meta.error("expected string literal for `bytes`"))
                }
            } else {
                Err(meta.error("unknown pattern attribute key"))
            }
        })?;

        if let Some(s) = found {
            return Ok(s);
        }
    }
    Err(syn::Error::new(
        proc_macro2::Span::call_site(),
        "missing #[pattern(bytes = \"...\")] attribute",
    ))
}
