//! `#[derive(Record)]` for markstruct.
//!
//! Generates the `Record` and `Visit` implementations for a struct: a field
//! descriptor table built once per type, plus indexed mutable field access.
//!
//! Field attributes:
//! - `#[markdown = "on"]` or `#[markdown(tag = "on")]`: annotation value,
//!   resolved case-insensitively by markstruct.
//! - `#[markdown(skip)]`: leave the field out of the descriptor entirely.
//!   Required for field types that do not implement `Visit`.

use proc_macro::TokenStream;
use proc_macro2::{Group, Ident, TokenStream as TokenStream2, TokenTree};
use quote::{ToTokens, quote};
use syn::{
    Data, DeriveInput, Expr, ExprLit, Field, Fields, Index, Lit, LitStr, Member, Meta,
    parse_macro_input,
};

#[proc_macro_derive(Record, attributes(markdown))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct FieldAttrs {
    annotation: Option<LitStr>,
    skip: bool,
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("markdown")) {
        match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(value),
                    ..
                }) => attrs.annotation = Some(value.clone()),
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected string literal, e.g. #[markdown = \"on\"]",
                    ));
                }
            },
            Meta::List(_) => attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else if meta.path.is_ident("tag") {
                    attrs.annotation = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported markdown attribute, expected `skip` or `tag`"))
                }
            })?,
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "expected #[markdown = \"on\"], #[markdown(tag = \"on\")] or #[markdown(skip)]",
                ));
            }
        }
    }

    Ok(attrs)
}

/// Replace `Self` with the concrete type name. The descriptor table lives in
/// a `static`, where `Self` is not in scope.
fn replace_self(tokens: TokenStream2, name: &Ident) -> TokenStream2 {
    tokens
        .into_iter()
        .map(|tree| match tree {
            TokenTree::Ident(ident) if ident == "Self" => {
                TokenTree::Ident(Ident::new(&name.to_string(), ident.span()))
            }
            TokenTree::Group(group) => {
                let mut replaced =
                    Group::new(group.delimiter(), replace_self(group.stream(), name));
                replaced.set_span(group.span());
                TokenTree::Group(replaced)
            }
            other => other,
        })
        .collect()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Record)] does not support generic parameters",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "#[derive(Record)] only supports structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "#[derive(Record)] only supports structs",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut accessors = Vec::new();

    let members: Vec<(Member, &Field)> = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.clone().map(|ident| (Member::Named(ident), f)))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (Member::Unnamed(Index::from(i)), f))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    for (member, field) in members {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let index = accessors.len();
        let field_name = match &member {
            Member::Named(ident) => ident.to_string(),
            Member::Unnamed(index) => index.index.to_string(),
        };
        let field_name = field_name.trim_start_matches("r#").to_owned();
        let ty = replace_self(field.ty.to_token_stream(), name);
        let annotation = match &attrs.annotation {
            Some(value) => quote!(::std::option::Option::Some(#value)),
            None => quote!(::std::option::Option::None),
        };

        descriptors.push(quote! {
            ::markstruct::FieldDescriptor::new(
                #field_name,
                <#ty as ::markstruct::Visit>::shape(),
                #annotation,
            )
        });
        accessors.push(quote! {
            #index => ::std::option::Option::Some(
                &mut self.#member as &mut dyn ::markstruct::Visit
            ),
        });
    }

    let name_str = name.to_string();

    Ok(quote! {
        impl ::markstruct::Record for #name {
            fn descriptor(&self) -> &'static ::markstruct::RecordDescriptor {
                static DESCRIPTOR: ::std::sync::LazyLock<::markstruct::RecordDescriptor> =
                    ::std::sync::LazyLock::new(|| {
                        ::markstruct::RecordDescriptor::new(
                            #name_str,
                            ::std::vec![#(#descriptors),*],
                        )
                    });
                &DESCRIPTOR
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<&mut dyn ::markstruct::Visit> {
                match index {
                    #(#accessors)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::markstruct::Visit for #name {
            fn shape() -> ::markstruct::Shape {
                ::markstruct::Shape::Record
            }

            fn target(&mut self) -> ::markstruct::Target<'_> {
                ::markstruct::Target::Record(self)
            }
        }
    })
}
