//! Derive macros for scoped-di
//!
//! `#[derive(Component)]` implements `scoped_di::Component` for a struct whose
//! dependencies are service references. Each `#[inject]` field is resolved
//! from the innermost scope when the component is constructed.
//!
//! # Example
//!
//! ```rust,ignore
//! use scoped_di::{Bindings, Component, Scope, ServiceRef};
//!
//! trait Printer: Send + Sync {
//!     fn print(&self, text: &str);
//! }
//!
//! struct Metrics;
//!
//! #[derive(Component)]
//! struct Greeter {
//!     #[inject]
//!     printer: ServiceRef<dyn Printer>,
//!     #[inject(optional)]
//!     metrics: Option<ServiceRef<Metrics>>,
//!     // Non-injected fields use Default
//!     greeted: std::sync::atomic::AtomicU64,
//! }
//!
//! let app = Bindings::new()
//!     .bind::<dyn Printer, ConsolePrinter>()
//!     .bind::<Greeter, Greeter>();
//! let _scope = Scope::new(&[&app])?;
//! let greeter = ServiceRef::<Greeter>::new()?;
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Type, parse_macro_input};

/// Derive macro for the `Component` trait.
///
/// The generated implementation takes no arguments (`type Args = ()`) and
/// builds the struct field by field.
///
/// # Attributes
///
/// - `#[inject]` - Resolve the field from the current scope. The field type
///   must be `ServiceRef<I>` or `ServiceRef<I, Tag>`.
/// - `#[inject(optional)]` - Resolve the field if the interface is bound. The
///   field type must be `Option<ServiceRef<..>>`.
///
/// Fields without `#[inject]` use `Default::default()`.
///
/// # Generated Code
///
/// ```rust,ignore
/// impl scoped_di::Component for Greeter {
///     type Args = ();
///
///     fn construct(_: ()) -> scoped_di::Result<Self> {
///         Ok(Self {
///             printer: scoped_di::ServiceRef::new()?,
///             metrics: scoped_di::ServiceRef::optional()?,
///             greeted: Default::default(),
///         })
///     }
/// }
/// ```
#[proc_macro_derive(Component, attributes(inject))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_component(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_component(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Component can only be derived for structs",
            ));
        }
    };

    let body = match fields {
        Fields::Named(named) => {
            let inits = named
                .named
                .iter()
                .map(|field| {
                    let field_name = &field.ident;
                    let value = field_init(&field.attrs, &field.ty)?;
                    Ok(quote! { #field_name: #value })
                })
                .collect::<syn::Result<Vec<_>>>()?;
            quote! { Self { #(#inits),* } }
        }
        Fields::Unnamed(unnamed) => {
            let inits = unnamed
                .unnamed
                .iter()
                .map(|field| field_init(&field.attrs, &field.ty))
                .collect::<syn::Result<Vec<_>>>()?;
            quote! { Self ( #(#inits),* ) }
        }
        Fields::Unit => quote! { Self },
    };

    Ok(quote! {
        impl #impl_generics ::scoped_di::Component for #name #ty_generics #where_clause {
            type Args = ();

            fn construct(_: ()) -> ::scoped_di::Result<Self> {
                ::std::result::Result::Ok(#body)
            }
        }
    })
}

/// Types of inject attributes
enum InjectAttr {
    Required,
    Optional,
}

/// Initializer expression for one field.
fn field_init(attrs: &[Attribute], ty: &Type) -> syn::Result<proc_macro2::TokenStream> {
    match find_inject_attr(attrs)? {
        Some(InjectAttr::Required) => {
            if !is_service_ref(ty) {
                return Err(syn::Error::new_spanned(
                    ty,
                    "Fields marked with #[inject] must have type ServiceRef<I>",
                ));
            }
            Ok(quote! { ::scoped_di::ServiceRef::new()? })
        }
        Some(InjectAttr::Optional) => {
            if !option_inner(ty).is_some_and(is_service_ref) {
                return Err(syn::Error::new_spanned(
                    ty,
                    "Fields marked with #[inject(optional)] must have type Option<ServiceRef<I>>",
                ));
            }
            Ok(quote! { ::scoped_di::ServiceRef::optional()? })
        }
        None => Ok(quote! { ::std::default::Default::default() }),
    }
}

/// Find and parse the #[inject] attribute
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<InjectAttr>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    if attr.meta.require_path_only().is_ok() {
        return Ok(Some(InjectAttr::Required));
    }

    let nested = attr.parse_args::<syn::Ident>()?;
    if nested == "optional" {
        Ok(Some(InjectAttr::Optional))
    } else {
        Err(syn::Error::new_spanned(
            nested,
            "expected #[inject] or #[inject(optional)]",
        ))
    }
}

/// Whether the last path segment is `ServiceRef<..>`
fn is_service_ref(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    type_path.path.segments.last().is_some_and(|segment| {
        segment.ident == "ServiceRef"
            && matches!(segment.arguments, syn::PathArguments::AngleBracketed(_))
    })
}

/// Extract T from Option<T>
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
