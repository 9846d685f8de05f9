//! Derive macros for todo-desk
//!
//! This crate provides procedural macros to reduce boilerplate when building
//! reducers.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates helpers for action enums (commands/events)
//! - `#[derive(State)]` - Generates revision accessors for state structs
//!
//! # Example
//!
//! ```ignore
//! use todo_desk_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[command]
//!     AddTodo { text: String },
//!
//!     #[event]
//!     Persisted { at: DateTime<Utc> },
//! }
//!
//! // Generated methods:
//! assert!(TodoAction::AddTodo { text: "test".into() }.is_command());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_command()` - Returns true if this variant is a command (input from a user or caller)
/// - `is_event()` - Returns true if this variant is an event (fed back by an effect)
/// - `name()` - Returns the variant name, for logging
///
/// # Attributes
///
/// - `#[command]` - Mark a variant as a command
/// - `#[event]` - Mark a variant as an event
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]` attributes
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut command_arms = Vec::new();
    let mut event_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[command] and #[event]",
            )
            .to_compile_error()
            .into();
        }

        let pattern = variant_pattern(&variant.ident, &variant.fields);

        if is_command {
            command_arms.push(quote! { #pattern => true, });
        }

        if is_event {
            event_arms.push(quote! { #pattern => true, });
        }

        let variant_name = variant.ident.to_string();
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a command
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#event_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for State structs
///
/// Handles a revision counter field marked with `#[revision]`. The field
/// must be a `u64`. Generates:
/// - `revision()` - the current value
/// - `bump_revision()` - increments the counter (wrapping)
///
/// Structs without a `#[revision]` field get no extra methods.
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-struct type
/// - More than one field is marked `#[revision]`
/// - The marked field is a tuple-struct field
///
/// # Example
///
/// ```ignore
/// use todo_desk_macros::State;
///
/// #[derive(State, Clone, Debug, Default)]
/// struct TodoState {
///     pub todos: Vec<TodoItem>,
///     #[revision]
///     revision: u64,
/// }
///
/// let mut state = TodoState::default();
/// state.bump_revision();
/// assert_eq!(state.revision(), 1);
/// ```
#[proc_macro_derive(State, attributes(revision))]
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(State)] can only be used on structs")
            .to_compile_error()
            .into();
    };

    let mut marked = data_struct
        .fields
        .iter()
        .filter(|field| has_attribute(&field.attrs, "revision"));

    let Some(field) = marked.next() else {
        return TokenStream::new();
    };

    if let Some(extra) = marked.next() {
        return syn::Error::new_spanned(extra, "Only one field may be marked #[revision]")
            .to_compile_error()
            .into();
    }

    let Some(field_name) = field.ident.as_ref() else {
        return syn::Error::new_spanned(field, "#[revision] requires a named field")
            .to_compile_error()
            .into();
    };

    let expanded = quote! {
        impl #name {
            /// Current revision; increases by one per recorded change
            #[must_use]
            pub const fn revision(&self) -> u64 {
                self.#field_name
            }

            /// Record a change
            pub const fn bump_revision(&mut self) {
                self.#field_name = self.#field_name.wrapping_add(1);
            }
        }
    };

    TokenStream::from(expanded)
}

/// Match pattern for a variant, ignoring its fields
fn variant_pattern(variant: &Ident, fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Named(_) => quote! { Self::#variant { .. } },
        Fields::Unnamed(_) => quote! { Self::#variant(..) },
        Fields::Unit => quote! { Self::#variant },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
