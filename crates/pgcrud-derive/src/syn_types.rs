//! Type helper utilities for syn type analysis.

/// Extract the inner type T from Option<T>, or return None if not an Option type.
pub(crate) fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    match args.args.first() {
        Some(syn::GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// `String` / `std::string::String`.
pub(crate) fn is_string(ty: &syn::Type) -> bool {
    let syn::Type::Path(type_path) = ty else {
        return false;
    };
    type_path.qself.is_none()
        && type_path
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "String" && seg.arguments.is_empty())
}

/// `&str` with any lifetime.
pub(crate) fn is_str_ref(ty: &syn::Type) -> bool {
    let syn::Type::Reference(reference) = ty else {
        return false;
    };
    let syn::Type::Path(elem) = &*reference.elem else {
        return false;
    };
    reference.mutability.is_none() && elem.qself.is_none() && elem.path.is_ident("str")
}

/// How a field reports itself absent in an UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Absence {
    /// `Option<_>`: absent when `None`.
    None,
    /// `String` or `&str`: absent when empty.
    Empty,
    /// Everything else is always written.
    Never,
}

pub(crate) fn absence(ty: &syn::Type) -> Absence {
    if option_inner(ty).is_some() {
        Absence::None
    } else if is_string(ty) || is_str_ref(ty) {
        Absence::Empty
    } else {
        Absence::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(src: &str) -> syn::Type {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn detects_option_types() {
        assert!(option_inner(&ty("Option<String>")).is_some());
        assert!(option_inner(&ty("std::option::Option<i32>")).is_some());
        assert!(option_inner(&ty("Vec<i32>")).is_none());
    }

    #[test]
    fn detects_string() {
        assert!(is_string(&ty("String")));
        assert!(is_string(&ty("std::string::String")));
        assert!(!is_string(&ty("Option<String>")));
        assert!(!is_string(&ty("&str")));
    }

    #[test]
    fn detects_str_references() {
        assert!(is_str_ref(&ty("&str")));
        assert!(is_str_ref(&ty("&'static str")));
        assert!(!is_str_ref(&ty("&mut str")));
        assert!(!is_str_ref(&ty("&String")));
        assert!(!is_str_ref(&ty("str")));
    }

    #[test]
    fn classifies_absence() {
        assert_eq!(absence(&ty("Option<String>")), Absence::None);
        assert_eq!(absence(&ty("String")), Absence::Empty);
        assert_eq!(absence(&ty("&'static str")), Absence::Empty);
        assert_eq!(absence(&ty("i32")), Absence::Never);
        assert_eq!(absence(&ty("bool")), Absence::Never);
        assert_eq!(absence(&ty("chrono::NaiveDateTime")), Absence::Never);
    }
}
