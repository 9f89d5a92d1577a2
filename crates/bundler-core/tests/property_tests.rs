//! Property-based tests for in-archive name computation.

#![allow(clippy::unwrap_used)]

use bundler_core::BundleError;
use bundler_core::archive::naming::has_parent_segment;
use bundler_core::archive::naming::normalize;
use bundler_core::archive::naming::preserved_prefixes;
use bundler_core::archive::naming::relative_name;
use bundler_core::archive::naming::to_slash;
use proptest::prelude::*;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-][a-zA-Z0-9._-]{0,10}"
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("/"), Just("//"), Just("/./")]
}

proptest! {
    /// Every prefix of a preserved path is listed, in order, with `/` names.
    #[test]
    fn prop_preserved_prefixes_list_every_segment(
        segments in prop::collection::vec(segment(), 1..6),
        separators in prop::collection::vec(separator(), 6),
    ) {
        let mut literal = segments[0].clone();
        for (segment, sep) in segments[1..].iter().zip(&separators) {
            literal.push_str(sep);
            literal.push_str(segment);
        }

        let prefixes = preserved_prefixes(Path::new(&literal)).unwrap();
        prop_assert_eq!(prefixes.len(), segments.len());
        for (i, (path, name)) in prefixes.iter().enumerate() {
            prop_assert_eq!(name, &segments[..=i].join("/"));
            prop_assert_eq!(path, &segments[..=i].iter().collect::<PathBuf>());
            prop_assert!(!name.split('/').any(|s| s == ".."));
        }
    }

    /// A `..` segment anywhere is rejected.
    #[test]
    fn prop_parent_segment_rejected(
        before in prop::collection::vec(segment(), 0..4),
        after in prop::collection::vec(segment(), 0..4),
    ) {
        let mut segments = before;
        segments.push("..".to_string());
        segments.extend(after);
        let literal = segments.join("/");

        prop_assert!(has_parent_segment(Path::new(&literal)));
        let rejected = matches!(
            preserved_prefixes(Path::new(&literal)),
            Err(BundleError::ParentTraversal { .. })
        );
        prop_assert!(rejected);
    }

    /// Normalized absolute paths have no `.` or `..` components.
    #[test]
    fn prop_normalized_absolute_paths_are_clean(
        parts in prop::collection::vec(
            prop_oneof![segment(), Just(".".to_string()), Just("..".to_string())],
            0..8
        ),
    ) {
        let path = PathBuf::from(format!("/{}", parts.join("/")));
        let normalized = normalize(&path);

        prop_assert!(normalized.has_root());
        prop_assert!(normalized
            .components()
            .all(|c| matches!(c, Component::RootDir | Component::Normal(_))));
        prop_assert_eq!(normalize(&normalized), normalized);
    }

    /// Names under a base are the relative segments joined by `/`.
    #[test]
    fn prop_relative_names_use_forward_slashes(
        base in prop::collection::vec(segment(), 1..4),
        rest in prop::collection::vec(segment(), 1..4),
    ) {
        let base_path: PathBuf = std::iter::once("/".to_string()).chain(base).collect();
        let full = rest.iter().fold(base_path.clone(), |path, s| path.join(s));

        let name = relative_name(&full, &base_path).unwrap();
        prop_assert_eq!(&name, &rest.join("/"));
        prop_assert!(!name.starts_with('/'));

        let relative: PathBuf = rest.iter().collect();
        prop_assert_eq!(to_slash(&relative).unwrap(), rest.join("/"));
    }
}
