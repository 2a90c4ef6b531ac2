//! Utilities for turning free text into URL-safe post slugs.
//!
//! Derivation is total and idempotent: the input is lowercased, every maximal
//! run of characters outside `[a-z0-9]` collapses into a single hyphen, and a
//! hyphen left at either end is stripped. Characters without an ASCII
//! lowercase form (accents, CJK, emoji) are treated as separators rather than
//! transliterated.

/// Derive a slug from the provided human-readable text.
///
/// Empty or separator-only input yields an empty string.
pub fn derive_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Returns true when `candidate` is already in derived form.
///
/// Canonical slugs are empty or match `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn is_canonical_slug(candidate: &str) -> bool {
    if candidate.is_empty() {
        return true;
    }

    candidate
        .split('-')
        .all(|segment| !segment.is_empty() && segment.bytes().all(is_slug_byte))
}

fn is_slug_byte(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_collapses_punctuation() {
        assert_eq!(derive_slug("Hello, World!"), "hello-world");
    }

    #[test]
    fn derive_slug_trims_and_collapses_whitespace_runs() {
        assert_eq!(
            derive_slug(" Multiple   Spaces--Here "),
            "multiple-spaces-here"
        );
    }

    #[test]
    fn derive_slug_of_empty_or_separator_only_input_is_empty() {
        assert_eq!(derive_slug(""), "");
        assert_eq!(derive_slug("  --!!  "), "");
    }

    #[test]
    fn derive_slug_keeps_digits() {
        assert_eq!(derive_slug("Rust 2024 Edition"), "rust-2024-edition");
    }

    #[test]
    fn derive_slug_treats_non_ascii_letters_as_separators() {
        assert_eq!(derive_slug("Café Über Straße"), "caf-ber-stra-e");
        assert_eq!(derive_slug("基础 tutorial"), "tutorial");
    }

    #[test]
    fn derive_slug_is_idempotent() {
        let samples = [
            "Hello, World!",
            " Multiple   Spaces--Here ",
            "already-a-slug",
            "--leading and trailing--",
            "MiXeD_case__under_scores",
            "",
        ];

        for sample in samples {
            let once = derive_slug(sample);
            assert_eq!(derive_slug(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn derived_slugs_are_canonical() {
        let samples = ["Hello, World!", "  ", "a", "A--B--C", "ümlaut only ü", "9 lives"];

        for sample in samples {
            assert!(is_canonical_slug(&derive_slug(sample)), "input: {sample:?}");
        }
    }

    #[test]
    fn every_basic_plane_and_emoji_char_derives_canonically() {
        let scalars = (0u32..=0xFFFF)
            .chain(0x1F300..=0x1F64F)
            .filter_map(char::from_u32);

        for ch in scalars {
            for input in [
                ch.to_string(),
                format!("a{ch}b{ch}{ch}"),
                format!("{ch}{ch} 9 {ch}"),
                format!("-{ch}-"),
            ] {
                let once = derive_slug(&input);
                assert!(is_canonical_slug(&once), "input: {input:?} -> {once:?}");
                assert_eq!(derive_slug(&once), once, "input: {input:?}");
            }
        }
    }

    #[test]
    fn canonical_check_rejects_malformed_slugs() {
        assert!(is_canonical_slug("hello-world"));
        assert!(!is_canonical_slug("-hello"));
        assert!(!is_canonical_slug("hello-"));
        assert!(!is_canonical_slug("hello--world"));
        assert!(!is_canonical_slug("Hello"));
        assert!(!is_canonical_slug("hello world"));
    }
}
