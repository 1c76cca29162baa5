//! URL-safe product slugs.
//!
//! `slugify` is pure and idempotent. `unique_slug` applies the collision
//! policy: derived slugs take the first free `-N` suffix (starting at 2).
//! Explicit slugs are never rewritten; callers reject them on collision.

use rusqlite::Connection;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::db::queries;
use crate::error::{AppError, Result};

/// Upper bound on suffix probing before giving up.
const MAX_SUFFIX: u32 = 1000;

pub fn slugify(name: &str) -> String {
    let stripped: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    slug.trim_matches('-').to_string()
}

/// Pick a free slug for `base`, appending `-2`, `-3`, ... on collision.
///
/// `exclude_id` lets an update keep the product's own current slug.
pub fn unique_slug(conn: &Connection, base: &str, exclude_id: Option<&str>) -> Result<String> {
    if !queries::slug_exists(conn, base, exclude_id)? {
        return Ok(base.to_string());
    }
    for n in 2..=MAX_SUFFIX {
        let candidate = format!("{}-{}", base, n);
        if !queries::slug_exists(conn, &candidate, exclude_id)? {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(format!(
        "Too many products share the slug '{}'",
        base
    )))
}

/// Normalize a slug supplied by an admin. It must survive `slugify` non-empty.
pub fn normalize_explicit(slug: &str) -> Result<String> {
    let normalized = slugify(slug);
    if normalized.is_empty() {
        return Err(AppError::BadRequest(
            "Slug must contain at least one letter or digit".into(),
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Curso de Marketing Digital!"), "curso-de-marketing-digital");
    }

    #[test]
    fn test_slugify_strips_diacritics_and_trims() {
        assert_eq!(slugify("  Olá   Mundo  "), "ola-mundo");
        assert_eq!(slugify("Promoção Ação Única"), "promocao-acao-unica");
    }

    #[test]
    fn test_slugify_collapses_hyphens() {
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("--já--"), "ja");
    }

    #[test]
    fn test_slugify_keeps_underscore_and_digits() {
        assert_eq!(slugify("Plano_Pro 2024"), "plano_pro-2024");
    }

    #[test]
    fn test_slugify_empty_when_nothing_survives() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for name in [
            "Curso de Marketing Digital!",
            "  Olá   Mundo  ",
            "E-book: Receitas (Vol. 2)",
            "ÇÃO---ção",
            "tab\tand\nnewline",
        ] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", name);
        }
    }

    #[test]
    fn test_normalize_explicit() {
        assert_eq!(normalize_explicit("Meu Produto").unwrap(), "meu-produto");
        assert!(normalize_explicit("???").is_err());
    }
}
