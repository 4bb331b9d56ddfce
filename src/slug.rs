/// Maps common accented Latin letters to their ASCII base letter
fn fold_to_ascii(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'č' | 'ć' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ñ' | 'ń' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'š' | 'ś' => "s",
        'ž' | 'ź' | 'ż' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Converts a title into a URL slug: lowercase ASCII letters, digits,
/// underscores and single hyphens.
///
/// Accented letters are folded to ASCII where possible; other non-ASCII
/// characters and punctuation are dropped.
pub fn slugify(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() {
            cleaned.push(c);
        } else if let Some(folded) = fold_to_ascii(c) {
            cleaned.push_str(folded);
        }
    }

    let mut slug = String::with_capacity(cleaned.len());
    let mut pending_separator = false;
    for c in cleaned.chars() {
        if c == '-' || c.is_whitespace() {
            pending_separator = true;
            continue;
        }
        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        slug.push(c);
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Slug for `candidate_title` that `exists` reports as free.
///
/// Tries the plain slug first, then `slug-1`, `slug-2`, ... Lookup errors
/// propagate unchanged.
pub fn ensure_unique_slug<E>(
    candidate_title: &str,
    mut exists: impl FnMut(&str) -> Result<bool, E>,
) -> Result<String, E> {
    let base_slug = slugify(candidate_title);
    let mut slug = base_slug.clone();
    let mut count = 1;

    while exists(&slug)? {
        slug = format!("{}-{}", base_slug, count);
        count += 1;
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Climate Action"), "climate-action");
        assert_eq!(
            slugify("Peace, Justice and Strong Institutions"),
            "peace-justice-and-strong-institutions"
        );
        assert_eq!(slugify("  Zero -- Hunger  "), "zero-hunger");
        assert_eq!(slugify("Café Société"), "cafe-societe");
        assert_eq!(slugify("_SDG 4_"), "sdg-4");
        assert_eq!(slugify("Life Below Water!!!"), "life-below-water");
        assert_eq!(slugify("日本"), "");
    }

    #[test]
    fn test_unique_slug_appends_counter() {
        let taken: HashSet<&str> = ["climate-action", "climate-action-1"].into_iter().collect();
        let slug =
            ensure_unique_slug("Climate Action", |s| Ok::<_, ()>(taken.contains(s))).unwrap();
        assert_eq!(slug, "climate-action-2");

        let slug = ensure_unique_slug("Quality Education", |s| Ok::<_, ()>(taken.contains(s)))
            .unwrap();
        assert_eq!(slug, "quality-education");
    }

    #[test]
    fn test_unique_slug_propagates_lookup_error() {
        let result = ensure_unique_slug("Anything", |_| Err("database down"));
        assert_eq!(result, Err("database down"));
    }
}
