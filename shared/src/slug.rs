//! URL slug generation for content titles.
//!
//! Titles are predominantly Russian, so slugs go through a Cyrillic-to-Latin
//! transliteration pass before the usual lowercase/collapse treatment.

use uuid::Uuid;

/// Turn an arbitrary title into a URL-safe slug.
///
/// Guarantees a non-empty result: input consisting only of punctuation or
/// emoji falls back to a random 8-character suffix.
pub fn slugify(input: &str) -> String {
    let transliterated = transliterate_cyrillic(input);

    let mut slug = String::with_capacity(transliterated.len());
    let mut last_was_dash = true; // suppress a leading dash
    for ch in transliterated.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    } else {
        slug
    }
}

/// Covers Russian + common Kazakh Cyrillic letters. Unknown characters pass
/// through unchanged and are handled by the collapse pass in `slugify`.
fn transliterate_cyrillic(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        match lower {
            'а' => out.push('a'),
            'б' => out.push('b'),
            'в' => out.push('v'),
            'г' => out.push('g'),
            'д' => out.push('d'),
            'е' => out.push('e'),
            'ё' => out.push_str("yo"),
            'ж' => out.push_str("zh"),
            'з' => out.push('z'),
            'и' => out.push('i'),
            'й' => out.push('y'),
            'к' => out.push('k'),
            'л' => out.push('l'),
            'м' => out.push('m'),
            'н' => out.push('n'),
            'о' => out.push('o'),
            'п' => out.push('p'),
            'р' => out.push('r'),
            'с' => out.push('s'),
            'т' => out.push('t'),
            'у' => out.push('u'),
            'ф' => out.push('f'),
            'х' => out.push_str("kh"),
            'ц' => out.push_str("ts"),
            'ч' => out.push_str("ch"),
            'ш' => out.push_str("sh"),
            'щ' => out.push_str("sch"),
            'ъ' | 'ь' => {}
            'ы' => out.push('y'),
            'э' => out.push('e'),
            'ю' => out.push_str("yu"),
            'я' => out.push_str("ya"),
            other => out.push(other),
        }
    }
    out
}
