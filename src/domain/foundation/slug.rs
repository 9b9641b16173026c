//! URL slugs with Russian transliteration.

/// Builds a lowercase ASCII slug: Cyrillic is transliterated, runs of other
/// characters collapse into a single `-`.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        let piece: Option<&str> = transliterate(ch);
        let ascii = match piece {
            Some(p) => Some(p.to_string()),
            None if ch.is_ascii_alphanumeric() => Some(ch.to_string()),
            None => None,
        };

        match ascii {
            Some(s) if !s.is_empty() => {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push_str(&s);
            }
            Some(_) => {}
            None => pending_dash = true,
        }
    }

    out
}

fn transliterate(ch: char) -> Option<&'static str> {
    let s = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shh",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(s)
}
