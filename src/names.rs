//! Supervisor/tech name normalization.
//!
//! EAM exports carry people as `LAST,FIRST` in capitals, several of them
//! joined with `;`. The tracker stores `First Last; First Last`. Normalizing
//! happens once at write time, so [`normalize_person_name`] must be a fixed
//! point on its own output: running a backfill twice changes nothing.

/// Separator used between people in a normalized field.
pub const NAME_SEPARATOR: &str = "; ";

/// Placeholder some exports use for "nobody"; kept verbatim.
const NOT_APPLICABLE: &str = "N/A";

/// Normalize one or more `LAST,FIRST` entries to `First Last`.
///
/// ```
/// use hextrackr_validate::names::normalize_person_name;
///
/// assert_eq!(normalize_person_name("SMITH,JOHN; DOE,JANE"), "John Smith; Jane Doe");
/// assert_eq!(normalize_person_name("John Smith"), "John Smith");
/// ```
pub fn normalize_person_name(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed == NOT_APPLICABLE {
        return trimmed.to_string();
    }

    trimmed
        .split(';')
        .filter_map(normalize_one)
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR)
}

fn normalize_one(person: &str) -> Option<String> {
    let person = person.trim();
    if person.is_empty() {
        return None;
    }

    let ordered: Vec<&str> = if person.contains(',') {
        let parts: Vec<&str> = person
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        match parts.as_slice() {
            [] => return None,
            [last, first, suffixes @ ..] => {
                let mut v = vec![*first, *last];
                v.extend_from_slice(suffixes);
                v
            }
            [only] => vec![*only],
        }
    } else {
        vec![person]
    };

    let joined = ordered
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    Some(to_proper_case(&joined))
}

/// Lowercase everything, then uppercase the first character of each word.
///
/// A word is a run of alphanumerics or `_`, so `O'BRIEN` becomes `O'Brien`
/// and `SMITH-JONES` becomes `Smith-Jones`. Characters whose uppercase form
/// is more than one character stay lowercase.
pub fn to_proper_case(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut in_word = false;

    for ch in lower.chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && !in_word {
            let mut upper = ch.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => out.push(u),
                _ => out.push(ch),
            }
        } else {
            out.push(ch);
        }
        in_word = is_word;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_people() {
        assert_eq!(
            normalize_person_name("SMITH,JOHN; DOE,JANE"),
            "John Smith; Jane Doe"
        );
        assert_eq!(
            normalize_person_name("SMITH,JOHN;DOE,JANE"),
            "John Smith; Jane Doe"
        );
    }

    #[test]
    fn test_whitespace_around_separators() {
        assert_eq!(
            normalize_person_name("  SMITH , JOHN ;  ; DOE,  JANE  "),
            "John Smith; Jane Doe"
        );
        assert_eq!(normalize_person_name("MARY   ANN,LEE"), "Lee Mary Ann");
    }

    #[test]
    fn test_single_name_without_comma() {
        assert_eq!(normalize_person_name("JOHNSON"), "Johnson");
        assert_eq!(normalize_person_name("john smith"), "John Smith");
    }

    #[test]
    fn test_empty_and_placeholder() {
        assert_eq!(normalize_person_name(""), "");
        assert_eq!(normalize_person_name("   "), "");
        assert_eq!(normalize_person_name(";;"), "");
        assert_eq!(normalize_person_name(","), "");
        assert_eq!(normalize_person_name("N/A"), "N/A");
    }

    #[test]
    fn test_suffix_and_dangling_comma() {
        assert_eq!(normalize_person_name("KING,MARTIN,JR"), "Martin King Jr");
        assert_eq!(normalize_person_name("SMITH,"), "Smith");
    }

    #[test]
    fn test_idempotent_on_samples() {
        for input in [
            "SMITH,JOHN; DOE,JANE",
            "O'BRIEN,PAT",
            "SMITH-JONES,ANNE MARIE",
            "KING,MARTIN,JR",
            "  weird ;; ,spacing,  ",
            "mcdonald,ronald",
            "ÉMILE,ZOLA",
            "N/A",
        ] {
            let once = normalize_person_name(input);
            let twice = normalize_person_name(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_proper_case_word_boundaries() {
        assert_eq!(to_proper_case("O'BRIEN"), "O'Brien");
        assert_eq!(to_proper_case("SMITH-JONES"), "Smith-Jones");
        assert_eq!(to_proper_case("ÉMILE"), "Émile");
        assert_eq!(to_proper_case("x2y z"), "X2y Z");
        assert_eq!(to_proper_case(""), "");
    }
}
