//! Naming conventions shared by type lookup and path building.
//!
//! Only the rules needed for resource names are covered: type names are
//! `CamelCase`, element names are `snake_case`, and collection names are the
//! English plural of the element name.

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("ox", "oxen"),
    ("quiz", "quizzes"),
    ("movie", "movies"),
    ("cache", "caches"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
];

/// Words in `f`/`fe` whose plural ends in `ves`.
const F_TO_VES: &[(&str, &str)] = &[
    ("calf", "calves"),
    ("elf", "elves"),
    ("half", "halves"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("loaf", "loaves"),
    ("self", "selves"),
    ("shelf", "shelves"),
    ("thief", "thieves"),
    ("wife", "wives"),
    ("wolf", "wolves"),
];

/// Words ending in a single `s` whose plural adds `es`.
const S_TO_SES: &[&str] = &[
    "alias", "atlas", "bonus", "bus", "campus", "canvas", "census", "status", "virus",
];

/// Stems whose singular ends in `sis` and plural in `ses`.
const SIS_STEMS: &[&str] = &[
    "analy", "ba", "cri", "diagno", "parenthe", "progno", "synop", "the",
];

const UNCOUNTABLE: &[&str] = &["information", "equipment", "news", "series", "species"];

/// Converts `snake_case` to `CamelCase` (`"lawyer_post"` -> `"LawyerPost"`).
#[must_use]
pub fn camelize(word: &str) -> String {
    word.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// Converts `CamelCase` to `snake_case` (`"LawyerPost"` -> `"lawyer_post"`).
///
/// Acronym runs stay together: `"HTTPRequest"` -> `"http_request"`.
#[must_use]
pub fn underscore(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    out
}

/// Returns the plural of a `snake_case` word, inflecting the last segment.
#[must_use]
pub fn pluralize(word: &str) -> String {
    let (head, last) = split_last(word);
    format!("{head}{}", pluralize_word(last))
}

/// Returns the singular of a `snake_case` word, inflecting the last segment.
#[must_use]
pub fn singularize(word: &str) -> String {
    let (head, last) = split_last(word);
    format!("{head}{}", singularize_word(last))
}

fn split_last(word: &str) -> (&str, &str) {
    word.rfind('_')
        .map_or(("", word), |idx| (&word[..=idx], &word[idx + 1..]))
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }
    if let Some((_, plural)) = F_TO_VES.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }

    if let Some(stem) = word.strip_suffix("sis") {
        return format!("{stem}ses");
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u', 'y']) || stem.ends_with("qu") {
            return format!("{stem}ies");
        }
    }
    if word.ends_with(['s', 'x', 'z']) || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{word}es");
    }
    format!("{word}s")
}

fn singularize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return (*singular).to_string();
    }
    if let Some((singular, _)) = F_TO_VES.iter().find(|(_, plural)| *plural == word) {
        return (*singular).to_string();
    }

    if let Some(stem) = word.strip_suffix("ses") {
        if SIS_STEMS.contains(&stem) {
            return format!("{stem}sis");
        }
        let singular = format!("{stem}s");
        if singular.ends_with("ss") || S_TO_SES.contains(&singular.as_str()) {
            return singular;
        }
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["xes", "zzes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || S_TO_SES.contains(&word) {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("lawyer"), "Lawyer");
        assert_eq!(camelize("lawyer_post"), "LawyerPost");
        assert_eq!(camelize("billing_plan"), "BillingPlan");
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("Lawyer"), "lawyer");
        assert_eq!(underscore("LawyerPost"), "lawyer_post");
        assert_eq!(underscore("NoExtension"), "no_extension");
        assert_eq!(underscore("HTTPRequest"), "http_request");
        assert_eq!(underscore("Address2Line"), "address2_line");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("lawyer"), "lawyers");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("phone"), "phones");
        assert_eq!(pluralize("lawyer_post"), "lawyer_posts");
        assert_eq!(pluralize("no_extension"), "no_extensions");
        assert_eq!(pluralize("company"), "companies");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("branch"), "branches");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("news"), "news");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("phones"), "phone");
        assert_eq!(singularize("lawyer_posts"), "lawyer_post");
        assert_eq!(singularize("companies"), "company");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("address"), "address");
    }

    #[test]
    fn test_sibilant_and_irregular_suffixes() {
        let cases = [
            ("status", "statuses"),
            ("order_status", "order_statuses"),
            ("bus", "buses"),
            ("alias", "aliases"),
            ("quiz", "quizzes"),
            ("buzz", "buzzes"),
            ("tax", "taxes"),
            ("match", "matches"),
            ("wish", "wishes"),
            ("class", "classes"),
            ("analysis", "analyses"),
            ("wolf", "wolves"),
            ("knife", "knives"),
            ("roof", "roofs"),
            ("archive", "archives"),
            ("movie", "movies"),
            ("database", "databases"),
            ("response", "responses"),
            ("case", "cases"),
            ("soliloquy", "soliloquies"),
            ("menu", "menus"),
        ];

        for (singular, plural) in cases {
            assert_eq!(pluralize(singular), plural, "pluralize({singular})");
            assert_eq!(singularize(plural), singular, "singularize({plural})");
        }
    }

    #[test]
    fn test_singular_words_stay_singular() {
        for word in ["status", "address", "campus", "class"] {
            assert_eq!(singularize(word), word);
        }
    }

    #[test]
    fn test_singularize_inverts_pluralize_for_resource_names() {
        for word in ["lawyer", "doctor", "address", "phone", "headshot", "lawyer_post"] {
            assert_eq!(singularize(&pluralize(word)), word);
        }
    }
}
