//! Identifier tokenization and comparison helpers shared by the
//! naming-based discovery methods.

/// Irregular plural forms not covered by suffix rules.
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("indices", "index"),
    ("vertices", "vertex"),
];

/// Structural prefixes conventionally prepended to table/view names,
/// checked against normalized (separator-free) identifiers.
const STRUCTURAL_PREFIXES: &[&str] = &["view", "tbl", "vw", "v", "t"];

/// Split an identifier into lowercase tokens on separator and camelCase
/// boundaries. Acronym runs stay together: `CustomerID` yields
/// `["customer", "id"]`, `CancelledDate` yields `["cancelled", "date"]`.
pub fn tokens(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (idx, &ch) in chars.iter().enumerate() {
        if matches!(ch, '_' | '-' | ' ' | '.') {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[idx - 1];
            let next_is_lower = chars
                .get(idx + 1)
                .map(|next| next.is_lowercase())
                .unwrap_or(false);
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                tokens.push(std::mem::take(&mut current));
            }
        }

        current.extend(ch.to_lowercase());
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Whole-token containment check. A pattern keyword matches only complete
/// tokens of the identifier, never raw substrings.
pub fn contains_token(name: &str, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    tokens(name).iter().any(|token| *token == keyword)
}

/// Lowercased identifier with all separators removed.
pub fn normalize(name: &str) -> String {
    tokens(name).concat()
}

/// Reduce a word to its singular form.
pub fn singularize(word: &str) -> String {
    for (plural, singular) in IRREGULAR_PLURALS {
        if word == *plural {
            return (*singular).to_string();
        }
    }

    if word.len() > 3 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if word.len() > suffix.len() && word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    let keeps_final_s = word.ends_with("ss") || word.ends_with("us") || word.ends_with("is");
    if word.ends_with('s') && !keeps_final_s && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Whether an entity reference and an asset name denote the same entity
/// after case, separator, and singular/plural normalization.
pub fn same_entity(entity: &str, asset_name: &str) -> bool {
    singularize(&normalize(entity)) == singularize(&normalize(asset_name))
}

/// Whether two object names are equal once a structural prefix
/// (`tbl_`, `v_`, `vw_`, ...) is stripped from one side.
pub fn is_prefix_variant(left: &str, right: &str) -> bool {
    let left = normalize(left);
    let right = normalize(right);
    if left == right {
        return false;
    }
    strip_structural_prefix(&left) == right || left == strip_structural_prefix(&right)
}

fn strip_structural_prefix(name: &str) -> &str {
    for prefix in STRUCTURAL_PREFIXES {
        if let Some(stripped) = name.strip_prefix(prefix) {
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    name
}

/// Lowercased data type with parameters stripped and common engine aliases
/// folded, so `VARCHAR(255)` and `character varying(64)` compare equal.
pub fn normalize_data_type(data_type: &str) -> String {
    let base = data_type
        .split('(')
        .next()
        .unwrap_or(data_type)
        .trim()
        .to_lowercase();
    match base.as_str() {
        "int2" => "smallint".to_string(),
        "int4" | "int" => "integer".to_string(),
        "int8" => "bigint".to_string(),
        "bool" => "boolean".to_string(),
        "varchar" => "character varying".to_string(),
        "timestamptz" => "timestamp with time zone".to_string(),
        _ => base,
    }
}

/// Levenshtein edit distance over characters, two-row dynamic programming.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut current = Vec::with_capacity(b_chars.len() + 1);
        current.push(i + 1);
        for (j, &cb) in b_chars.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = current[j] + 1;
            current.push(substitution.min(deletion).min(insertion));
        }
        prev = current;
    }
    prev[b_chars.len()]
}
