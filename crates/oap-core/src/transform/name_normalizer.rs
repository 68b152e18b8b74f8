use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::ir::NormalizedName;

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    // Handle names that start with numbers or contain special chars
    let sanitized = sanitize_identifier(name);

    NormalizedName {
        original: name.to_string(),
        pascal_case: sanitized.to_pascal_case(),
        camel_case: sanitized.to_lower_camel_case(),
        snake_case: sanitized.to_snake_case(),
        screaming_snake: sanitized.to_shouty_snake_case(),
    }
}

/// A type-name spelling of an arbitrary string, e.g. `/pets/{id}` → `PetsId`.
pub fn to_class(name: &str) -> String {
    normalize_name(name).pascal_case
}

/// A model type name with the configured suffix appended once.
///
/// `("pet", "dto")` → `PetDto`; a name that already ends in the suffix is
/// left alone.
pub fn model_type_name(name: &str, suffix: &str) -> NormalizedName {
    let mut normalized = normalize_name(name);
    if suffix.is_empty() {
        return normalized;
    }
    let suffix = capitalize_first(suffix);
    if !normalized.pascal_case.ends_with(&suffix) {
        normalized.pascal_case.push_str(&suffix);
        normalized.camel_case = normalized.pascal_case.to_lower_camel_case();
        normalized.snake_case = normalized.pascal_case.to_snake_case();
        normalized.screaming_snake = normalized.pascal_case.to_shouty_snake_case();
    }
    normalized
}

/// Uppercase the first character, keeping the rest as is.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sanitize a string to be a valid identifier.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for (i, ch) in name.chars().enumerate() {
        if ch.is_alphanumeric() {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}
