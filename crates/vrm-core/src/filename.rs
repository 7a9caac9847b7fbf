/// Characters that are never safe in a file name derived from embedded data.
const UNSAFE_PUNCTUATION: [char; 9] = ['"', '*', '/', ':', '<', '>', '?', '\\', '|'];

/// Strips C0 control codes and path-unsafe punctuation from `name`.
///
/// Spaces and other printable characters are kept as-is.
pub fn remove_unsafe_path_chars(name: &str) -> String {
    name.chars()
        .filter(|c| !(('\u{0}'..='\u{1f}').contains(c) || UNSAFE_PUNCTUATION.contains(c)))
        .collect()
}
