/// Separator written in place of every run of non-alphanumeric characters
const SEPARATOR: char = '-';

/// Turns an arbitrary string into a filesystem-safe slug
///
/// Every character that is not an ASCII letter or digit is replaced by `-`,
/// consecutive separators collapse into one, and leading and trailing
/// separators are stripped. The function is total and deterministic.
///
/// # Examples
///
/// ```
/// use page_loader::naming::format_name;
///
/// assert_eq!(format_name("ru.hexlet.io/courses"), "ru-hexlet-io-courses");
/// assert_eq!(format_name("//a..b//"), "a-b");
/// ```
pub fn format_name(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}
