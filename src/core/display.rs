//! Display helpers for the patient list

/// Formats an email address for display as `local @ domain`
///
/// The value is lowercased and trimmed first. Anything that does not split
/// into exactly two parts around `@` is returned lowercased/trimmed as is.
///
/// # Examples
///
/// ```
/// use patient_registry::core::display::format_email;
///
/// assert_eq!(format_email("Foo@Bar.com"), "foo @ bar.com");
/// assert_eq!(format_email("noat"), "noat");
/// assert_eq!(format_email(""), "");
/// ```
pub fn format_email(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let email = value.to_lowercase().trim().to_string();
    match email.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => format!("{local} @ {domain}"),
        _ => email,
    }
}
