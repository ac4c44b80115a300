use crate::error::ExpansionError;

/// Substitutes `subject` for the single `%s` placeholder in `format`.
///
/// `%%` escapes a literal percent. Any other directive, or a placeholder
/// count other than one, is a malformed template.
pub fn format_single(format: &str, subject: &str) -> Result<String, ExpansionError> {
    let mut out = String::with_capacity(format.len() + subject.len());
    let mut placeholders = 0usize;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => {
                placeholders += 1;
                if placeholders == 1 {
                    out.push_str(subject);
                }
            }
            Some('%') => out.push('%'),
            _ => return Err(malformed(format)),
        }
    }
    if placeholders != 1 {
        return Err(malformed(format));
    }
    Ok(out)
}

fn malformed(format: &str) -> ExpansionError {
    ExpansionError::expansion(format!(
        "invalid format string \"{}\": expected exactly one \"%s\" placeholder (use %% for a literal %)",
        format
    ))
}
