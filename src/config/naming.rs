/// Converts a field name to lower-dash-case.
///
/// Capitalized word boundaries and underscores become single dashes. A
/// capital following another capital continues the same word, and a capital
/// at the very end is treated as a unit suffix, so `MaxSizeMB` becomes
/// `max-size-mb` and `SizeB` becomes `sizeb`.
pub fn to_lower_dash_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let last = chars.len().saturating_sub(1);
    let mut output = String::with_capacity(name.len() + 4);
    let mut previous_uppercase = false;

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !output.is_empty() && !output.ends_with('-') {
                output.push('-');
            }
            previous_uppercase = false;
            continue;
        }

        if c.is_uppercase() {
            let starts_word = !previous_uppercase && i != last;
            if starts_word && !output.is_empty() && !output.ends_with('-') {
                output.push('-');
            }
            output.extend(c.to_lowercase());
        } else {
            output.push(c);
        }
        previous_uppercase = c.is_uppercase();
    }

    output
}
