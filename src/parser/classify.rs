//! Lexeme classification
//!
//! Pure predicates answering "what kind of lexeme is this?" for the tokenizer and for
//! anyone inspecting tokens after the fact. The vocabularies are fixed; numeric literals
//! are checked against a small grammar covering decimal, float, exponent, based
//! (`0x`/`0b`/`0o`) and complex (`j` suffix) forms.

/// Reserved words. `and`, `or`, `not`, `in` and `is` live here too, so the tokenizer
/// emits them as keywords even though the operator vocabulary also lists the first four.
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
    "return", "try", "while", "with", "yield",
];

pub const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "**", "//", "=", "+=", "-=", "*=", "/=", "%=", "**=", "//=",
    "==", "!=", "<", ">", "<=", ">=", "&", "|", "^", "~", "<<", ">>", "&=", "|=", "^=",
    "<<=", ">>=", ":=", "->", "and", "or", "not", "is",
];

pub const DELIMITERS: &[&str] = &["(", ")", "[", "]", "{", "}", ",", ":", ".", ";", "@", "..."];

/// Names the symbol table treats as built-in functions on first sighting.
pub const BUILTINS: &[&str] = &["print", "format"];

pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

pub fn is_operator(s: &str) -> bool {
    OPERATORS.contains(&s)
}

pub fn is_delimiter(s: &str) -> bool {
    DELIMITERS.contains(&s)
}

pub fn is_builtin(s: &str) -> bool {
    BUILTINS.contains(&s)
}

/// True when `c` can begin an operator token on its own.
pub(crate) fn starts_operator(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '&' | '|' | '^' | '~'
    )
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Numeric literal check.
///
/// Accepts an optional leading `-` (negative literals are lexed as one token), a
/// complex `j`/`J` suffix over any other valid number, based integers with at least one
/// digit valid for the base, and decimal/float forms with at most one `.` and at most
/// one exponent that carries at least one digit.
pub fn is_number(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() {
        return false;
    }

    if let Some(real) = body.strip_suffix(['j', 'J']) {
        return !real.is_empty()
            && !real.starts_with('-')
            && !real.ends_with(['j', 'J'])
            && is_number(real);
    }

    if let Some((radix, digits)) = split_base_prefix(body) {
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    is_decimal(body)
}

/// Splits `0x1F` into `(16, "1F")`. Returns `None` when there is no base prefix.
pub(crate) fn split_base_prefix(s: &str) -> Option<(u32, &str)> {
    let rest = s.strip_prefix('0')?;
    let mut chars = rest.chars();
    let radix = match chars.next()? {
        'x' | 'X' => 16,
        'b' | 'B' => 2,
        'o' | 'O' => 8,
        _ => return None,
    };
    Some((radix, chars.as_str()))
}

fn is_decimal(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let mut seen_dot = false;
    let mut mantissa_digits = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => mantissa_digits += 1,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    if mantissa_digits == 0 {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabularies() {
        assert!(is_keyword("def"));
        assert!(is_keyword("and"));
        assert!(!is_keyword("print"));
        assert!(is_operator("//="));
        assert!(is_operator(":="));
        assert!(!is_operator("!"));
        assert!(is_delimiter("..."));
        assert!(is_delimiter(":"));
        assert!(is_builtin("print"));
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("_private"));
        assert!(is_identifier("x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn test_decimal_numbers() {
        for ok in ["0", "42", "3.14", "3.", ".5", "1e10", "1.5E-3", "2e+8", "-7", "1.e5"] {
            assert!(is_number(ok), "{ok} should be a number");
        }
        for bad in [".", "3.14.15", "1e", "1e+", "1e5.0", "1ee5", "12ab", "-", "--1", "e5"] {
            assert!(!is_number(bad), "{bad} should not be a number");
        }
    }

    #[test]
    fn test_based_numbers() {
        assert!(is_number("0x1F"));
        assert!(is_number("0XfF"));
        assert!(is_number("0b1010"));
        assert!(is_number("0o17"));
        assert!(!is_number("0x"));
        assert!(!is_number("0b102"));
        assert!(!is_number("0o8"));
        assert!(!is_number("0xG"));
    }

    #[test]
    fn test_complex_numbers() {
        assert!(is_number("3j"));
        assert!(is_number("1.5e3J"));
        assert!(is_number("-2j"));
        assert!(!is_number("j"));
        assert!(!is_number("1ej"));
        assert!(!is_number("3jj"));
    }
}
