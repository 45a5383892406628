//! Identifier case conversion handed to user hooks.

/// Splits input into words on non-alphanumeric characters and on
/// lower→upper / letter→digit boundaries, then re-joins them per case style.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeCase;

impl ChangeCase {
    pub fn words(input: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut prev: Option<char> = None;
        for c in input.chars() {
            if !c.is_alphanumeric() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                prev = None;
                continue;
            }
            if let Some(p) = prev {
                let boundary = (p.is_lowercase() && c.is_uppercase())
                    || (p.is_alphabetic() && c.is_ascii_digit())
                    || (p.is_ascii_digit() && c.is_alphabetic());
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
            prev = Some(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    pub fn camel_case(&self, input: &str) -> String {
        Self::words(input)
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if i == 0 {
                    w.to_lowercase()
                } else {
                    capitalize(w)
                }
            })
            .collect()
    }

    pub fn pascal_case(&self, input: &str) -> String {
        Self::words(input).iter().map(|w| capitalize(w)).collect()
    }

    pub fn snake_case(&self, input: &str) -> String {
        self.joined_lower(input, "_")
    }

    pub fn kebab_case(&self, input: &str) -> String {
        self.joined_lower(input, "-")
    }

    pub fn constant_case(&self, input: &str) -> String {
        Self::words(input)
            .iter()
            .map(|w| w.to_uppercase())
            .collect::<Vec<_>>()
            .join("_")
    }

    fn joined_lower(&self, input: &str, sep: &str) -> String {
        Self::words(input)
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join(sep)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
