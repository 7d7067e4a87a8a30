/// Punctuation kept by `clean_text` besides word characters and whitespace.
const KEPT_PUNCTUATION: &str = ".,;:()-@+";

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || KEPT_PUNCTUATION.contains(c)
}

/// Strips symbols outside basic punctuation, then collapses whitespace runs to
/// one space and trims.
pub fn clean_text(text: &str) -> String {
    let stripped: String = text.chars().filter(|c| is_kept(*c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
