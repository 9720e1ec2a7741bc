//! Url-safe anchors for headings.

const FROM: &str = "àáäâãåăæçèéëêǵḧìíïîḿńǹñòóöôœṕŕßśșțùúüûǘẃẍÿź·/_,:;";
const TO: &str = "aaaaaaaaceeeeghiiiimnnnoooooprssstuuuuuwxyz------";

/// Turn a heading title into an anchor id.
///
/// Lowercases, folds common accents, spells `&` as `and` and keeps only
/// ASCII word characters separated by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let c = fold(c);
        match c {
            c if c.is_whitespace() || c == '-' => push_dash(&mut slug),
            '&' => {
                push_dash(&mut slug);
                slug.push_str("and");
                push_dash(&mut slug);
            }
            c if c.is_ascii_alphanumeric() => slug.push(c),
            _ => {}
        }
    }
    slug.trim_matches('-').to_string()
}

fn fold(c: char) -> char {
    FROM.chars()
        .position(|from| from == c)
        .and_then(|pos| TO.chars().nth(pos))
        .unwrap_or(c)
}

fn push_dash(slug: &mut String) {
    if !slug.ends_with('-') {
        slug.push('-');
    }
}
