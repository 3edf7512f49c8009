use zeroize::Zeroizing;

/// Insert one space at `ceil(chars / 2)` for readability.
///
/// Presentation only: copy the unsplit value. Values shorter than two
/// characters are returned unchanged rather than gaining a trailing space.
pub fn split_for_display(value: &str) -> Zeroizing<String> {
    let count = value.chars().count();
    let mid = count.div_ceil(2);

    if mid == 0 || mid == count {
        return Zeroizing::new(value.to_string());
    }

    let byte_mid = value
        .char_indices()
        .nth(mid)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len());
    let (head, tail) = value.split_at(byte_mid);

    let mut split = Zeroizing::new(String::with_capacity(value.len() + 1));
    split.push_str(head);
    split.push(' ');
    split.push_str(tail);
    split
}
