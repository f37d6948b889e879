//! Profile blocks of the shared AWS credentials file.
//!
//! The file is treated as plain text: a block starts at `[name]` and runs up
//! to the next line starting with `[`, or to end of file. Only the first
//! block for a name is ever touched and every other byte is kept as is.

/// Renders a profile block: the `[name]` header followed by one
/// `key = value` line per field, newline terminated.
///
/// # Arguments
/// * `profile_name` - Name written between the brackets
/// * `fields` - Key/value pairs in output order
pub fn render_block<K, V>(profile_name: &str, fields: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut block = format!("[{profile_name}]\n");
    for (key, value) in fields {
        block.push_str(key.as_ref());
        block.push_str(" = ");
        block.push_str(value.as_ref());
        block.push('\n');
    }
    block
}

/// Replaces the first `[profile_name]` block in `file_text` with a freshly
/// rendered one, or appends it after a newline when the profile is absent.
///
/// Never fails. Text outside the replaced span comes back unchanged, so a
/// second call with the same arguments is a no-op on the output of the first.
pub fn merge<K, V>(file_text: &str, profile_name: &str, fields: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let block = render_block(profile_name, fields);
    let header = format!("[{profile_name}]");

    match block_span(file_text, &header) {
        Some((start, end)) => {
            let mut merged = String::with_capacity(file_text.len() + block.len());
            merged.push_str(&file_text[..start]);
            merged.push_str(&block);
            merged.push_str(&file_text[end..]);
            merged
        }
        None => {
            let mut merged = String::with_capacity(file_text.len() + block.len() + 1);
            merged.push_str(file_text);
            merged.push('\n');
            merged.push_str(&block);
            merged
        }
    }
}

/// Byte span `[start, end)` of the first block whose header matches.
fn block_span(file_text: &str, header: &str) -> Option<(usize, usize)> {
    let start = file_text.find(header)?;
    // `find` on the tail is relative to `start`; add it back.
    let end = file_text[start..]
        .find("\n[")
        .map_or(file_text.len(), |offset| start + offset);
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [(&str, &str); 2] = [
        ("aws_access_key_id", "AKIA1"),
        ("aws_secret_access_key", "SECRET1"),
    ];

    #[test]
    fn renders_fields_in_order() {
        let block = render_block("default", &[("b", "2"), ("a", "1")]);
        assert_eq!(block, "[default]\nb = 2\na = 1\n");
    }

    #[test]
    fn replaces_last_block_and_keeps_others() {
        let input = "[other]\nfoo = 1\n[default]\nbar = 2\n";
        assert_eq!(
            merge(input, "default", &KEYS),
            "[other]\nfoo = 1\n[default]\naws_access_key_id = AKIA1\naws_secret_access_key = SECRET1\n"
        );
    }

    #[test]
    fn appends_to_empty_text() {
        assert_eq!(
            merge("", "default", &[("key", "value")]),
            "\n[default]\nkey = value\n"
        );
    }

    #[test]
    fn replaces_first_block_before_another() {
        let input = "[default]\nold = 1\n[other]\nfoo = 1\n";
        let merged = merge(input, "default", &[("new", "2")]);
        assert_eq!(merged, "[default]\nnew = 2\n\n[other]\nfoo = 1\n");
    }

    #[test]
    fn end_search_is_relative_to_block_start() {
        // the `\n[` before `[default]` must not be taken as its end
        let input = "[a]\nx = 1\n[b]\ny = 2\n[default]\nold = 1\n[c]\nz = 3\n";
        let merged = merge(input, "default", &[("new", "2")]);
        assert_eq!(merged, "[a]\nx = 1\n[b]\ny = 2\n[default]\nnew = 2\n\n[c]\nz = 3\n");
    }

    #[test]
    fn last_block_without_trailing_newline() {
        let input = "[other]\nfoo = 1\n[default]\nbar = 2";
        let merged = merge(input, "default", &[("bar", "3")]);
        assert_eq!(merged, "[other]\nfoo = 1\n[default]\nbar = 3\n");
    }

    #[test]
    fn stable_after_first_application() {
        let input = "[default]\nold = 1\n[other]\nfoo = 1";
        let once = merge(input, "default", &KEYS);
        let twice = merge(&once, "default", &KEYS);
        assert_eq!(once, twice);
        assert_eq!(merge(&twice, "default", &KEYS), twice);
    }

    #[test]
    fn only_first_duplicate_block_is_replaced() {
        let input = "[default]\na = 1\n[default]\na = 2\n";
        let merged = merge(input, "default", &[("a", "3")]);
        assert_eq!(merged, "[default]\na = 3\n\n[default]\na = 2\n");
    }
}
