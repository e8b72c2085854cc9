//! Pull a single SQL statement out of free-form model output.

/// Marker the model uses when the question can't be answered from the schema.
pub const NO_MATCH_PREFIX: &str = "-- No matching SQL";

const MARKER: &str = "SQL:";

/// Extract the SQL statement from a model reply.
///
/// Returns the reply's no-match line verbatim when the model declined,
/// otherwise the first statement that starts with `SELECT` or `WITH`.
pub fn extract_sql(output: &str) -> Option<String> {
    let unfenced: Vec<&str> = output
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();
    let text = unfenced.join("\n");
    let text = after_last_marker(&text);

    let trimmed = text.trim();
    if trimmed.starts_with(NO_MATCH_PREFIX) {
        return trimmed.lines().next().map(|l| l.trim().to_string());
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let (start, offset) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| statement_start(line).map(|at| (i, at)))?;

    let mut statement = Vec::new();
    for (i, line) in lines[start..].iter().enumerate() {
        let line = if i == 0 { &line[offset..] } else { line };
        if i > 0 && line.trim().is_empty() {
            break;
        }
        if let Some(end) = line.find(';') {
            statement.push(&line[..=end]);
            break;
        }
        statement.push(line);
    }

    let sql = statement.join("\n").trim().to_string();
    (!sql.is_empty()).then_some(sql)
}

/// Text after the last `SQL:` label that isn't part of a no-match line.
fn after_last_marker(text: &str) -> &str {
    text.rmatch_indices(MARKER)
        .find(|(at, _)| !text[..*at].ends_with("No matching "))
        .map_or(text, |(at, marker)| &text[at + marker.len()..])
}

/// Byte offset where a statement begins on `line`, if any.
fn statement_start(line: &str) -> Option<usize> {
    let lower = line.to_ascii_lowercase();
    let trimmed = lower.trim_start();
    if trimmed.starts_with("with ") {
        return Some(lower.len() - trimmed.len());
    }
    find_word(&lower, "select")
}

fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(at, _)| at).find(|&at| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
