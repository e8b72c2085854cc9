//! Read-only check run on every statement before it reaches MySQL.
//!
//! The scanner understands MySQL quoting (`'`, `"`, backticks) and comments
//! (`-- `, `#`, `/* */`), so keywords inside literals or identifiers are
//! ignored. The body of an executable comment (`/*! */`, `/*!50000 */`) is
//! code to MySQL and is scanned like any other text.

use crate::{Error, Result};

const ALLOWED_LEADING: &[&str] = &["SELECT", "WITH", "SHOW", "DESCRIBE", "DESC", "EXPLAIN"];

const FORBIDDEN: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "TRUNCATE", "CREATE", "GRANT", "REVOKE",
    "RENAME", "LOCK", "CALL", "OUTFILE", "DUMPFILE", "LOAD_FILE",
];

#[derive(Clone, Copy, PartialEq)]
enum State {
    Normal,
    Quoted(char),
    LineComment,
    BlockComment,
}

struct Scan {
    words: Vec<String>,
    trailing_statement: bool,
}

fn scan(sql: &str) -> Scan {
    let chars: Vec<char> = sql.chars().collect();
    let mut words = Vec::new();
    let mut word = String::new();
    let mut state = State::Normal;
    let mut terminated = false;
    let mut trailing_statement = false;
    let mut executable_comment = false;
    let mut i = 0;

    let flush = |word: &mut String, words: &mut Vec<String>| {
        if !word.is_empty() {
            words.push(word.to_ascii_uppercase());
            word.clear();
        }
    };

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match state {
            State::Normal => {
                if c.is_alphanumeric() || c == '_' {
                    if terminated {
                        trailing_statement = true;
                    }
                    word.push(c);
                } else {
                    flush(&mut word, &mut words);
                    if c == '-' && next == Some('-') && chars.get(i + 2).is_none_or(|n| n.is_whitespace()) {
                        state = State::LineComment;
                        i += 1;
                    } else if c == '#' {
                        state = State::LineComment;
                    } else if c == '/' && next == Some('*') && chars.get(i + 2) == Some(&'!') {
                        executable_comment = true;
                        i += 2;
                        while chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()) {
                            i += 1;
                        }
                    } else if c == '/' && next == Some('*') {
                        state = State::BlockComment;
                        i += 1;
                    } else if c == '*' && next == Some('/') && executable_comment {
                        executable_comment = false;
                        i += 1;
                    } else if c == ';' {
                        terminated = true;
                    } else if !c.is_whitespace() {
                        if terminated {
                            trailing_statement = true;
                        }
                        if matches!(c, '\'' | '"' | '`') {
                            state = State::Quoted(c);
                        }
                    }
                }
            }
            State::Quoted(quote) => {
                if c == '\\' && quote != '`' {
                    i += 1;
                } else if c == quote {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = State::Normal;
                    i += 1;
                }
            }
        }
        i += 1;
    }
    flush(&mut word, &mut words);

    Scan {
        words,
        trailing_statement,
    }
}

/// Reject anything but a single read-only statement.
pub fn check_read_only(sql: &str) -> Result<()> {
    let scan = scan(sql);

    let Some(first) = scan.words.first() else {
        return Err(Error::validation_field("sql", "statement is empty"));
    };

    if scan.trailing_statement {
        return Err(Error::validation_field(
            "sql",
            "only a single statement may be executed",
        ));
    }

    if !ALLOWED_LEADING.contains(&first.as_str()) {
        return Err(Error::validation_field(
            "sql",
            format!("{first} statements are not allowed; only read-only queries run"),
        ));
    }

    if let Some(word) = scan.words.iter().find(|w| FORBIDDEN.contains(&w.as_str())) {
        return Err(Error::validation_field(
            "sql",
            format!("statement contains forbidden keyword {word}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sql::match_template;
    use proptest::prelude::*;

    fn rejected(sql: &str) -> String {
        match check_read_only(sql) {
            Err(Error::Validation { message, .. }) => message,
            other => unreachable!("expected validation error for {sql:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_read_only_statements() {
        for sql in [
            "SELECT * FROM orders LIMIT 10;",
            "  select name from users",
            "WITH t AS (SELECT 1 AS x) SELECT x FROM t;",
            "SHOW TABLES;",
            "DESCRIBE orders",
            "EXPLAIN SELECT * FROM orders",
            "-- leading comment\nSELECT 1;",
            "/* hint */ SELECT 1;",
            "SELECT 1; -- trailing comment",
            "SELECT 1;   \n",
        ] {
            assert!(check_read_only(sql).is_ok(), "{sql}");
        }
    }

    #[test]
    fn test_keywords_inside_literals_are_ignored() {
        assert!(check_read_only("SELECT * FROM logs WHERE action = 'DELETE';").is_ok());
        assert!(check_read_only("SELECT `update` FROM audit;").is_ok());
        assert!(check_read_only("SELECT 'it\\'s; DROP' AS s;").is_ok());
        assert!(check_read_only("SELECT \"a;b\" AS s").is_ok());
    }

    #[test]
    fn test_rejects_writes() {
        assert!(rejected("DELETE FROM orders").contains("DELETE statements are not allowed"));
        assert!(rejected("update users set name = 'x'").contains("UPDATE"));
        assert!(rejected("DROP TABLE users;").contains("DROP"));
        assert!(rejected("INSERT INTO t VALUES (1)").contains("INSERT"));
    }

    #[test]
    fn test_rejects_writes_hidden_in_cte() {
        assert!(
            rejected("WITH x AS (SELECT id FROM t) DELETE FROM t WHERE id IN (SELECT id FROM x)")
                .contains("DELETE")
        );
    }

    #[test]
    fn test_rejects_file_access() {
        assert!(rejected("SELECT * FROM users INTO OUTFILE '/tmp/u.csv'").contains("OUTFILE"));
        assert!(rejected("SELECT LOAD_FILE('/etc/passwd')").contains("LOAD_FILE"));
    }

    #[test]
    fn test_rejects_stacked_statements() {
        assert!(rejected("SELECT 1; DROP TABLE users").contains("single statement"));
        assert!(rejected("SELECT 1;SELECT 2;").contains("single statement"));
    }

    #[test]
    fn test_executable_comments_are_scanned() {
        assert!(rejected("SELECT 1; /*! DROP TABLE users */").contains("single statement"));
        assert!(
            rejected("SELECT * FROM users /*! INTO OUTFILE '/tmp/u.csv' */").contains("OUTFILE")
        );
        assert!(rejected("SELECT 1 /*!50000 ; DELETE FROM orders */").contains("single statement"));
        assert!(rejected("/*!40000 DELETE */ FROM orders").contains("DELETE statements"));
        assert!(check_read_only("SELECT /*!40001 SQL_NO_CACHE */ id FROM orders;").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(rejected("").contains("empty"));
        assert!(rejected("  -- just a comment").contains("empty"));
        assert!(rejected(";").contains("empty"));
    }

    #[test]
    fn test_no_match_marker_is_not_a_statement() {
        assert!(rejected("-- No matching SQL").contains("empty"));
    }

    #[test]
    fn test_template_output_passes() {
        for question in crate::sql::EXAMPLE_QUESTIONS {
            let sql = match_template(question).unwrap();
            assert!(check_read_only(&sql).is_ok(), "{sql}");
        }
    }

    proptest! {
        #[test]
        fn test_guard_never_panics(s in "\\PC*") {
            let _ = check_read_only(&s);
        }

        #[test]
        fn test_select_with_quoted_payload_passes(payload in "[a-zA-Z0-9 ;]{0,30}") {
            let sql = format!("SELECT '{payload}' AS v;");
            prop_assert!(check_read_only(&sql).is_ok());
        }
    }
}
