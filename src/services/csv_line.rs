// src/services/csv_line.rs

/// Split one line of the published-sheet CSV into fields.
///
/// A `"` toggles quoted mode and is dropped; commas inside quotes are kept
/// as content. Doubled quotes are not treated as an escape. Unbalanced
/// quotes never fail, the rest of the line simply stays in the last field.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        struct TestCase {
            input: &'static str,
            expected: Vec<&'static str>,
        }

        let tests = vec![
            TestCase {
                // TC0: plain fields
                input: "AAPL,178.52,1.33",
                expected: vec!["AAPL", "178.52", "1.33"],
            },
            TestCase {
                // TC1: quoted field with embedded comma stays one token
                input: "MSFT,\"3,012,345,678\",0.5",
                expected: vec!["MSFT", "3,012,345,678", "0.5"],
            },
            TestCase {
                // TC2: empty input yields a single empty field
                input: "",
                expected: vec![""],
            },
            TestCase {
                // TC3: trailing comma yields a trailing empty field
                input: "A,B,",
                expected: vec!["A", "B", ""],
            },
            TestCase {
                // TC4: unbalanced quote swallows the rest of the line
                input: "X,\"unterminated,still,here",
                expected: vec!["X", "unterminated,still,here"],
            },
            TestCase {
                // TC5: doubled quotes are two toggles, not an escape
                input: "\"Say \"\"hi\"\"\",2",
                expected: vec!["Say hi", "2"],
            },
            TestCase {
                // TC6: quotes in the middle of a field toggle as well
                input: "ab\"c,d\"e,f",
                expected: vec!["abc,de", "f"],
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = parse_line(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
