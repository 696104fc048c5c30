use crate::span::Span;
use std::fmt::Write;

/// Render an error against its source line, rustc style:
///
/// ```text
/// error[NameError]: undefined variable 'nope'
///  --> line 1:5
///   |
/// 1 | x = nope + 1;
///   |     ^^^^
///   |
///   = hint: assign the name a value before using it
/// ```
pub fn render(source: &str, kind: &str, span: Span, message: &str, hint: Option<&str>) -> String {
    let source_line = source.lines().nth(span.line.saturating_sub(1)).unwrap_or("");
    let gutter = " ".repeat(span.line.to_string().len());

    let mut out = String::new();
    let _ = writeln!(out, "error[{}]: {}", kind, message);
    let _ = writeln!(out, "{}--> line {}:{}", gutter, span.line, span.col);
    let _ = writeln!(out, "{} |", gutter);
    let _ = writeln!(out, "{} | {}", span.line, source_line);

    // Tabs in the source line keep their width in the padding so the carets
    // land under the offending text.
    let padding: String = source_line
        .chars()
        .take(span.col.saturating_sub(1))
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let carets = "^".repeat(span.length.max(1));
    let _ = writeln!(out, "{} | {}{}", gutter, padding, carets);

    if let Some(hint) = hint {
        let _ = writeln!(out, "{} |", gutter);
        let _ = writeln!(out, "{} = hint: {}", gutter, hint);
    }

    out
}

pub fn suggest_hint(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("undefined variable") {
        return Some("assign the name a value before using it".into());
    }

    if msg.contains("divide by zero") {
        return Some("guard the division with a check on the divisor".into());
    }

    if msg.contains("is not a function") {
        return Some("only names bound by 'fun' can be called".into());
    }

    if msg.contains("expects") && msg.contains("arguments") {
        return Some("match the call to the function's parameter list".into());
    }

    if msg.contains("unterminated string") {
        return Some("close the string literal with '\"'".into());
    }

    if msg.contains("cannot apply") || msg.contains("cannot negate") {
        return Some("'+' joins strings; '-', '*' and '/' want numbers".into());
    }

    None
}
