//! Console lines - what the control surface can type at the host

use anyhow::{bail, Context};

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Raw command message, e.g. `{"kind":"EQ","frequency":32,"gain":4}`
    Message(serde_json::Value),
    /// `preset <name>`
    Preset(String),
    /// `click`: the user interacted with the page
    Click,
    /// `navigate`: the page swapped its media element
    Navigate,
    /// `status`: print the live chain
    Status,
    /// `quit`
    Quit,
    /// Blank line or `#` comment
    Empty,
}

pub fn parse_line(line: &str) -> anyhow::Result<Line> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Line::Empty);
    }

    if line.starts_with('{') {
        let value = serde_json::from_str(line).context("Invalid JSON message")?;
        return Ok(Line::Message(value));
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let parsed = match verb.as_str() {
        "preset" => match words.next() {
            Some(name) => Line::Preset(name.to_ascii_lowercase()),
            None => bail!("Usage: preset <name>"),
        },
        "click" => Line::Click,
        "navigate" => Line::Navigate,
        "status" => Line::Status,
        "quit" | "exit" => Line::Quit,
        other => bail!("Unknown input: {}", other),
    };

    if words.next().is_some() {
        bail!("Trailing input after {}", verb);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_message() {
        let line = parse_line(r#"  {"kind":"RESET"}  "#).unwrap();
        assert_eq!(line, Line::Message(json!({"kind": "RESET"})));
        assert!(parse_line("{kind: RESET}").is_err());
    }

    #[test]
    fn test_verbs() {
        assert_eq!(parse_line("preset Rock").unwrap(), Line::Preset("rock".into()));
        assert_eq!(parse_line("click").unwrap(), Line::Click);
        assert_eq!(parse_line("NAVIGATE").unwrap(), Line::Navigate);
        assert_eq!(parse_line("status").unwrap(), Line::Status);
        assert_eq!(parse_line("exit").unwrap(), Line::Quit);
    }

    #[test]
    fn test_empty_and_comments() {
        assert_eq!(parse_line("").unwrap(), Line::Empty);
        assert_eq!(parse_line("   ").unwrap(), Line::Empty);
        assert_eq!(parse_line("# bass test").unwrap(), Line::Empty);
    }

    #[test]
    fn test_bad_input() {
        assert!(parse_line("preset").is_err());
        assert!(parse_line("click twice").is_err());
        assert!(parse_line("louder").is_err());
    }
}
