use std::sync::LazyLock;

use regex::Regex;

use crate::domain::FieldDataType;

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]*(\.[0-9]*)?([eE][-+]?[0-9]*)?$").expect("numeric literal pattern compiles")
});

pub const NON_BREAKING_SPACE: &str = "\u{a0}";

/// A `keydown` as seen by the page, `key` being the DOM `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta || self.alt
    }

    /// The typed character, when the key produces exactly one.
    fn printable(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyVerdict {
    Allow,
    /// Suppress the default action.
    Prevent,
    /// Suppress the default action and insert the text at the caret instead.
    InsertText(String),
}

/// What the guard needs to know about the editable receiving the key.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'a> {
    pub field_type: Option<FieldDataType>,
    pub text: &'a str,
    /// Character offsets of the current selection.
    pub selection: Option<(usize, usize)>,
    pub inside_button: bool,
}

pub fn guard_keydown(input: &KeyInput, context: &KeyContext<'_>) -> KeyVerdict {
    if input.has_command_modifier() {
        return KeyVerdict::Allow;
    }

    match context.field_type {
        Some(FieldDataType::SingleLine | FieldDataType::Number) if input.key == "Enter" => {
            return KeyVerdict::Prevent;
        }
        Some(FieldDataType::Number) => {
            if let Some(ch) = input.printable()
                && !numeric_guard(context.text, context.selection, ch)
            {
                return KeyVerdict::Prevent;
            }
        }
        _ => {}
    }

    if context.inside_button && input.key == " " {
        return KeyVerdict::InsertText(NON_BREAKING_SPACE.to_string());
    }
    KeyVerdict::Allow
}

pub fn is_numeric_literal(text: &str) -> bool {
    NUMERIC_LITERAL.is_match(text)
}

/// Whether typing `ch` over `selection` keeps `text` a partial number.
///
/// Digits are accepted on content that is already not a number, so a
/// formatted value can still be corrected one digit at a time.
pub fn numeric_guard(text: &str, selection: Option<(usize, usize)>, ch: char) -> bool {
    if ch.is_ascii_digit() && !is_numeric_literal(text) {
        return true;
    }
    is_numeric_literal(&simulate_insertion(text, selection, ch))
}

fn simulate_insertion(text: &str, selection: Option<(usize, usize)>, ch: char) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let len = chars.len();
    let (start, end) = selection
        .map(|(start, end)| (start.min(end).min(len), start.max(end).min(len)))
        .unwrap_or((len, len));
    let mut out = String::with_capacity(text.len() + ch.len_utf8());
    out.extend(&chars[..start]);
    out.push(ch);
    out.extend(&chars[end..]);
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasteInput {
    pub plain_text: String,
    /// Event time in milliseconds.
    pub time_stamp: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteVerdict {
    Allow,
    /// The plain text was already inserted at the selection; suppress the
    /// native paste.
    InsertPlainText(String),
    /// A repeat of a paste that was just handled.
    Suppress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(field_type: FieldDataType, text: &str) -> KeyContext<'_> {
        KeyContext {
            field_type: Some(field_type),
            text,
            selection: None,
            inside_button: false,
        }
    }

    #[test]
    fn numeric_keys_follow_the_literal_pattern() {
        let cases = [
            ("-1.5e2", "e", KeyVerdict::Prevent),
            ("2.2", "1", KeyVerdict::Allow),
            ("2.2", ".", KeyVerdict::Prevent),
            ("12", "-", KeyVerdict::Prevent),
            ("", "-", KeyVerdict::Allow),
            ("1e", "+", KeyVerdict::Allow),
            ("12", "a", KeyVerdict::Prevent),
            ("12", "Backspace", KeyVerdict::Allow),
            ("12", "ArrowLeft", KeyVerdict::Allow),
        ];
        for (text, key, expected) in cases {
            assert_eq!(
                guard_keydown(&KeyInput::new(key), &context(FieldDataType::Number, text)),
                expected,
                "typing {key:?} into {text:?}"
            );
        }
    }

    #[test]
    fn numeric_guard_uses_the_selection_offset() {
        assert!(numeric_guard("12", Some((0, 0)), '-'));
        assert!(!numeric_guard("12", Some((1, 1)), '-'));
        assert!(numeric_guard("1x3", Some((1, 2)), '.'));
        assert!(numeric_guard("1,234", None, '5'));
        assert!(!numeric_guard("1,234", None, '.'));
    }

    #[test]
    fn only_ascii_digits_count_as_numeric() {
        assert!(!numeric_guard("12", None, '\u{663}'));
        assert!(!numeric_guard("", None, '\u{96a}'));
        assert!(!is_numeric_literal("\u{663}"));
        assert!(numeric_guard("12", None, '3'));
    }

    #[test]
    fn numeric_guard_matches_the_pattern_on_valid_text() {
        let texts = ["", "-", "1", "-1.", "1.5e", "1.5e-", "3e10", ".5"];
        for text in texts {
            for ch in "0123456789-.eE+x ".chars() {
                let len = text.chars().count();
                for offset in 0..=len {
                    let mut inserted = text.chars().collect::<Vec<_>>();
                    inserted.insert(offset, ch);
                    let expected = is_numeric_literal(&inserted.into_iter().collect::<String>());
                    assert_eq!(
                        numeric_guard(text, Some((offset, offset)), ch),
                        expected,
                        "{ch:?} at {offset} in {text:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn modifiers_pass_through() {
        let number = context(FieldDataType::Number, "1");
        assert_eq!(
            guard_keydown(&KeyInput::new("a").with_ctrl(), &number),
            KeyVerdict::Allow
        );
        assert_eq!(
            guard_keydown(&KeyInput::new("v").with_meta(), &number),
            KeyVerdict::Allow
        );
        assert_eq!(
            guard_keydown(&KeyInput::new("Enter").with_alt(), &number),
            KeyVerdict::Allow
        );
    }

    #[test]
    fn enter_is_blocked_on_single_line_only() {
        let enter = KeyInput::new("Enter");
        assert_eq!(
            guard_keydown(&enter, &context(FieldDataType::SingleLine, "hi")),
            KeyVerdict::Prevent
        );
        assert_eq!(
            guard_keydown(&enter, &context(FieldDataType::MultiLine, "hi")),
            KeyVerdict::Allow
        );
        assert_eq!(
            guard_keydown(&enter.clone().with_shift(), &context(FieldDataType::SingleLine, "")),
            KeyVerdict::Prevent
        );
    }

    #[test]
    fn space_inside_button_is_inserted_manually() {
        let mut inside = context(FieldDataType::SingleLine, "Buy");
        inside.inside_button = true;
        assert_eq!(
            guard_keydown(&KeyInput::new(" "), &inside),
            KeyVerdict::InsertText(NON_BREAKING_SPACE.to_string())
        );
        assert_eq!(guard_keydown(&KeyInput::new("n"), &inside), KeyVerdict::Allow);
    }
}
