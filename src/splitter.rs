use std::sync::LazyLock;

use regex::Regex;

static DOLLAR_TAG: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$").expect("valid dollar tag regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex<'a> {
	Code,
	Quoted { escapes: bool },
	Ident,
	LineComment,
	BlockComment(usize),
	Dollar(&'a str),
}

/// Splits a script into statements on `;` immediately followed by a newline.
///
/// Line endings are normalised to `\n` first. Terminators inside string
/// literals, quoted identifiers, comments and dollar-quoted bodies do not
/// split. Fragments that are blank or hold only comments are dropped; the
/// rest are trimmed and returned in script order without the terminator.
pub fn split(script: &str) -> Vec<String> {
	let text = script.replace("\r\n", "\n").replace('\r', "\n");
	let bytes = text.as_bytes();

	let mut statements = Vec::new();
	let mut state = Lex::Code;
	let mut start = 0;
	let mut has_code = false;
	let mut i = 0;

	while i < bytes.len() {
		let b = bytes[i];
		let next = bytes.get(i + 1).copied();

		match state {
			Lex::Code => match (b, next) {
				(b';', Some(b'\n')) => {
					if has_code {
						statements.push(text[start..i].trim().to_string());
					}
					i += 2;
					start = i;
					has_code = false;
					continue;
				}
				(b'-', Some(b'-')) => {
					state = Lex::LineComment;
					i += 2;
					continue;
				}
				(b'/', Some(b'*')) => {
					state = Lex::BlockComment(1);
					i += 2;
					continue;
				}
				(b'\'', _) => {
					let escapes = i > 0
						&& matches!(bytes[i - 1], b'E' | b'e')
						&& !is_word_byte(bytes, i - 1);
					state = Lex::Quoted { escapes };
				}
				(b'"', _) => state = Lex::Ident,
				(b'$', _) if i == 0 || !is_ident_byte(bytes[i - 1]) => {
					if let Some(tag) = DOLLAR_TAG.find(&text[i..]) {
						has_code = true;
						state = Lex::Dollar(tag.as_str());
						i += tag.len();
						continue;
					}
				}
				_ => {}
			},
			Lex::Quoted { escapes } => match b {
				b'\\' if escapes => i += 1,
				b'\'' => state = Lex::Code,
				_ => {}
			},
			Lex::Ident => {
				if b == b'"' {
					state = Lex::Code;
				}
			}
			Lex::LineComment => {
				if b == b'\n' {
					state = Lex::Code;
				}
			}
			Lex::BlockComment(depth) => match (b, next) {
				(b'*', Some(b'/')) => {
					state = if depth == 1 {
						Lex::Code
					} else {
						Lex::BlockComment(depth - 1)
					};
					i += 2;
					continue;
				}
				(b'/', Some(b'*')) => {
					state = Lex::BlockComment(depth + 1);
					i += 2;
					continue;
				}
				_ => {}
			},
			Lex::Dollar(tag) => {
				// bytewise: `i` may sit inside a multi-byte character here
				if b == b'$' && bytes[i..].starts_with(tag.as_bytes()) {
					state = Lex::Code;
					i += tag.len();
					continue;
				}
			}
		}

		if !b.is_ascii_whitespace() && !matches!(state, Lex::LineComment | Lex::BlockComment(_)) {
			has_code = true;
		}
		i += 1;
	}

	if has_code {
		statements.push(text[start..].trim().to_string());
	}

	statements
}

fn is_ident_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

// `E'..'` only when the E stands alone, not as the tail of `CASE'..'` etc.
fn is_word_byte(bytes: &[u8], at: usize) -> bool {
	at > 0 && is_ident_byte(bytes[at - 1])
}
