//! Chat transcript model and answer parsing.

use pulldown_cmark::{Event, Options, Parser, html};

/// Shown when the backend answers with an error status.
pub const BACKEND_FAILURE_TEXT: &str = "Sorry, something went wrong.";
/// Shown when the backend cannot be reached at all.
pub const CONNECTION_FAILURE_TEXT: &str = "Unable to connect to the server.";

/// A bot answer, either free text or `**Key:** value` pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotReply {
	Plain(String),
	Structured(Vec<(String, String)>),
}

/// One entry of the transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
	pub from_user: bool,
	pub reply: BotReply,
}

impl ChatMessage {
	pub fn user(text: impl Into<String>) -> Self {
		Self {
			from_user: true,
			reply: BotReply::Plain(text.into()),
		}
	}

	pub fn bot(reply: BotReply) -> Self {
		Self {
			from_user: false,
			reply,
		}
	}

	pub fn bot_text(text: impl Into<String>) -> Self {
		Self::bot(BotReply::Plain(text.into()))
	}
}

/// Split an answer into key/value pairs when any line reads `**Key:** value`.
///
/// Lines are trimmed first. A key seen twice keeps its first position and
/// takes the later value. Answers with no such line come back unchanged.
pub fn parse_structured_response(response: &str) -> BotReply {
	let mut pairs: Vec<(String, String)> = Vec::new();

	for (key, value) in response.lines().filter_map(|l| structured_line(l.trim())) {
		match pairs.iter_mut().find(|(k, _)| *k == key) {
			Some(slot) => slot.1 = value,
			None => pairs.push((key, value)),
		}
	}

	if pairs.is_empty() {
		BotReply::Plain(response.to_string())
	} else {
		BotReply::Structured(pairs)
	}
}

fn structured_line(line: &str) -> Option<(String, String)> {
	let rest = line.strip_prefix("**")?;
	// shortest key: first ":**" after at least one character
	let first = rest.chars().next()?.len_utf8();
	let split = rest[first..].find(":**")? + first;
	let key = rest[..split].trim();
	let value = rest[split + 3..].trim();
	// a blank key is kept as ""; only the value must be present
	if value.is_empty() {
		return None;
	}
	Some((key.to_string(), value.to_string()))
}

/// Render a free-text answer as GitHub-flavored markdown.
///
/// Raw HTML in the answer is escaped, not passed through.
pub fn render_markdown(text: &str) -> String {
	let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
	let events = Parser::new_ext(text, options).map(|event| match event {
		Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
		other => other,
	});
	let mut out = String::with_capacity(text.len() * 3 / 2);
	html::push_html(&mut out, events);
	out
}

/// Whether the input box holds something worth sending.
pub fn is_sendable(input: &str) -> bool {
	!input.trim().is_empty()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pairs(items: &[(&str, &str)]) -> BotReply {
		BotReply::Structured(
			items
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
		)
	}

	#[test]
	fn plain_answers_pass_through() {
		let text = "Alice knows Bob.\nBob works at Acme.";
		assert_eq!(parse_structured_response(text), BotReply::Plain(text.into()));
	}

	#[test]
	fn bold_keys_become_pairs() {
		let text = "Here is what I found:\n  **Name:** Alice  \n**Employer:**   Acme Corp\nThanks";
		assert_eq!(
			parse_structured_response(text),
			pairs(&[("Name", "Alice"), ("Employer", "Acme Corp")])
		);
	}

	#[test]
	fn repeated_keys_keep_position_and_last_value() {
		let text = "**A:** 1\n**B:** 2\n**A:** 3";
		assert_eq!(parse_structured_response(text), pairs(&[("A", "3"), ("B", "2")]));
	}

	#[test]
	fn incomplete_lines_are_ignored() {
		for line in ["**Name:**", "**:** x", "**Name** Alice", "Name:** Alice", "** x"] {
			assert_eq!(
				parse_structured_response(line),
				BotReply::Plain(line.into()),
				"{line}"
			);
		}
	}

	#[test]
	fn blank_keys_are_kept_empty() {
		assert_eq!(parse_structured_response("** :** x"), pairs(&[("", "x")]));
	}

	#[test]
	fn list_answers_render_as_html_lists() {
		let html = render_markdown("Found two people:\n\n- Alice\n- **Bob**");
		assert_eq!(
			html,
			"<p>Found two people:</p>\n<ul>\n<li>Alice</li>\n<li><strong>Bob</strong></li>\n</ul>\n"
		);
	}

	#[test]
	fn tables_and_strikethrough_are_enabled() {
		let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");
		assert!(html.contains("<table>"), "{html}");
		assert!(html.contains("<td>1</td>"), "{html}");
		assert!(html.contains("<del>old</del>"), "{html}");
	}

	#[test]
	fn raw_html_is_escaped() {
		let html = render_markdown("<script>alert(1)</script>\n\nhi <b>there</b>");
		assert!(!html.contains("<script>"), "{html}");
		assert!(html.contains("&lt;script&gt;"), "{html}");
		assert!(html.contains("&lt;b&gt;there&lt;/b&gt;"), "{html}");
	}

	#[test]
	fn non_ascii_keys_are_accepted() {
		assert_eq!(
			parse_structured_response("**État:** stable"),
			pairs(&[("État", "stable")])
		);
	}

	#[test]
	fn key_stops_at_first_marker() {
		assert_eq!(
			parse_structured_response("**Ratio:** 1:** 2"),
			pairs(&[("Ratio", "1:** 2")])
		);
	}

	#[test]
	fn blank_input_is_not_sendable() {
		assert!(!is_sendable("   \n"));
		assert!(is_sendable(" hi "));
	}
}
