use std::io::{self, BufRead, Write};

/// The single accepted affirmative answer, compared case-insensitively.
pub const AFFIRMATIVE: &str = "s";

/// Blocking yes/no question. Anything but the affirmative token is a refusal.
pub trait Confirm {
	fn ask(&mut self, prompt: &str) -> bool;
}

pub fn is_affirmative(answer: &str) -> bool {
	answer.trim().eq_ignore_ascii_case(AFFIRMATIVE)
}

/// Line-based prompt over any reader/writer pair; stdin/stdout in the binary.
pub struct ConsoleGate<R, W> {
	input: R,
	output: W,
}

impl ConsoleGate<io::StdinLock<'static>, io::Stdout> {
	pub fn stdio() -> Self {
		Self::new(io::stdin().lock(), io::stdout())
	}
}

impl<R: BufRead, W: Write> ConsoleGate<R, W> {
	pub fn new(input: R, output: W) -> Self {
		Self { input, output }
	}
}

impl<R: BufRead, W: Write> Confirm for ConsoleGate<R, W> {
	fn ask(&mut self, prompt: &str) -> bool {
		// a prompt we cannot show or answer counts as "no"
		if write!(self.output, "{prompt} (s/N) ")
			.and_then(|_| self.output.flush())
			.is_err()
		{
			return false;
		}

		let mut line = String::new();
		match self.input.read_line(&mut line) {
			Ok(0) | Err(_) => false,
			Ok(_) => is_affirmative(&line),
		}
	}
}

#[cfg(test)]
pub mod scripted {
	use std::collections::VecDeque;

	use super::Confirm;

	/// Answers prompts from a fixed list and records what was asked.
	#[derive(Debug, Default)]
	pub struct ScriptedGate {
		answers: VecDeque<bool>,
		pub asked: Vec<String>,
	}

	impl ScriptedGate {
		pub fn new(answers: &[bool]) -> Self {
			Self {
				answers: answers.iter().copied().collect(),
				asked: Vec::new(),
			}
		}
	}

	impl Confirm for ScriptedGate {
		fn ask(&mut self, prompt: &str) -> bool {
			self.asked.push(prompt.to_string());
			self.answers.pop_front().unwrap_or(false)
		}
	}
}
