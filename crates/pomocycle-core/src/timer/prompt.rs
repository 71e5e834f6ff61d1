use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::countdown::CancelToken;

/// The yes/skip question asked between intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakPrompt {
    /// Offered after work session `after_session` (1..=3).
    ShortBreak { after_session: u8 },
    /// Offered once all work sessions are done.
    LongBreak,
}

impl BreakPrompt {
    pub fn question(&self) -> &'static str {
        match self {
            BreakPrompt::ShortBreak { .. } => "Take a short break? (y/n): ",
            BreakPrompt::LongBreak => "Take a long break? (y/n): ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptAnswer {
    Take,
    Skip,
    /// The cancel token tripped while waiting for an answer.
    Interrupted,
}

impl PromptAnswer {
    /// Empty input and "y"/"yes" take the break; anything else skips it.
    pub fn from_input(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => PromptAnswer::Take,
            _ => PromptAnswer::Skip,
        }
    }
}

/// Source of break decisions.
///
/// Implementations must return `Interrupted` once `cancel` is tripped rather
/// than blocking indefinitely.
pub trait Prompter {
    fn ask(&mut self, prompt: BreakPrompt, cancel: &CancelToken) -> PromptAnswer;
}

/// Answers from a fixed script; `Take` once the script runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<PromptAnswer>,
    asked: Vec<BreakPrompt>,
}

impl ScriptedPrompter {
    pub fn new<I: IntoIterator<Item = PromptAnswer>>(answers: I) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Every prompt seen so far, in order.
    pub fn asked(&self) -> &[BreakPrompt] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: BreakPrompt, cancel: &CancelToken) -> PromptAnswer {
        self.asked.push(prompt);
        if cancel.is_cancelled() {
            return PromptAnswer::Interrupted;
        }
        let answer = self.answers.pop_front().unwrap_or(PromptAnswer::Take);
        if answer == PromptAnswer::Interrupted {
            cancel.cancel();
        }
        answer
    }
}
