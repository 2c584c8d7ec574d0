//! Command sequences
//!
//! A `CommandSequence` is the output of a table compilation: an ordered list
//! of top-level commands with printing and export helpers.

use crate::command::{format_block, Command};
use crate::error::ScanError;
use crate::scn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: impl Into<Command>) {
        self.commands.push(command.into());
    }

    pub fn into_vec(self) -> Vec<Command> {
        self.commands
    }

    /// Multi-line rendering, one command per line
    ///
    /// ```text
    /// [
    ///   Comment('Example'),
    ///   Loop('pos', 1, 5, 0.5,
    ///   [
    ///     Set('run', 1)
    ///   ])
    /// ]
    /// ```
    pub fn format(&self) -> String {
        format_block(&self.commands, 0)
    }

    /// Serialize as JSON (pretty-printed)
    pub fn to_json(&self) -> Result<String, ScanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        Ok(serde_json::from_str(json)?)
    }

    /// XML accepted by the scan server
    pub fn to_scn(&self) -> String {
        scn::to_scn(&self.commands)
    }
}

impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.commands.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", items.join(", "))
    }
}

impl Deref for CommandSequence {
    type Target = [Command];

    fn deref(&self) -> &[Command] {
        &self.commands
    }
}

impl From<Vec<Command>> for CommandSequence {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

impl FromIterator<Command> for CommandSequence {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl Extend<Command> for CommandSequence {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

impl IntoIterator for CommandSequence {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Comment, Delay, Loop, Set};

    fn example() -> CommandSequence {
        let mut seq = CommandSequence::new();
        seq.push(Comment::new("Example"));
        seq.push(Loop::new("pos", 1.0, 5.0, 0.5).with_body(vec![
            Set::new("run", 1).into(),
            Delay::new(2.0).into(),
            Set::new("run", 0).into(),
        ]));
        seq
    }

    #[test]
    fn test_display() {
        assert_eq!(CommandSequence::new().to_string(), "[]");
        assert_eq!(
            example().to_string(),
            "[Comment('Example'), Loop('pos', 1, 5, 0.5, [ Set('run', 1), Delay(2), Set('run', 0) ])]"
        );
    }

    #[test]
    fn test_format() {
        assert_eq!(CommandSequence::new().format(), "[]");
        assert_eq!(
            example().format(),
            "[\n  Comment('Example'),\n  Loop('pos', 1, 5, 0.5,\n  [\n    Set('run', 1),\n    Delay(2),\n    Set('run', 0)\n  ])\n]"
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let seq = example();
        let json = seq.to_json().unwrap();
        assert!(json.contains("\"type\": \"loop\""));
        assert_eq!(CommandSequence::from_json(&json).unwrap(), seq);
    }

    #[test]
    fn test_deref_and_collect() {
        let seq: CommandSequence = vec![Comment::new("a").into(), Comment::new("b").into()]
            .into_iter()
            .collect();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[1].kind(), "comment");
        assert_eq!(seq.to_scn().matches("<comment>").count(), 2);
    }
}
