//! SCN export
//!
//! The scan server accepts commands as XML: a `<commands>` root with one
//! element per command, nested bodies for loops and parallel groups.

use crate::command::{Command, Include, Loop, Parallel, Readback, Set, Wait};
use crate::number::format_compact;
use crate::value::Value;
use std::fmt::{self, Write};

/// Render commands as an SCN document
pub fn to_scn(commands: &[Command]) -> String {
    let mut xml = String::new();
    // Writing into a String cannot fail
    let _ = ScnWriter::new(&mut xml).document(commands);
    xml
}

/// Escape text content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text values are sent quoted so the server does not parse them as numbers
fn scn_value(value: &Value) -> String {
    match value.as_text() {
        Some(text) => format!("\"{}\"", text),
        None => value.to_string(),
    }
}

fn flag(on: bool) -> &'static str {
    if on {
        "true"
    } else {
        "false"
    }
}

struct ScnWriter<'a> {
    out: &'a mut String,
    level: usize,
}

impl<'a> ScnWriter<'a> {
    fn new(out: &'a mut String) -> Self {
        Self { out, level: 0 }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.level)
    }

    fn leaf(&mut self, tag: &str, text: &str) -> fmt::Result {
        let indent = self.indent();
        if text.is_empty() {
            writeln!(self.out, "{}<{}/>", indent, tag)
        } else {
            writeln!(self.out, "{}<{}>{}</{}>", indent, tag, escape(text), tag)
        }
    }

    fn open(&mut self, tag: &str) -> fmt::Result {
        let indent = self.indent();
        self.level += 1;
        writeln!(self.out, "{}<{}>", indent, tag)
    }

    fn close(&mut self, tag: &str) -> fmt::Result {
        self.level = self.level.saturating_sub(1);
        let indent = self.indent();
        writeln!(self.out, "{}</{}>", indent, tag)
    }

    fn document(&mut self, commands: &[Command]) -> fmt::Result {
        if commands.is_empty() {
            return self.leaf("commands", "");
        }
        self.open("commands")?;
        for command in commands {
            self.command(command)?;
        }
        self.close("commands")
    }

    fn body(&mut self, commands: &[Command]) -> fmt::Result {
        if commands.is_empty() {
            return self.leaf("body", "");
        }
        self.open("body")?;
        for command in commands {
            self.command(command)?;
        }
        self.close("body")
    }

    fn errhandler(&mut self, errhandler: Option<&str>) -> fmt::Result {
        match errhandler {
            Some(e) => self.leaf("error_handler", e),
            None => Ok(()),
        }
    }

    fn command(&mut self, command: &Command) -> fmt::Result {
        let tag = command.kind();
        self.open(tag)?;
        if let Some(device) = command.device() {
            self.leaf("device", device)?;
        }
        match command {
            Command::Set(set) => self.set(set)?,
            Command::Wait(wait) => self.wait(wait)?,
            Command::Delay(delay) => self.leaf("seconds", &format_compact(delay.seconds))?,
            Command::Comment(comment) => self.leaf("text", &comment.text)?,
            Command::Log(log) => {
                self.open("devices")?;
                for device in &log.devices {
                    self.leaf("device", device)?;
                }
                self.close("devices")?;
            }
            Command::Include(include) => self.include(include)?,
            Command::Loop(lp) => self.loop_(lp)?,
            Command::Parallel(par) => self.parallel(par)?,
        }
        if let Some(body) = command.body() {
            self.body(body)?;
        }
        self.close(tag)
    }

    /// `completion`, `wait`, `readback`, `tolerance`, `timeout` of Set and Loop
    fn checks(
        &mut self,
        device: &str,
        completion: bool,
        readback: &Readback,
        tolerance: f64,
        timeout: Option<f64>,
    ) -> fmt::Result {
        if completion {
            self.leaf("completion", "true")?;
        }
        match readback.target(device) {
            Some(target) => {
                self.leaf("wait", flag(true))?;
                self.leaf("readback", target)?;
                self.leaf("tolerance", &format_compact(tolerance))?;
            }
            None => self.leaf("wait", flag(false))?,
        }
        if let Some(timeout) = timeout {
            self.leaf("timeout", &format_compact(timeout))?;
        }
        Ok(())
    }

    fn set(&mut self, set: &Set) -> fmt::Result {
        self.leaf("value", &scn_value(set.value()))?;
        self.checks(
            set.device(),
            set.completion(),
            set.readback(),
            set.tolerance(),
            set.needs_timeout().then(|| set.timeout()),
        )?;
        self.errhandler(set.errhandler())
    }

    fn wait(&mut self, wait: &Wait) -> fmt::Result {
        self.leaf("value", &scn_value(wait.value()))?;
        self.leaf("comparison", wait.comparison().scn_name())?;
        self.leaf("tolerance", &format_compact(wait.tolerance()))?;
        if wait.timeout() > 0.0 {
            self.leaf("timeout", &format_compact(wait.timeout()))?;
        }
        self.errhandler(wait.errhandler())
    }

    fn include(&mut self, include: &Include) -> fmt::Result {
        self.leaf("scan_file", &include.scan)?;
        if let Some(ref macros) = include.macros {
            self.leaf("macros", macros)?;
        }
        self.errhandler(include.errhandler.as_deref())
    }

    fn loop_(&mut self, lp: &Loop) -> fmt::Result {
        self.leaf("start", &format_compact(lp.start()))?;
        self.leaf("end", &format_compact(lp.end()))?;
        self.leaf("step", &format_compact(lp.step()))?;
        self.checks(
            lp.device(),
            lp.completion(),
            lp.readback(),
            lp.tolerance(),
            lp.needs_timeout().then(|| lp.timeout()),
        )?;
        self.errhandler(lp.errhandler())
    }

    fn parallel(&mut self, par: &Parallel) -> fmt::Result {
        if par.timeout() > 0.0 {
            self.leaf("timeout", &format_compact(par.timeout()))?;
        }
        self.errhandler(par.errhandler())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Comment, Delay, Log};

    #[test]
    fn test_set_with_readback() {
        let cmds: Vec<Command> = vec![Set::new("motor_x", 3.0)
            .with_completion(true)
            .with_readback("motor_x.RBV")
            .with_tolerance(0.1)
            .with_timeout(100.0)
            .into()];
        let xml = to_scn(&cmds);
        assert_eq!(
            xml,
            "<commands>\n  <set>\n    <device>motor_x</device>\n    <value>3.0</value>\n    \
             <completion>true</completion>\n    <wait>true</wait>\n    \
             <readback>motor_x.RBV</readback>\n    <tolerance>0.1</tolerance>\n    \
             <timeout>100</timeout>\n  </set>\n</commands>\n"
        );
    }

    #[test]
    fn test_text_value_is_quoted() {
        let xml = to_scn(&[Set::new("camera", "snap").into()]);
        assert!(xml.contains("<value>\"snap\"</value>"));
        assert!(xml.contains("<wait>false</wait>"));
        assert!(!xml.contains("<timeout>"));
    }

    #[test]
    fn test_escaping() {
        let xml = to_scn(&[Comment::new("a < b & c").into()]);
        assert!(xml.contains("<text>a &lt; b &amp; c</text>"));
    }

    #[test]
    fn test_nested_body() {
        let cmds: Vec<Command> = vec![Loop::new("x", 1.0, 5.0, 1.0)
            .with_body(vec![
                Parallel::new(vec![Set::new("a", 1.0).into()]).into(),
                Delay::new(2.0).into(),
                Log::new(["a"]).into(),
            ])
            .into()];
        let xml = to_scn(&cmds);
        assert!(xml.contains("    <body>\n      <parallel>\n        <body>\n          <set>"));
        assert!(xml.contains("      <delay>\n        <seconds>2</seconds>"));
        assert!(xml.contains("<devices>\n          <device>a</device>\n        </devices>"));
    }

    #[test]
    fn test_wait_comparison_name() {
        let xml = to_scn(&[Wait::new("counter", 10.0)
            .with_comparison(crate::command::Comparison::IncreaseBy)
            .into()]);
        assert!(xml.contains("<comparison>INCREASE_BY</comparison>"));
    }

    #[test]
    fn test_timeout_only_with_checks() {
        let xml = to_scn(&[Set::new("x", 1.0).with_timeout(30.0).into()]);
        assert!(!xml.contains("<timeout>"));

        let xml = to_scn(&[Loop::new("m", 0.0, 2.0, 1.0)
            .with_completion(true)
            .with_timeout(30.0)
            .into()]);
        assert!(xml.contains(
            "<completion>true</completion>\n    <wait>false</wait>\n    <timeout>30</timeout>"
        ));
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_scn(&[]), "<commands/>\n");
    }
}
