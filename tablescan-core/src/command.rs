//! Scan commands
//!
//! The command set is closed: every consumer (text rendering, SCN export,
//! JSON) handles each kind explicitly. `Loop` and `Parallel` own their body,
//! so a compiled scan is a strict tree.
//!
//! Text rendering mirrors how commands are written by hand:
//!
//! ```text
//! Set('Motor1', 2.0, completion=True, timeout=100, readback='Motor1.RBV', tolerance=0.100000)
//! Wait('Counter1', 10.0, comparison='>=', tolerance=0.1, timeout=60, errhandler='OnErrorContinue')
//! Loop('X', 0, 3, 0.5, [ Set('Camera', 'Snap') ])
//! Parallel(Set('A', 1.0), Set('B', 2.0))
//! ```

use crate::number::{format_compact, format_fixed};
use crate::value::{quote, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error handler name that lets a scan continue after a timeout
pub const ON_ERROR_CONTINUE: &str = "OnErrorContinue";

/// One node of a command tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    Set(Set),
    Wait(Wait),
    Delay(Delay),
    Comment(Comment),
    Log(Log),
    Include(Include),
    Loop(Loop),
    Parallel(Parallel),
}

impl Command {
    /// Lowercase kind name, also the SCN element name
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Set(_) => "set",
            Command::Wait(_) => "wait",
            Command::Delay(_) => "delay",
            Command::Comment(_) => "comment",
            Command::Log(_) => "log",
            Command::Include(_) => "include",
            Command::Loop(_) => "loop",
            Command::Parallel(_) => "parallel",
        }
    }

    /// Device addressed by the command, if any
    pub fn device(&self) -> Option<&str> {
        match self {
            Command::Set(s) => Some(&s.device),
            Command::Wait(w) => Some(&w.device),
            Command::Loop(l) => Some(&l.device),
            _ => None,
        }
    }

    /// Nested commands of `Loop` and `Parallel`
    pub fn body(&self) -> Option<&[Command]> {
        match self {
            Command::Loop(l) => Some(&l.body),
            Command::Parallel(p) => Some(&p.body),
            _ => None,
        }
    }

    /// Multi-line rendering at the given nesting level
    pub fn format(&self, level: usize) -> String {
        let indent = "  ".repeat(level);
        match self {
            Command::Loop(l) if !l.body.is_empty() => format!(
                "{}{},\n{}{})",
                indent,
                l.head(),
                format_block(&l.body, level),
                l.options()
            ),
            Command::Parallel(p) if !p.body.is_empty() => format!(
                "{}Parallel(\n{}{})",
                indent,
                format_block(&p.body, level),
                p.options()
            ),
            other => format!("{}{}", indent, other),
        }
    }
}

/// `[`, one command per line one level deeper, `]`
pub fn format_block(commands: &[Command], level: usize) -> String {
    let indent = "  ".repeat(level);
    if commands.is_empty() {
        return format!("{}[]", indent);
    }
    let lines: Vec<String> = commands.iter().map(|c| c.format(level + 1)).collect();
    format!("{}[\n{}\n{}]", indent, lines.join(",\n"), indent)
}

fn join(commands: &[Command]) -> String {
    commands
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set(c) => c.fmt(f),
            Command::Wait(c) => c.fmt(f),
            Command::Delay(c) => c.fmt(f),
            Command::Comment(c) => c.fmt(f),
            Command::Log(c) => c.fmt(f),
            Command::Include(c) => c.fmt(f),
            Command::Loop(c) => c.fmt(f),
            Command::Parallel(c) => c.fmt(f),
        }
    }
}

// ============================================================================
// Readback / Comparison
// ============================================================================

/// Readback check after writing a device
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Readback {
    /// No readback check
    #[default]
    Off,
    /// Read back the written device itself
    Device,
    /// Read back another device
    Named(String),
}

impl Readback {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Readback::Off)
    }

    /// Device to read back when writing `device`
    pub fn target<'a>(&'a self, device: &'a str) -> Option<&'a str> {
        match self {
            Readback::Off => None,
            Readback::Device => Some(device),
            Readback::Named(name) => Some(name),
        }
    }
}

impl From<bool> for Readback {
    fn from(enabled: bool) -> Self {
        if enabled {
            Readback::Device
        } else {
            Readback::Off
        }
    }
}

impl From<&str> for Readback {
    fn from(name: &str) -> Self {
        Readback::Named(name.to_string())
    }
}

impl From<String> for Readback {
    fn from(name: String) -> Self {
        Readback::Named(name)
    }
}

/// How a `Wait` compares the device value with its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comparison {
    #[default]
    Equals,
    Above,
    AtLeast,
    Below,
    AtMost,
    IncreaseBy,
    DecreaseBy,
}

impl Comparison {
    /// Parse `">="`, `"increase by"`, `"AT_LEAST"`, ...
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase().replace(['_', ' '], "");
        let comparison = match normalized.as_str() {
            "=" | "==" | "equals" => Comparison::Equals,
            ">" | "above" => Comparison::Above,
            ">=" | "atleast" => Comparison::AtLeast,
            "<" | "below" => Comparison::Below,
            "<=" | "atmost" => Comparison::AtMost,
            "increaseby" | "increase" => Comparison::IncreaseBy,
            "decreaseby" | "decrease" => Comparison::DecreaseBy,
            _ => return None,
        };
        Some(comparison)
    }

    /// Text form used in command rendering
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Equals => "=",
            Comparison::Above => ">",
            Comparison::AtLeast => ">=",
            Comparison::Below => "<",
            Comparison::AtMost => "<=",
            Comparison::IncreaseBy => "increase by",
            Comparison::DecreaseBy => "decrease by",
        }
    }

    /// Name used by the scan server
    pub fn scn_name(&self) -> &'static str {
        match self {
            Comparison::Equals => "EQUALS",
            Comparison::Above => "ABOVE",
            Comparison::AtLeast => "AT_LEAST",
            Comparison::Below => "BELOW",
            Comparison::AtMost => "AT_MOST",
            Comparison::IncreaseBy => "INCREASE_BY",
            Comparison::DecreaseBy => "DECREASE_BY",
        }
    }
}

/// `completion=True, timeout=..., readback=..., tolerance=...` shared by Set and Loop
fn check_options(completion: bool, readback: &Readback, tolerance: f64, timeout: f64) -> String {
    let mut out = String::new();
    if completion {
        out.push_str(", completion=True");
        if timeout != 0.0 {
            out.push_str(&format!(", timeout={}", format_compact(timeout)));
        }
    }
    match readback {
        Readback::Off => {}
        Readback::Device => out.push_str(&format!(
            ", readback=True, tolerance={}",
            format_fixed(tolerance)
        )),
        Readback::Named(name) => out.push_str(&format!(
            ", readback={}, tolerance={}",
            quote(name),
            format_fixed(tolerance)
        )),
    }
    if readback.is_enabled() && !completion && timeout != 0.0 {
        out.push_str(&format!(", timeout={}", format_compact(timeout)));
    }
    out
}

fn errhandler_option(errhandler: &Option<String>) -> String {
    errhandler
        .as_ref()
        .map(|e| format!(", errhandler={}", quote(e)))
        .unwrap_or_default()
}

// ============================================================================
// Set
// ============================================================================

/// Write a value to a device, optionally awaiting completion and readback
///
/// When completion is awaited, the timeout applies to the completion and the
/// readback is then checked once. Without completion, the timeout applies to
/// waiting for the readback to reach the value within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    device: String,
    value: Value,
    #[serde(default)]
    completion: bool,
    #[serde(default)]
    readback: Readback,
    #[serde(default)]
    tolerance: f64,
    #[serde(default)]
    timeout: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    errhandler: Option<String>,
}

impl Set {
    pub fn new(device: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            device: device.into(),
            value: value.into(),
            completion: false,
            readback: Readback::Off,
            tolerance: 0.0,
            timeout: 0.0,
            errhandler: None,
        }
    }

    pub fn with_completion(mut self, completion: bool) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_readback(mut self, readback: impl Into<Readback>) -> Self {
        self.readback = readback.into();
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_errhandler(mut self, errhandler: impl Into<String>) -> Self {
        self.errhandler = Some(errhandler.into());
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn completion(&self) -> bool {
        self.completion
    }

    pub fn readback(&self) -> &Readback {
        &self.readback
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn errhandler(&self) -> Option<&str> {
        self.errhandler.as_deref()
    }

    /// Change completion
    pub fn set_completion(&mut self, completion: bool) {
        self.completion = completion;
    }

    /// Change readback
    pub fn set_readback(&mut self, readback: impl Into<Readback>) {
        self.readback = readback.into();
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    pub fn set_timeout(&mut self, timeout: f64) {
        self.timeout = timeout;
    }

    /// Timeout is only meaningful with completion or readback
    pub fn needs_timeout(&self) -> bool {
        (self.completion || self.readback.is_enabled()) && self.timeout > 0.0
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Set({}, {}{}{})",
            quote(&self.device),
            self.value.repr(),
            check_options(self.completion, &self.readback, self.tolerance, self.timeout),
            errhandler_option(&self.errhandler)
        )
    }
}

impl From<Set> for Command {
    fn from(c: Set) -> Self {
        Command::Set(c)
    }
}

// ============================================================================
// Wait
// ============================================================================

/// Wait until a device reaches a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wait {
    device: String,
    value: Value,
    #[serde(default)]
    comparison: Comparison,
    #[serde(default)]
    tolerance: f64,
    #[serde(default)]
    timeout: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    errhandler: Option<String>,
}

impl Wait {
    pub fn new(device: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            device: device.into(),
            value: value.into(),
            comparison: Comparison::Equals,
            tolerance: 0.0,
            timeout: 0.0,
            errhandler: None,
        }
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_errhandler(mut self, errhandler: impl Into<String>) -> Self {
        self.errhandler = Some(errhandler.into());
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn errhandler(&self) -> Option<&str> {
        self.errhandler.as_deref()
    }
}

impl fmt::Display for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wait({}, {}, comparison={}, tolerance={}",
            quote(&self.device),
            self.value.repr(),
            quote(self.comparison.symbol()),
            format_compact(self.tolerance)
        )?;
        if self.timeout > 0.0 {
            write!(f, ", timeout={}", format_compact(self.timeout))?;
        }
        write!(f, "{})", errhandler_option(&self.errhandler))
    }
}

impl From<Wait> for Command {
    fn from(c: Wait) -> Self {
        Command::Wait(c)
    }
}

// ============================================================================
// Delay / Comment / Log / Include
// ============================================================================

/// Pause for a number of seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    pub seconds: f64,
}

impl Delay {
    pub fn new(seconds: f64) -> Self {
        Self { seconds }
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delay({})", format_compact(self.seconds))
    }
}

impl From<Delay> for Command {
    fn from(c: Delay) -> Self {
        Command::Delay(c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment({})", quote(&self.text))
    }
}

impl From<Comment> for Command {
    fn from(c: Comment) -> Self {
        Command::Comment(c)
    }
}

/// Record the current value of devices
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Log {
    pub devices: Vec<String>,
}

impl Log {
    pub fn new<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            devices: devices.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.devices.iter().map(|d| quote(d)).collect();
        write!(f, "Log({})", names.join(", "))
    }
}

impl From<Log> for Command {
    fn from(c: Log) -> Self {
        Command::Log(c)
    }
}

/// Run the commands of another scan file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Include {
    pub scan: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub macros: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub errhandler: Option<String>,
}

impl Include {
    pub fn new(scan: impl Into<String>) -> Self {
        Self {
            scan: scan.into(),
            macros: None,
            errhandler: None,
        }
    }

    /// Macro definitions, `"name=value, other=value"`
    pub fn with_macros(mut self, macros: impl Into<String>) -> Self {
        self.macros = Some(macros.into());
        self
    }

    pub fn with_errhandler(mut self, errhandler: impl Into<String>) -> Self {
        self.errhandler = Some(errhandler.into());
        self
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Include({}", quote(&self.scan))?;
        if let Some(ref macros) = self.macros {
            write!(f, ", macros={}", quote(macros))?;
        }
        write!(f, "{})", errhandler_option(&self.errhandler))
    }
}

impl From<Include> for Command {
    fn from(c: Include) -> Self {
        Command::Include(c)
    }
}

// ============================================================================
// Loop
// ============================================================================

/// Step a device from `start` to `end`, running the body at each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    device: String,
    start: f64,
    end: f64,
    step: f64,
    #[serde(default)]
    body: Vec<Command>,
    #[serde(default)]
    completion: bool,
    #[serde(default)]
    readback: Readback,
    #[serde(default)]
    tolerance: f64,
    #[serde(default)]
    timeout: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    errhandler: Option<String>,
}

impl Loop {
    pub fn new(device: impl Into<String>, start: f64, end: f64, step: f64) -> Self {
        Self {
            device: device.into(),
            start,
            end,
            step,
            body: Vec::new(),
            completion: false,
            readback: Readback::Off,
            tolerance: 0.0,
            timeout: 0.0,
            errhandler: None,
        }
    }

    pub fn with_body(mut self, body: Vec<Command>) -> Self {
        self.body = body;
        self
    }

    pub fn with_completion(mut self, completion: bool) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_readback(mut self, readback: impl Into<Readback>) -> Self {
        self.readback = readback.into();
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_errhandler(mut self, errhandler: impl Into<String>) -> Self {
        self.errhandler = Some(errhandler.into());
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn body(&self) -> &[Command] {
        &self.body
    }

    pub fn completion(&self) -> bool {
        self.completion
    }

    pub fn readback(&self) -> &Readback {
        &self.readback
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn errhandler(&self) -> Option<&str> {
        self.errhandler.as_deref()
    }

    /// Timeout is only meaningful with completion or readback
    pub fn needs_timeout(&self) -> bool {
        (self.completion || self.readback.is_enabled()) && self.timeout > 0.0
    }

    fn head(&self) -> String {
        format!(
            "Loop({}, {}, {}, {}",
            quote(&self.device),
            format_compact(self.start),
            format_compact(self.end),
            format_compact(self.step)
        )
    }

    fn options(&self) -> String {
        format!(
            "{}{}",
            check_options(self.completion, &self.readback, self.tolerance, self.timeout),
            errhandler_option(&self.errhandler)
        )
    }
}

impl fmt::Display for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head())?;
        if !self.body.is_empty() {
            write!(f, ", [ {} ]", join(&self.body))?;
        }
        write!(f, "{})", self.options())
    }
}

impl From<Loop> for Command {
    fn from(c: Loop) -> Self {
        Command::Loop(c)
    }
}

// ============================================================================
// Parallel
// ============================================================================

/// Run the body commands concurrently, then continue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parallel {
    #[serde(default)]
    body: Vec<Command>,
    #[serde(default)]
    timeout: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    errhandler: Option<String>,
}

impl Parallel {
    pub fn new(body: Vec<Command>) -> Self {
        Self {
            body,
            timeout: 0.0,
            errhandler: None,
        }
    }

    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_errhandler(mut self, errhandler: impl Into<String>) -> Self {
        self.errhandler = Some(errhandler.into());
        self
    }

    pub fn body(&self) -> &[Command] {
        &self.body
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    pub fn errhandler(&self) -> Option<&str> {
        self.errhandler.as_deref()
    }

    fn options(&self) -> String {
        let mut out = String::new();
        if self.timeout > 0.0 {
            out.push_str(&format!(", timeout={}", format_compact(self.timeout)));
        }
        out.push_str(&errhandler_option(&self.errhandler));
        out
    }
}

impl fmt::Display for Parallel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = self.options();
        if self.body.is_empty() {
            write!(f, "Parallel({})", options.trim_start_matches(", "))
        } else {
            write!(f, "Parallel({}{})", join(&self.body), options)
        }
    }
}

impl From<Parallel> for Command {
    fn from(c: Parallel) -> Self {
        Command::Parallel(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_plain() {
        assert_eq!(Set::new("X", 1.0).to_string(), "Set('X', 1.0)");
        assert_eq!(Set::new("shutter", 1).to_string(), "Set('shutter', 1)");
        assert_eq!(Set::new("camera", "snap").to_string(), "Set('camera', 'snap')");
    }

    #[test]
    fn test_set_completion_and_readback() {
        let set = Set::new("Motor1", 2.0)
            .with_completion(true)
            .with_readback("Motor1.RBV")
            .with_tolerance(0.1)
            .with_timeout(100.0);
        assert_eq!(
            set.to_string(),
            "Set('Motor1', 2.0, completion=True, timeout=100, readback='Motor1.RBV', tolerance=0.100000)"
        );
    }

    #[test]
    fn test_set_readback_timeout_without_completion() {
        let set = Set::new("X", 1.0)
            .with_readback(true)
            .with_tolerance(0.5)
            .with_timeout(10.0);
        assert_eq!(
            set.to_string(),
            "Set('X', 1.0, readback=True, tolerance=0.500000, timeout=10)"
        );
    }

    #[test]
    fn test_set_timeout_hidden_without_checks() {
        let set = Set::new("X", 1.0).with_timeout(10.0);
        assert_eq!(set.to_string(), "Set('X', 1.0)");
        assert!(!set.needs_timeout());
    }

    #[test]
    fn test_set_mutators() {
        let mut set = Set::new("X", 1.0).with_completion(true).with_readback(true);
        set.set_completion(false);
        set.set_readback(false);
        assert_eq!(set.to_string(), "Set('X', 1.0)");
    }

    #[test]
    fn test_wait() {
        let wait = Wait::new("Counter1", 10.0)
            .with_comparison(Comparison::AtLeast)
            .with_tolerance(0.1)
            .with_timeout(60.0)
            .with_errhandler(ON_ERROR_CONTINUE);
        assert_eq!(
            wait.to_string(),
            "Wait('Counter1', 10.0, comparison='>=', tolerance=0.1, timeout=60, errhandler='OnErrorContinue')"
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Delay::new(10.0).to_string(), "Delay(10)");
        assert_eq!(Delay::new(0.5).to_string(), "Delay(0.5)");
        assert_eq!(Comment::new("Setup").to_string(), "Comment('Setup')");
        assert_eq!(Log::new(["X", "Y"]).to_string(), "Log('X', 'Y')");
        assert_eq!(Include::new("Start.scn").to_string(), "Include('Start.scn')");
        assert_eq!(
            Include::new("lf.scn").with_macros("run=1").to_string(),
            "Include('lf.scn', macros='run=1')"
        );
    }

    #[test]
    fn test_loop() {
        let empty = Loop::new("position", 2.0, 5.0, 1.0);
        assert_eq!(empty.to_string(), "Loop('position', 2, 5, 1)");

        let nested = Loop::new("X", 1.0, 10.0, 1.0).with_body(vec![
            Loop::new("Y", 2.0, 5.0, 1.0)
                .with_body(vec![Set::new("Camera", "Snap").into()])
                .into(),
        ]);
        assert_eq!(
            nested.to_string(),
            "Loop('X', 1, 10, 1, [ Loop('Y', 2, 5, 1, [ Set('Camera', 'Snap') ]) ])"
        );
    }

    #[test]
    fn test_loop_with_completion() {
        let lp = Loop::new("x", 1.0, 10.0, 0.5)
            .with_body(vec![Comment::new("Hello").into()])
            .with_completion(true)
            .with_timeout(10.0);
        assert_eq!(
            lp.to_string(),
            "Loop('x', 1, 10, 0.5, [ Comment('Hello') ], completion=True, timeout=10)"
        );
    }

    #[test]
    fn test_parallel() {
        let par = Parallel::new(vec![Set::new("A", 1.0).into(), Set::new("B", 2.0).into()]);
        assert_eq!(par.to_string(), "Parallel(Set('A', 1.0), Set('B', 2.0))");

        let timed = Parallel::new(vec![Set::new("A", 1.0).into()])
            .with_timeout(300.0)
            .with_errhandler(ON_ERROR_CONTINUE);
        assert_eq!(
            timed.to_string(),
            "Parallel(Set('A', 1.0), timeout=300, errhandler='OnErrorContinue')"
        );

        assert_eq!(Parallel::new(vec![]).with_timeout(5.0).to_string(), "Parallel(timeout=5)");
    }

    #[test]
    fn test_comparison_parse() {
        assert_eq!(Comparison::parse(">="), Some(Comparison::AtLeast));
        assert_eq!(Comparison::parse("increase by"), Some(Comparison::IncreaseBy));
        assert_eq!(Comparison::parse("AT_MOST"), Some(Comparison::AtMost));
        assert_eq!(Comparison::parse("sideways"), None);
    }

    #[test]
    fn test_format_nested() {
        let cmd: Command = Loop::new("pos", 1.0, 5.0, 0.5)
            .with_body(vec![Set::new("run", 1).into(), Delay::new(2.0).into()])
            .into();
        assert_eq!(
            cmd.format(1),
            "  Loop('pos', 1, 5, 0.5,\n  [\n    Set('run', 1),\n    Delay(2)\n  ])"
        );
    }

    #[test]
    fn test_json_tagging() {
        let cmd: Command = Delay::new(2.0).into();
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "delay");
        assert_eq!(json["seconds"], 2.0);

        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
    }
}
