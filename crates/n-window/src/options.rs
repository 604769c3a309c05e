// SPDX-License-Identifier: MIT
//! Window options — the `:set` system for the layout engine.
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `:set option`    | Enable boolean / show numeric |
//! | `:set nooption`  | Disable boolean               |
//! | `:set option!`   | Toggle boolean                |
//! | `:set option?`   | Query current value           |
//! | `:set option=N`  | Assign numeric value          |
//! | `:set`           | Show changed options          |
//! | `:set all`       | Show all options              |
//!
//! # Options
//!
//! | Full name        | Abbrev | Type    | Default | Meaning                          |
//! |------------------|--------|---------|---------|----------------------------------|
//! | `number`         | `nu`   | bool    | true    | Gutter with line numbers         |
//! | `relativenumber` | `rnu`  | bool    | false   | Gutter numbers relative to cursor |
//! | `smoothscroll`   | `sms`  | bool    | true    | Animate scrolling                |
//! | `scrolloff`      | `so`   | integer | 3       | Rows kept between cursor and edge on row jumps |
//! | `sidescrolloff`  | `siso` | integer | 2       | Columns kept left/right of the cursor |
//! | `scrolltick`     | `stk`  | integer | 16      | Milliseconds between animation frames |
//! | `gutterpadding`  | `gp`   | integer | 10      | Pixels on each side of gutter numbers |

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// A parsed `:set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `:set option` — enable a boolean option.
    On(String),
    /// `:set nooption` — disable a boolean option.
    Off(String),
    /// `:set option!` — toggle a boolean option.
    Toggle(String),
    /// `:set option?` — query the current value.
    Query(String),
    /// `:set option=value` — assign a value.
    Assign(String, String),
    /// `:set` with no arguments.
    ShowChanged,
    /// `:set all`.
    ShowAll,
}

/// Why a `:set` directive was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    /// A boolean directive on a numeric option or the other way round.
    #[error("wrong kind of value for {0}")]
    TypeMismatch(String),
}

// ---------------------------------------------------------------------------
// Option names
// ---------------------------------------------------------------------------

/// A known option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    Number,
    RelativeNumber,
    SmoothScroll,
    ScrollOff,
    SideScrollOff,
    ScrollTick,
    GutterPadding,
}

impl OptionName {
    pub const ALL: [Self; 7] = [
        Self::Number,
        Self::RelativeNumber,
        Self::SmoothScroll,
        Self::ScrollOff,
        Self::SideScrollOff,
        Self::ScrollTick,
        Self::GutterPadding,
    ];

    /// Resolve a full name or abbreviation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "number" | "nu" => Self::Number,
            "relativenumber" | "rnu" => Self::RelativeNumber,
            "smoothscroll" | "sms" => Self::SmoothScroll,
            "scrolloff" | "so" => Self::ScrollOff,
            "sidescrolloff" | "siso" => Self::SideScrollOff,
            "scrolltick" | "stk" => Self::ScrollTick,
            "gutterpadding" | "gp" => Self::GutterPadding,
            _ => return None,
        })
    }

    /// The full name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::RelativeNumber => "relativenumber",
            Self::SmoothScroll => "smoothscroll",
            Self::ScrollOff => "scrolloff",
            Self::SideScrollOff => "sidescrolloff",
            Self::ScrollTick => "scrolltick",
            Self::GutterPadding => "gutterpadding",
        }
    }

    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Number | Self::RelativeNumber | Self::SmoothScroll)
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    OptionName::parse(name).is_some_and(OptionName::is_bool)
}

/// Returns `true` if `name` is a known numeric option (full name or abbreviation).
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    OptionName::parse(name).is_some_and(|o| !o.is_bool())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the full `:set` arguments string into directives.
///
/// Multiple space-separated arguments are supported (e.g., `:set nu so=5`).
/// An empty argument string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `:set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `nonumber`, but not `number` read as "no" + "mber".
    if let Some(name) = arg.strip_prefix("no").filter(|name| is_bool_option(name)) {
        return SetDirective::Off(name.to_string());
    }
    // A bare numeric option name shows its value, as in Vim.
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }
    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display: `"name"` or `"noname"`.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Option values for every pane in a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub number: bool,
    pub relative_number: bool,
    pub smooth_scroll: bool,
    pub scroll_off: usize,
    pub side_scroll_off: usize,
    /// Milliseconds between animation frames.
    pub scroll_tick: u64,
    /// Pixels on each side of the gutter numbers.
    pub gutter_padding: i32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            number: true,
            relative_number: false,
            smooth_scroll: true,
            scroll_off: 3,
            side_scroll_off: 2,
            scroll_tick: 16,
            gutter_padding: 10,
        }
    }
}

impl Options {
    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.scroll_tick)
    }

    fn get_bool(&self, name: OptionName) -> Option<bool> {
        match name {
            OptionName::Number => Some(self.number),
            OptionName::RelativeNumber => Some(self.relative_number),
            OptionName::SmoothScroll => Some(self.smooth_scroll),
            _ => None,
        }
    }

    fn set_bool(&mut self, name: OptionName, value: bool) {
        match name {
            OptionName::Number => self.number = value,
            OptionName::RelativeNumber => self.relative_number = value,
            OptionName::SmoothScroll => self.smooth_scroll = value,
            _ => {}
        }
    }

    /// Current value as `:set` displays it.
    #[must_use]
    pub fn display(&self, name: OptionName) -> String {
        if let Some(value) = self.get_bool(name) {
            return format_bool(name.name(), value);
        }
        let value = match name {
            OptionName::ScrollOff => self.scroll_off.to_string(),
            OptionName::SideScrollOff => self.side_scroll_off.to_string(),
            OptionName::ScrollTick => self.scroll_tick.to_string(),
            OptionName::GutterPadding => self.gutter_padding.to_string(),
            _ => String::new(),
        };
        format!("{name}={value}")
    }

    fn assign(&mut self, name: OptionName, value: &str) -> Result<(), OptionError> {
        let invalid = || OptionError::InvalidValue {
            name: name.name().to_string(),
            value: value.to_string(),
        };
        match name {
            OptionName::ScrollOff => self.scroll_off = value.parse().map_err(|_| invalid())?,
            OptionName::SideScrollOff => {
                self.side_scroll_off = value.parse().map_err(|_| invalid())?;
            }
            OptionName::ScrollTick => {
                let tick: u64 = value.parse().map_err(|_| invalid())?;
                if tick == 0 {
                    return Err(invalid());
                }
                self.scroll_tick = tick;
            }
            OptionName::GutterPadding => {
                let padding: i32 = value.parse().map_err(|_| invalid())?;
                if padding < 0 {
                    return Err(invalid());
                }
                self.gutter_padding = padding;
            }
            _ => return Err(OptionError::TypeMismatch(name.name().to_string())),
        }
        Ok(())
    }

    /// Apply one directive. Returns the text to show, if any.
    ///
    /// # Errors
    ///
    /// Unknown option names, values that do not parse, and boolean
    /// directives on numeric options (or assignments to booleans).
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        let resolve = |name: &str| OptionName::parse(name).ok_or_else(|| OptionError::Unknown(name.to_string()));
        let require_bool = |name: OptionName| {
            if name.is_bool() {
                Ok(name)
            } else {
                Err(OptionError::TypeMismatch(name.name().to_string()))
            }
        };
        match directive {
            SetDirective::On(name) => {
                let name = require_bool(resolve(name)?)?;
                self.set_bool(name, true);
                Ok(None)
            }
            SetDirective::Off(name) => {
                let name = require_bool(resolve(name)?)?;
                self.set_bool(name, false);
                Ok(None)
            }
            SetDirective::Toggle(name) => {
                let name = require_bool(resolve(name)?)?;
                let value = self.get_bool(name).unwrap_or(false);
                self.set_bool(name, !value);
                Ok(None)
            }
            SetDirective::Query(name) => Ok(Some(self.display(resolve(name)?))),
            SetDirective::Assign(name, value) => {
                self.assign(resolve(name)?, value)?;
                Ok(None)
            }
            SetDirective::ShowChanged => {
                let defaults = Self::default();
                let changed: Vec<String> = OptionName::ALL
                    .iter()
                    .filter(|&&o| self.display(o) != defaults.display(o))
                    .map(|&o| self.display(o))
                    .collect();
                Ok(Some(changed.join("  ")))
            }
            SetDirective::ShowAll => Ok(Some(
                OptionName::ALL.iter().map(|&o| self.display(o)).collect::<Vec<_>>().join("  "),
            )),
        }
    }

    /// Parse and apply a whole `:set` argument string. Stops at the first
    /// failing directive; earlier ones stay applied, as in Vim.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn set(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            if let Some(text) = self.apply(&directive)? {
                shown.push(text);
            }
        }
        Ok(shown)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── parse_set_arg ────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_forms() {
        assert_eq!(parse_set_arg("number"), SetDirective::On("number".into()));
        assert_eq!(parse_set_arg("nonu"), SetDirective::Off("nu".into()));
        assert_eq!(parse_set_arg("sms!"), SetDirective::Toggle("sms".into()));
        assert_eq!(parse_set_arg("rnu?"), SetDirective::Query("rnu".into()));
    }

    #[test]
    fn number_is_not_no_mber() {
        assert_eq!(parse_set_arg("number"), SetDirective::On("number".into()));
        assert_eq!(parse_set_arg("nonumber"), SetDirective::Off("number".into()));
    }

    #[test]
    fn parse_assign_and_bare_numeric() {
        assert_eq!(
            parse_set_arg("so=5"),
            SetDirective::Assign("so".into(), "5".into())
        );
        assert_eq!(parse_set_arg("scrolltick"), SetDirective::Query("scrolltick".into()));
    }

    #[test]
    fn parse_set_splits_and_defaults() {
        assert_eq!(parse_set("  "), vec![SetDirective::ShowChanged]);
        assert_eq!(parse_set("all"), vec![SetDirective::ShowAll]);
        assert_eq!(parse_set("nu so=1").len(), 2);
    }

    // ── Options ──────────────────────────────────────────────────────────

    #[test]
    fn set_updates_values() {
        let mut o = Options::default();
        assert_eq!(o.set("nonu rnu nosms so=5 siso=4 stk=8 gp=6").unwrap(), Vec::<String>::new());
        assert!(!o.number);
        assert!(o.relative_number);
        assert!(!o.smooth_scroll);
        assert_eq!(o.scroll_off, 5);
        assert_eq!(o.side_scroll_off, 4);
        assert_eq!(o.tick(), Duration::from_millis(8));
        assert_eq!(o.gutter_padding, 6);
    }

    #[test]
    fn toggle_flips() {
        let mut o = Options::default();
        o.set("number!").unwrap();
        assert!(!o.number);
        o.set("nu!").unwrap();
        assert!(o.number);
    }

    #[test]
    fn query_and_show() {
        let mut o = Options::default();
        assert_eq!(o.set("so?").unwrap(), vec!["scrolloff=3".to_string()]);
        assert_eq!(o.set("nu?").unwrap(), vec!["number".to_string()]);
        assert_eq!(o.set("").unwrap(), vec![String::new()]);
        o.set("nonu so=7").unwrap();
        assert_eq!(o.set("").unwrap(), vec!["nonumber  scrolloff=7".to_string()]);
        assert!(o.set("all").unwrap()[0].starts_with("nonumber  norelativenumber  smoothscroll"));
    }

    #[test]
    fn errors() {
        let mut o = Options::default();
        assert_eq!(o.set("bogus"), Err(OptionError::Unknown("bogus".into())));
        assert_eq!(
            o.set("so=abc"),
            Err(OptionError::InvalidValue {
                name: "scrolloff".into(),
                value: "abc".into(),
            })
        );
        assert_eq!(o.set("stk=0").unwrap_err().to_string(), "invalid value for scrolltick: 0");
        assert_eq!(o.set("nu=3"), Err(OptionError::TypeMismatch("number".into())));
        assert_eq!(o.set("so!"), Err(OptionError::TypeMismatch("scrolloff".into())));
    }

    #[test]
    fn earlier_directives_stick_on_error() {
        let mut o = Options::default();
        assert!(o.set("nonu bogus rnu").is_err());
        assert!(!o.number);
        assert!(!o.relative_number);
    }
}
