// SPDX-License-Identifier: MIT
//
// n-win — headless driver for the n-window layout engine.
//
// Loads a file (or a scratch buffer) into a rope document and replays window
// commands read from stdin, one per line, against a workspace whose panes
// draw nothing. `print` shows where every pane sits:
//
//   split | vsplit | close | exchange        structure
//   focus h|j|k|l | click X Y | pane N       focus
//   rows N [jump] | cursor R C | goto R C    scrolling and cursor
//   view                                     bring the cursor into view
//   set ARGS | resize W H                    options and canvas
//   print | tree | quit
//
// Lines starting with `#` are comments. Scrolling commands wait for their
// animations to land before the next command runs, so output is
// reproducible. RUST_LOG=debug shows structural decisions, trace shows
// every animation frame.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use n_window::{
    Direction, Document, NullSurfaceFactory, Options, Orientation, PaneId, Position, Rect, RopeDocument,
    SurfaceFactory, Workspace,
};

/// Canvas used until a `resize`.
const CANVAS: Rect = Rect::new(0, 0, 800, 600);

/// How long one pump of the update queue waits for news.
const PUMP: Duration = Duration::from_millis(20);

/// Upper bound on waiting for animations to land.
const SETTLE_LIMIT: Duration = Duration::from_secs(5);

const SCRATCH: &str = "\
n-win scratch buffer

Each line of stdin is a window command:
  split, vsplit, close, exchange
  focus h/j/k/l, click X Y, pane N
  rows N [jump], cursor ROWS COLS, goto ROW COL, view
  set ARGS, resize W H
  print, tree, quit
";

// ─── Commands ───────────────────────────────────────────────────────────────

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Split(Orientation),
    Close,
    Exchange,
    Focus(Direction),
    Click(i32, i32),
    Pane(usize),
    Rows(isize, bool),
    Cursor(isize, isize),
    Goto(usize, usize),
    View,
    Set(String),
    Resize(i32, i32),
    Print,
    Tree,
    Quit,
}

/// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match (word, args.as_slice()) {
        ("split" | "sp", []) => Command::Split(Orientation::Horizontal),
        ("vsplit" | "vs", []) => Command::Split(Orientation::Vertical),
        ("close" | "clo", []) => Command::Close,
        ("exchange" | "x", []) => Command::Exchange,
        ("focus", [key]) => {
            let dir = single_char(key)
                .and_then(Direction::from_key)
                .ok_or_else(|| format!("focus: expected h, j, k or l, got {key:?}"))?;
            Command::Focus(dir)
        }
        ("click", [x, y]) => Command::Click(number(x)?, number(y)?),
        ("pane", [n]) => Command::Pane(number(n)?),
        ("rows", [n]) => Command::Rows(number(n)?, false),
        ("rows", [n, "jump"]) => Command::Rows(number(n)?, true),
        ("cursor", [rows, cols]) => Command::Cursor(number(rows)?, number(cols)?),
        ("goto", [row, col]) => Command::Goto(number(row)?, number(col)?),
        ("view", []) => Command::View,
        ("set", []) => Command::Set(String::new()),
        ("set", _) => Command::Set(rest.trim().to_string()),
        ("resize", [w, h]) => Command::Resize(number(w)?, number(h)?),
        ("print" | "p", []) => Command::Print,
        ("tree", []) => Command::Tree,
        ("quit" | "q", []) => Command::Quit,
        _ => return Err(format!("unknown command: {line}")),
    };
    Ok(Some(command))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("not a number: {s:?}"))
}

// ─── Driver ─────────────────────────────────────────────────────────────────

struct Driver {
    ws: Workspace,
}

impl Driver {
    fn new(document: Arc<dyn Document>, canvas: Rect, options: Options) -> Self {
        let surfaces: Arc<dyn SurfaceFactory> = Arc::new(NullSurfaceFactory::new());
        Self {
            ws: Workspace::new(document, surfaces, canvas, options),
        }
    }

    /// Execute one command, writing any output to `out`.
    fn run(&mut self, command: Command, out: &mut impl Write) -> io::Result<()> {
        debug!("command {command:?}");
        match command {
            Command::Split(orientation) => {
                if self.ws.split(orientation).is_none() {
                    writeln!(out, "split: nothing to split")?;
                }
            }
            Command::Close => {
                if self.ws.close().is_none() {
                    writeln!(out, "close: cannot close the last pane")?;
                }
            }
            Command::Exchange => {
                self.ws.exchange();
            }
            Command::Focus(dir) => {
                let moved = match dir {
                    Direction::Above => self.ws.focus_above(),
                    Direction::Below => self.ws.focus_below(),
                    Direction::Left => self.ws.focus_left(),
                    Direction::Right => self.ws.focus_right(),
                };
                if !moved {
                    writeln!(out, "focus: no pane {dir}")?;
                }
            }
            Command::Click(x, y) => {
                if !self.ws.focus_at(x, y) {
                    writeln!(out, "click: no pane at {x},{y}")?;
                }
            }
            Command::Pane(n) => {
                if !self.ws.focus_pane(PaneId::from_raw(n)) {
                    writeln!(out, "pane: no pane {n}")?;
                }
            }
            Command::Rows(n, jump) => {
                if let Some(handle) = self.ws.scroll_rows(n, jump) {
                    join_jump(handle);
                }
                self.settle();
            }
            Command::Cursor(rows, cols) => {
                self.ws.cursor_to(rows, cols, cols != 0);
                self.settle();
            }
            Command::Goto(row, col) => {
                let pos = Position::new(row.saturating_sub(1), col.saturating_sub(1));
                self.ws.scroll_to(pos, true);
                self.settle();
            }
            Command::View => {
                self.ws.scroll_to_cursor();
                self.settle();
            }
            Command::Set(args) => match self.ws.set_option(&args) {
                Ok(shown) => {
                    for line in shown {
                        writeln!(out, "{line}")?;
                    }
                }
                Err(e) => writeln!(out, "set: {e}")?,
            },
            Command::Resize(width, height) => {
                self.ws.resize(Rect::new(0, 0, width.max(0), height.max(0)));
            }
            Command::Print => self.print(out)?,
            Command::Tree => match self.ws.tree().shape(n_window::Pane::id) {
                Some(shape) => writeln!(out, "{shape:?}")?,
                None => writeln!(out, "(empty)")?,
            },
            Command::Quit => {}
        }
        self.ws.drain_updates();
        Ok(())
    }

    /// Pump the update queue until every pane has landed.
    fn settle(&mut self) {
        let deadline = Instant::now() + SETTLE_LIMIT;
        loop {
            self.ws.wait_redraw(PUMP);
            self.ws.drain_updates();
            let idle = self
                .ws
                .panes()
                .iter()
                .all(|p| !p.is_jumping() && p.heading() == p.scroll_offset());
            if idle || Instant::now() >= deadline {
                break;
            }
        }
        self.ws.drain_updates();
    }

    /// One line per pane, in layout order. The focused pane is starred.
    fn print(&self, out: &mut impl Write) -> io::Result<()> {
        let focused = self.ws.focused();
        for pane in self.ws.panes() {
            let mark = if Some(pane.id()) == focused { '*' } else { ' ' };
            let (sx, sy) = pane.scroll_offset();
            let (start, end) = pane.visible_range();
            writeln!(
                out,
                "{mark} pane {} {} scroll {sx},{sy} lines {start}..{end} cursor {}",
                pane.id(),
                pane.rect(),
                pane.cursor().pos(),
            )?;
        }
        Ok(())
    }
}

/// Wait for a row-jump thread. A panic in it is logged, not propagated.
fn join_jump(handle: JoinHandle<()>) -> bool {
    let name = handle.thread().name().unwrap_or("row jump").to_owned();
    match handle.join() {
        Ok(()) => true,
        Err(cause) => {
            let msg = cause
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            warn!("{name} thread panicked: {msg}");
            false
        }
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let document = match args.get(1) {
        Some(path) => RopeDocument::from_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("n-win: {path}: {e}");
            process::exit(1);
        }),
        None => RopeDocument::from_text(SCRATCH),
    };
    info!("{} lines loaded", document.line_count());

    let mut driver = Driver::new(Arc::new(document), CANVAS, Options::default());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("n-win: stdin: {e}");
            process::exit(1);
        });
        let result = match parse_command(&line) {
            Ok(None) => Ok(()),
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => driver.run(command, &mut out),
            Err(msg) => writeln!(out, "error: {msg}"),
        };
        if let Err(e) = result.and_then(|()| out.flush()) {
            eprintln!("n-win: stdout: {e}");
            process::exit(1);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn driver() -> Driver {
        let text: String = (1..=300).map(|i| format!("line {i}\n")).collect();
        Driver::new(
            Arc::new(RopeDocument::from_text(&text)),
            Rect::new(0, 0, 300, 100),
            Options::default(),
        )
    }

    /// Run a script and return everything it printed.
    fn script(d: &mut Driver, lines: &[&str]) -> String {
        let mut out = Vec::new();
        for line in lines {
            match parse_command(line) {
                Ok(Some(command)) => d.run(command, &mut out).unwrap(),
                Ok(None) => {}
                Err(msg) => writeln!(out, "error: {msg}").unwrap(),
            }
        }
        String::from_utf8(out).unwrap()
    }

    // ── Parsing ───────────────────────────────────────────────────────────

    #[test]
    fn parses_structure_commands() {
        assert_eq!(parse_command("split"), Ok(Some(Command::Split(Orientation::Horizontal))));
        assert_eq!(parse_command("  vs "), Ok(Some(Command::Split(Orientation::Vertical))));
        assert_eq!(parse_command("close"), Ok(Some(Command::Close)));
        assert_eq!(parse_command("x"), Ok(Some(Command::Exchange)));
    }

    #[test]
    fn parses_focus_and_scroll_commands() {
        assert_eq!(parse_command("focus l"), Ok(Some(Command::Focus(Direction::Right))));
        assert_eq!(parse_command("click 10 20"), Ok(Some(Command::Click(10, 20))));
        assert_eq!(parse_command("rows -5"), Ok(Some(Command::Rows(-5, false))));
        assert_eq!(parse_command("rows 5 jump"), Ok(Some(Command::Rows(5, true))));
        assert_eq!(parse_command("cursor 3 -1"), Ok(Some(Command::Cursor(3, -1))));
        assert_eq!(parse_command("goto 10 1"), Ok(Some(Command::Goto(10, 1))));
    }

    #[test]
    fn set_keeps_its_arguments_verbatim() {
        assert_eq!(parse_command("set nonu so=5"), Ok(Some(Command::Set("nonu so=5".into()))));
        assert_eq!(parse_command("set"), Ok(Some(Command::Set(String::new()))));
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("# vsplit"), Ok(None));
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse_command("focus q").is_err());
        assert!(parse_command("focus hl").is_err());
        assert!(parse_command("rows many").is_err());
        assert!(parse_command("split 3").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    // ── Scripts ───────────────────────────────────────────────────────────

    #[test]
    fn three_columns_then_close_middle() {
        let mut d = driver();
        let out = script(&mut d, &["vsplit", "focus l", "vsplit", "print"]);
        assert_eq!(
            out,
            "  pane 1 100x100+0+0 scroll 0,0 lines 0..6 cursor 1:1\n\
             * pane 2 100x100+100+0 scroll 0,0 lines 0..6 cursor 1:1\n  \
             pane 3 100x100+200+0 scroll 0,0 lines 0..6 cursor 1:1\n"
        );

        let out = script(&mut d, &["close", "focus j", "print"]);
        assert_eq!(
            out,
            "focus: no pane below\n\
             * pane 1 150x100+0+0 scroll 0,0 lines 0..6 cursor 1:1\n  \
             pane 3 150x100+150+0 scroll 0,0 lines 0..6 cursor 1:1\n"
        );
    }

    #[test]
    fn last_pane_is_kept() {
        let mut d = driver();
        let out = script(&mut d, &["close"]);
        assert_eq!(out, "close: cannot close the last pane\n");
        assert_eq!(d.ws.len(), 1);
    }

    #[test]
    fn row_jump_lands_before_next_command() {
        let mut d = driver();
        script(&mut d, &["rows 10 jump"]);
        let pane = d.ws.focused_pane().unwrap();
        assert_eq!(pane.cursor().pos(), Position::new(10, 0));
        assert_eq!(pane.scroll_offset(), (0, 200));
    }

    #[test]
    fn goto_is_one_indexed() {
        let mut d = driver();
        script(&mut d, &["goto 50 3"]);
        let pane = d.ws.focused_pane().unwrap();
        assert_eq!(pane.cursor().pos(), Position::new(49, 2));
        assert_eq!(pane.heading(), pane.scroll_offset());
        let (start, end) = pane.visible_range();
        assert!((start..end).contains(&49));
    }

    #[test]
    fn set_reports_values_and_errors() {
        let mut d = driver();
        let out = script(&mut d, &["set so?", "set bogus"]);
        assert_eq!(out, "scrolloff=3\nset: unknown option: bogus\n");
    }

    #[test]
    fn click_and_pane_focus() {
        let mut d = driver();
        let out = script(&mut d, &["vsplit", "click 200 50", "pane 9", "click 900 900"]);
        assert_eq!(out, "pane: no pane 9\nclick: no pane at 900,900\n");
        assert_eq!(d.ws.focused(), Some(PaneId::from_raw(2)));
    }

    #[test]
    fn panicking_jump_thread_is_reported() {
        let ok = std::thread::spawn(|| {});
        assert!(join_jump(ok));
        let failed = std::thread::Builder::new()
            .name("n-win-test-jump".into())
            .spawn(|| panic!("lost the cursor"))
            .unwrap();
        assert!(!join_jump(failed));
    }

    #[test]
    fn resize_and_empty_tree_output() {
        let mut d = driver();
        let out = script(&mut d, &["split", "resize 200 50", "print"]);
        assert_eq!(
            out,
            "* pane 1 200x25+0+0 scroll 0,0 lines 0..2 cursor 1:1\n  \
             pane 2 200x25+0+25 scroll 0,0 lines 0..2 cursor 1:1\n"
        );
    }
}
