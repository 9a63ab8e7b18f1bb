//! Commands reachable through `tinytools exec`.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use tinytools_core::cmdparser::{CmdParser, CommandInfo, ParsedCommandLine};
use tinytools_core::colors::Color;
use tinytools_core::coordinate::Coordinate;
use tinytools_core::forward::forward_call;
use tinytools_core::math::{Digits, pow10};
use tinytools_core::platform;
use tinytools_core::screen::AnnotatedScreen;

/// Where command output goes.
pub type Output = Rc<RefCell<dyn Write>>;

const SCREEN_WIDTH: usize = 40;
const SCREEN_HEIGHT: usize = 8;
const TEXT_ROW: usize = 3;
const TEXT_COLUMN: usize = 2;

type Canvas = AnnotatedScreen<SCREEN_WIDTH, SCREEN_HEIGHT, Color>;

/// Register every built-in command, writing their output to `out`.
pub fn register(parser: &mut CmdParser, out: &Output) {
    let sink = Rc::clone(out);
    parser.add_fn(
        "help",
        move |line| emit(&sink, &help(line)),
        Some(CommandInfo::new("help", "list the available commands")),
    );

    let sink = Rc::clone(out);
    parser.add_fn(
        "screen",
        move |line| emit(&sink, &screen(line)?),
        Some(CommandInfo::new(
            "screen [--border] [text=[...]] [color=[name]]",
            "draw text on a 40x8 character screen",
        )),
    );

    let sink = Rc::clone(out);
    parser.add_fn(
        "paint",
        move |line| emit(&sink, &paint(line)?),
        Some(CommandInfo::new(
            "paint color=<name> <text>...",
            "print text in green, yellow, red or blue",
        )),
    );

    let sink = Rc::clone(out);
    parser.add_fn(
        "coord",
        move |line| emit(&sink, &coord(line)?),
        Some(CommandInfo::new(
            "coord [--3d] <(a,b)> <(c,d)>",
            "add, subtract and measure two points",
        )),
    );

    let sink = Rc::clone(out);
    parser.add_fn(
        "digits",
        move |line| emit(&sink, &digits(line)?),
        Some(CommandInfo::new(
            "digits [--pow10=<n>] <integer>...",
            "count decimal digits",
        )),
    );

    let sink = Rc::clone(out);
    parser.add_fn(
        "where",
        move |line| emit(&sink, &locate(line)?),
        Some(CommandInfo::new(
            "where [--exe]",
            "print the directory of the running executable",
        )),
    );
}

fn emit(out: &Output, text: &str) -> Result<()> {
    let mut out = out.borrow_mut();
    writeln!(out, "{text}").context("writing command output")?;
    out.flush().context("flushing command output")
}

fn help(line: &ParsedCommandLine) -> String {
    let mut lines = vec!["commands:".to_string()];
    lines.extend(line.commands().iter().map(|(name, command)| match command.info() {
        Some(info) => format!("  {:<46} {}", info.usage, info.summary),
        None => format!("  {name}"),
    }));
    lines.join("\n")
}

fn color_arg(line: &ParsedCommandLine, default: Color) -> Result<Color> {
    match line.args().pair("color") {
        Some(name) => Ok(name.parse()?),
        None => Ok(default),
    }
}

fn screen(line: &ParsedCommandLine) -> Result<String> {
    let args = line.args();
    let mut canvas = Canvas::new();

    if args.has_option("border") {
        let last_x = SCREEN_WIDTH - 1;
        let last_y = SCREEN_HEIGHT - 1;
        canvas
            .set_row_with_data(0, '-', Color::Blue, ..)
            .set_row_with_data(last_y, '-', Color::Blue, ..)
            .set_column_with_data(0, '|', Color::Blue, 1..last_y)
            .set_column_with_data(last_x, '|', Color::Blue, 1..last_y);
        for (x, y) in [(0, 0), (last_x, 0), (0, last_y), (last_x, last_y)] {
            canvas.set(x, y, '+');
        }
    }

    if let Some(text) = args.pair("text") {
        let color = color_arg(line, Color::Green)?;
        let room = SCREEN_WIDTH - 2 * TEXT_COLUMN;
        let text: String = text.chars().take(room).collect();
        let len = text.chars().count();
        canvas.put_str(TEXT_COLUMN, TEXT_ROW, &text);
        if len > 0 {
            canvas.set_row_data(TEXT_ROW, color, TEXT_COLUMN..TEXT_COLUMN + len);
        }
    }

    Ok(render(&canvas))
}

fn render<const W: usize, const H: usize>(canvas: &AnnotatedScreen<W, H, Color>) -> String {
    let mut text = String::with_capacity((W + 1) * H);
    for (y, row) in canvas.screen().rows().enumerate() {
        if y > 0 {
            text.push('\n');
        }
        for (x, &ch) in row.iter().enumerate() {
            match canvas.data_at(x, y) {
                Ok(color) => text.push_str(&color.paint(&ch.to_string())),
                Err(_) => text.push(ch),
            }
        }
    }
    text
}

fn paint(line: &ParsedCommandLine) -> Result<String> {
    let args = line.args();
    let name = args
        .pair("color")
        .context("paint needs color=<green|yellow|red|blue>")?;
    let color: Color = name.parse()?;
    Ok(color.paint(&args.values().join(" ")))
}

fn coord(line: &ParsedCommandLine) -> Result<String> {
    let args = line.args();
    if args.has_option("3d") {
        coord_report::<3>(args.values())
    } else {
        coord_report::<2>(args.values())
    }
}

fn coord_report<const N: usize>(values: &[String]) -> Result<String> {
    let [a, b] = values else {
        bail!("coord takes exactly two points, got {}", values.len());
    };
    let a: Coordinate<f64, N> = a.parse()?;
    let b: Coordinate<f64, N> = b.parse()?;
    Ok(format!(
        "{a} + {b} = {}\n{a} - {b} = {}\ndistance = {}",
        a + b,
        a - b,
        (b - a).distance()
    ))
}

fn digits(line: &ParsedCommandLine) -> Result<String> {
    let args = line.args();
    let mut lines = Vec::new();

    if let Some(exponent) = args.option_value("pow10") {
        let exponent: u32 = exponent
            .parse()
            .with_context(|| format!("invalid exponent {exponent:?}"))?;
        if exponent >= u64::MAX_DIGITS {
            bail!("10^{exponent} does not fit in 64 bits");
        }
        lines.push(format!("10^{exponent} = {}", pow10(exponent)));
    }

    for value in args.values() {
        let number: i128 = value
            .parse()
            .with_context(|| format!("not an integer: {value:?}"))?;
        lines.push(format!("{number}: {}", number.digits()));
    }

    if lines.is_empty() {
        bail!("digits needs at least one integer or --pow10=<n>");
    }
    Ok(lines.join("\n"))
}

fn locate(line: &ParsedCommandLine) -> Result<String> {
    let want_exe = line.args().has_option("exe");
    let lookup = if want_exe {
        platform::executable_path
    } else {
        platform::executable_dir
    };

    let found = forward_call(
        |_| {},
        |site, result: &tinytools_core::Result<_>| match result {
            Err(err) => Err(anyhow!("executable lookup at {site} failed: {err}")),
            Ok(_) => Ok(()),
        },
        |result| result.is_err(),
        lookup,
    )?;
    Ok(found?.display().to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use tinytools_core::cmdparser::TokenSyntax;
    use tinytools_core::colors;
    use tinytools_core::error::CoreError;

    use super::*;

    fn run(tokens: &[&str]) -> (tinytools_core::Result<()>, String) {
        run_with(TokenSyntax::default(), tokens)
    }

    fn run_with(syntax: TokenSyntax, tokens: &[&str]) -> (tinytools_core::Result<()>, String) {
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        let out: Output = buffer.clone();
        let mut parser = CmdParser::new(tokens.iter().copied()).with_syntax(syntax);
        register(&mut parser, &out);
        let result = parser.parse().and_then(|line| line.exec());
        let text = String::from_utf8(buffer.borrow().clone()).expect("utf8 output");
        (result, text)
    }

    fn run_plain(tokens: &[&str]) -> String {
        let previous = colors::set_enabled(false);
        let (result, text) = run(tokens);
        colors::set_enabled(previous);
        result.expect("command succeeds");
        text
    }

    #[test]
    #[serial]
    fn help_lists_every_builtin() {
        let text = run_plain(&["help"]);
        for name in ["coord", "digits", "help", "paint", "screen", "where"] {
            assert!(text.contains(&format!("\n  {name}")), "missing {name}: {text}");
        }
    }

    #[test]
    #[serial]
    fn screen_draws_border_and_text() {
        let text = run_plain(&["screen", "--border", "text=[hi", "there]"]);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), SCREEN_HEIGHT);
        assert_eq!(rows[0], format!("+{}+", "-".repeat(SCREEN_WIDTH - 2)));
        assert_eq!(
            rows[TEXT_ROW],
            format!("| hi there{}|", " ".repeat(SCREEN_WIDTH - 11))
        );
        assert_eq!(rows[SCREEN_HEIGHT - 1], rows[0]);
    }

    #[test]
    #[serial]
    fn screen_colors_text_cells() {
        let previous = colors::set_enabled(true);
        let (result, text) = run(&["screen", "text=ab", "color=red"]);
        colors::set_enabled(previous);
        result.expect("screen");

        let row = text.lines().nth(TEXT_ROW).expect("text row");
        let expected = format!(
            "  {}{}{}",
            Color::Red.paint("a"),
            Color::Red.paint("b"),
            " ".repeat(SCREEN_WIDTH - 4)
        );
        assert_eq!(row, expected);
    }

    #[test]
    #[serial]
    fn paint_wraps_values() {
        let previous = colors::set_enabled(true);
        let (result, text) = run(&["paint", "color=yellow", "careful", "now"]);
        colors::set_enabled(previous);
        result.expect("paint");
        assert_eq!(
            text,
            format!("{}careful now{}\n", colors::BEGIN_YELLOW, colors::COLOR_RESET)
        );
    }

    #[test]
    fn paint_rejects_unknown_colors() {
        let (result, _) = run(&["paint", "color=mauve", "x"]);
        let err = result.expect_err("unknown color");
        assert!(matches!(err, CoreError::CommandFailed { ref name, .. } if name == "paint"));
        assert!(err.to_string().contains("mauve"));
    }

    #[test]
    #[serial]
    fn coord_reports_sum_difference_and_distance() {
        let text = run_plain(&["coord", "(1,2)", "(4,6)"]);
        assert_eq!(
            text,
            "(1,2) + (4,6) = (5,8)\n(1,2) - (4,6) = (-3,-4)\ndistance = 5\n"
        );
    }

    #[test]
    #[serial]
    fn coord_handles_three_dimensions_and_delimited_points() {
        let text = run_plain(&["coord", "--3d", "[(0,", "0, 0)]", "(2,3,6)"]);
        assert!(text.ends_with("distance = 7\n"), "{text}");
    }

    #[test]
    fn coord_rejects_wrong_dimension() {
        let (result, _) = run(&["coord", "(1,2,3)", "(4,6)"]);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn digits_counts_and_powers() {
        let text = run_plain(&["digits", "--pow10=3", "12345", "-7", "0"]);
        assert_eq!(text, "10^3 = 1000\n12345: 5\n-7: 1\n0: 0\n");
    }

    #[test]
    fn digits_refuses_overflowing_powers() {
        let (result, _) = run(&["digits", "--pow10=20"]);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn where_prints_the_executable_directory() {
        let text = run_plain(&["where"]);
        let expected = platform::executable_dir().expect("exe dir");
        assert_eq!(text.trim_end(), expected.display().to_string());
    }

    #[test]
    #[serial]
    fn lenient_exec_keeps_malformed_tokens_as_text() {
        let tokens = ["paint", "color=green", "=x", "[open", "hi"];
        let previous = colors::set_enabled(false);
        let (result, text) = run_with(TokenSyntax::default().with_strict(false), &tokens);
        colors::set_enabled(previous);
        result.expect("lenient paint");
        assert_eq!(text, "=x [open hi\n");
    }

    #[test]
    fn strict_exec_rejects_malformed_tokens() {
        let (result, text) = run(&["paint", "color=green", "=x", "hi"]);
        assert!(matches!(result, Err(CoreError::Parse(_))));
        assert!(text.is_empty());
    }

    #[test]
    fn unknown_commands_are_reported() {
        let (result, text) = run(&["juggle"]);
        assert!(matches!(result, Err(CoreError::CommandNotFound(ref name)) if name == "juggle"));
        assert!(text.is_empty());
    }
}
