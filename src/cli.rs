// ============================================================================
// ZPaint CLI: window options and headless gesture-script replay
// ============================================================================
//
// Usage examples:
//   zpaint                                         (open the editor)
//   zpaint --width 640 --height 480 --zoom 200     (editor with a fixed canvas)
//   zpaint -i smiley.zps -o smiley.png
//   zpaint -i "scripts/*.zps" --output-dir out/ --format jpg
//
// A gesture script replays pointer, key and style events against a fresh
// toolbox exactly as the editor would receive them, then exports the
// persisted surface. One command per line, `#` starts a comment:
//
//   size 200 100
//   tool square
//   fill red
//   down 10 10
//   move 60 40
//   up 60 40

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::components::tools::{Key, ToolKind};
use crate::export::{save_image, SaveFormat};
use crate::geometry::Position;
use crate::toolbox::{check_canvas_size, Toolbox};

pub const DEFAULT_SCRIPT_SIZE: (u32, u32) = (800, 600);

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// ZPaint raster editor.
#[derive(Parser, Debug, Default)]
#[command(
    name = "zpaint",
    about = "ZPaint raster editor",
    long_about = "Opens the editor when run without --input. With --input, replays\n\
                  gesture scripts headlessly and saves the resulting canvas.\n\n\
                  Example:\n  \
                  zpaint -i drawing.zps -o drawing.png\n  \
                  zpaint -i \"*.zps\" --output-dir out/ --format png"
)]
pub struct CliArgs {
    /// Gesture script(s) to replay. Glob patterns accepted (e.g. "*.zps").
    #[arg(short, long, num_args = 1.., value_name = "SCRIPT")]
    pub input: Vec<String>,

    /// Output file path. Only valid for a single script.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for several scripts; files keep the script's stem.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp, tga. Inferred from --output when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Canvas width (editor, or scripts without a `size` line).
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height (editor, or scripts without a `size` line).
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial zoom in percent.
    #[arg(long)]
    pub zoom: Option<f32>,

    /// Print per-script timing.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// True when scripts were given and no window should open.
    pub fn is_cli_mode(&self) -> bool {
        !self.input.is_empty()
    }
}

// ============================================================================
// Gesture scripts
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Size(u32, u32),
    Tool(ToolKind),
    Stroke(String),
    Fill(String),
    Weight(f32),
    Pixel(u32),
    Font(String),
    FontSize(u32),
    Zoom(f32),
    Down(Position),
    Move(Position),
    Up(Position),
    Leave,
    Key(Key),
    Type(String),
    Clear,
}

fn parse_num<T: std::str::FromStr>(word: Option<&str>, what: &str) -> Result<T, String> {
    let word = word.ok_or_else(|| format!("missing {}", what))?;
    word.parse::<T>()
        .map_err(|_| format!("invalid {} '{}'", what, word))
}

fn parse_point(args: &[&str]) -> Result<Position, String> {
    if args.len() != 2 {
        return Err("expected X Y".to_string());
    }
    let x: i32 = parse_num(args.first().copied(), "x")?;
    let y: i32 = parse_num(args.get(1).copied(), "y")?;
    Ok(Position::new(x, y))
}

fn rest_of(line: &str, verb: &str) -> String {
    line[verb.len()..].trim().to_string()
}

/// Drop a comment: a line starting with `#`, or a `#` standing alone as a
/// word. Hex colors such as `#ff0000` are kept.
fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return "";
    }
    let bytes = trimmed.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let before_ws = i > 0 && bytes[i - 1].is_ascii_whitespace();
        let after_ws = bytes.get(i + 1).is_none_or(|c| c.is_ascii_whitespace());
        if b == b'#' && before_ws && after_ws {
            return trimmed[..i].trim_end();
        }
    }
    trimmed
}

/// Parse one script line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = strip_comment(line);
    if line.is_empty() {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let verb = words[0];
    let args = &words[1..];
    let cmd = match verb.to_ascii_lowercase().as_str() {
        "size" => {
            let w: u32 = parse_num(args.first().copied(), "width")?;
            let h: u32 = parse_num(args.get(1).copied(), "height")?;
            check_canvas_size(w, h)?;
            Command::Size(w, h)
        }
        "tool" => {
            let name = args.first().ok_or("missing tool name")?;
            Command::Tool(ToolKind::parse(name).ok_or_else(|| format!("unknown tool '{}'", name))?)
        }
        "stroke" => Command::Stroke(rest_of(line, verb)),
        "fill" => Command::Fill(rest_of(line, verb)),
        "weight" => Command::Weight(parse_num(args.first().copied(), "weight")?),
        "pixel" => Command::Pixel(parse_num(args.first().copied(), "pixel weight")?),
        "font" => Command::Font(rest_of(line, verb)),
        "fontsize" => Command::FontSize(parse_num(args.first().copied(), "font size")?),
        "zoom" => Command::Zoom(parse_num(args.first().copied(), "zoom")?),
        "down" => Command::Down(parse_point(args)?),
        "move" => Command::Move(parse_point(args)?),
        "up" => Command::Up(parse_point(args)?),
        "leave" => Command::Leave,
        "key" => Command::Key(Key::parse(args.first().ok_or("missing key name")?)),
        "type" => Command::Type(rest_of(line, verb).replace("\\n", "\n")),
        "clear" => Command::Clear,
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(Some(cmd))
}

/// Parse a whole script into `(line number, command)` pairs.
pub fn parse_script(src: &str) -> Result<Vec<(usize, Command)>, String> {
    let mut out = Vec::new();
    for (idx, line) in src.lines().enumerate() {
        let line_no = idx + 1;
        if let Some(cmd) = parse_line(line).map_err(|e| format!("line {}: {}", line_no, e))? {
            out.push((line_no, cmd));
        }
    }
    Ok(out)
}

/// Apply one command to the toolbox.
fn apply(toolbox: &mut Toolbox, cmd: &Command) -> Result<(), String> {
    let accepted = match cmd {
        Command::Size(..) => return Err("size must be the first command".to_string()),
        Command::Tool(kind) => toolbox.select_kind(*kind),
        Command::Stroke(c) => toolbox.set_stroke_color(c),
        Command::Fill(c) => toolbox.set_fill_color(c),
        Command::Weight(w) => toolbox.set_stroke_weight(*w),
        Command::Pixel(w) => toolbox.set_pixel_weight(*w),
        Command::Font(name) => toolbox.set_font_name(name),
        Command::FontSize(size) => toolbox.set_font_size(*size),
        Command::Zoom(z) => toolbox.set_zoom(*z),
        Command::Down(p) => {
            toolbox.pointer_down_at(*p);
            true
        }
        Command::Move(p) => {
            toolbox.pointer_move_at(*p);
            true
        }
        Command::Up(p) => {
            toolbox.pointer_up_at(*p);
            true
        }
        Command::Leave => {
            toolbox.pointer_left();
            true
        }
        Command::Key(key) => {
            toolbox.key_down(key);
            true
        }
        Command::Type(text) => {
            if !toolbox.overlay().is_open() {
                return Err("no open text box to type into".to_string());
            }
            toolbox.overlay_mut().set_text(text);
            true
        }
        Command::Clear => {
            toolbox.clear_all();
            true
        }
    };
    if accepted {
        Ok(())
    } else {
        Err(format!("rejected value in {:?}", cmd))
    }
}

/// Replay a parsed script on a fresh toolbox. A leading `size` command
/// overrides `default_size`.
pub fn replay(commands: &[(usize, Command)], default_size: (u32, u32)) -> Result<Toolbox, String> {
    let (size, rest) = match commands.first() {
        Some((_, Command::Size(w, h))) => ((*w, *h), &commands[1..]),
        _ => (default_size, commands),
    };
    let mut toolbox = Toolbox::try_new(size.0, size.1)?;
    for (line_no, cmd) in rest {
        apply(&mut toolbox, cmd).map_err(|e| format!("line {}: {}", line_no, e))?;
    }
    Ok(toolbox)
}

/// Parse and replay script text.
pub fn run_script(src: &str, default_size: (u32, u32)) -> Result<Toolbox, String> {
    let commands = parse_script(src)?;
    replay(&commands, default_size)
}

// ============================================================================
// Public entry point
// ============================================================================

/// Replay every script and return an OS exit code.
/// `0` = all scripts succeeded, `1` = one or more failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} scripts given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let format = match parse_format(args.format.as_deref(), args.output.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let default_size = (
        args.width.unwrap_or(DEFAULT_SCRIPT_SIZE.0),
        args.height.unwrap_or(DEFAULT_SCRIPT_SIZE.1),
    );
    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let started = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            format,
        ) else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            any_failure = true;
            continue;
        };

        match run_one(input_path, &output_path, format, default_size) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  -> {} ({:.0}ms)",
                        output_path.display(),
                        started.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                crate::log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn run_one(input: &Path, output: &Path, format: SaveFormat, default_size: (u32, u32)) -> Result<(), String> {
    let src = std::fs::read_to_string(input)
        .map_err(|e| format!("could not read '{}': {}", input.display(), e))?;
    let toolbox = run_script(&src, default_size)?;
    save_image(toolbox.persisted_image(), output, format)
}

// ============================================================================
// Helpers
// ============================================================================

/// Extension of gesture scripts picked up from a directory input.
pub const SCRIPT_EXTENSION: &str = "zps";

/// Scripts to replay, in argument order and without duplicates. An existing
/// file is taken as is, a directory contributes its `*.zps` files, anything
/// else is expanded as a glob. Only regular files survive.
fn resolve_inputs(args: &[String]) -> Vec<PathBuf> {
    fn add(path: PathBuf, scripts: &mut Vec<PathBuf>) {
        if !scripts.contains(&path) {
            scripts.push(path);
        }
    }

    let mut scripts: Vec<PathBuf> = Vec::new();

    for arg in args {
        let path = Path::new(arg);
        if path.is_file() {
            add(path.to_path_buf(), &mut scripts);
            continue;
        }
        let pattern = if path.is_dir() {
            path.join(format!("*.{}", SCRIPT_EXTENSION)).to_string_lossy().into_owned()
        } else {
            arg.clone()
        };
        let found: Vec<PathBuf> = match glob::glob(&pattern) {
            Ok(paths) => paths.flatten().filter(|p| p.is_file()).collect(),
            Err(e) => {
                eprintln!("warning: invalid input pattern '{}': {}", arg, e);
                continue;
            }
        };
        if found.is_empty() {
            eprintln!("warning: no gesture scripts found for '{}'.", arg);
        }
        for script in found {
            add(script, &mut scripts);
        }
    }
    scripts
}

/// `--format` wins; otherwise the output extension; otherwise PNG.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<SaveFormat, String> {
    if let Some(f) = format_arg {
        return SaveFormat::parse(f).ok_or_else(|| format!("unsupported format '{}'", f));
    }
    Ok(output.and_then(SaveFormat::from_path).unwrap_or_default())
}

/// Output path for one script: `--output`, else `--output-dir/<stem>.<ext>`,
/// else next to the script.
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    Some(parent.join(format!("{}.{}", stem, ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_skips_comments() {
        let cmds = parse_script("# header\n\nsize 10 20\ntool Line  # pick line\nfill rgb(1, 2, 3)\ndown 1 2\n").unwrap();
        assert_eq!(
            cmds,
            vec![
                (3, Command::Size(10, 20)),
                (4, Command::Tool(ToolKind::Line)),
                (5, Command::Fill("rgb(1, 2, 3)".into())),
                (6, Command::Down(Position::new(1, 2))),
            ]
        );
    }

    #[test]
    fn hex_colors_are_not_comments() {
        assert_eq!(
            parse_line("stroke #ff0000 # red").unwrap(),
            Some(Command::Stroke("#ff0000".into()))
        );
        assert_eq!(parse_line("   # just a note").unwrap(), None);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse_script("tool pencil\nwiggle 1 2\n").unwrap_err();
        assert!(err.starts_with("line 2:"), "{err}");
        let err = parse_script("down 1\n").unwrap_err();
        assert!(err.contains("expected X Y"), "{err}");
        let err = parse_script("tool brush\n").unwrap_err();
        assert!(err.contains("unknown tool"), "{err}");
    }

    #[test]
    fn size_only_first() {
        let tb = run_script("size 30 20\n", (5, 5)).unwrap();
        assert_eq!(tb.persisted_image().dimensions(), (30, 20));
        let err = run_script("tool pencil\nsize 30 20\n", (5, 5)).unwrap_err();
        assert!(err.starts_with("line 2:"), "{err}");
    }

    #[test]
    fn oversized_canvas_is_an_error() {
        let err = run_script("size 4294967295 4294967295\n", (5, 5)).unwrap_err();
        assert!(err.starts_with("line 1:"), "{err}");
        assert!(err.contains("limit"), "{err}");
        assert!(run_script("size 0 10\n", (5, 5)).is_err());
        let err = run_script("tool pencil\n", (100_000, 10)).unwrap_err();
        assert!(err.contains("limit"), "{err}");
    }

    #[test]
    fn rejected_style_fails_the_script() {
        let err = run_script("stroke notacolor\n", (5, 5)).unwrap_err();
        assert!(err.starts_with("line 1:"), "{err}");
    }

    #[test]
    fn type_needs_open_text_box() {
        assert!(run_script("type hello\n", (5, 5)).is_err());
        let tb = run_script("tool text\ndown 2 2\ntype hi\n", (20, 20)).unwrap();
        assert_eq!(tb.overlay().text(), "hi");
    }

    #[test]
    fn pencil_script_draws() {
        let tb = run_script("size 20 20\ntool pencil\npixel 3\ndown 10 10\nup 10 10\n", (5, 5)).unwrap();
        assert_eq!(tb.persisted_image().get_pixel(10, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn inputs_expand_directories_and_globs() {
        let dir = std::env::temp_dir().join(format!("zpaint_inputs_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["a.zps", "b.zps", "notes.txt"] {
            std::fs::write(dir.join(name), "tool pencil\n").unwrap();
        }
        let a = dir.join("a.zps");

        let from_dir = resolve_inputs(&[dir.to_string_lossy().into_owned()]);
        let glob_all = dir.join("*").to_string_lossy().into_owned();
        let mixed = resolve_inputs(&[a.to_string_lossy().into_owned(), glob_all]);
        let missing = resolve_inputs(&[dir.join("nothing_*.zps").to_string_lossy().into_owned()]);
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(from_dir.len(), 2);
        assert!(from_dir.iter().all(|p| p.extension().is_some_and(|e| e == SCRIPT_EXTENSION)));
        assert_eq!(mixed.len(), 3);
        assert_eq!(mixed[0], a);
        assert!(missing.is_empty());
    }

    #[test]
    fn format_selection() {
        assert_eq!(parse_format(None, None), Ok(SaveFormat::Png));
        assert_eq!(parse_format(None, Some(Path::new("a.jpg"))), Ok(SaveFormat::Jpeg));
        assert_eq!(parse_format(Some("bmp"), Some(Path::new("a.jpg"))), Ok(SaveFormat::Bmp));
        assert!(parse_format(Some("webp"), None).is_err());
    }

    #[test]
    fn output_path_priority() {
        let input = Path::new("/tmp/scripts/smile.zps");
        assert_eq!(
            build_output_path(input, None, Some(Path::new("/out")), SaveFormat::Png),
            Some(PathBuf::from("/out/smile.png"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Tga),
            Some(PathBuf::from("/tmp/scripts/smile.tga"))
        );
    }
}
