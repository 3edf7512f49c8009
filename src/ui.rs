use anyhow::{Context, Result};
use arboard::Clipboard;
use console::{Style, Term};
use passgenius::input::{control_character_positions, normalize};
use passgenius::{DerivationError, DerivationInput, DerivedOutput, split_for_display};
use rpassword::read_password;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::i18n::Locale;

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
    pub split: bool,
    pub locale: Locale,
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("✓", "!")
    } else {
        ("+", "!")
    }
}

fn tree_branches(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support {
        ("├─", "└─")
    } else {
        ("|-", "`-")
    }
}

fn warn_control_characters(s: &str, input_name: &str) -> Result<()> {
    let positions = control_character_positions(s);
    if positions.is_empty() {
        return Ok(());
    }

    warn!(count = positions.len(), input = input_name, "control characters in input");

    let term = Term::stderr();
    term.write_line(&format!(
        "WARNING: {} contains {} control character(s) at position(s): {}",
        input_name,
        positions.len(),
        positions
            .iter()
            .map(|pos| pos.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ))?;

    Ok(())
}

/// Apply the optional normalization and check for control characters.
pub fn prepare_entry(
    raw: &str,
    input_name: &str,
    normalize_input: bool,
) -> Result<Zeroizing<String>> {
    let entry = if normalize_input {
        normalize(raw)
    } else {
        Zeroizing::new(raw.to_string())
    };
    warn_control_characters(&entry, input_name)?;
    Ok(entry)
}

fn write_prompt(index: usize, label: &str) -> Result<()> {
    let mut stderr = io::stderr();
    write!(stderr, "In [{}] {}: ", index, label)?;
    stderr.flush()?;
    Ok(())
}

pub fn prompt_master_secret(
    options: &DisplayOptions,
    normalize_input: bool,
) -> Result<Zeroizing<String>> {
    write_prompt(0, options.locale.messages().master_prompt)?;

    let password = Zeroizing::new(read_password().context("Failed to fetch master secret")?);
    prepare_entry(&password, "Master secret", normalize_input)
}

pub fn prompt_salt(options: &DisplayOptions, normalize_input: bool) -> Result<Zeroizing<String>> {
    write_prompt(1, options.locale.messages().salt_prompt)?;

    let mut input = Zeroizing::new(String::new());
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read salt")?;

    let entry = input.trim_end_matches(['\r', '\n']);
    prepare_entry(entry, "Salt", normalize_input)
}

pub fn display_output(output: &DerivedOutput, input: &DerivationInput, options: &DisplayOptions) {
    let shown = if options.split {
        split_for_display(output.as_str())
    } else {
        Zeroizing::new(output.as_str().to_string())
    };

    if options.quiet {
        println!("{}", &**shown);
        return;
    }

    println!("\nOut[0]:\n{}\n", &**shown);
    display_settings(output, input, options);
}

fn display_settings(output: &DerivedOutput, input: &DerivationInput, options: &DisplayOptions) {
    let m = options.locale.messages();
    let (branch, last) = tree_branches(options.unicode_support);

    let enabled = if options.color_support {
        Style::new().green()
    } else {
        Style::new()
    };
    let toggle = |on: bool| {
        if on {
            enabled.apply_to(format!("[{}]", m.on))
        } else {
            Style::new().apply_to(format!("[{}]", m.off))
        }
    };

    println!("{}:", m.settings);
    println!(
        "  {} {:<10} {}",
        branch,
        m.mode,
        options.locale.mode_label(input.mode)
    );
    println!("  {} {:<10} {}", branch, m.year_suffix, toggle(input.year_suffix));
    println!(
        "  {} {:<10} {}",
        branch,
        m.underscore_wrap,
        toggle(input.underscore_wrap)
    );
    println!(
        "  {} {:<10} {} {}",
        last,
        m.length,
        output.len(),
        length_unit(options.locale, output.len())
    );
    println!("\n{}", m.not_saved);
}

/// On X11 and Wayland the selection is served by this process, so the copy
/// blocks until `hold` elapses or another owner takes the clipboard.
pub const CLIPBOARD_SERVED_BY_PROCESS: bool = cfg!(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
));

fn length_unit(locale: Locale, len: usize) -> &'static str {
    let m = locale.messages();
    if len == 1 { m.char_unit } else { m.chars_unit }
}

pub fn copy_to_clipboard(value: &str, hold: Duration) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Clipboard unavailable")?;
    clipboard_set_text_secure(&mut clipboard, value, hold)
        .context("Failed to write to clipboard")?;
    debug!(len = value.len(), "copied derived value to clipboard");
    Ok(())
}

#[cfg(target_os = "macos")]
fn clipboard_set_text_secure(
    clipboard: &mut Clipboard,
    value: &str,
    _hold: Duration,
) -> Result<(), arboard::Error> {
    use arboard::SetExtApple;

    clipboard
        .set()
        .exclude_from_history()
        .text(value.to_owned())
}

#[cfg(windows)]
fn clipboard_set_text_secure(
    clipboard: &mut Clipboard,
    value: &str,
    _hold: Duration,
) -> Result<(), arboard::Error> {
    use arboard::SetExtWindows;

    clipboard
        .set()
        .exclude_from_monitoring()
        .text(value.to_owned())
}

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn clipboard_set_text_secure(
    clipboard: &mut Clipboard,
    value: &str,
    hold: Duration,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;
    use std::time::Instant;

    clipboard
        .set()
        .exclude_from_history()
        .wait_until(Instant::now() + hold)
        .text(value.to_owned())
}

#[cfg(not(any(
    target_os = "macos",
    windows,
    all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    )
)))]
fn clipboard_set_text_secure(
    clipboard: &mut Clipboard,
    value: &str,
    _hold: Duration,
) -> Result<(), arboard::Error> {
    clipboard.set_text(value.to_owned())
}

pub fn notify_clipboard_hold(hold: Duration, options: &DisplayOptions) {
    eprintln!("{}", options.locale.clipboard_hold_notice(hold.as_secs()));
}

pub fn notify_copied(options: &DisplayOptions) {
    let m = options.locale.messages();
    let (check_ok, _) = get_status_symbols(options.unicode_support);
    let style = if options.color_support {
        Style::new().green()
    } else {
        Style::new()
    };

    eprintln!(
        "{} {} {}",
        style.apply_to(format!("[{}]", check_ok)),
        style.apply_to(m.copied_title),
        m.copied_description
    );
}

pub fn notify_clipboard_failure(err: &anyhow::Error, options: &DisplayOptions) {
    let (_, check_warn) = get_status_symbols(options.unicode_support);
    let style = if options.color_support {
        Style::new().yellow()
    } else {
        Style::new()
    };

    eprintln!("{} {:#}", style.apply_to(format!("[{}]", check_warn)), err);
}

pub fn notify_error(err: &DerivationError, options: &DisplayOptions) {
    let (title, body) = options.locale.describe_error(err);
    let (_, check_warn) = get_status_symbols(options.unicode_support);
    let style = if options.color_support {
        Style::new().red()
    } else {
        Style::new()
    };

    eprintln!(
        "{} {}: {}",
        style.apply_to(format!("[{}]", check_warn)),
        style.apply_to(title),
        body
    );
}

pub fn notify_unexpected(err: &anyhow::Error, options: &DisplayOptions) {
    let m = options.locale.messages();
    let (_, check_warn) = get_status_symbols(options.unicode_support);
    let style = if options.color_support {
        Style::new().red()
    } else {
        Style::new()
    };

    eprintln!(
        "{} {}: {} ({:#})",
        style.apply_to(format!("[{}]", check_warn)),
        style.apply_to(m.error_title),
        m.unexpected_error,
        err
    );
}
