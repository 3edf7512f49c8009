mod i18n;
mod ui;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use passgenius::{CapitalizationRule, DerivationError, DerivationInput, GenerationMode};
use tracing::Level;

use crate::i18n::Locale;

#[derive(Parser)]
#[command(
    name = "passgenius",
    version,
    about = "Deterministic site passwords from a master secret and a salt"
)]
struct Cli {
    #[arg(short, long, value_enum, default_value = "general")]
    mode: Mode,

    /// Append the current year to the salt before hashing
    #[arg(short, long)]
    year: bool,

    /// Wrap the result as _value_
    #[arg(short, long)]
    underscore: bool,

    /// Copy the result to the clipboard
    #[arg(short, long)]
    copy: bool,

    /// Seconds to keep serving the clipboard where this process owns it (X11/Wayland)
    #[arg(
        long,
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..=600)
    )]
    clipboard_hold: u64,

    /// Show the result split in two halves
    #[arg(short, long)]
    split: bool,

    /// Trim and NFC-normalize inputs (changes results for such inputs)
    #[arg(short, long)]
    normalize: bool,

    /// Uppercase character 0 in general mode, as earlier releases did
    #[arg(long)]
    legacy_capitalization: bool,

    /// Salt; prompted for when absent
    #[arg(long, env = "PASSGENIUS_SALT", hide_env_values = true)]
    salt: Option<String>,

    #[arg(long, value_enum, env = "PASSGENIUS_LANG", default_value = "en")]
    lang: Locale,

    #[arg(short, long)]
    quiet: bool,

    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    General,
    #[value(name = "6-digit")]
    SixDigit,
    #[value(name = "8-digit")]
    EightDigit,
}

impl From<Mode> for GenerationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::General => GenerationMode::General,
            Mode::SixDigit => GenerationMode::SixDigit,
            Mode::EightDigit => GenerationMode::EightDigit,
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => return,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, options: &ui::DisplayOptions) -> Result<()> {
    let master_secret = ui::prompt_master_secret(options, cli.normalize)?;
    let salt = match cli.salt.as_deref() {
        Some(salt) => ui::prepare_entry(salt, "Salt", cli.normalize)?,
        None => ui::prompt_salt(options, cli.normalize)?,
    };

    let capitalization = if cli.legacy_capitalization {
        CapitalizationRule::FirstCharacter
    } else {
        CapitalizationRule::FirstAlphabetic
    };

    let input = DerivationInput {
        master_secret,
        salt,
        mode: cli.mode.into(),
        year_suffix: cli.year,
        underscore_wrap: cli.underscore,
        capitalization,
    };

    let output = passgenius::derive(&input)?;

    ui::display_output(&output, &input, options);

    if cli.copy {
        let hold = Duration::from_secs(cli.clipboard_hold);
        if ui::CLIPBOARD_SERVED_BY_PROCESS {
            ui::notify_clipboard_hold(hold, options);
        }
        match ui::copy_to_clipboard(output.as_str(), hold) {
            Ok(()) => ui::notify_copied(options),
            Err(err) => ui::notify_clipboard_failure(&err, options),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ui::DisplayOptions {
        unicode_support: ui::detect_unicode_support(),
        color_support: ui::detect_color_support(),
        quiet: cli.quiet,
        split: cli.split,
        locale: cli.lang,
    };

    match run(cli, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<DerivationError>() {
                Some(derivation) => ui::notify_error(derivation, &options),
                None => ui::notify_unexpected(&err, &options),
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 1 for derivation errors the user can fix by changing inputs, 2 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<DerivationError>() {
        Some(derivation) if derivation.is_user_recoverable() => 1,
        _ => 2,
    }
}
