/*!
Main binary for jsonp.
*/

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use log::debug;
use memmap2::Mmap;
use std::io::{self, IsTerminal, Read, Write};
use std::fs::File;
use std::path::{Path, PathBuf};

use jsonp::{Decoder, JSONValue, commands, tokenizer, utils};

/// Decode, re-encode or tokenize a JSON document.
#[derive(Parser)]
#[command(
    name = "jp",
    version,
    about,
    long_about = None,
    disable_help_subcommand = true
)]
struct Args {
    /// Optional subcommands
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(value_name = "FILE")]
    /// Optional path to JSON file. If omitted, reads from STDIN
    input: Option<PathBuf>,
    /// Do not pretty-print the JSON output, instead use compact
    #[arg(long, action = ArgAction::SetTrue)]
    compact: bool,
    /// Print the token stream instead of the decoded document
    #[arg(long, action = ArgAction::SetTrue)]
    tokens: bool,
    /// Print tokens as JSON records
    #[arg(long, action = ArgAction::SetTrue, requires = "tokens")]
    json: bool,
    /// Display depth of the input document
    #[arg(long, action = ArgAction::SetTrue)]
    depth: bool,
    /// Disable colored output
    #[arg(long, action = ArgAction::SetTrue)]
    no_color: bool,
    /// Output format of the decoded document
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

/// Output formats for decoded documents
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "toml")]
    Toml,
    #[cfg(feature = "cbor")]
    Cbor,
    #[cfg(feature = "msgpack")]
    Msgpack,
}

/// Available subcommands for `jp`
#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    /// Generate additional documentation and/or completions
    Generate(GenerateCommand),
}

/// Generate shell completions and man page
#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate shell completions for the given shell to stdout.
    Shell { shell: clap_complete::Shell },
    /// Generate a man page for jp to output directory if specified, else
    /// the current directory.
    Man {
        /// The output directory to write the man pages.
        #[clap(short, long)]
        output_dir: Option<PathBuf>,
    },
}

/// Raw document input, either mapped from a regular file or read into memory.
enum Input {
    Mapped(Mmap),
    Owned(String),
}

impl Input {
    fn as_str(&self) -> Result<&str> {
        match self {
            Self::Mapped(mmap) => std::str::from_utf8(mmap)
                .context("Input file is not valid UTF-8"),
            Self::Owned(text) => Ok(text),
        }
    }
}

/// Read the whole input. Non-empty regular files are memory-mapped; pipes,
/// FIFOs and special files report no size and are read to the end instead.
fn read_input(path: Option<&Path>) -> Result<Option<Input>> {
    let Some(path) = path else {
        if io::stdin().is_terminal() {
            return Ok(None);
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read STDIN")?;
        return Ok(Some(Input::Owned(buffer)));
    };

    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file {}", path.display()))?;
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to stat file {}", path.display()))?;

    if !metadata.is_file() || metadata.len() == 0 {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer).with_context(|| {
            format!("Failed to read file {}", path.display())
        })?;
        debug!("Read {} bytes from {}", buffer.len(), path.display());
        return Ok(Some(Input::Owned(buffer)));
    }

    // SAFETY: the map is read-only. Concurrent truncation by another process
    // is outside our control.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {}", path.display()))?;
    debug!("Mapped {} bytes from {}", mmap.len(), path.display());
    Ok(Some(Input::Mapped(mmap)))
}

fn write_tokens(text: &str, as_json: bool, compact: bool) -> Result<()> {
    let tokens = tokenizer::tokenize(text).context("Failed to tokenize input")?;
    if as_json {
        let out = if compact {
            serde_json::to_string(&tokens)?
        } else {
            serde_json::to_string_pretty(&tokens)?
        };
        println!("{out}");
        Ok(())
    } else {
        utils::write_colored_tokens(&mut io::stdout().lock(), &tokens)
    }
}

fn write_value(value: &JSONValue, format: Format, compact: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match format {
        Format::Json => {
            return utils::write_colored_value(&mut stdout, value, !compact);
        }
        #[cfg(feature = "yaml")]
        Format::Yaml => {
            let out = serde_yaml::to_string(value)
                .context("Failed to convert to YAML")?;
            write!(stdout, "{out}")?;
        }
        #[cfg(feature = "toml")]
        Format::Toml => {
            let out = if compact {
                toml::to_string(value)
            } else {
                toml::to_string_pretty(value)
            }
            .context("Failed to convert to TOML")?;
            write!(stdout, "{out}")?;
        }
        #[cfg(feature = "cbor")]
        Format::Cbor => {
            ciborium::into_writer(value, &mut stdout)
                .context("Failed to convert to CBOR")?;
        }
        #[cfg(feature = "msgpack")]
        Format::Msgpack => {
            rmp_serde::encode::write(&mut stdout, value)
                .context("Failed to convert to MessagePack")?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Entry point for main binary.
///
/// Reads the document from FILE or piped STDIN, then prints its tokens or its
/// decoded value to STDOUT, with formatting determined by the command line
/// arguments.
fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .parse_default_env()
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    match args.command {
        Some(Commands::Generate(cmd)) => match cmd {
            GenerateCommand::Shell { shell } => {
                commands::generate::write_completions(
                    shell,
                    &mut Args::command(),
                    &mut io::stdout().lock(),
                );
            }
            GenerateCommand::Man { output_dir } => {
                let pages = commands::generate::generate_man_pages(
                    &Args::command(),
                    output_dir,
                )?;
                for path in pages {
                    println!("Generated: {}", path.display());
                }
            }
        },
        None => {
            let Some(input) = read_input(args.input.as_deref())? else {
                // No piped input and no file specified
                Args::command().print_help()?;
                return Ok(());
            };
            let text = input.as_str()?;

            if args.tokens {
                return write_tokens(text, args.json, args.compact);
            }

            let value = Decoder::new()
                .decode(text)
                .context("Failed to parse JSON")?;

            if args.depth {
                println!("Depth: {}", value.depth());
            }

            write_value(&value, args.format, args.compact)?;
        }
    }

    Ok(())
}
