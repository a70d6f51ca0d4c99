//! `generate` subcommand: shell completions and man pages for `jp`.
use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write shell completions for `cmd` to `writer`.
pub fn write_completions<W: Write>(
    shell: Shell,
    cmd: &mut Command,
    writer: &mut W,
) {
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, name, writer);
}

/// Render man pages for `cmd` and, recursively, all of its subcommands into
/// `output_dir`, or the current directory when omitted.
///
/// Subcommand pages are named after their full path, e.g.
/// `jp-generate-man.1`. Returns the paths written, parents before children.
///
/// # Errors
///
/// Returns an error if the output directory cannot be created or a page
/// cannot be written.
pub fn generate_man_pages(
    cmd: &Command,
    output_dir: Option<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => {
            std::env::current_dir().context("Opening current directory")?
        }
    };
    std::fs::create_dir_all(&output_dir)
        .context("create output Man directories")?;

    let mut written = Vec::new();
    render_page(cmd.clone(), &output_dir, &mut written)?;
    render_subcommand_pages(cmd, &output_dir, cmd.get_name(), &mut written)?;
    Ok(written)
}

fn render_page(
    cmd: Command,
    output_dir: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let path = output_dir.join(format!("{}.1", cmd.get_name()));
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    clap_mangen::Man::new(cmd)
        .render(&mut file)
        .with_context(|| format!("failed to render {}", path.display()))?;
    info!("Generated: {}", path.display());
    written.push(path);
    Ok(())
}

fn render_subcommand_pages(
    cmd: &Command,
    output_dir: &Path,
    prefix: &str,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    for subcmd in cmd.get_subcommands() {
        let prefixed_name = format!("{prefix}-{}", subcmd.get_name());

        // clap_mangen takes NAME and SYNOPSIS from the command name. Leaking
        // is fine for a one-shot generation run.
        let leaked_name: &'static str =
            Box::leak(prefixed_name.clone().into_boxed_str());
        let renamed = subcmd
            .clone()
            .name(leaked_name)
            .disable_help_subcommand(true);
        render_page(renamed, output_dir, written)?;

        if subcmd.has_subcommands() {
            render_subcommand_pages(
                subcmd,
                output_dir,
                &prefixed_name,
                written,
            )?;
        }
    }
    Ok(())
}
