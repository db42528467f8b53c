mod opt;

use crate::opt::Opt;

use std::{
    env::var_os,
    fs::{create_dir_all, File},
    io::{stdout, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, shells::*, Generator};
use strum::Display;

#[derive(
    Copy, Clone, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash, ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
enum Shell {
    Bash,
    Elvish,
    Fish,
    #[allow(clippy::enum_variant_names)]
    PowerShell,
    Zsh,
}

#[derive(Debug, Parser)]
struct ShellSelect {
    /// Shell for which to generate completions
    #[clap(value_enum)]
    shell: Shell,

    /// Write completions to standard output instead of the user
    /// completion directory
    #[clap(long)]
    stdout: bool,
}

fn gen_completion<S: Copy + Generator, W: Write>(shell: S, mut to: W) {
    generate(shell, &mut Opt::command(), "evan", &mut to);
}

fn main() -> Result<()> {
    let ShellSelect { shell, stdout: to_stdout } = ShellSelect::parse();
    eprintln!("Generating {shell} completions");
    match shell {
        Shell::Bash if !to_stdout => gen_completion(Bash, gen_bash_outfile()?),
        Shell::Fish if !to_stdout => gen_completion(Fish, gen_fish_outfile()?),
        Shell::Bash => gen_completion(Bash, &mut stdout()),
        Shell::Fish => gen_completion(Fish, &mut stdout()),
        Shell::Elvish => gen_completion(Elvish, &mut stdout()),
        Shell::PowerShell => gen_completion(PowerShell, &mut stdout()),
        Shell::Zsh => gen_completion(Zsh, &mut stdout()),
    }
    Ok(())
}

fn data_home() -> Result<PathBuf> {
    if let Some(dir) = var_os("XDG_DATA_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = var_os("HOME").ok_or_else(|| anyhow!("No home directory found"))?;
    let mut dir = PathBuf::from(home);
    dir.push(".local");
    dir.push("share");
    Ok(dir)
}

fn gen_bash_outfile() -> Result<File> {
    let mut outfile = match var_os("BASH_COMPLETION_USER_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => data_home()?.join("bash-completion"),
    };
    outfile.push("completions");
    outfile.push("evan.bash");
    create_file(outfile)
}

fn gen_fish_outfile() -> Result<File> {
    let mut outfile = data_home()?;
    for part in ["fish", "vendor_completions.d", "evan.fish"] {
        outfile.push(part);
    }
    create_file(outfile)
}

fn create_file<P: AsRef<Path>>(name: P) -> Result<File> {
    let name = name.as_ref();
    if let Some(dir) = name.parent() {
        create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {dir:?}"))?;
    }
    eprintln!("Writing to {name:?}");
    File::create(name).with_context(|| format!("Failed to create {name:?}"))
}
