use clap::{ArgAction, Parser};
use edir_core::prelude::*;
use std::path::PathBuf;

/// Rename, move or delete files and directories using your editor.
#[derive(Parser, Debug)]
#[command(name = "edir", version, about, args_override_self = true)]
pub struct Cli {
    /// Include hidden files (names starting with ".").
    #[arg(short = 'a', long = "all", action = ArgAction::SetTrue, overrides_with = "no_all")]
    pub all: bool,

    /// Exclude hidden files (the default).
    #[arg(short = 'A', long = "no-all", action = ArgAction::SetTrue)]
    pub no_all: bool,

    /// Delete directories recursively, including their contents.
    #[arg(short = 'r', long = "recurse", action = ArgAction::SetTrue, overrides_with = "no_recurse")]
    pub recurse: bool,

    #[arg(short = 'R', long = "no-recurse", action = ArgAction::SetTrue)]
    pub no_recurse: bool,

    /// Do not print successful renames and deletes.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue, overrides_with = "no_quiet")]
    pub quiet: bool,

    #[arg(short = 'Q', long = "no-quiet", action = ArgAction::SetTrue)]
    pub no_quiet: bool,

    /// Use git for tracked files (error outside a repository).
    #[arg(short = 'g', long = "git", action = ArgAction::SetTrue, overrides_with = "no_git")]
    pub git: bool,

    /// Never use git, even inside a repository.
    #[arg(short = 'G', long = "no-git", action = ArgAction::SetTrue, overrides_with = "git")]
    pub no_git: bool,

    /// Move deleted paths to the trash instead of removing them.
    #[arg(short = 't', long = "trash", action = ArgAction::SetTrue, overrides_with = "no_trash")]
    pub trash: bool,

    #[arg(short = 'T', long = "no-trash", action = ArgAction::SetTrue)]
    pub no_trash: bool,

    /// Program used to move paths to the trash.
    #[arg(long = "trash-program", default_value = "trash-put")]
    pub trash_program: String,

    /// Do not colour output.
    #[arg(short = 'c', long = "no-color")]
    pub no_color: bool,

    /// List named directories themselves rather than their contents.
    #[arg(short = 'd', long = "dirnames")]
    pub dirnames: bool,

    /// Only list files (and links to files).
    #[arg(short = 'F', long = "files", conflicts_with = "dirs")]
    pub files: bool,

    /// Only list directories (and links to directories).
    #[arg(short = 'D', long = "dirs")]
    pub dirs: bool,

    /// Skip symbolic links.
    #[arg(short = 'L', long = "nolinks")]
    pub nolinks: bool,

    /// Sort paths by name.
    #[arg(short = 'N', long = "sort-name", overrides_with_all = ["sort_time", "sort_size"])]
    pub sort_name: bool,

    /// Sort paths by modification time.
    #[arg(short = 'I', long = "sort-time", overrides_with_all = ["sort_name", "sort_size"])]
    pub sort_time: bool,

    /// Sort paths by size.
    #[arg(short = 'S', long = "sort-size", overrides_with_all = ["sort_name", "sort_time"])]
    pub sort_size: bool,

    /// Reverse the sort order.
    #[arg(short = 'E', long = "sort-reverse")]
    pub sort_reverse: bool,

    /// List directories before files.
    #[arg(short = 'X', long = "group-dirs-first", overrides_with_all = ["group_dirs_last", "no_group_dirs"])]
    pub group_dirs_first: bool,

    /// List directories after files.
    #[arg(short = 'Y', long = "group-dirs-last", overrides_with_all = ["group_dirs_first", "no_group_dirs"])]
    pub group_dirs_last: bool,

    /// Do not group directories.
    #[arg(short = 'Z', long = "no-group-dirs", overrides_with_all = ["group_dirs_first", "group_dirs_last"])]
    pub no_group_dirs: bool,

    /// Replay an actions file written by an earlier run.
    #[arg(short = 'i', long = "input-from", value_name = "FILE")]
    pub input_from: Option<PathBuf>,

    /// Suffix of the temporary file handed to the editor.
    #[arg(long = "suffix", default_value = ".sh")]
    pub suffix: String,

    /// Increase log verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Paths to list; "-" reads paths from stdin.
    #[arg(value_name = "PATH")]
    pub args: Vec<String>,
}

impl Cli {
    fn git_mode(&self) -> GitMode {
        if self.git {
            GitMode::Always
        } else if self.no_git {
            GitMode::Never
        } else {
            GitMode::Auto
        }
    }

    fn sort_key(&self) -> Option<SortKey> {
        if self.sort_name {
            Some(SortKey::Name)
        } else if self.sort_time {
            Some(SortKey::Time)
        } else if self.sort_size {
            Some(SortKey::Size)
        } else {
            None
        }
    }

    fn grouping(&self) -> DirGrouping {
        if self.group_dirs_first {
            DirGrouping::First
        } else if self.group_dirs_last {
            DirGrouping::Last
        } else {
            DirGrouping::None
        }
    }

    /// Resolves the flags into the configuration the core runs with.
    /// `stdin_is_terminal` decides whether paths are also read from stdin.
    pub fn into_config(self, stdin_is_terminal: bool) -> RunConfig {
        let mut args = self.args.clone();
        if stdin_is_terminal {
            if args.is_empty() {
                args.push(".".to_string());
            }
        } else if !args.iter().any(|arg| arg == "-") {
            args.insert(0, "-".to_string());
        }

        RunConfig {
            all: self.all && !self.no_all,
            recurse: self.recurse && !self.no_recurse,
            quiet: self.quiet && !self.no_quiet,
            git: self.git_mode(),
            dirnames: self.dirnames,
            trash: self.trash && !self.no_trash,
            trash_program: self.trash_program.clone(),
            files_only: self.files,
            dirs_only: self.dirs,
            nolinks: self.nolinks,
            suffix: self.suffix.clone(),
            sort: self.sort_key(),
            sort_reverse: self.sort_reverse,
            group_dirs: self.grouping(),
            args,
        }
    }
}
