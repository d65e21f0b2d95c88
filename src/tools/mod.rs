//! Static table of installable tools
//!
//! Each entry names the release source, the asset filters and the way the
//! unpacked asset lands in the binaries directory. The per-tool subcommands
//! and the generic installer are both driven from [`TOOLS`].

use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{InstallerError, Result};
use crate::fetch::Compression;
use crate::install::{self, InstallConfig};
use crate::platform::System;
use crate::resolver::MatchCriteria;
use crate::shell::ShellLines;

/// Where a tool's release comes from and how its asset is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub owner: &'static str,
    pub repo: &'static str,
    pub tag: Option<&'static str>,
    pub match_system: bool,
    pub match_c_std_lib: bool,
    pub match_machine: bool,
    pub not_matches: &'static [&'static str],
    pub not_endswith: &'static [&'static str],
}

impl Variant {
    /// Match on system and machine
    const fn sm(owner: &'static str, repo: &'static str) -> Self {
        Self {
            owner,
            repo,
            tag: None,
            match_system: true,
            match_c_std_lib: false,
            match_machine: true,
            not_matches: &[],
            not_endswith: &[],
        }
    }

    /// Match on system, libc and machine
    const fn slm(owner: &'static str, repo: &'static str) -> Self {
        Self {
            match_c_std_lib: true,
            ..Self::sm(owner, repo)
        }
    }

    const fn tag(self, tag: &'static str) -> Self {
        Self {
            tag: Some(tag),
            ..self
        }
    }

    const fn no_machine(self) -> Self {
        Self {
            match_machine: false,
            ..self
        }
    }

    const fn not_matches(self, patterns: &'static [&'static str]) -> Self {
        Self {
            not_matches: patterns,
            ..self
        }
    }

    const fn not_endswith(self, suffixes: &'static [&'static str]) -> Self {
        Self {
            not_endswith: suffixes,
            ..self
        }
    }

    pub fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            match_system: self.match_system,
            match_machine: self.match_machine,
            match_c_std_lib: self.match_c_std_lib,
            not_matches: self.not_matches.iter().map(|s| (*s).to_string()).collect(),
            not_endswith: self.not_endswith.iter().map(|s| (*s).to_string()).collect(),
            tag: self.tag.map(str::to_string),
        }
    }
}

/// How an unpacked asset is placed into the binaries directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallRule<'a> {
    /// A file of this name, searched for recursively inside the unpacked tree
    Member(&'a str),
    /// The asset is a single file, installed under this name
    Single(&'a str),
    /// Every unpacked file whose name starts with the prefix
    Prefixed(&'a str),
    /// The whole directory, plus a symlink into it
    Tree {
        dir: &'a str,
        target: &'a str,
        link: &'a str,
    },
}

/// Lines added to shell startup files after installing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellHook {
    /// `posix` has `{shell}` replaced by the shell name
    Template {
        posix: &'static str,
        fish: &'static str,
    },
    PerShell {
        bash: &'static str,
        zsh: &'static str,
        fish: &'static str,
    },
}

impl ShellHook {
    pub fn lines(self) -> ShellLines {
        match self {
            ShellHook::Template { posix, fish } => ShellLines {
                bash: vec![posix.replace("{shell}", "bash")],
                zsh: vec![posix.replace("{shell}", "zsh")],
                fish: vec![fish.to_string()],
            },
            ShellHook::PerShell { bash, zsh, fish } => ShellLines {
                bash: vec![bash.to_string()],
                zsh: vec![zsh.to_string()],
                fish: vec![fish.to_string()],
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub about: &'static str,
    pub variant: Variant,
    /// Replaces `variant` on macOS
    pub darwin: Option<Variant>,
    pub compression: Compression,
    pub rule: InstallRule<'static>,
    pub hook: Option<ShellHook>,
}

impl ToolSpec {
    pub fn variant_for(&self, system: System) -> &Variant {
        match (system, &self.darwin) {
            (System::Darwin, Some(darwin)) => darwin,
            _ => &self.variant,
        }
    }
}

const fn tool(
    name: &'static str,
    about: &'static str,
    variant: Variant,
    compression: Compression,
    rule: InstallRule<'static>,
) -> ToolSpec {
    ToolSpec {
        name,
        about,
        variant,
        darwin: None,
        compression,
        rule,
        hook: None,
    }
}

const fn with_hook(spec: ToolSpec, hook: ShellHook) -> ToolSpec {
    ToolSpec {
        hook: Some(hook),
        ..spec
    }
}

const fn with_darwin(spec: ToolSpec, darwin: Variant) -> ToolSpec {
    ToolSpec {
        darwin: Some(darwin),
        ..spec
    }
}

use Compression::{Bzip2, Gzip, Lzma, Plain};
use InstallRule::{Member, Prefixed, Single, Tree};

pub static TOOLS: &[ToolSpec] = &[
    tool(
        "age",
        "Install 'age'",
        Variant::sm("FiloSottile", "age").not_endswith(&["proof"]),
        Gzip,
        Prefixed("age"),
    ),
    tool("bat", "Install 'bat'", Variant::slm("sharkdp", "bat"), Gzip, Member("bat")),
    tool(
        "btm",
        "Install 'bottom'",
        Variant::slm("ClementTsang", "bottom").not_matches(&[r"\d+\.tar\.gz$"]),
        Gzip,
        Member("btm"),
    ),
    tool("delta", "Install 'delta'", Variant::slm("dandavison", "delta"), Gzip, Member("delta")),
    with_hook(
        tool(
            "direnv",
            "Install 'direnv'",
            Variant::sm("direnv", "direnv"),
            Plain,
            Single("direnv"),
        ),
        ShellHook::Template {
            posix: r#"eval "$(direnv hook {shell})""#,
            fish: "direnv hook fish | source",
        },
    ),
    with_darwin(
        tool("dust", "Install 'dust'", Variant::slm("bootandy", "dust"), Gzip, Member("dust")),
        Variant::slm("bootandy", "dust").no_machine(),
    ),
    with_darwin(
        tool(
            "eza",
            "Install 'eza'",
            Variant::slm("eza-community", "eza").not_endswith(&["zip"]),
            Gzip,
            Single("eza"),
        ),
        Variant::sm("cargo-bins", "cargo-quickinstall")
            .tag("eza")
            .not_endswith(&["sig"]),
    ),
    tool("fd", "Install 'fd'", Variant::slm("sharkdp", "fd"), Gzip, Member("fd")),
    with_hook(
        tool("fzf", "Install 'fzf'", Variant::sm("junegunn", "fzf"), Gzip, Single("fzf")),
        ShellHook::PerShell {
            bash: r#"eval "$(fzf --bash)""#,
            zsh: "source <(fzf --zsh)",
            fish: "fzf --fish | source",
        },
    ),
    tool(
        "jq",
        "Install 'jq'",
        Variant::sm("jqlang", "jq").not_endswith(&["linux64"]),
        Plain,
        Single("jq"),
    ),
    tool("just", "Install 'just'", Variant::sm("casey", "just"), Gzip, Member("just")),
    tool(
        "neovim",
        "Install 'neovim'",
        Variant::sm("neovim", "neovim").not_endswith(&["appimage", "zsync"]),
        Gzip,
        Tree {
            dir: "nvim-dir",
            target: "bin/nvim",
            link: "nvim",
        },
    ),
    tool("restic", "Install 'restic'", Variant::sm("restic", "restic"), Bzip2, Single("restic")),
    tool(
        "ripgrep",
        "Install 'ripgrep'",
        Variant::sm("burntsushi", "ripgrep").not_endswith(&["sha256"]),
        Gzip,
        Member("rg"),
    ),
    tool(
        "ruff",
        "Install 'ruff'",
        Variant::slm("astral-sh", "ruff").not_endswith(&["sha256"]),
        Gzip,
        Member("ruff"),
    ),
    tool("sd", "Install 'sd'", Variant::slm("chmln", "sd"), Gzip, Member("sd")),
    tool(
        "shellcheck",
        "Install 'shellcheck'",
        Variant::sm("koalaman", "shellcheck").not_endswith(&["tar.xz"]),
        Gzip,
        Member("shellcheck"),
    ),
    tool("shfmt", "Install 'shfmt'", Variant::sm("mvdan", "sh"), Plain, Single("shfmt")),
    tool(
        "sops",
        "Install 'sops'",
        Variant::sm("getsops", "sops").not_endswith(&["json"]),
        Plain,
        Single("sops"),
    ),
    with_hook(
        tool(
            "starship",
            "Install 'starship'",
            Variant::slm("starship", "starship").not_endswith(&["sha256"]),
            Gzip,
            Single("starship"),
        ),
        ShellHook::Template {
            posix: r#"eval "$(starship init {shell})""#,
            fish: "starship init fish | source",
        },
    ),
    tool("taplo", "Install 'taplo'", Variant::sm("tamasfe", "taplo"), Gzip, Single("taplo")),
    tool(
        "uv",
        "Install 'uv'",
        Variant::slm("astral-sh", "uv").not_endswith(&["sha256"]),
        Gzip,
        Member("uv"),
    ),
    tool(
        "watchexec",
        "Install 'watchexec'",
        Variant::slm("watchexec", "watchexec")
            .not_endswith(&["b3", "deb", "rpm", "sha256", "sha512"]),
        Lzma,
        Member("watchexec"),
    ),
    tool(
        "yq",
        "Install 'yq'",
        Variant::sm("mikefarah", "yq").not_endswith(&["tar.gz"]),
        Plain,
        Single("yq"),
    ),
    with_hook(
        tool(
            "zoxide",
            "Install 'zoxide'",
            Variant::sm("ajeetdsouza", "zoxide"),
            Gzip,
            Member("zoxide"),
        ),
        ShellHook::Template {
            posix: r#"eval "$(zoxide init {shell})""#,
            fish: "zoxide init fish | source",
        },
    ),
];

pub fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Place the unpacked asset at `path` into `bin_dir` per `rule`.
/// Returns the installed paths.
pub fn apply_rule(
    rule: InstallRule<'_>,
    path: &Path,
    bin_dir: &Path,
    config: &InstallConfig,
) -> Result<Vec<PathBuf>> {
    match rule {
        InstallRule::Member(name) => {
            let src = if path.is_file() {
                path.to_path_buf()
            } else {
                find_member(path, name)?
            };
            let dest = bin_dir.join(name);
            install::install_file(&src, &dest, config)?;
            Ok(vec![dest])
        }
        InstallRule::Single(name) => {
            let src = if path.is_file() {
                path.to_path_buf()
            } else {
                single_file(path)?
            };
            let dest = bin_dir.join(name);
            install::install_file(&src, &dest, config)?;
            Ok(vec![dest])
        }
        InstallRule::Prefixed(prefix) => {
            let files = if path.is_file() {
                vec![path.to_path_buf()]
            } else {
                files_under(path)?
                    .into_iter()
                    .filter(|p| file_name(p).starts_with(prefix))
                    .collect()
            };
            if files.is_empty() {
                return Err(member_not_found(prefix, path));
            }
            let mut installed = Vec::with_capacity(files.len());
            for src in files {
                let dest = bin_dir.join(file_name(&src));
                install::install_file(&src, &dest, config)?;
                installed.push(dest);
            }
            Ok(installed)
        }
        InstallRule::Tree { dir, target, link } => {
            let dest_dir = bin_dir.join(dir);
            install::install_tree(path, &dest_dir, config)?;
            let link_path = bin_dir.join(link);
            install::symlink(&dest_dir.join(target), &link_path, config)?;
            Ok(vec![dest_dir, link_path])
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn member_not_found(member: &str, path: &Path) -> InstallerError {
    InstallerError::MemberNotFound {
        member: member.to_string(),
        path: path.display().to_string(),
    }
}

fn files_under(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn find_member(dir: &Path, name: &str) -> Result<PathBuf> {
    let found = files_under(dir)?
        .into_iter()
        .find(|p| file_name(p) == name)
        .ok_or_else(|| member_not_found(name, dir))?;
    debug!("Found '{name}' at {}", found.display());
    Ok(found)
}

fn single_file(dir: &Path) -> Result<PathBuf> {
    let mut files = files_under(dir)?;
    match files.len() {
        1 => Ok(files.remove(0)),
        _ => Err(InstallerError::MemberNotFound {
            member: "<single file>".to_string(),
            path: dir.display().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Shell;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_tool_names_unique() {
        let names: HashSet<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), TOOLS.len());
    }

    #[test]
    fn test_find() {
        let rg = find("ripgrep").unwrap();
        assert_eq!(rg.variant.owner, "burntsushi");
        assert_eq!(rg.rule, InstallRule::Member("rg"));
        assert!(find("emacs").is_none());
    }

    #[test]
    fn test_not_matches_patterns_compile() {
        for spec in TOOLS {
            for variant in std::iter::once(&spec.variant).chain(spec.darwin.iter()) {
                for pattern in variant.not_matches {
                    assert!(regex::Regex::new(pattern).is_ok(), "{}: {pattern}", spec.name);
                }
            }
        }
    }

    #[test]
    fn test_eza_darwin_variant() {
        let eza = find("eza").unwrap();
        assert_eq!(eza.variant_for(System::Linux).owner, "eza-community");
        let darwin = eza.variant_for(System::Darwin);
        assert_eq!(darwin.repo, "cargo-quickinstall");
        assert_eq!(darwin.criteria().tag.as_deref(), Some("eza"));
        assert_eq!(darwin.criteria().not_endswith, vec!["sig".to_string()]);
    }

    #[test]
    fn test_dust_skips_machine_on_darwin() {
        let dust = find("dust").unwrap();
        assert!(dust.variant_for(System::Linux).match_machine);
        assert!(!dust.variant_for(System::Darwin).match_machine);
    }

    #[test]
    fn test_variant_criteria() {
        let criteria = find("watchexec").unwrap().variant.criteria();
        assert!(criteria.match_system && criteria.match_machine && criteria.match_c_std_lib);
        assert_eq!(criteria.not_endswith.len(), 5);
        assert!(criteria.tag.is_none());
    }

    #[test]
    fn test_template_hook_lines() {
        let lines = find("direnv").unwrap().hook.unwrap().lines();
        assert_eq!(lines.for_shell(Shell::Bash), [r#"eval "$(direnv hook bash)""#]);
        assert_eq!(lines.for_shell(Shell::Zsh), [r#"eval "$(direnv hook zsh)""#]);
        assert_eq!(lines.for_shell(Shell::Fish), ["direnv hook fish | source"]);
        assert_eq!(lines.for_shell(Shell::Sh), lines.for_shell(Shell::Bash));
    }

    #[test]
    fn test_per_shell_hook_lines() {
        let lines = find("fzf").unwrap().hook.unwrap().lines();
        assert_eq!(lines.for_shell(Shell::Zsh), ["source <(fzf --zsh)"]);
    }

    #[test]
    fn test_member_found_nested() {
        let temp = TempDir::new().unwrap();
        let unpacked = temp.path().join("unpacked");
        write(&unpacked.join("ripgrep-14.1.0-x86_64/rg"), "rg");
        write(&unpacked.join("ripgrep-14.1.0-x86_64/README.md"), "docs");
        let bin = temp.path().join("bin");

        let installed =
            apply_rule(InstallRule::Member("rg"), &unpacked, &bin, &InstallConfig::default())
                .unwrap();
        assert_eq!(installed, vec![bin.join("rg")]);
        assert_eq!(fs::read_to_string(bin.join("rg")).unwrap(), "rg");
    }

    #[test]
    fn test_member_missing() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("unpacked/other"), "x");
        let err = apply_rule(
            InstallRule::Member("rg"),
            &temp.path().join("unpacked"),
            &temp.path().join("bin"),
            &InstallConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InstallerError::MemberNotFound { .. }));
    }

    #[test]
    fn test_single_renames_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("jq-linux-amd64");
        write(&src, "jq");
        let bin = temp.path().join("bin");
        apply_rule(InstallRule::Single("jq"), &src, &bin, &InstallConfig::default()).unwrap();
        assert_eq!(fs::read_to_string(bin.join("jq")).unwrap(), "jq");
    }

    #[test]
    fn test_prefixed_installs_all_matches() {
        let temp = TempDir::new().unwrap();
        let unpacked = temp.path().join("age");
        write(&unpacked.join("age"), "a");
        write(&unpacked.join("age-keygen"), "k");
        write(&unpacked.join("LICENSE"), "l");
        let bin = temp.path().join("bin");

        let installed =
            apply_rule(InstallRule::Prefixed("age"), &unpacked, &bin, &InstallConfig::default())
                .unwrap();
        assert_eq!(installed, vec![bin.join("age"), bin.join("age-keygen")]);
        assert!(!bin.join("LICENSE").exists());
    }

    #[test]
    fn test_tree_with_symlink() {
        let temp = TempDir::new().unwrap();
        let unpacked = temp.path().join("nvim-linux-x86_64");
        write(&unpacked.join("bin/nvim"), "nvim");
        write(&unpacked.join("share/nvim/runtime/init.vim"), "");
        let bin = temp.path().join("bin");
        let rule = find("neovim").unwrap().rule;

        apply_rule(rule, &unpacked, &bin, &InstallConfig::default()).unwrap();
        assert!(bin.join("nvim-dir/share/nvim/runtime/init.vim").exists());
        assert_eq!(fs::read_link(bin.join("nvim")).unwrap(), bin.join("nvim-dir/bin/nvim"));
        assert_eq!(fs::read_to_string(bin.join("nvim")).unwrap(), "nvim");
    }
}
