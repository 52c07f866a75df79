#![forbid(unsafe_code)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let Some(git_dir) = locate_git_dir(&manifest_dir) else {
        return;
    };

    let head_path = git_dir.join("HEAD");
    println!("cargo:rerun-if-changed={}", head_path.display());

    let Some(sha) = head_sha(&git_dir, &head_path) else {
        return;
    };
    let short = sha.chars().take(12).collect::<String>();
    println!("cargo:rustc-env=PM_GIT_SHA={short}");
}

fn head_sha(git_dir: &Path, head_path: &Path) -> Option<String> {
    let head_raw = fs::read_to_string(head_path).ok()?;
    let head = head_raw.trim();
    let sha = match head.strip_prefix("ref:") {
        Some(reference) => lookup_ref(git_dir, reference.trim())?,
        None => head.to_string(),
    };
    let sha = sha.trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn locate_git_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let dot_git = current.join(".git");
        if dot_git.is_dir() {
            return Some(dot_git);
        }
        if dot_git.is_file() {
            // Worktrees and submodules point at the real git dir.
            let text = fs::read_to_string(&dot_git).ok()?;
            let line = text.lines().next().unwrap_or("").trim();
            return line
                .strip_prefix("gitdir:")
                .map(|path| current.join(path.trim()));
        }
        current = current.parent()?;
    }
}

fn lookup_ref(git_dir: &Path, reference: &str) -> Option<String> {
    let loose = git_dir.join(reference);
    if loose.exists() {
        println!("cargo:rerun-if-changed={}", loose.display());
        if let Ok(text) = fs::read_to_string(&loose)
            && !text.trim().is_empty()
        {
            return Some(text.trim().to_string());
        }
    }

    let packed = git_dir.join("packed-refs");
    if !packed.exists() {
        return None;
    }
    println!("cargo:rerun-if-changed={}", packed.display());
    let text = fs::read_to_string(&packed).ok()?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('^'))
        .filter_map(|line| line.split_once(' '))
        .find(|(_, name)| *name == reference)
        .map(|(sha, _)| sha.trim().to_string())
}
