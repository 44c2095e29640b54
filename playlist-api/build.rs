//! Stamps the binary with the commit and build date logged at startup

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "nogit".into());
    let dirty = git(&["status", "--porcelain"]).is_some_and(|s| !s.is_empty());
    let built = chrono::Utc::now().format("%Y-%m-%d");

    println!(
        "cargo:rustc-env=PLAYLIST_API_BUILD={}{} {}",
        commit,
        if dirty { "+dirty" } else { "" },
        built
    );
}

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}
