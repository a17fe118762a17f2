use std::process::Command;

/// Short commit hash of the checkout being built, or "unknown" outside git
fn git_hash() -> String {
    let output = match Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return "unknown".to_string(),
    };

    String::from_utf8(output.stdout)
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn main() {
    // Build metadata for the cold-start log line
    println!("cargo:rustc-env=GIT_HASH={}", git_hash());
    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        chrono::Utc::now().to_rfc3339()
    );

    // Rebuild when HEAD moves
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
