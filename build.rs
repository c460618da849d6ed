use chrono::Utc;

/// 生成 `xkcd-archive --version` 的详细版本信息
fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let built_on = Utc::now().format("%Y-%m-%d").to_string();

    println!(
        "cargo:rustc-env=ARCHIVE_LONG_VERSION={} ({} {}, built {})",
        version, target, profile, built_on
    );
    println!("cargo:rerun-if-changed=build.rs");
}
