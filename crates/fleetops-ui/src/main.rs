#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Fleetops console binary.
//!
//! In the browser this mounts the login/dashboard app. A native build has no
//! DOM or `localStorage`, so it only explains how to produce the wasm bundle.

#[cfg(target_arch = "wasm32")]
fn main() {
    fleetops_ui::run_app();
}

#[cfg(not(target_arch = "wasm32"))]
const NATIVE_NOTICE: &str = "fleetops-ui renders in a browser; run `trunk serve` \
    (or build for wasm32-unknown-unknown) and open the served page.\n";

#[cfg(not(target_arch = "wasm32"))]
fn write_notice(out: &mut impl std::io::Write) -> std::io::Result<()> {
    out.write_all(NATIVE_NOTICE.as_bytes())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::io::Result<()> {
    write_notice(&mut std::io::stderr().lock())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_build_points_at_the_wasm_bundle() -> std::io::Result<()> {
        let mut out = Vec::new();
        write_notice(&mut out)?;
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("trunk serve"));
        assert!(text.contains("wasm32-unknown-unknown"));
        assert!(text.ends_with('\n'));
        Ok(())
    }
}
