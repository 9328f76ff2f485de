//! Build script for storefront crate.
//!
//! Generates content-based hashes for static assets so they can be served
//! with immutable caching. Each asset is copied to a `derived/` directory
//! next to it with the hash in its file name.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// (path under `static/`, env var receiving the hash)
const ASSETS: &[(&str, &str)] = &[
    ("css/main.css", "CSS_HASH"),
    ("js/cart.js", "CART_JS_HASH"),
    ("js/checkout.js", "CHECKOUT_JS_HASH"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for (relative, var) in ASSETS {
        hash_asset(&static_dir, relative, var);
    }
}

/// Hash one asset and copy it to `derived/<stem>.<hash>.<ext>`.
///
/// Sets `var` for use with `env!`. A missing asset yields an empty hash.
fn hash_asset(static_dir: &Path, relative: &str, var: &str) {
    let path = static_dir.join(relative);
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {relative}: {e}");
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);
    println!("cargo:rustc-env={var}={short_hash}");

    let (Some(parent), Some(stem), Some(ext)) = (
        path.parent(),
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|s| s.to_str()),
    ) else {
        return;
    };

    let derived_dir = parent.join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");
    fs::copy(&path, derived_dir.join(format!("{stem}.{short_hash}.{ext}")))
        .expect("Failed to copy asset to derived directory");
}
