fn main() {
    // ── libvips linking ──────────────────────────────────────────────────────
    //
    // The libvips-rs bindings crate ships no build script of its own.
    // We must tell cargo where to find the library for each platform.
    //
    // The VIPS_DIR environment variable points at a non-system libvips
    // install (e.g. a Homebrew prefix or a custom build).
    link_libvips();
}

fn link_libvips() {
    // Re-run whenever the override env-var changes.
    println!("cargo:rerun-if-env-changed=VIPS_DIR");

    if let Ok(vips_dir) = std::env::var("VIPS_DIR") {
        let lib_dir = std::path::Path::new(&vips_dir).join("lib");
        if lib_dir.exists() {
            println!("cargo:rustc-link-search=native={}", lib_dir.display());
        } else {
            println!("cargo:warning=VIPS_DIR is set but '{}' does not exist", lib_dir.display());
        }
    }

    // Linux: the system libvips-dev package is sufficient.
    // macOS: `brew install vips` puts libvips on the default search path.
    println!("cargo:rustc-link-lib=dylib=vips");
}
