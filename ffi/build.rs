//! Generates `cinema.h` for C hosts under `OUT_DIR`.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        println!("cargo:warning=CARGO_MANIFEST_DIR or OUT_DIR unset, skipping cinema.h");
        return;
    };
    let header = PathBuf::from(out_dir).join("cinema.h");

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("CINEMA_H".to_string()),
        cpp_compat: true,
        usize_is_size_t: true,
        ..Default::default()
    };

    // Header problems are reported as warnings only.
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header);
            println!("cargo:rustc-env=CINEMA_HEADER={}", header.display());
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
