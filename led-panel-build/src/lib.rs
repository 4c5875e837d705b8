//! Build-time helper for bundling the panel frontend into a server.
//!
//! Call it from the server's `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     led_panel_build::frontend("led-frontend", "../frontend", "assets");
//! }
//! ```
//!
//! and embed the result:
//!
//! ```ignore
//! #[derive(RustEmbed)]
//! #[folder = "$LED_FRONTEND_DIST"]
//! struct Assets;
//! ```
//!
//! The compiled frontend is located through, in order:
//! 1. `CARGO_CDYLIB_FILE_{CRATE}_{crate}` / `CARGO_CDYLIB_FILE_{CRATE}` (artifact dependencies)
//! 2. `{CRATE}_WASM`, a path to a `.wasm` built with
//!    `cargo build -p led-frontend --lib --release --target wasm32-unknown-unknown --features hydrate`
//!
//! When none is set the server embeds `fallback_dir` instead, so a plain
//! `cargo build` works without a WASM toolchain.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

/// `led-frontend` -> `LED_FRONTEND`.
pub fn env_prefix(crate_name: &str) -> String {
    crate_name.replace('-', "_").to_uppercase()
}

/// Environment variables that may point at the compiled frontend, in priority order.
pub fn wasm_env_vars(crate_name: &str) -> Vec<String> {
    let upper = env_prefix(crate_name);
    let underscored = crate_name.replace('-', "_");
    vec![
        format!("CARGO_CDYLIB_FILE_{upper}_{underscored}"),
        format!("CARGO_CDYLIB_FILE_{upper}"),
        format!("{upper}_WASM"),
    ]
}

/// Minimal page used when the frontend ships no `index.html`.
pub fn default_index_html(js_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LED panel</title>
    <style>
        html, body {{ margin: 0; padding: 0; width: 100%; height: 100%; overflow: hidden; }}
        canvas {{ width: 100%; height: 100%; }}
        #loading_text {{ position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); font-family: sans-serif; font-size: 1.5em; color: #888; }}
    </style>
    <!--LED_PANEL_INITIAL_STATE-->
</head>
<body>
    <p id="loading_text">Loading...</p>
    <canvas id="the_canvas_id"></canvas>
    <script type="module">
        import init from './{js_name}';
        init();
    </script>
</body>
</html>"#
    )
}

/// Bundle the frontend and export `{CRATE}_DIST` for `rust-embed`.
///
/// * `crate_name` - the frontend crate, e.g. `"led-frontend"`
/// * `source_dir` - the frontend crate directory, relative to the calling manifest
/// * `fallback_dir` - assets to embed when no compiled frontend is available
///
/// # Panics
///
/// Panics if a compiled frontend is found but `wasm-bindgen` is missing or fails.
pub fn frontend(crate_name: &str, source_dir: &str, fallback_dir: &str) {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let dist_var = format!("{}_DIST", env_prefix(crate_name));

    println!("cargo:rerun-if-changed={source_dir}/src/");
    println!("cargo:rerun-if-changed={source_dir}/index.html");
    println!("cargo:rerun-if-changed={fallback_dir}");
    let candidates = wasm_env_vars(crate_name);
    for var in &candidates {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let Some(wasm_path) = candidates.iter().find_map(|var| env::var(var).ok()) else {
        println!(
            "cargo:warning={crate_name}: no compiled frontend found (set {}), embedding {fallback_dir}/",
            env_prefix(crate_name) + "_WASM"
        );
        let fallback = manifest_dir.join(fallback_dir);
        println!("cargo:rustc-env={dist_var}={}", fallback.display());
        return;
    };

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dist_dir = Path::new(&out_dir).join(format!("{crate_name}-dist"));
    fs::create_dir_all(&dist_dir).expect("Failed to create dist directory");

    let status = Command::new("wasm-bindgen")
        .arg(&wasm_path)
        .arg("--out-dir")
        .arg(&dist_dir)
        .args(["--target", "web", "--no-typescript"])
        .status()
        .expect(
            "Failed to run wasm-bindgen. Is it installed?\n\
             Run: cargo install wasm-bindgen-cli --version 0.2.104",
        );
    if !status.success() {
        panic!("wasm-bindgen failed for {crate_name}");
    }

    let html_src = manifest_dir.join(source_dir).join("index.html");
    let html_dst = dist_dir.join("index.html");
    if html_src.exists() {
        fs::copy(&html_src, &html_dst).expect("Failed to copy index.html");
    } else {
        let js_name = format!("{}.js", crate_name.replace('-', "_"));
        fs::write(&html_dst, default_index_html(&js_name)).expect("Failed to write index.html");
    }

    println!("cargo:rustc-env={dist_var}={}", dist_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_upper_snake_case() {
        assert_eq!(env_prefix("led-frontend"), "LED_FRONTEND");
    }

    #[test]
    fn artifact_variables_come_before_manual_override() {
        assert_eq!(
            wasm_env_vars("led-frontend"),
            vec![
                "CARGO_CDYLIB_FILE_LED_FRONTEND_led_frontend".to_string(),
                "CARGO_CDYLIB_FILE_LED_FRONTEND".to_string(),
                "LED_FRONTEND_WASM".to_string(),
            ]
        );
    }

    #[test]
    fn default_page_loads_bindings_and_has_state_marker() {
        let html = default_index_html("led_frontend.js");
        assert!(html.contains("import init from './led_frontend.js';"));
        assert!(html.contains("<!--LED_PANEL_INITIAL_STATE-->"));
        assert!(html.contains(r#"id="the_canvas_id""#));
    }
}
