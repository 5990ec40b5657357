//! Generates Swift/Kotlin bindings for `nutri_core`.
//!
//! ```text
//! cargo run --bin uniffi-bindgen generate --library target/debug/libnutri_core.dylib \
//!     --language swift --out-dir bindings/
//! ```

fn main() -> anyhow::Result<()> {
    uniffi::uniffi_bindgen_main();
    Ok(())
}
