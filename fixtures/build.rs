use std::env;
use std::path::PathBuf;

use model_query_codegen::{GeneratorOptions, generate_to_dir};

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let declarations = crate_dir.join("models.yaml");

    if let Err(err) = generate_to_dir([&declarations], &out_dir, &GeneratorOptions::default()) {
        panic!("failed to generate fixture models: {err}");
    }

    println!("cargo:rerun-if-changed=models.yaml");
}
