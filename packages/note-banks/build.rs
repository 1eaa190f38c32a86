use std::env;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn is_bank_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let banks_dir = Path::new("banks");
    println!("cargo:rerun-if-changed={}", banks_dir.display());

    let mut files: Vec<_> = WalkDir::new(banks_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_bank_file(path))
        .collect();
    files.sort();

    let mut table = String::from("/// Embedded bank files as (file name, source)\n");
    table.push_str("pub static BANKS: &[(&str, &str)] = &[\n");
    for path in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .expect("bank file names are UTF-8");
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("cannot read bank {}: {}", path.display(), e));
        println!("cargo:rerun-if-changed={}", path.display());
        // {:?} produces an escaped string literal
        table.push_str(&format!("    ({:?}, {:?}),\n", name, content));
    }
    table.push_str("];\n");

    fs::write(Path::new(&out_dir).join("banks.rs"), table).expect("write banks.rs");
}
