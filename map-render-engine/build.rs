// build.rs
use std::{env, fs, path::PathBuf};

const AREAS_JSON: &str = "assets/data/areas.json";
const CATEGORIES: &[&str] = &[
    "accommodation",
    "dining",
    "recreation",
    "wellness",
    "golf",
    "realestate",
];

/// Fail the build early when the bundled areas dataset is malformed, instead of
/// discovering it as an empty map at runtime.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={AREAS_JSON}");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let path = manifest_dir.join(AREAS_JSON);

    let Ok(content) = fs::read_to_string(&path) else {
        println!("cargo:warning=No dataset at {}, markers will be empty", path.display());
        return;
    };

    let json: serde_json::Value =
        serde_json::from_str(&content).expect("areas.json is not valid JSON");
    let areas = json["areas"]
        .as_array()
        .expect("areas.json must contain an 'areas' array");

    let mut ids = std::collections::HashSet::new();
    for area in areas {
        let id = area["id"].as_str().expect("area without string id");
        assert!(ids.insert(id.to_string()), "duplicate area id '{id}'");

        let category = area["category"].as_str().unwrap_or_default();
        assert!(
            CATEGORIES.contains(&category),
            "area '{id}' has unknown category '{category}'"
        );

        for axis in ["x", "y", "z"] {
            assert!(
                area["position"][axis].is_number(),
                "area '{id}' is missing position.{axis}"
            );
        }
    }

    println!("cargo:warning=Validated {} areas in {AREAS_JSON}", areas.len());
}
