//! Integration test: taxonomy loading

use explica::taxonomy::TaxonomyLoader;

fn sample_path() -> String {
    format!("{}/assets/sample_taxonomy.yaml", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_sample_taxonomy_labels() {
    let loader = TaxonomyLoader::new(sample_path());
    let taxonomy = loader.load().unwrap();
    let labels = taxonomy.labels();

    assert!(!labels.is_empty());
    assert!(labels.iter().any(|l| l.contains("Food")));
    assert!(labels.contains(&"Food & Drink::Coffee Shops".to_string()));
    assert!(labels.contains(&"Transportation::Fuel".to_string()));
    // Categories without subcategories still appear as labels
    assert!(labels.contains(&"Entertainment".to_string()));
}

#[test]
fn test_labels_follow_taxonomy_order() {
    let loader = TaxonomyLoader::new(sample_path());
    let labels = loader.load().unwrap().labels();

    let category = labels.iter().position(|l| l == "Food & Drink").unwrap();
    let sub = labels
        .iter()
        .position(|l| l == "Food & Drink::Coffee Shops")
        .unwrap();
    assert!(sub > category);
}

#[test]
fn test_missing_taxonomy_file() {
    let loader = TaxonomyLoader::new("/does/not/exist.yaml");
    assert!(loader.load().is_err());
}
