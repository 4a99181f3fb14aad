use cxr_prep_scan::{ImageWalker, PrepError, Split, count_files, discover_classes, print_structure};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Lay out an extracted archive: two train classes, one test class and the
/// resource-fork folder macOS zips carry along.
fn extracted_dataset(root: &Path) -> PathBuf {
    let data = root.join("chest_xray");
    let files: &[(&str, usize)] = &[
        ("train/NORMAL", 3),
        ("train/PNEUMONIA", 4),
        ("test/NORMAL", 2),
        ("__MACOSX/train/NORMAL", 5),
    ];
    for (dir, count) in files {
        fs::create_dir_all(data.join(dir)).unwrap();
        for i in 0..*count {
            fs::write(data.join(dir).join(format!("img{i}.jpeg")), format!("{dir}{i}")).unwrap();
        }
    }
    data
}

fn ignored() -> Vec<String> {
    vec!["__MACOSX".to_string()]
}

#[test]
fn test_discover_classes_of_extracted_archive() {
    let temp = TempDir::new().unwrap();
    let data = extracted_dataset(temp.path());
    fs::create_dir_all(data.join("train/.ipynb_checkpoints")).unwrap();
    fs::write(data.join("train/labels.csv"), "x").unwrap();

    let classes = discover_classes(&data.join("train"), &ignored()).unwrap();
    assert_eq!(classes, vec!["NORMAL", "PNEUMONIA"]);
}

#[test]
fn test_count_files_buckets_and_ignores() {
    let temp = TempDir::new().unwrap();
    let data = extracted_dataset(temp.path());

    let report = count_files(&data, 2, &ignored()).unwrap();

    assert_eq!(report.train.len(), 2);
    assert_eq!(report.total(Split::Train), 7);
    assert_eq!(report.test.len(), 1);
    assert_eq!(report.total(Split::Test), 2);
    assert_eq!(
        report.rows(Split::Train),
        vec![("train/PNEUMONIA".to_string(), 4), ("train/NORMAL".to_string(), 3)]
    );
    let ratio = report.test_train_ratio().unwrap();
    assert!((ratio - 2.0 / 7.0).abs() < 1e-9);
}

#[test]
fn test_stats_chart_with_high_threshold() {
    let temp = TempDir::new().unwrap();
    let data = extracted_dataset(temp.path());

    let report = count_files(&data, 50, &ignored()).unwrap();
    let mut out = Vec::new();
    report.render(&mut out, 20).unwrap();

    assert!(report.is_empty());
    assert_eq!(String::from_utf8(out).unwrap(), "No folders with 50+ files to display.\n");
}

#[test]
fn test_count_files_missing_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let err = count_files(&missing, 1, &[]).unwrap_err();
    assert!(matches!(err, PrepError::NotADirectory { ref path } if *path == missing));
}

#[test]
fn test_structure_truncates_file_lists() {
    let temp = TempDir::new().unwrap();
    let data = extracted_dataset(temp.path());

    let mut out = Vec::new();
    print_structure(&data.join("train"), 2, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let expected = "\
+ train/
  + NORMAL/
    - img0.jpeg
    - img1.jpeg
    ... (1 more files hidden)
  + PNEUMONIA/
    - img0.jpeg
    - img1.jpeg
    ... (2 more files hidden)
";
    assert_eq!(text, expected);
}

#[test]
fn test_walker_yields_images_in_name_order() {
    let temp = TempDir::new().unwrap();
    let class = temp.path().join("NORMAL");
    fs::create_dir_all(class.join("b")).unwrap();
    fs::write(class.join("c.png"), "c").unwrap();
    fs::write(class.join("a.JPG"), "a").unwrap();
    fs::write(class.join("b/x.jpeg"), "x").unwrap();
    fs::write(class.join("notes.txt"), "n").unwrap();

    let images = ImageWalker::default().collect(&class).unwrap();

    assert_eq!(
        images,
        vec![class.join("a.JPG"), class.join("b/x.jpeg"), class.join("c.png")]
    );
}

#[test]
fn test_split_ignores_folders_above_root() {
    let temp = TempDir::new().unwrap();
    let data = extracted_dataset(&temp.path().join("latest_runs"));

    let report = count_files(&data, 2, &ignored()).unwrap();
    assert_eq!(report.total(Split::Train), 7);
    assert_eq!(report.total(Split::Test), 2);

    let only_test = count_files(&data.join("test"), 1, &ignored()).unwrap();
    assert_eq!(only_test.total(Split::Test), 2);
    assert!(only_test.train.is_empty());
}
