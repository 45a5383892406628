use std::fs;
use std::path::Path;

use tempfile::tempdir;

use api_power::writer::write_output;
use api_power::{Fragment, GroupSettings, OutputFileList, OutputGroup, WeightVector};

fn group(dir: &Path, types_only: bool, hooks: bool) -> OutputGroup {
    let settings = GroupSettings {
        types_only,
        request_function_file_path: dir.join("src/request.js"),
        request_hook_maker_file_path: hooks.then(|| dir.join("src/makeRequestHook.ts")),
    };
    OutputGroup {
        settings: settings.clone(),
        fragments: vec![Fragment {
            output_path: dir.join("src/service/user/index.js"),
            code: "export type UserListRequest = {}".to_string(),
            weight: WeightVector::default(),
            settings,
        }],
    }
}

#[test]
fn writes_files_and_missing_stubs() {
    let dir = tempdir().expect("tempdir");
    let mut files = OutputFileList::new();
    files.insert(dir.path().join("src/service/user/index.js"), group(dir.path(), false, true));

    let report = write_output(dir.path(), &files).expect("write");

    let output = dir.path().join("src/service/user/index.ts");
    assert_eq!(report.files, vec![output.clone()]);
    assert_eq!(
        report.stubs,
        vec![dir.path().join("src/request.ts"), dir.path().join("src/makeRequestHook.ts")]
    );

    let text = fs::read_to_string(&output).expect("output");
    assert!(text.starts_with("/* tslint:disable */\n/* eslint-disable */"));
    assert!(text.contains("// @ts-ignore\nimport request from \"../../request\""));
    assert!(text.contains("// @ts-ignore\nimport makeRequestHook from \"../../makeRequestHook\""));
    assert!(text.ends_with("export type UserListRequest = {}\n"));
    assert!(fs::read_to_string(dir.path().join("src/request.ts"))
        .expect("stub")
        .contains("export default request"));
}

#[test]
fn existing_request_module_is_left_alone() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("src")).expect("mkdir");
    fs::write(dir.path().join("src/request.ts"), "// mine\n").expect("seed");

    let mut files = OutputFileList::new();
    files.insert(dir.path().join("src/service/user/index.js"), group(dir.path(), false, false));
    let report = write_output(dir.path(), &files).expect("write");

    assert!(report.stubs.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/request.ts")).expect("read"),
        "// mine\n"
    );
}

#[test]
fn types_only_files_skip_request_import_and_stubs() {
    let dir = tempdir().expect("tempdir");
    let mut files = OutputFileList::new();
    files.insert(dir.path().join("src/service/user/index.js"), group(dir.path(), true, true));
    let report = write_output(dir.path(), &files).expect("write");

    assert!(report.stubs.is_empty());
    assert!(!dir.path().join("src/request.ts").exists());
    let text = fs::read_to_string(dir.path().join("src/service/user/index.ts")).expect("output");
    assert!(text.contains("type FileData = File"));
    assert!(!text.contains("import request"));
}

#[test]
fn index_re_exports_root_directories() {
    let dir = tempdir().expect("tempdir");
    let mut files = OutputFileList::new();
    for path in [
        "src/service/user/index.js",
        "src/service/user/admin/index.ts",
        "src/service/order/index.ts",
    ] {
        let mut entry = group(dir.path(), true, false);
        entry.fragments[0].output_path = dir.path().join(path);
        files.insert(dir.path().join(path), entry);
    }

    let report = write_output(dir.path(), &files).expect("write");

    let index = dir.path().join("src/service/index.ts");
    assert_eq!(report.index, Some(index.clone()));
    assert_eq!(report.files.len(), 3);
    let text = fs::read_to_string(&index).expect("index");
    assert!(text.starts_with("/* tslint:disable */"));
    assert!(text.ends_with("export * from \"./order\"\nexport * from \"./user\"\n"));
    assert!(!text.contains("admin"));
}

#[test]
fn generated_file_at_the_index_path_is_not_overwritten_by_the_index() {
    let dir = tempdir().expect("tempdir");
    let mut files = OutputFileList::new();
    files.insert(dir.path().join("src/service/index.ts"), group(dir.path(), true, false));

    let report = write_output(dir.path(), &files).expect("write");

    assert_eq!(report.index, None);
    let text = fs::read_to_string(dir.path().join("src/service/index.ts")).expect("output");
    assert!(text.contains("export type UserListRequest = {}"));
    assert!(!text.contains("export * from"));
}
