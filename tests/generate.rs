use duo_scaffold::generate::{GenerateError, GenerateOptions, ProjectName, generate};
use std::{fs, path::Path};
use tempfile::tempdir;

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_template(root: &Path) {
    write(
        &root.join("Cargo.toml"),
        b"[package]\nname = \"duo-scaffold\"\n",
    );
    write(
        &root.join("src/main.rs"),
        b"use duo_scaffold::app;\n// DUO_SCAFFOLD_DATABASE\n",
    );
    write(&root.join("src/duo_scaffold/mod.rs"), b"pub fn f() {}\n");
    write(&root.join("README.md"), b"plain text\n");
    write(&root.join("logo.bin"), &[0xff, 0xfe, 0x00, 0x64]);
    write(&root.join("target/debug/junk"), b"duo-scaffold");
    write(&root.join(".git/HEAD"), b"ref");
    write(&root.join("node_modules/x/index.js"), b"x");
    write(&root.join("database.db"), b"sqlite");
}

#[test]
fn generates_renamed_copy() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("template");
    let out = dir.path().join("out");
    sample_template(&template);

    let report = generate(&GenerateOptions {
        name: ProjectName::parse("my-shop").unwrap(),
        template: template.clone(),
        out_dir: out.clone(),
        force: false,
    })
    .unwrap();

    let dest = out.join("my-shop");
    assert_eq!(report.destination, std::path::absolute(&dest).unwrap());
    assert_eq!(report.files_written, 5);
    assert_eq!(report.files_rewritten, 2);

    assert_eq!(
        fs::read_to_string(dest.join("Cargo.toml")).unwrap(),
        "[package]\nname = \"my-shop\"\n"
    );
    assert_eq!(
        fs::read_to_string(dest.join("src/main.rs")).unwrap(),
        "use my_shop::app;\n// MY_SHOP_DATABASE\n"
    );
    assert!(dest.join("src/my_shop/mod.rs").is_file());
    assert_eq!(fs::read(dest.join("logo.bin")).unwrap(), vec![0xff, 0xfe, 0x00, 0x64]);

    for skipped in ["target", ".git", "node_modules", "database.db"] {
        assert!(!dest.join(skipped).exists(), "{skipped} should not be copied");
    }
}

#[test]
fn output_inside_template_is_not_copied_into_itself() {
    let dir = tempdir().unwrap();
    sample_template(dir.path());

    let report = generate(&GenerateOptions {
        name: ProjectName::parse("nested").unwrap(),
        template: dir.path().to_path_buf(),
        out_dir: dir.path().to_path_buf(),
        force: false,
    })
    .unwrap();
    assert_eq!(report.files_written, 5);
    assert!(!dir.path().join("nested/nested").exists());
}

#[test]
fn refuses_existing_destination_without_force() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("template");
    sample_template(&template);
    fs::create_dir_all(dir.path().join("taken")).unwrap();

    let opts = GenerateOptions {
        name: ProjectName::parse("taken").unwrap(),
        template,
        out_dir: dir.path().to_path_buf(),
        force: false,
    };
    assert!(matches!(
        generate(&opts),
        Err(GenerateError::DestinationExists(_))
    ));

    let forced = GenerateOptions { force: true, ..opts };
    assert!(generate(&forced).is_ok());
    assert!(dir.path().join("taken/Cargo.toml").is_file());
}

#[test]
fn missing_template_is_reported() {
    let dir = tempdir().unwrap();
    let err = generate(&GenerateOptions {
        name: ProjectName::parse("x").unwrap(),
        template: dir.path().join("nope"),
        out_dir: dir.path().to_path_buf(),
        force: false,
    })
    .unwrap_err();
    assert!(matches!(err, GenerateError::TemplateMissing(_)));
}
