//! End-to-end runs of the four binaries against images on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use fatdisk::image::ImageBuilder;
use fatdisk::{MemStore, Volume};
use tempfile::TempDir;

fn write_image(dir: &TempDir, builder: ImageBuilder) -> PathBuf {
    let path = dir.path().join("disk.img");
    fs::write(&path, builder.build().0).unwrap();
    path
}

fn run(bin: &str, args: &[&Path]) -> Output {
    Command::new(bin).args(args).env("FATDISK_LOG", "off").output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8(out.stderr.clone()).unwrap()
}

fn sample() -> ImageBuilder {
    ImageBuilder::new(512, 128, 1).file("/README", b"hello world").dir("/docs")
}

#[test]
fn diskinfo_prints_superblock_and_tally() {
    let tmp = TempDir::new().unwrap();
    let image = write_image(&tmp, sample());

    let out = run(env!("CARGO_BIN_EXE_diskinfo"), &[&image]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("Super block information:\nBlock size: 512\nBlock count: 128\n"));
    assert!(text.contains("Root directory start: 2\n"));
    assert!(text.contains("\nFAT information:\nFree Blocks: 123\nReserved Blocks: 3\nAllocated Blocks: 2\n"));
}

#[test]
fn disklist_root_and_subdirectory() {
    let tmp = TempDir::new().unwrap();
    let image = write_image(&tmp, sample());

    let out = run(env!("CARGO_BIN_EXE_disklist"), &[&image]);
    assert!(out.status.success());
    let lines: Vec<String> = stdout(&out).lines().map(str::to_owned).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("F {:>10} {:<30} 2024/01/15 10:30:00", 11, "README"));
    assert!(lines[1].starts_with("D          0 docs "));

    let out = run(env!("CARGO_BIN_EXE_disklist"), &[&image, Path::new("/docs")]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).lines().count(), 1);

    let out = run(env!("CARGO_BIN_EXE_disklist"), &[&image, Path::new("/missing")]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("directory path '/missing' not found"));
}

#[test]
fn diskget_copies_exact_bytes() {
    let tmp = TempDir::new().unwrap();
    let image = write_image(&tmp, sample());
    let output = tmp.path().join("readme.out");

    let out = run(env!("CARGO_BIN_EXE_diskget"), &[&image, Path::new("/README"), &output]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fs::read(&output).unwrap(), b"hello world");
}

#[test]
fn diskget_missing_file_creates_nothing() {
    let tmp = TempDir::new().unwrap();
    let image = write_image(&tmp, sample());
    let output = tmp.path().join("never");

    let out = run(env!("CARGO_BIN_EXE_diskget"), &[&image, Path::new("/docs/nope"), &output]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out).trim_end(), "Requested file nope not found in /docs.");
    assert!(!output.exists());
}

#[test]
fn diskput_then_diskget_round_trip() {
    let tmp = TempDir::new().unwrap();
    let image = write_image(&tmp, sample());
    let source = tmp.path().join("localfile.txt");
    let data: Vec<u8> = (0..1300u32).map(|i| (i % 251) as u8).collect();
    fs::write(&source, &data).unwrap();

    let out = run(env!("CARGO_BIN_EXE_diskput"), &[&image, &source, Path::new("/sub/out.txt")]);
    assert!(out.status.success(), "{}", stderr(&out));

    let mut volume = Volume::open(MemStore(fs::read(&image).unwrap())).unwrap();
    let root = volume.list("/").unwrap();
    assert!(root.iter().any(|e| e.name_bytes() == b"sub"));

    let back = tmp.path().join("back.txt");
    let out = run(env!("CARGO_BIN_EXE_diskget"), &[&image, Path::new("/sub/out.txt"), &back]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fs::read(&back).unwrap(), data);
}

#[test]
fn diskput_missing_source_names_basename() {
    let tmp = TempDir::new().unwrap();
    let image = write_image(&tmp, sample());
    let before = fs::read(&image).unwrap();
    let source = tmp.path().join("nested").join("ghost.txt");

    let out = run(env!("CARGO_BIN_EXE_diskput"), &[&image, &source, Path::new("/ghost.txt")]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out).trim_end(), "Source file ghost.txt not found.");
    assert_eq!(fs::read(&image).unwrap(), before);
}

#[test]
fn diskput_without_space_leaves_image_unchanged() {
    let tmp = TempDir::new().unwrap();
    let image = write_image(&tmp, ImageBuilder::new(64, 16, 1));
    let before = fs::read(&image).unwrap();
    let source = tmp.path().join("big.bin");
    fs::write(&source, vec![7u8; 64 * 20]).unwrap();

    let out = run(env!("CARGO_BIN_EXE_diskput"), &[&image, &source, Path::new("/big.bin")]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("not enough space"));
    assert_eq!(fs::read(&image).unwrap(), before);
}

#[test]
fn wrong_arity_prints_usage() {
    let out = Command::new(env!("CARGO_BIN_EXE_diskget")).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("Usage: diskget <disk image>"));
}

#[test]
fn bad_magic_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let image = tmp.path().join("junk.img");
    fs::write(&image, vec![0u8; 4096]).unwrap();

    let out = run(env!("CARGO_BIN_EXE_diskinfo"), &[&image]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("not a CSC360FS file system"));
}
