use std::sync::Arc;

use gallery_storage::{
    default_collection, DocumentBackend, GalleryEntryInput, GalleryStore, LocalFileBackend,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn input() -> GalleryEntryInput {
    GalleryEntryInput {
        title: "Spring Cup".to_string(),
        description: "Heats on the lake".to_string(),
        date: "2025-04-20".to_string(),
        competition: "Spring Cup".to_string(),
        image_url: "/uploads/photo_1.jpg".to_string(),
    }
}

#[tokio::test]
async fn test_missing_file_loads_none() {
    let dir = TempDir::new().unwrap();
    let backend = LocalFileBackend::new(dir.path().join("gallery.json"));

    assert_eq!(backend.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("nested").join("gallery.json");
    let backend = LocalFileBackend::new(&path);

    backend.save(b"[]".to_vec()).await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"[]".to_vec());
    assert!(!path.with_file_name("gallery.json.tmp").exists());
    assert_eq!(backend.load().await.unwrap(), Some(b"[]".to_vec()));
}

#[tokio::test]
async fn test_store_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gallery.json");

    let store = GalleryStore::new(Arc::new(LocalFileBackend::new(&path)));
    let entry = store.add(input()).await.unwrap();

    // A fresh store over the same file sees the same collection
    let reopened = GalleryStore::new(Arc::new(LocalFileBackend::new(&path)));
    let mut expected = default_collection();
    expected.push(entry);
    assert_eq!(reopened.read_all().await, expected);
}

#[tokio::test]
async fn test_unreadable_path_reads_default() {
    let dir = TempDir::new().unwrap();
    // A directory where the document should be makes reads fail
    let store = GalleryStore::new(Arc::new(LocalFileBackend::new(dir.path())));

    assert!(store.load().await.is_err());
    assert_eq!(store.read_all().await, default_collection());
}

#[tokio::test]
async fn test_describe_names_the_file() {
    let backend = LocalFileBackend::new("/var/lib/gallery/gallery.json");
    assert_eq!(backend.describe(), "file:///var/lib/gallery/gallery.json");
}
