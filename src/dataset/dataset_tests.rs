use super::*;
use crate::config::DatasetLayout;
use image::Luma;
use std::fs;

fn flat(value: u8, width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("eigenfaces-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn ids_and_class_ids_follow_insertion_order() {
    let mut dataset = Dataset::new(None);
    let labels = [7, 3, 7, 5, 3];
    for (i, &label) in labels.iter().enumerate() {
        let partition = if i < 3 {
            Partition::Training
        } else {
            Partition::Test
        };
        let id = dataset.push_gray(flat(i as u8, 2, 2), label, partition).unwrap();
        assert_eq!(id, i);
    }
    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.unique_classes(), 3);
    assert_eq!(dataset.class_of_label(7), Some(0));
    assert_eq!(dataset.class_of_label(3), Some(1));
    assert_eq!(dataset.class_of_label(5), Some(2));
    assert_eq!(dataset.class_groups()[0], vec![0, 2]);
    assert_eq!(dataset.class_groups()[1], vec![1, 4]);
    assert_eq!(dataset.training_ids(), &[0, 1, 2]);
    assert_eq!(dataset.test_ids(), &[3, 4]);
    assert_eq!(dataset.class_id(4), 1);
}

#[test]
fn first_image_fixes_the_canonical_size() {
    let mut dataset = Dataset::new(None);
    dataset.push_gray(flat(10, 4, 2), 1, Partition::Training).unwrap();
    dataset.push_gray(flat(20, 8, 8), 1, Partition::Training).unwrap();
    assert_eq!(dataset.image_size(), Some((4, 2)));
    assert_eq!(dataset.pixel_count(), 8);
    assert_eq!(dataset.image(1).dimensions(), (4, 2));
    assert!(dataset.vector(1).iter().all(|&p| p == 20.0));
}

#[test]
fn declared_size_wins_over_first_image() {
    let mut dataset = Dataset::new(Some((3, 3)));
    let rgb = image::RgbImage::from_pixel(6, 6, image::Rgb([0, 0, 0]));
    dataset
        .push(&DynamicImage::ImageRgb8(rgb), 1, Partition::Test)
        .unwrap();
    assert_eq!(dataset.pixel_count(), 9);
    assert_eq!(dataset.partition(0), Partition::Test);
}

#[test]
fn appending_keeps_existing_entries() {
    let mut dataset = Dataset::new(None);
    for i in 0..4 {
        dataset
            .push_gray(flat(i * 10, 2, 2), i as i32 % 2, Partition::Training)
            .unwrap();
    }
    let before = dataset.labels().to_vec();
    let id = dataset.push_gray(flat(99, 2, 2), 42, Partition::Test).unwrap();
    assert_eq!(id, 4);
    assert_eq!(&dataset.labels()[..4], before.as_slice());
    assert_eq!(dataset.vector(2)[0], 20.0);
    assert_eq!(dataset.class_of_label(42), Some(2));
}

#[test]
fn load_directory_skips_bad_lines_and_missing_images() {
    let dir = scratch_dir("layout");
    let layout = DatasetLayout::default();
    let training = dir.join(&layout.training_folder);
    let test = dir.join(&layout.test_folder);
    fs::create_dir_all(&training).unwrap();
    fs::create_dir_all(&test).unwrap();
    flat(10, 4, 4).save(training.join("a.png")).unwrap();
    flat(200, 4, 4).save(training.join("b.png")).unwrap();
    flat(12, 8, 8).save(test.join("c.png")).unwrap();
    fs::write(
        training.join(&layout.label_file),
        "a.png;1\nface1.png\nb.png;2\nmissing.png;2\n",
    )
    .unwrap();
    fs::write(test.join(&layout.label_file), "c.png;1\n").unwrap();

    let dataset = Dataset::from_directory(&dir, &EngineConfig::default());
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.training_ids(), &[0, 1]);
    assert_eq!(dataset.test_ids(), &[2]);
    assert_eq!(dataset.labels(), &[1, 2, 1]);
    assert_eq!(dataset.image(2).dimensions(), (4, 4));
    assert_eq!(dataset.path(0), Some(training.join("a.png").as_path()));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_label_file_yields_empty_dataset() {
    let dir = scratch_dir("empty");
    let dataset = Dataset::from_directory(&dir, &EngineConfig::default());
    assert!(dataset.is_empty());
    let _ = fs::remove_dir_all(&dir);
}
