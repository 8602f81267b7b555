use super::*;

fn gray(v: u8) -> Frame {
    Frame::solid(2, 2, [v, v, v, 255]).unwrap()
}

#[test]
fn queue_yields_latest_frame_once() {
    let mut q = FrameQueue::new();
    assert!(q.next_frame().is_none());

    q.push(gray(10));
    q.push(gray(200));
    assert_eq!(q.dropped(), 1);
    assert!(q.has_pending());

    let f = q.next_frame().unwrap();
    assert_eq!(f.rgba8_at(0, 0), [200, 200, 200, 255]);
    assert!(q.next_frame().is_none());
}

#[test]
fn image_sequence_plays_files_in_name_order() {
    let dir = PathBuf::from("target").join("unit_image_sequence");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    for (name, v) in [("b.png", 20u8), ("a.png", 10u8)] {
        image::RgbaImage::from_pixel(2, 2, image::Rgba([v, v, v, 255]))
            .save(dir.join(name))
            .unwrap();
    }
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let mut seq = ImageSequence::from_dir(&dir).unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.next_frame().unwrap().rgba8_at(0, 0)[0], 10);
    assert_eq!(seq.next_frame().unwrap().rgba8_at(0, 0)[0], 20);
    assert!(seq.is_exhausted());
    assert!(seq.next_frame().is_none());
}

#[test]
fn image_sequence_skips_undecodable_files() {
    let mut seq = ImageSequence::new(vec![PathBuf::from("target/does-not-exist.png")]);
    assert!(seq.next_frame().is_none());
    assert!(seq.is_exhausted());
}

#[test]
fn empty_directory_is_a_frame_error() {
    let dir = PathBuf::from("target").join("unit_image_sequence_empty");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    assert!(matches!(
        ImageSequence::from_dir(&dir),
        Err(FieldError::Frame(_))
    ));
}

#[test]
fn fixed_viewport_reports_both_ratios() {
    let v = FixedViewport::new(16.0 / 9.0, 4.0 / 3.0);
    assert_eq!(v.viewport_aspect_ratio(), 16.0 / 9.0);
    assert_eq!(v.source_aspect_ratio(), 4.0 / 3.0);
}
