use super::*;
use shared::{
    domain::{FieldId, FileInputId},
    protocol::{wire, ActionKind},
};

use crate::{envelope::PartValue, registry::MemoryRegistry};

fn with_camera_params(registry: &mut MemoryRegistry) {
    registry.set_text(FieldId::FocalLength, "50");
    registry.set_text(FieldId::PixelSize, "0.003");
    registry.set_text(FieldId::SensorResolution, "6000x4000");
    registry.set_text(FieldId::SensorSize, "36x24");
    registry.set_text(FieldId::Distance, "1200");
}

fn image_pair() -> Vec<SelectedFile> {
    vec![
        SelectedFile::new("left.png", b"left".to_vec()),
        SelectedFile::new("right.png", b"right".to_vec()),
    ]
}

#[test]
fn calibration_upload_requires_exactly_one_file() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::UploadCalibration);
    let mut registry = MemoryRegistry::new();

    let empty = validate(descriptor, ModeFlags::default(), &registry);
    assert_eq!(
        empty.missing,
        vec![InputRef::File(FileInputId::CalibrationFile)]
    );

    registry.set_files(
        FileInputId::CalibrationFile,
        vec![
            SelectedFile::new("a.json", b"{}".to_vec()),
            SelectedFile::new("b.json", b"{}".to_vec()),
        ],
    );
    assert!(!validate(descriptor, ModeFlags::default(), &registry).is_valid());

    registry.set_files(
        FileInputId::CalibrationFile,
        vec![SelectedFile::new("a.json", b"{}".to_vec())],
    );
    let envelope = validate(descriptor, ModeFlags::default(), &registry)
        .into_envelope()
        .expect("valid");
    assert_eq!(envelope.part_names(), vec![wire::CALIBRATION_FILE]);
}

#[test]
fn blank_text_counts_as_missing() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::UploadParams);
    let mut registry = MemoryRegistry::new();
    with_camera_params(&mut registry);
    registry.set_text(FieldId::Distance, "   ");
    registry.set_files(
        FileInputId::ChessboardPair,
        vec![
            SelectedFile::new("board1.jpg", b"1".to_vec()),
            SelectedFile::new("board2.jpg", b"2".to_vec()),
        ],
    );
    registry.set_text(FieldId::NumTiles, "9x6");

    let validation = validate(descriptor, ModeFlags::default(), &registry);
    assert_eq!(
        validation.missing,
        vec![
            InputRef::Field(FieldId::Distance),
            InputRef::Field(FieldId::SquareSize)
        ]
    );
    assert_eq!(validation.checked.len(), 8);
}

#[test]
fn pair_inputs_need_two_distinct_files() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::UploadAndProcess);
    let mut registry = MemoryRegistry::new();

    registry.set_files(
        FileInputId::ImagePair,
        vec![SelectedFile::new("left.png", b"left".to_vec())],
    );
    assert!(!validate(descriptor, ModeFlags::default(), &registry).is_valid());

    registry.set_files(
        FileInputId::ImagePair,
        vec![
            SelectedFile::new("same.png", b"1".to_vec()),
            SelectedFile::new("same.png", b"2".to_vec()),
        ],
    );
    assert!(!validate(descriptor, ModeFlags::default(), &registry).is_valid());

    registry.set_files(FileInputId::ImagePair, image_pair());
    let envelope = validate(descriptor, ModeFlags::default(), &registry)
        .into_envelope()
        .expect("valid");
    assert_eq!(envelope.part_names(), vec![wire::IMAGE1, wire::IMAGE2]);
}

#[test]
fn params_envelope_follows_wire_order() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::UploadParams);
    let mut registry = MemoryRegistry::new();
    with_camera_params(&mut registry);
    registry.set_files(
        FileInputId::ChessboardPair,
        vec![
            SelectedFile::new("board1.jpg", b"1".to_vec()),
            SelectedFile::new("board2.jpg", b"2".to_vec()),
        ],
    );
    registry.set_text(FieldId::NumTiles, "9x6");
    registry.set_text(FieldId::SquareSize, "25");

    let envelope = validate(descriptor, ModeFlags::default(), &registry)
        .into_envelope()
        .expect("valid");
    assert_eq!(
        envelope.part_names(),
        vec![
            "focal_length",
            "pixel_size",
            "sensor_resolution",
            "sensor_size",
            "distance",
            "chessboard_image1",
            "chessboard_image2",
            "num_tiles",
            "square_size",
        ]
    );
}

#[test]
fn process_in_image_mode_sends_image_pair() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::Process);
    let mut registry = MemoryRegistry::new();
    with_camera_params(&mut registry);
    registry.set_files(FileInputId::ImagePair, image_pair());
    registry.set_files(
        FileInputId::ModelFile,
        vec![SelectedFile::new("scan.ply", b"ply".to_vec())],
    );

    let envelope = validate(descriptor, ModeFlags::default(), &registry)
        .into_envelope()
        .expect("valid");
    let names = envelope.part_names();
    assert!(names.contains(&wire::IMAGE1));
    assert!(names.contains(&wire::IMAGE2));
    assert!(!names.contains(&wire::MODEL));
}

#[test]
fn process_in_model_mode_requires_images_count() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::Process);
    let modes = ModeFlags {
        calibration_mode: false,
        model_mode: true,
    };
    let mut registry = MemoryRegistry::new();
    with_camera_params(&mut registry);
    registry.set_files(
        FileInputId::ModelFile,
        vec![SelectedFile::new("scan.ply", b"ply".to_vec())],
    );

    let validation = validate(descriptor, modes, &registry);
    assert_eq!(
        validation.missing,
        vec![InputRef::Field(FieldId::ImagesCount)]
    );

    registry.set_text(FieldId::ImagesCount, "12");
    let envelope = validate(descriptor, modes, &registry)
        .into_envelope()
        .expect("valid");
    let model_part = envelope
        .parts()
        .iter()
        .find(|part| part.name == wire::MODEL)
        .expect("model part");
    assert!(matches!(&model_part.value, PartValue::File(file) if file.name == "scan.ply"));
    assert_eq!(
        envelope.entered_values().get(&FieldId::ImagesCount),
        Some(&"12".to_string())
    );
}

#[test]
fn images_count_must_be_a_positive_integer() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::UploadModel);
    let mut registry = MemoryRegistry::new();
    registry.set_files(
        FileInputId::ModelFile,
        vec![SelectedFile::new("scan.obj", b"obj".to_vec())],
    );

    for bad in ["zero", "0", "-3", "2.5"] {
        registry.set_text(FieldId::ImagesCount, bad);
        let validation = validate(descriptor, ModeFlags::default(), &registry);
        assert_eq!(
            validation.missing,
            vec![InputRef::Field(FieldId::ImagesCount)],
            "{bad} should be rejected"
        );
    }

    registry.set_text(FieldId::ImagesCount, " 8 ");
    let envelope = validate(descriptor, ModeFlags::default(), &registry)
        .into_envelope()
        .expect("valid");
    assert_eq!(
        envelope.part_names(),
        vec![wire::IMAGES_COUNT, wire::MODEL_FILE]
    );
}

#[test]
fn into_envelope_reports_every_missing_input() {
    let descriptor = ActionDescriptor::for_kind(ActionKind::UploadModel);
    let registry = MemoryRegistry::new();
    let err = validate(descriptor, ModeFlags::default(), &registry)
        .into_envelope()
        .expect_err("must fail");
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "missing required inputs: images_count, model_file"
    );
}
