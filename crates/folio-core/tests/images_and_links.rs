use folio_core::{
    Command, CommandExecutor, CommandResult, DecodeError, EditCommand, FolioError, ImageRef,
    LinkSpec, Rgb, Surface, ValidationError, clamp_dimension, import, probe_image,
};
use pretty_assertions::assert_eq;

#[test]
fn test_image_with_native_size_is_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    image::RgbImage::new(800, 600).save(&path).unwrap();

    let (width, height) = probe_image(&path).unwrap();
    assert_eq!((width, height), (800, 600));

    let mut executor = CommandExecutor::empty();
    let src = path.display().to_string();
    let result = executor
        .execute(Command::Edit(EditCommand::InsertImage(ImageRef::new(
            src.clone(),
            clamp_dimension(width),
            clamp_dimension(height),
        ))))
        .unwrap();
    assert_eq!(result, CommandResult::Inserted(0..1));

    let pages = import(executor.export_blob().as_str()).unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[&1].contains(&format!("src=\"{src}\"")));
    assert!(pages[&1].contains("width=\"800\" height=\"600\""));
}

#[test]
fn test_image_with_wrong_extension_is_still_probed() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("real.png");
    image::RgbImage::new(3, 2).save(&png).unwrap();
    let disguised = dir.path().join("picture.dat");
    std::fs::copy(&png, &disguised).unwrap();

    assert_eq!(probe_image(&disguised).unwrap(), (3, 2));
}

#[test]
fn test_undecodable_image_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not a png").unwrap();

    let err: DecodeError = probe_image(&path).unwrap_err();
    assert_eq!(err.path, path);
}

#[test]
fn test_insert_link() {
    let mut executor = CommandExecutor::empty();
    executor
        .execute(Command::Edit(EditCommand::InsertLink {
            text: "docs".to_string(),
            href: "https://example.com/docs".to_string(),
        }))
        .unwrap();

    let format = executor.surface().char_format_at(2);
    assert_eq!(format.anchor_href.as_deref(), Some("https://example.com/docs"));
    assert!(format.is_underlined());
    assert_eq!(format.color, Some(Rgb::LINK_BLUE));
    assert!(
        executor
            .surface()
            .markup()
            .contains("<a href=\"https://example.com/docs\">")
    );

    executor
        .execute(Command::Edit(EditCommand::SetSelection {
            anchor: 1,
            position: 1,
        }))
        .unwrap();
    assert_eq!(
        executor.link_at_cursor().as_deref(),
        Some("https://example.com/docs")
    );
}

#[test]
fn test_text_typed_after_link_is_not_linked() {
    let mut executor = CommandExecutor::empty();
    executor
        .execute(Command::Edit(EditCommand::InsertLink {
            text: "here".to_string(),
            href: "https://example.com".to_string(),
        }))
        .unwrap();
    executor
        .execute(Command::Edit(EditCommand::InsertText {
            text: " and more".to_string(),
        }))
        .unwrap();

    assert_eq!(executor.surface().char_format_at(8).anchor_href, None);
    assert_eq!(executor.surface().plain_text(), "here and more");
}

#[test]
fn test_link_requires_text_and_url() {
    let mut executor = CommandExecutor::empty();
    let err = executor
        .execute(Command::Edit(EditCommand::InsertLink {
            text: "  ".to_string(),
            href: "https://example.com".to_string(),
        }))
        .unwrap_err();
    assert_eq!(err.validation(), Some(&ValidationError::EmptyLinkText));

    assert_eq!(
        LinkSpec::new("text", ""),
        Err(ValidationError::EmptyLinkUrl)
    );
    assert!(matches!(
        executor.execute(Command::Edit(EditCommand::InsertLink {
            text: "text".to_string(),
            href: String::new(),
        })),
        Err(FolioError::Validation(ValidationError::EmptyLinkUrl))
    ));
    assert_eq!(executor.surface().char_count(), 0);
}
