use folio_core::{
    BLOB_PREFIX, BLOB_SUFFIX, ColorSwatch, Command, EditCommand, EditorConfig, PAGE_BREAK_MARKER,
    PageCommand, Rgb, Surface, ToggleAttribute,
};
use folio_ui::{
    Answer, Cancelled, ColorPicker, Confirm, EditorController, FileFilter, FilePicker,
    IntegerPicker, LinkOpener, MessageSink, Severity, TextPrompt,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Scripted dialogs. Unscripted pickers cancel and unscripted questions take the default.
#[derive(Default)]
struct FakeDialogs {
    files: VecDeque<PathBuf>,
    colors: VecDeque<Rgb>,
    /// `None` accepts the proposed value.
    integers: VecDeque<Option<u32>>,
    texts: VecDeque<String>,
    answers: VecDeque<Answer>,
    integer_prompts: Vec<(String, u32)>,
    questions: Vec<(String, Answer)>,
    messages: Vec<(Severity, String)>,
    opened: Vec<String>,
}

impl FilePicker for FakeDialogs {
    fn pick_open(&mut self, _title: &str, _filter: FileFilter) -> Result<PathBuf, Cancelled> {
        self.files.pop_front().ok_or(Cancelled)
    }

    fn pick_save(&mut self, _title: &str, _filter: FileFilter) -> Result<PathBuf, Cancelled> {
        self.files.pop_front().ok_or(Cancelled)
    }
}

impl ColorPicker for FakeDialogs {
    fn pick_color(&mut self, _initial: Rgb) -> Result<Rgb, Cancelled> {
        self.colors.pop_front().ok_or(Cancelled)
    }
}

impl IntegerPicker for FakeDialogs {
    fn pick_integer(
        &mut self,
        label: &str,
        initial: u32,
        range: RangeInclusive<u32>,
    ) -> Result<u32, Cancelled> {
        assert_eq!(range, 1..=3000);
        self.integer_prompts.push((label.to_string(), initial));
        match self.integers.pop_front() {
            Some(Some(value)) => Ok(value),
            Some(None) => Ok(initial),
            None => Err(Cancelled),
        }
    }
}

impl TextPrompt for FakeDialogs {
    fn prompt_text(&mut self, _label: &str, _initial: &str) -> Result<String, Cancelled> {
        self.texts.pop_front().ok_or(Cancelled)
    }
}

impl Confirm for FakeDialogs {
    fn confirm(&mut self, question: &str, default: Answer) -> Answer {
        self.questions.push((question.to_string(), default));
        self.answers.pop_front().unwrap_or(default)
    }
}

impl MessageSink for FakeDialogs {
    fn show_message(&mut self, severity: Severity, text: &str) {
        self.messages.push((severity, text.to_string()));
    }
}

impl LinkOpener for FakeDialogs {
    fn open_link(&mut self, href: &str) -> std::io::Result<()> {
        self.opened.push(href.to_string());
        Ok(())
    }
}

fn controller(dir: &tempfile::TempDir) -> EditorController<FakeDialogs> {
    let config = EditorConfig {
        style_store_path: dir.path().join("styles.json"),
        ..EditorConfig::default()
    };
    EditorController::from_config(&config, FakeDialogs::default())
}

fn type_text(controller: &mut EditorController<FakeDialogs>, text: &str) {
    controller.run(Command::Edit(EditCommand::InsertText {
        text: text.to_string(),
    }));
}

#[test]
fn test_insert_image_proposes_native_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    image::RgbImage::new(800, 600).save(&path).unwrap();

    let mut ui = controller(&dir);
    ui.dialogs_mut().files.push_back(path.clone());
    ui.dialogs_mut().integers.extend([None, None]);

    assert!(ui.insert_image());
    assert_eq!(
        ui.dialogs().integer_prompts,
        vec![("Width".to_string(), 800), ("Height".to_string(), 600)]
    );
    let page = ui.state_mut().snapshot()[&1].clone();
    assert!(page.contains("width=\"800\" height=\"600\""));
    assert!(ui.state().is_modified());
}

#[test]
fn test_insert_image_with_overridden_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    image::RgbImage::new(4000, 10).save(&path).unwrap();

    let mut ui = controller(&dir);
    ui.dialogs_mut().files.push_back(path);
    ui.dialogs_mut().integers.extend([None, Some(25)]);

    assert!(ui.insert_image());
    // Native width is proposed clamped to the allowed range.
    assert_eq!(ui.dialogs().integer_prompts[0], ("Width".to_string(), 3000));
    let page = ui.state_mut().snapshot()[&1].clone();
    assert!(page.contains("width=\"3000\" height=\"25\""));
}

#[test]
fn test_undecodable_image_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not an image").unwrap();

    let mut ui = controller(&dir);
    ui.dialogs_mut().files.push_back(path);

    assert!(!ui.insert_image());
    assert_eq!(ui.dialogs().messages.len(), 1);
    assert_eq!(ui.dialogs().messages[0].0, Severity::Error);
    assert!(ui.dialogs().integer_prompts.is_empty());
    assert!(!ui.state().is_modified());
}

#[test]
fn test_cancelled_pickers_do_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);

    assert!(!ui.insert_image());
    assert!(!ui.pick_text_color());
    assert!(!ui.insert_link());
    assert!(!ui.export_html());
    assert!(ui.dialogs().messages.is_empty());
    assert_eq!(ui.state().version(), 0);
}

#[test]
fn test_text_color_updates_swatch() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    ui.dialogs_mut().colors.push_back(Rgb::new(200, 0, 0));

    assert!(ui.pick_text_color());
    assert_eq!(
        ui.state().executor().typing_context().current_color,
        Rgb::new(200, 0, 0)
    );
    assert_eq!(ui.state().swatch(), ColorSwatch::Color(Rgb::new(200, 0, 0)));
}

#[test]
fn test_invalid_line_spacing_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    ui.dialogs_mut().texts.push_back("one and a half".to_string());

    ui.prompt_line_spacing();
    assert!(ui.dialogs().messages.is_empty());
    assert_eq!(ui.state().version(), 0);
}

#[test]
fn test_style_with_empty_name_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    ui.dialogs_mut().texts.push_back(String::new());

    assert!(!ui.save_style());
    assert_eq!(
        ui.dialogs().messages,
        vec![(Severity::Error, "style name must not be empty".to_string())]
    );
    assert!(!dir.path().join("styles.json").exists());
}

#[test]
fn test_saved_style_can_be_applied() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    ui.toggle(ToggleAttribute::Bold);
    ui.set_point_size(20);
    ui.dialogs_mut().texts.push_back("Heading".to_string());
    assert!(ui.save_style());
    assert_eq!(ui.style_names(), vec!["Heading"]);

    ui.toggle(ToggleAttribute::Bold);
    ui.set_point_size(9);
    assert!(ui.apply_style("Heading"));
    let typing = ui.state().executor().typing_context();
    assert!(typing.bold_active);
    assert_eq!(typing.current_point_size, 20);

    assert!(!ui.apply_style("Missing"));
    assert_eq!(
        ui.dialogs().messages.last().unwrap(),
        &(Severity::Error, "No style named 'Missing'".to_string())
    );
}

#[test]
fn test_export_then_open_round_trips_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.html");
    let mut ui = controller(&dir);
    for (page, text) in [(1, "one"), (2, "two"), (3, "three")] {
        ui.go_to_page(page);
        type_text(&mut ui, text);
    }
    let original = ui.state_mut().snapshot();

    ui.dialogs_mut().files.push_back(path.clone());
    assert!(ui.export_html());
    assert!(!ui.state().is_modified());
    assert_eq!(ui.document_path(), Some(path.as_path()));

    let mut reopened = controller(&dir);
    reopened.dialogs_mut().files.push_back(path);
    assert!(reopened.open_document());
    assert_eq!(reopened.state_mut().snapshot(), original);
    assert!(!reopened.state().is_modified());
}

#[test]
fn test_open_with_unsaved_changes_defaults_to_keeping_them() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    type_text(&mut ui, "draft");
    ui.dialogs_mut().files.push_back(dir.path().join("other.html"));

    assert!(!ui.open_document());
    assert_eq!(ui.dialogs().questions.len(), 1);
    assert_eq!(ui.dialogs().questions[0].1, Answer::No);
    // The file picker was never shown.
    assert_eq!(ui.dialogs().files.len(), 1);
    assert!(ui.state_mut().snapshot()[&1].contains("draft"));
}

#[test]
fn test_failed_open_keeps_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.html");
    std::fs::write(
        &path,
        format!("{BLOB_PREFIX}<p>ok</p>{PAGE_BREAK_MARKER}<p>bad<span{BLOB_SUFFIX}"),
    )
    .unwrap();

    let mut ui = controller(&dir);
    type_text(&mut ui, "keep");
    ui.dialogs_mut().answers.push_back(Answer::Yes);
    ui.dialogs_mut().files.push_back(path);

    assert!(!ui.open_document());
    assert_eq!(ui.dialogs().messages.len(), 1);
    assert!(ui.dialogs().messages[0].1.contains("page 2"));
    assert!(ui.state_mut().snapshot()[&1].contains("keep"));
    assert!(ui.state().is_modified());
    assert_eq!(ui.document_path(), None);
}

#[test]
fn test_close_guard() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    assert!(ui.request_close());
    assert!(ui.dialogs().questions.is_empty());

    type_text(&mut ui, "x");
    assert!(!ui.request_close());
    ui.dialogs_mut().answers.push_back(Answer::Yes);
    assert!(ui.request_close());
}

#[test]
fn test_new_document_after_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    type_text(&mut ui, "x");
    ui.run(Command::Page(PageCommand::SetPageCount { count: 3 }));

    ui.dialogs_mut().answers.push_back(Answer::Yes);
    assert!(ui.new_document());
    assert_eq!(ui.state().get_document_state().page_count, 1);
    assert_eq!(ui.state().get_document_state().char_count, 0);
}

#[test]
fn test_open_link_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    ui.dialogs_mut()
        .texts
        .extend(["docs".to_string(), "https://example.com".to_string()]);
    assert!(ui.insert_link());

    assert!(!ui.open_link_at_cursor());
    assert!(ui.dialogs().opened.is_empty());
    assert_eq!(ui.dialogs().questions[0].1, Answer::No);

    ui.dialogs_mut().answers.push_back(Answer::Yes);
    assert!(ui.open_link_at_cursor());
    assert_eq!(ui.dialogs().opened, vec!["https://example.com"]);
}

#[test]
fn test_link_with_empty_address_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    ui.dialogs_mut()
        .texts
        .extend(["docs".to_string(), String::new()]);

    assert!(!ui.insert_link());
    assert_eq!(
        ui.dialogs().messages,
        vec![(Severity::Error, "link address must not be empty".to_string())]
    );
}

#[test]
fn test_search_panel_finds_and_resets() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    type_text(&mut ui, "Cat concatenate cats cat.");

    ui.open_search_panel();
    ui.search_panel_mut().query = "cat".to_string();
    ui.search_panel_mut().whole_word = true;
    assert_eq!(ui.find(), 2);
    assert_eq!(ui.find_next(), Some((21, 24)));
    assert_eq!(ui.find_next(), Some((0, 3)));
    assert_eq!(ui.find_previous(), Some((21, 24)));

    ui.close_search_panel();
    assert!(ui.state().executor().matches().is_empty());
    assert_eq!(ui.find_next(), None);
    ui.open_search_panel();
    assert_eq!(ui.search_panel().query, "");
    assert!(!ui.search_panel().whole_word);
}

#[test]
fn test_search_without_matches_informs() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    type_text(&mut ui, "abc");
    ui.open_search_panel();
    ui.search_panel_mut().query = "xyz".to_string();

    assert_eq!(ui.find(), 0);
    assert_eq!(
        ui.dialogs().messages,
        vec![(Severity::Info, "No matches found".to_string())]
    );
}

#[test]
fn test_search_with_empty_query_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    type_text(&mut ui, "abc");
    ui.open_search_panel();

    assert_eq!(ui.find(), 0);
    assert_eq!(
        ui.dialogs().messages,
        vec![(Severity::Error, "search text must not be empty".to_string())]
    );
}

#[test]
fn test_replace_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    type_text(&mut ui, "the cat and the cat");

    ui.open_replace_panel();
    ui.replace_panel_mut().find = "cat".to_string();
    ui.replace_panel_mut().replacement = "dog".to_string();
    assert_eq!(ui.replace_all(), 2);
    assert_eq!(
        ui.dialogs().messages.last().unwrap(),
        &(Severity::Info, "Replaced 2 occurrences".to_string())
    );
    assert_eq!(
        ui.state().executor().surface().plain_text(),
        "the dog and the dog"
    );

    ui.close_replace_panel();
    assert_eq!(ui.replace_panel().find, "");
}

#[test]
fn test_replace_with_empty_query_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut ui = controller(&dir);
    type_text(&mut ui, "text");
    let version = ui.state().version();

    ui.open_replace_panel();
    ui.replace_panel_mut().replacement = "anything".to_string();
    assert_eq!(ui.replace_all(), 0);
    assert_eq!(
        ui.dialogs().messages,
        vec![(Severity::Error, "search text must not be empty".to_string())]
    );
    assert_eq!(ui.state().version(), version);
}

#[test]
fn test_export_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");
    let mut ui = controller(&dir);
    type_text(&mut ui, "printed");
    ui.set_page_count(2);

    ui.dialogs_mut().files.push_back(path.clone());
    assert!(ui.export_pdf());
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.windows(7).any(|w| w == b"/Count "));
    // PDF export does not save the editable document.
    assert!(ui.state().is_modified());
}
