use folio_core::{
    BlockFormat, CharAttribute, CharFormat, Command, CommandExecutor, EditCommand, EditorConfig,
    FormatCommand, IndentDirection, Rgb, RichTextSurface, StyleRecord, Surface, SurfaceChange,
    ToggleAttribute,
};
use pretty_assertions::assert_eq;

fn executor_with(text: &str) -> CommandExecutor {
    CommandExecutor::new(RichTextSurface::with_plain_text(text), &EditorConfig::default())
}

fn select(executor: &mut CommandExecutor, anchor: usize, position: usize) {
    executor
        .execute(Command::Edit(EditCommand::SetSelection { anchor, position }))
        .unwrap();
}

fn format(executor: &mut CommandExecutor, cmd: FormatCommand) {
    executor.execute(Command::Format(cmd)).unwrap();
}

fn block_formats(executor: &CommandExecutor) -> Vec<BlockFormat> {
    executor
        .surface()
        .document()
        .blocks()
        .iter()
        .map(|b| b.format)
        .collect()
}

#[test]
fn test_toggle_twice_restores_weight() {
    let mut executor = executor_with("plain words");
    select(&mut executor, 0, 5);

    format(&mut executor, FormatCommand::Toggle(ToggleAttribute::Bold));
    assert!(executor.typing_context().bold_active);
    assert!(executor.surface().char_format_at(5).is_bold());

    format(&mut executor, FormatCommand::Toggle(ToggleAttribute::Bold));
    assert!(!executor.typing_context().bold_active);
    assert!(!executor.surface().char_format_at(5).is_bold());
}

#[test]
fn test_toggle_state_is_not_read_back_from_content() {
    let mut executor = executor_with("mixed");
    select(&mut executor, 0, 2);
    format(&mut executor, FormatCommand::Toggle(ToggleAttribute::Italic));

    // Selecting already-italic text does not resynchronize the flag.
    select(&mut executor, 0, 5);
    format(&mut executor, FormatCommand::Toggle(ToggleAttribute::Italic));
    assert!(!executor.typing_context().italic_active);
    assert!(!executor.surface().char_format_at(1).is_italic());
}

#[test]
fn test_attribute_applies_to_selection_only() {
    let mut executor = executor_with("one two three");
    select(&mut executor, 4, 7);
    format(
        &mut executor,
        FormatCommand::SetAttribute(CharAttribute::FontFamily("Courier New".to_string())),
    );

    assert_eq!(
        executor.surface().char_format_at(5).font_family.as_deref(),
        Some("Courier New")
    );
    assert_eq!(executor.surface().char_format_at(3).font_family, None);
    assert_eq!(executor.surface().char_format_at(9).font_family, None);
    assert_eq!(executor.typing_context().current_font_family, "Courier New");
}

#[test]
fn test_caret_outside_any_word_changes_only_typing_context() {
    let mut executor = executor_with("a  b");
    select(&mut executor, 2, 2);
    format(
        &mut executor,
        FormatCommand::SetAttribute(CharAttribute::PointSize(30)),
    );

    assert_eq!(executor.typing_context().current_point_size, 30);
    assert_eq!(executor.surface().markup(), "<p>a  b</p>");
}

#[test]
fn test_indent_is_whole_document_and_floors_at_zero() {
    let mut executor = executor_with("first\nsecond\nthird");
    select(&mut executor, 0, 0);

    format(&mut executor, FormatCommand::Indent(IndentDirection::Increase));
    format(&mut executor, FormatCommand::Indent(IndentDirection::Increase));
    assert_eq!(
        block_formats(&executor),
        vec![BlockFormat::new().with_indent(2); 3]
    );
    assert!(executor.surface().markup().contains("margin-left:80px;"));

    for _ in 0..3 {
        format(&mut executor, FormatCommand::Indent(IndentDirection::Decrease));
    }
    assert_eq!(executor.typing_context().current_indent, 0);
    assert_eq!(
        block_formats(&executor),
        vec![BlockFormat::new().with_indent(0); 3]
    );
}

#[test]
fn test_line_spacing_applies_to_caret_paragraph() {
    let mut executor = executor_with("one\ntwo\nthree");
    select(&mut executor, 5, 5);
    format(
        &mut executor,
        FormatCommand::SetLineSpacing {
            input: " 1.5 ".to_string(),
        },
    );

    assert_eq!(executor.typing_context().current_line_spacing, 1.5);
    assert_eq!(
        block_formats(&executor),
        vec![
            BlockFormat::new(),
            BlockFormat::new().with_line_height_percent(150),
            BlockFormat::new(),
        ]
    );
}

#[test]
fn test_line_spacing_parse_failure_is_silent() {
    let mut executor = executor_with("text");
    let result = executor.execute(Command::Format(FormatCommand::SetLineSpacing {
        input: "double".to_string(),
    }));
    assert!(result.is_ok());
    assert_eq!(block_formats(&executor), vec![BlockFormat::new()]);
}

#[test]
fn test_apply_style_updates_context_and_selection() {
    let mut executor = executor_with("heading body");
    select(&mut executor, 0, 7);

    let mut style = StyleRecord::new("Heading");
    style.font_family = "Arial".to_string();
    style.point_size = 18;
    style.bold = true;
    style.line_spacing = 2.0;
    style.color = Rgb::new(0x33, 0x66, 0x99);
    format(&mut executor, FormatCommand::ApplyStyle(style));

    let ctx = executor.typing_context();
    assert!(ctx.bold_active);
    assert_eq!(ctx.current_point_size, 18);
    assert_eq!(ctx.current_line_spacing, 2.0);

    let applied = executor.surface().char_format_at(3);
    assert_eq!(applied.font_family.as_deref(), Some("Arial"));
    assert_eq!(applied.color, Some(Rgb::new(0x33, 0x66, 0x99)));
    assert!(!executor.surface().char_format_at(10).is_bold());
    assert_eq!(
        block_formats(&executor),
        vec![BlockFormat::new().with_line_height_percent(200)]
    );
}

#[test]
fn test_typed_text_takes_typing_context_format() {
    let mut executor = CommandExecutor::empty();
    format(&mut executor, FormatCommand::Toggle(ToggleAttribute::Underline));
    format(&mut executor, FormatCommand::SetTextColor(Rgb::new(255, 0, 0)));
    executor
        .execute(Command::Edit(EditCommand::InsertText {
            text: "red".to_string(),
        }))
        .unwrap();

    let expected = executor.typing_context().char_format();
    assert_eq!(executor.surface().char_format_at(1), expected);
    assert_eq!(executor.surface().char_format_at(3), expected);
}

#[test]
fn test_reconciliation_does_not_observe_itself() {
    let mut executor = CommandExecutor::empty();
    format(&mut executor, FormatCommand::Toggle(ToggleAttribute::Bold));

    // Typing straight into the widget, as a frontend does on keystrokes.
    executor
        .surface_mut()
        .insert_text("abc", &CharFormat::default());
    let changes = executor.process_surface_changes();

    assert_eq!(changes, vec![SurfaceChange::TextChanged { range: 0..3 }]);
    assert!(executor.surface().char_format_at(3).is_bold());
    assert!(executor.surface_mut().take_changes().is_empty());
    assert!(executor.process_surface_changes().is_empty());
}

#[test]
fn test_reconciliation_skips_when_text_is_selected() {
    let mut executor = executor_with("xy");
    format(&mut executor, FormatCommand::Toggle(ToggleAttribute::Bold));

    let surface = executor.surface_mut();
    surface.insert_text("z", &CharFormat::default());
    surface.block_signals(true);
    surface.set_selection(folio_core::TextSelection::new(0, 1));
    surface.block_signals(false);
    executor.process_surface_changes();

    assert!(!executor.surface().char_format_at(1).is_bold());
}
