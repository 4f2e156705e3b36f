use folio_core::{
    Command, CommandExecutor, CommandResult, EditCommand, EditorConfig, FolioError, FormatCommand,
    Margins, PageCommand, RichTextSurface, SearchCommand, SearchError, SearchOptions, Surface,
    TextSelection, ToggleAttribute, ValidationError,
};
use pretty_assertions::assert_eq;

fn executor_with(text: &str) -> CommandExecutor {
    CommandExecutor::new(RichTextSurface::with_plain_text(text), &EditorConfig::default())
}

fn find(executor: &mut CommandExecutor, query: &str, options: SearchOptions) -> CommandResult {
    executor
        .execute(Command::Search(SearchCommand::Find {
            query: query.to_string(),
            options,
        }))
        .unwrap()
}

fn step(executor: &mut CommandExecutor, cmd: SearchCommand) -> CommandResult {
    executor.execute(Command::Search(cmd)).unwrap()
}

#[test]
fn test_whole_word_case_insensitive_scenario() {
    let mut executor = executor_with("Cat concatenate cats cat.");
    let result = find(&mut executor, "cat", SearchOptions::new(false, true));

    assert_eq!(result, CommandResult::Matches(vec![0, 21]));
    assert_eq!(executor.surface().selection(), TextSelection::new(0, 3));
}

#[test]
fn test_case_sensitive_search() {
    let mut executor = executor_with("Cat cat CAT");
    let result = find(&mut executor, "cat", SearchOptions::new(true, false));
    assert_eq!(result, CommandResult::Matches(vec![4]));
}

#[test]
fn test_next_cycles_back_to_first_match() {
    let mut executor = executor_with("a1 a2 a3 a4");
    find(&mut executor, "a", SearchOptions::default());
    let len = executor.matches().len();
    assert_eq!(len, 4);

    let mut seen = Vec::new();
    for _ in 0..len {
        match step(&mut executor, SearchCommand::Next) {
            CommandResult::SearchMatch { start, .. } => seen.push(start),
            other => panic!("unexpected result: {other:?}"),
        }
    }
    assert_eq!(seen, vec![3, 6, 9, 0]);
}

#[test]
fn test_previous_is_inverse_order() {
    let mut executor = executor_with("x y x y x");
    find(&mut executor, "x", SearchOptions::default());

    let starts: Vec<usize> = (0..3)
        .map(|_| match step(&mut executor, SearchCommand::Previous) {
            CommandResult::SearchMatch { start, .. } => start,
            other => panic!("unexpected result: {other:?}"),
        })
        .collect();
    assert_eq!(starts, vec![8, 4, 0]);
}

#[test]
fn test_navigation_without_matches() {
    let mut executor = executor_with("nothing here");
    assert_eq!(
        find(&mut executor, "zebra", SearchOptions::default()),
        CommandResult::Matches(vec![])
    );
    assert_eq!(executor.matches().current_index(), None);
    assert_eq!(
        step(&mut executor, SearchCommand::Next),
        CommandResult::SearchNotFound
    );
    assert_eq!(
        step(&mut executor, SearchCommand::Previous),
        CommandResult::SearchNotFound
    );
}

#[test]
fn test_selection_spans_query_length_not_match_length() {
    let mut executor = executor_with("caaat");
    find(&mut executor, "ca+t", SearchOptions::default());
    assert_eq!(executor.surface().selection(), TextSelection::new(0, 4));
}

#[test]
fn test_matches_are_cleared_on_page_change() {
    let mut executor = executor_with("find me");
    find(&mut executor, "me", SearchOptions::default());
    assert!(!executor.matches().is_empty());

    executor
        .execute(Command::Page(PageCommand::GoTo { page: 2 }))
        .unwrap();
    assert!(executor.matches().is_empty());
}

#[test]
fn test_invalid_pattern_is_reported() {
    let mut executor = executor_with("text");
    let err = executor
        .execute(Command::Search(SearchCommand::Find {
            query: "(".to_string(),
            options: SearchOptions::default(),
        }))
        .unwrap_err();
    assert!(matches!(
        err,
        FolioError::Search(SearchError::InvalidPattern(_))
    ));
}

#[test]
fn test_replace_all_rewrites_page_as_plain_text() {
    let mut executor = executor_with("the cat and the Cat");
    executor
        .execute(Command::Edit(EditCommand::SetSelection {
            anchor: 0,
            position: 3,
        }))
        .unwrap();
    executor
        .execute(Command::Format(FormatCommand::Toggle(ToggleAttribute::Bold)))
        .unwrap();

    let result = step(
        &mut executor,
        SearchCommand::ReplaceAll {
            find: "cat".to_string(),
            replacement: "dog".to_string(),
            options: SearchOptions::default(),
        },
    );

    assert_eq!(result, CommandResult::Replaced(2));
    assert_eq!(executor.surface().plain_text(), "the dog and the dog");
    assert_eq!(executor.surface().markup(), "<p>the dog and the dog</p>");
    assert_eq!(executor.surface().page_margins(), Margins::uniform(50.0));
}

#[test]
fn test_find_with_empty_query_fails() {
    let mut executor = executor_with("keep this");
    let err = executor
        .execute(Command::Search(SearchCommand::Find {
            query: String::new(),
            options: SearchOptions::default(),
        }))
        .unwrap_err();

    assert_eq!(err.validation(), Some(&ValidationError::EmptyQuery));
    assert!(executor.matches().is_empty());
}

#[test]
fn test_replace_all_with_empty_find_fails() {
    for replacement in ["", "anything"] {
        let mut executor = executor_with("keep this");
        let err = executor
            .execute(Command::Search(SearchCommand::ReplaceAll {
                find: String::new(),
                replacement: replacement.to_string(),
                options: SearchOptions::default(),
            }))
            .unwrap_err();

        assert!(matches!(
            err,
            FolioError::Search(SearchError::Validation(ValidationError::EmptyQuery))
        ));
        assert_eq!(executor.surface().plain_text(), "keep this");
    }
}

#[test]
fn test_replace_all_expands_capture_groups() {
    let mut executor = executor_with("2024-01-31");
    let result = step(
        &mut executor,
        SearchCommand::ReplaceAll {
            find: r"(\d+)-(\d+)-(\d+)".to_string(),
            replacement: "$3/$2/$1".to_string(),
            options: SearchOptions::default(),
        },
    );
    assert_eq!(result, CommandResult::Replaced(1));
    assert_eq!(executor.surface().plain_text(), "31/01/2024");
}
