// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{cell::{Cell, RefCell},
          rc::Rc};

use pretty_assertions::assert_eq;
use r3bl_readline::{ActionContext, CandidateCompletionHandler, CompleteOutcome,
                    CompletionHandler, EditModeKind, InMemoryHistory, Key, LineBuffer,
                    Readline, ReadlineConfig, ReadlineError, ViStatus, WordListCompleter,
                    test_fixtures::TestConnection};

type Lines = Rc<RefCell<Vec<Option<String>>>>;

fn start(readline: &Readline, conn: &Rc<TestConnection>, prompt: &str) -> Lines {
    let lines: Lines = Rc::new(RefCell::new(vec![]));
    let lines_clone = lines.clone();
    readline
        .readline(conn.clone(), prompt, move |maybe_line| {
            lines_clone.borrow_mut().push(maybe_line);
        })
        .unwrap();
    conn.run_tasks();
    lines
}

fn start_with_completion(
    readline: &Readline,
    conn: &Rc<TestConnection>,
    handler: impl CompletionHandler + 'static,
) -> Lines {
    let lines: Lines = Rc::new(RefCell::new(vec![]));
    let lines_clone = lines.clone();
    readline
        .readline_with_completion(
            conn.clone(),
            "> ",
            move |maybe_line| lines_clone.borrow_mut().push(maybe_line),
            handler,
        )
        .unwrap();
    conn.run_tasks();
    lines
}

fn with_history(entries: &[&str]) -> Readline {
    let config = ReadlineConfig::default();
    let history = InMemoryHistory::with_entries(config.history_size, entries.iter().copied());
    Readline::new_with_history(config, Box::new(history))
}

fn buffer_text(readline: &Readline) -> String {
    readline.buffer().map(|it| it.text()).unwrap_or_default()
}

fn git_words() -> CandidateCompletionHandler {
    CandidateCompletionHandler::new(WordListCompleter::new(["git", "grep", "go"]))
}

#[test]
fn test_accept_line() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");
    assert_eq!(conn.screen_lines(), vec![">"]);
    assert!(readline.is_reading());

    conn.read_str("hello");
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("hello".to_string())]);
    assert_eq!(conn.screen_lines(), vec!["> hello"]);
    assert_eq!(conn.cursor(), (1, 0));
    assert!(!readline.is_reading());
    assert!(!conn.has_stdin_handler());
}

#[test]
fn test_insert_in_the_middle() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("34");
    conn.read_keys(&[Key::CtrlA]);
    conn.read_str("12");
    assert_eq!(conn.screen_lines(), vec!["> 1234"]);
    assert_eq!(conn.cursor(), (0, 4));
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("1234".to_string())]);
}

#[test]
fn test_whole_input_in_one_read() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("ab\x1b[Dc\r");

    assert_eq!(*lines.borrow(), vec![Some("acb".to_string())]);
}

#[test]
fn test_previous_handlers_come_back() {
    let conn = Rc::new(TestConnection::default());
    let seen = Rc::new(RefCell::new(String::new()));
    let seen_clone = seen.clone();
    r3bl_readline::Connection::set_stdin_handler(
        &*conn,
        Some(Rc::new(move |chunk: &[char]| seen_clone.borrow_mut().extend(chunk))),
    );

    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");
    conn.read_str("x\r");
    conn.read_str("after");

    assert_eq!(*lines.borrow(), vec![Some("x".to_string())]);
    assert_eq!(*seen.borrow(), "after");
}

#[test]
fn test_second_readline_is_rejected() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let _lines = start(&readline, &conn, "> ");

    let result = readline.readline(conn.clone(), "> ", |_| {});
    assert!(matches!(result, Err(ReadlineError::AlreadyReading)));
}

#[test]
fn test_callback_can_start_the_next_line() {
    fn read_forever(readline: &Readline, conn: &Rc<TestConnection>, lines: &Lines) {
        let (readline_clone, conn_clone, lines_clone) =
            (readline.clone(), conn.clone(), lines.clone());
        readline
            .readline(conn.clone(), "> ", move |maybe_line| {
                let done = maybe_line.is_none();
                lines_clone.borrow_mut().push(maybe_line);
                if !done {
                    read_forever(&readline_clone, &conn_clone, &lines_clone);
                }
            })
            .unwrap();
    }

    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines: Lines = Rc::new(RefCell::new(vec![]));
    read_forever(&readline, &conn, &lines);

    conn.read_str("a\rb\r\x04");

    assert_eq!(
        *lines.borrow(),
        vec![Some("a".to_string()), Some("b".to_string()), None]
    );
    assert_eq!(conn.screen_lines(), vec!["> a", "> b", ">"]);
    assert!(!readline.is_reading());
}

#[test]
fn test_queued_input_waits_for_readline() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    readline.queue_event(&['h', 'i', '\r']).unwrap();

    let lines = start(&readline, &conn, "> ");

    assert_eq!(*lines.borrow(), vec![Some("hi".to_string())]);
}

#[test]
fn test_eof_on_empty_line() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read(b"\x04");

    assert_eq!(*lines.borrow(), vec![None]);
    assert!(!readline.is_reading());
}

#[test]
fn test_ctrl_d_deletes_when_line_is_not_empty() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("ab");
    conn.read(b"\x04");
    assert_eq!(conn.bell_count(), 1);
    conn.read_keys(&[Key::CtrlA]);
    conn.read(b"\x04");
    assert_eq!(buffer_text(&readline), "b");
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("b".to_string())]);
}

#[test]
fn test_interrupt_starts_over() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("abc");
    conn.read(b"\x03");

    assert!(lines.borrow().is_empty());
    assert!(readline.is_reading());
    assert_eq!(buffer_text(&readline), "");
    assert_eq!(conn.screen_lines(), vec!["> abc", ">"]);
    assert_eq!(conn.cursor(), (1, 2));

    conn.read_str("x\r");
    assert_eq!(*lines.borrow(), vec![Some("x".to_string())]);
}

#[test]
fn test_interrupt_during_search() {
    let conn = Rc::new(TestConnection::default());
    let readline = with_history(&["asdf jkl", "footing"]);
    let lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::CtrlR]);
    conn.read_str("a");
    conn.read(b"\x03");

    assert_eq!(buffer_text(&readline), "");
    assert_eq!(
        conn.screen_lines(),
        vec!["(reverse-i-search) `a': asdf jkl", ">"]
    );
    conn.read_str("x\r");
    assert_eq!(*lines.borrow(), vec![Some("x".to_string())]);
}

#[test]
fn test_backslash_continues_line() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "$ ");

    conn.read_str("echo \\");
    conn.read_keys(&[Key::Enter]);
    assert!(lines.borrow().is_empty());
    conn.read_str("world");
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("echo world".to_string())]);
    assert_eq!(conn.screen_lines(), vec!["$ echo \\", "> world"]);
}

#[test]
fn test_open_quote_continues_line() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_continuation_prompt(". "));
    let lines = start(&readline, &conn, "$ ");

    conn.read_str("echo \"a\r");
    conn.read_str("b\"\r");

    assert_eq!(*lines.borrow(), vec![Some("echo \"a\nb\"".to_string())]);
    assert_eq!(conn.screen_lines(), vec!["$ echo \"a", ". b\""]);
}

#[test]
fn test_accepted_lines_go_to_history() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let _lines = start(&readline, &conn, "> ");
    conn.read_str("first\r");
    let lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::Up]);
    assert_eq!(buffer_text(&readline), "first");
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("first".to_string())]);
    assert_eq!(
        readline.with_history(|history| history.len()).unwrap(),
        1
    );
}

#[test]
fn test_reverse_search_then_enter() {
    let conn = Rc::new(TestConnection::default());
    let readline = with_history(&["asdf jkl", "footing"]);
    let lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::CtrlR]);
    conn.read_str("a");
    assert_eq!(conn.screen_lines(), vec!["(reverse-i-search) `a': asdf jkl"]);
    assert_eq!(conn.cursor(), (0, 24));
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("asdf jkl".to_string())]);
    assert_eq!(conn.screen_lines(), vec!["> asdf jkl"]);
}

#[test]
fn test_reverse_search_then_arrows() {
    for key in [Key::Left, Key::Right] {
        let conn = Rc::new(TestConnection::default());
        let readline = with_history(&["asdf jkl", "footing"]);
        let lines = start(&readline, &conn, "> ");

        conn.read_keys(&[Key::CtrlR]);
        conn.read_str("a");
        conn.read_keys(&[key]);
        assert_eq!(buffer_text(&readline), "asdf jkl");
        conn.read_keys(&[Key::Enter]);

        assert_eq!(*lines.borrow(), vec![Some("asdf jkl".to_string())]);
    }
}

#[test]
fn test_reverse_search_then_down() {
    let conn = Rc::new(TestConnection::default());
    let readline = with_history(&["asdf jkl", "footing"]);
    let lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::CtrlR]);
    conn.read_str("a");
    conn.read_keys(&[Key::Down, Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("footing".to_string())]);
}

#[test]
fn test_reverse_search_then_up() {
    let conn = Rc::new(TestConnection::default());
    let readline = with_history(&["asdf", "footing"]);
    let lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::CtrlR]);
    conn.read_str("f");
    conn.read_keys(&[Key::Up, Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("asdf".to_string())]);
}

#[test]
fn test_reverse_search_steps_and_rings_at_the_end() {
    let conn = Rc::new(TestConnection::default());
    let readline = with_history(&["cargo build", "ls", "cargo test"]);
    let lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::CtrlR]);
    conn.read_str("cargo");
    assert_eq!(buffer_text(&readline), "cargo test");
    conn.read_keys(&[Key::CtrlR]);
    assert_eq!(buffer_text(&readline), "cargo build");
    conn.read_keys(&[Key::CtrlR]);
    assert_eq!(conn.bell_count(), 1);
    conn.read_str("z");
    assert_eq!(conn.bell_count(), 2);
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("cargo build".to_string())]);
}

#[test]
fn test_backspace_fills_kill_ring() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("abc");
    conn.read_keys(&[Key::Backspace, Key::CtrlA, Key::CtrlY, Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("cab".to_string())]);
}

#[test]
fn test_backspace_at_end() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let _lines = start(&readline, &conn, "> ");

    conn.read_str("foob");
    conn.read_keys(&[Key::Backspace]);
    let buffer = readline.buffer().unwrap();
    assert_eq!(buffer.text(), "foo");
    assert_eq!(buffer.cursor(), 3);

    conn.read_keys(&[Key::CtrlY]);
    assert_eq!(buffer_text(&readline), "foob");
}

#[test]
fn test_kill_and_yank_word() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("hello world");
    conn.read_keys(&[Key::CtrlW]);
    assert_eq!(buffer_text(&readline), "hello ");
    assert_eq!(conn.screen_lines(), vec!["> hello"]);
    conn.read_keys(&[Key::CtrlA, Key::CtrlY, Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("worldhello ".to_string())]);
}

#[test]
fn test_undo() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("abc");
    conn.read_keys(&[Key::CtrlUnderscore]);
    assert_eq!(buffer_text(&readline), "");

    conn.read_str("xy");
    conn.read_keys(&[Key::CtrlA, Key::CtrlK]);
    assert_eq!(buffer_text(&readline), "");
    conn.read_keys(&[Key::CtrlUnderscore]);
    assert_eq!(buffer_text(&readline), "xy");
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("xy".to_string())]);
}

#[test]
fn test_undo_with_nothing_to_undo_rings() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let _lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::CtrlUnderscore]);

    assert_eq!(conn.bell_count(), 1);
}

#[test]
fn test_wrapped_line_is_edited_in_place() {
    let conn = Rc::new(TestConnection::new(10, 5));
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("abcdefghij");
    assert_eq!(conn.screen_lines(), vec!["> abcdefgh", "ij"]);
    assert_eq!(conn.cursor(), (1, 2));
    conn.read_keys(&[Key::Backspace, Key::Backspace, Key::Backspace]);
    assert_eq!(conn.screen_lines(), vec!["> abcdefg"]);
    assert_eq!(conn.cursor(), (0, 9));
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("abcdefg".to_string())]);
}

#[test]
fn test_resize_redraws() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    conn.read_str("hello");
    conn.resize(4, 24);
    assert_eq!(conn.screen_lines(), vec!["> he", "llo"]);
    assert_eq!(conn.cursor(), (1, 3));
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("hello".to_string())]);
}

#[test]
fn test_resize_to_wider_terminal_leaves_one_copy() {
    let conn = Rc::new(TestConnection::new(10, 24));
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "% ");

    conn.read_str("xxxxxxxxxxxx");
    assert_eq!(conn.screen_lines(), vec!["% xxxxxxxx", "xxxx"]);
    conn.resize(20, 24);
    assert_eq!(conn.screen_lines(), vec!["% xxxxxxxxxxxx"]);
    assert_eq!(conn.cursor(), (0, 14));
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("xxxxxxxxxxxx".to_string())]);
}

#[test]
fn test_vi_delete_word_and_insert() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_edit_mode(EditModeKind::Vi));
    let lines = start(&readline, &conn, "> ");

    conn.read_str("hello world");
    conn.read_keys(&[Key::Escape]);
    assert_eq!(readline.vi_status().unwrap(), ViStatus::Command);
    assert_eq!(readline.buffer().unwrap().cursor(), 10);

    conn.read_str("0dw");
    assert_eq!(buffer_text(&readline), "world");
    conn.read_str("iX");
    assert_eq!(readline.vi_status().unwrap(), ViStatus::Insert);
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("Xworld".to_string())]);
}

#[test]
fn test_vi_change_whole_line() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_edit_mode(EditModeKind::Vi));
    let lines = start(&readline, &conn, "> ");

    conn.read_str("abc");
    conn.read_keys(&[Key::Escape]);
    conn.read_str("ccnew\r");

    assert_eq!(*lines.borrow(), vec![Some("new".to_string())]);
}

#[test]
fn test_vi_command_mode_does_not_insert() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_edit_mode(EditModeKind::Vi));
    let _lines = start(&readline, &conn, "> ");

    conn.read_str("ab");
    conn.read_keys(&[Key::Escape]);
    conn.read_str("z");

    assert_eq!(buffer_text(&readline), "ab");
    assert_eq!(conn.bell_count(), 1);
}

#[test]
fn test_vi_insert_uses_control_key_editing() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_edit_mode(EditModeKind::Vi));
    let lines = start(&readline, &conn, "> ");

    conn.read_str("abc");
    conn.read_keys(&[Key::CtrlA]);
    conn.read_str("x");
    conn.read_keys(&[Key::CtrlE, Key::CtrlK, Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("xabc".to_string())]);
    assert_eq!(conn.bell_count(), 0);
}

#[test]
fn test_vi_mode_resets_for_next_line() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_edit_mode(EditModeKind::Vi));
    let _lines = start(&readline, &conn, "> ");
    conn.read_keys(&[Key::Escape]);
    conn.read_keys(&[Key::Enter]);
    assert_eq!(readline.vi_status().unwrap(), ViStatus::Command);

    let _lines = start(&readline, &conn, "> ");
    assert_eq!(readline.vi_status().unwrap(), ViStatus::Insert);
}

#[test]
fn test_custom_binding() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    readline
        .bind(Key::CtrlO, r3bl_readline::ActionKind::KillWholeLine)
        .unwrap();
    let lines = start(&readline, &conn, "> ");

    conn.read_str("abc");
    conn.read_keys(&[Key::CtrlO]);
    conn.read_str("d\r");

    assert_eq!(*lines.borrow(), vec![Some("d".to_string())]);
}

#[test]
fn test_tab_without_handler_rings() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let _lines = start(&readline, &conn, "> ");

    conn.read_keys(&[Key::Tab]);

    assert_eq!(conn.bell_count(), 1);
}

#[test]
fn test_complete_single_candidate() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start_with_completion(&readline, &conn, git_words());

    conn.read_str("gi");
    conn.read_keys(&[Key::Tab]);
    assert_eq!(buffer_text(&readline), "git ");
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("git ".to_string())]);
}

#[test]
fn test_complete_common_prefix() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let handler = CandidateCompletionHandler::new(WordListCompleter::new(["grep", "grab"]));
    let _lines = start_with_completion(&readline, &conn, handler);

    conn.read_str("ls g");
    conn.read_keys(&[Key::Tab]);

    assert_eq!(buffer_text(&readline), "ls gr");
}

#[test]
fn test_complete_lists_candidates() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start_with_completion(&readline, &conn, git_words());

    conn.read_str("g");
    conn.read_keys(&[Key::Tab]);
    assert_eq!(conn.screen_lines(), vec!["> g", "git  go  grep", "> g"]);
    assert_eq!(conn.cursor(), (2, 3));
    conn.read_keys(&[Key::Enter]);

    assert_eq!(*lines.borrow(), vec![Some("g".to_string())]);
}

#[test]
fn test_complete_asks_before_listing() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_completion_query_items(2));
    let _lines = start_with_completion(&readline, &conn, git_words());

    conn.read_str("g");
    conn.read_keys(&[Key::Tab]);
    assert_eq!(
        conn.screen_lines(),
        vec!["> g", "Display all 3 possibilities? (y or n)"]
    );
    conn.read_str("y");

    assert_eq!(
        conn.screen_lines(),
        vec![
            "> g",
            "Display all 3 possibilities? (y or n)",
            "git  go  grep",
            "> g"
        ]
    );
    assert_eq!(buffer_text(&readline), "g");
}

#[test]
fn test_complete_declined() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default().with_completion_query_items(2));
    let _lines = start_with_completion(&readline, &conn, git_words());

    conn.read_str("g");
    conn.read_keys(&[Key::Tab]);
    conn.read_str("n");

    assert_eq!(
        conn.screen_lines(),
        vec!["> g", "Display all 3 possibilities? (y or n)", ">"]
    );
    assert_eq!(buffer_text(&readline), "");
}

#[derive(Debug, Default)]
struct DeferredCompletion {
    calls: Rc<Cell<usize>>,
}

impl CompletionHandler for DeferredCompletion {
    fn complete(&mut self, _cx: &mut ActionContext<'_>) -> CompleteOutcome {
        self.calls.set(self.calls.get() + 1);
        CompleteOutcome::Deferred
    }

    fn ask_display_completion(&self) -> bool { false }

    fn set_ask_display_completion(&mut self, _ask: bool) {}
}

#[test]
fn test_deferred_completion_pauses_input() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let handler = DeferredCompletion::default();
    let calls = handler.calls.clone();
    let lines = start_with_completion(&readline, &conn, handler);

    conn.read_str("ab");
    conn.read_keys(&[Key::Tab]);
    assert_eq!(calls.get(), 1);
    assert!(readline.is_paused());

    conn.read_str("x");
    assert_eq!(buffer_text(&readline), "ab");

    readline
        .with_interaction(|interaction| {
            let mut update = interaction.buffer().clone();
            update.insert_str("c").unwrap();
            interaction.refresh(update);
        })
        .unwrap();
    readline.resume().unwrap();
    conn.run_tasks();

    assert!(!readline.is_paused());
    assert_eq!(buffer_text(&readline), "abcx");
    assert!(matches!(readline.resume(), Err(ReadlineError::NotPaused)));

    conn.read_keys(&[Key::Enter]);
    assert_eq!(*lines.borrow(), vec![Some("abcx".to_string())]);
    assert!(matches!(readline.resume(), Err(ReadlineError::NoInteraction)));
}

#[test]
fn test_resize_during_pause_waits_for_resume() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let _lines = start_with_completion(&readline, &conn, DeferredCompletion::default());

    conn.read_str("hello");
    conn.read_keys(&[Key::Tab]);
    conn.clear_output();
    conn.resize(4, 24);
    assert_eq!(conn.output(), "");

    readline.resume().unwrap();
    conn.run_tasks();

    assert_eq!(conn.screen_lines(), vec!["> he", "llo"]);
    assert_eq!(conn.cursor(), (1, 3));
}

#[test]
fn test_refresh_through_interaction() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let _lines = start(&readline, &conn, "> ");

    readline
        .with_interaction(|interaction| interaction.refresh(LineBuffer::from("typed")))
        .unwrap();

    assert_eq!(conn.screen_lines(), vec!["> typed"]);
}

#[test]
fn test_line_ended_in_background_reaches_callback_on_resume() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start_with_completion(&readline, &conn, DeferredCompletion::default());

    conn.read_str("ab");
    conn.read_keys(&[Key::Tab]);
    readline
        .with_interaction(|interaction| interaction.end(Some("done".to_string())))
        .unwrap();
    assert!(lines.borrow().is_empty());

    readline.resume().unwrap();
    conn.run_tasks();

    assert_eq!(*lines.borrow(), vec![Some("done".to_string())]);
    assert!(!readline.is_reading());
    assert!(!conn.has_stdin_handler());
}

#[test]
fn test_end_outside_a_pause_runs_callback_right_away() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let lines = start(&readline, &conn, "> ");

    readline
        .with_interaction(|interaction| interaction.end(None))
        .unwrap();

    assert_eq!(*lines.borrow(), vec![None]);
    assert!(!readline.is_reading());
}

/// Asks the engine for its Vi status from inside `complete`.
#[derive(Debug)]
struct NestedCallCompletion {
    readline: Readline,
    seen: Rc<RefCell<Option<Result<ViStatus, ReadlineError>>>>,
}

impl CompletionHandler for NestedCallCompletion {
    fn complete(&mut self, _cx: &mut ActionContext<'_>) -> CompleteOutcome {
        *self.seen.borrow_mut() = Some(self.readline.vi_status());
        CompleteOutcome::Completed
    }

    fn ask_display_completion(&self) -> bool { false }

    fn set_ask_display_completion(&mut self, _ask: bool) {}
}

#[test]
fn test_engine_accessors_inside_an_action_are_reentrant() {
    let conn = Rc::new(TestConnection::default());
    let readline = Readline::new(ReadlineConfig::default());
    let seen = Rc::new(RefCell::new(None));
    let handler = NestedCallCompletion {
        readline: readline.clone(),
        seen: seen.clone(),
    };
    let _lines = start_with_completion(&readline, &conn, handler);

    conn.read_keys(&[Key::Tab]);

    assert!(matches!(*seen.borrow(), Some(Err(ReadlineError::Reentrant))));
    assert_eq!(readline.vi_status().unwrap(), ViStatus::Insert);
    assert_eq!(readline.edit_mode_kind().unwrap(), EditModeKind::Emacs);
}
