mod common;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use common::{drive, open_preamble, quiz, FakePortal};
use lmsquiz::error::Error;
use lmsquiz::jobs::Job;
use lmsquiz::state::{Dialog, Effect, InputMode, Recovery, Screen};
use lmsquiz::submit::{SubmitState, SubmitTrigger};
use lmsquiz::timer::TimerEvent;
use lmsquiz::tui::handle_key;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

#[test]
fn test_time_expiry_submits_answers_once() {
    // Two choice questions plus a short answer, one minute.
    let api = FakePortal::new(quiz(2, Some(1)));
    let mut state = open_preamble(&api);
    assert_eq!(state.screen, Screen::Preamble);

    let effects = state.begin_attempt();
    let timers = drive(&mut state, &api, effects);
    assert_eq!(timers, vec![Effect::StartTimer(60)]);
    assert_eq!(state.screen, Screen::Working);

    state.select_choice(1);
    state.navigate_next();
    state.select_choice(2);

    state.on_timer(TimerEvent::Tick(1));
    let effects = state.on_timer(TimerEvent::TimeExpired);
    let timers = drive(&mut state, &api, effects);
    assert_eq!(timers, vec![Effect::StopTimer]);

    assert_eq!(api.submit_count(), 1);
    let sent = api.last_submission();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].option_id, Some(11));
    assert_eq!(sent[1].option_id, Some(22));

    assert_eq!(state.screen, Screen::Results);
    assert!(state.notice.as_deref().unwrap().contains("Time expired"));
    assert_eq!(state.records.len(), 1);
    assert!(state.attempt.is_none());
}

#[test]
fn test_double_submit_sends_one_request() {
    let api = FakePortal::new(quiz(1, None));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    handle_key(ctrl('s'), &mut state);
    assert_eq!(state.top_dialog(), Some(&Dialog::ConfirmSubmit));
    let first = handle_key(key(KeyCode::Enter), &mut state);
    assert_eq!(state.screen, Screen::Submitting);

    // Pressed again before the response arrives.
    let second = handle_key(ctrl('s'), &mut state);
    assert!(second.is_empty());
    assert!(!state.has_dialog());
    assert!(state.request_submit(SubmitTrigger::Manual).is_empty());

    drive(&mut state, &api, first);
    assert_eq!(api.submit_count(), 1);
    assert_eq!(state.notice.as_deref(), Some("Assessment submitted."));
}

#[test]
fn test_expiry_and_manual_submit_in_same_frame() {
    let api = FakePortal::new(quiz(3, Some(5)));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    let mut pending = state.on_timer(TimerEvent::TimeExpired);
    pending.extend(state.request_submit(SubmitTrigger::Manual));
    let submits = pending
        .iter()
        .filter(|e| matches!(e, Effect::Spawn(Job::Submit(_))))
        .count();
    assert_eq!(submits, 1);

    drive(&mut state, &api, pending);
    assert_eq!(api.submit_count(), 1);
    assert!(state.notice.as_deref().unwrap().contains("Time expired"));
}

#[test]
fn test_untimed_quiz_never_starts_a_timer() {
    let api = FakePortal::new(quiz(2, None));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    assert!(!effects.iter().any(|e| matches!(e, Effect::StartTimer(_))));
    drive(&mut state, &api, effects);
    assert_eq!(state.attempt.as_ref().unwrap().remaining_seconds, None);
}

#[test]
fn test_go_to_jumps_and_keeps_answers() {
    let api = FakePortal::new(quiz(6, None));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    state.navigate_to(1);
    state.select_choice(0);

    handle_key(key(KeyCode::Char('g')), &mut state);
    assert_eq!(state.top_dialog(), Some(&Dialog::GoTo));
    handle_key(key(KeyCode::Char('5')), &mut state);
    handle_key(key(KeyCode::Enter), &mut state);

    let attempt = state.attempt.as_ref().unwrap();
    assert_eq!(attempt.navigator.current(), 4);
    assert_eq!(attempt.buffer.selected_option(2), Some(20));
    assert_eq!(attempt.buffer.completed_count(), 1);
}

#[test]
fn test_letter_keys_select_and_text_is_typed() {
    let api = FakePortal::new(quiz(1, None));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    assert_eq!(state.input_mode, InputMode::ChoiceSelect);
    handle_key(key(KeyCode::Char('c')), &mut state);
    handle_key(key(KeyCode::Down), &mut state);
    assert_eq!(state.input_mode, InputMode::TextInput);
    for c in "North gate".chars() {
        handle_key(key(KeyCode::Char(c)), &mut state);
    }

    let attempt = state.attempt.as_ref().unwrap();
    assert_eq!(attempt.buffer.selected_option(1), Some(12));
    assert_eq!(attempt.buffer.text(100), Some("North gate"));
}

#[test]
fn test_submit_while_starting_waits_for_attempt_id() {
    let api = FakePortal::new(quiz(1, Some(10)));
    let mut state = open_preamble(&api);
    let start_effects = state.begin_attempt();
    state.select_choice(0);

    let effects = state.request_submit(SubmitTrigger::Manual);
    assert_eq!(effects, vec![Effect::StopTimer]);
    assert_eq!(state.screen, Screen::Submitting);
    assert!(state.request_submit(SubmitTrigger::Timeout).is_empty());

    drive(&mut state, &api, start_effects);
    assert_eq!(*api.starts.lock().unwrap(), 1);
    assert_eq!(api.submit_count(), 1);
    assert_eq!(api.last_submission().len(), 1);
    assert_eq!(state.screen, Screen::Results);
}

#[test]
fn test_failed_submit_can_be_retried_by_hand() {
    let api = FakePortal::new(quiz(2, Some(5)));
    api.fail_next_submit(Error::Network("connection reset".to_string()));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);
    state.select_choice(0);
    state.on_timer(TimerEvent::Tick(200));

    let effects = state.request_submit(SubmitTrigger::Manual);
    let timers = drive(&mut state, &api, effects);
    assert_eq!(timers, vec![Effect::StopTimer, Effect::StartTimer(200)]);
    assert_eq!(state.screen, Screen::Working);
    assert!(state.banner.as_deref().unwrap().contains("connection reset"));
    assert_eq!(api.submit_count(), 0);

    // Still editable after the failure.
    state.navigate_next();
    state.select_choice(1);

    let effects = state.request_submit(SubmitTrigger::Manual);
    drive(&mut state, &api, effects);
    assert_eq!(api.submit_count(), 1);
    assert_eq!(api.last_submission().len(), 2);
    assert_eq!(state.screen, Screen::Results);
}

#[test]
fn test_failed_timeout_submit_leaves_timer_stopped() {
    let api = FakePortal::new(quiz(1, Some(1)));
    api.fail_next_submit(Error::Status(502));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    let effects = state.on_timer(TimerEvent::TimeExpired);
    let timers = drive(&mut state, &api, effects);
    assert_eq!(timers, vec![Effect::StopTimer]);
    let attempt = state.attempt.as_ref().unwrap();
    assert_eq!(attempt.coordinator.state(), &SubmitState::Idle);
    assert_eq!(attempt.remaining_seconds, Some(0));
}

#[test]
fn test_retry_after_expiry_keeps_answers_frozen() {
    let api = FakePortal::new(quiz(2, Some(1)));
    api.fail_next_submit(Error::Network("connection reset".to_string()));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);
    state.select_choice(0);

    let effects = state.on_timer(TimerEvent::TimeExpired);
    drive(&mut state, &api, effects);
    assert_eq!(state.screen, Screen::Working);

    state.navigate_next();
    state.select_choice(1);
    state.clear_answer();
    handle_key(key(KeyCode::Char('b')), &mut state);
    let attempt = state.attempt.as_ref().unwrap();
    assert!(attempt.is_expired());
    assert_eq!(attempt.buffer.completed_count(), 1);

    let effects = state.request_submit(SubmitTrigger::Manual);
    assert!(!effects.iter().any(|e| matches!(e, Effect::StartTimer(_))));
    drive(&mut state, &api, effects);
    assert_eq!(api.submit_count(), 1);
    assert_eq!(api.last_submission().len(), 1);
    assert!(state.notice.as_deref().unwrap().contains("Time expired"));
}

#[test]
fn test_start_failure_is_page_error_back_to_list() {
    let api = FakePortal::new(quiz(1, Some(5)));
    api.fail_next_start(Error::Network("connection refused".to_string()));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    let timers = drive(&mut state, &api, effects);

    assert_eq!(timers, vec![Effect::StartTimer(300), Effect::StopTimer]);
    assert_eq!(state.screen, Screen::PageError);
    let error = state.page_error.as_ref().unwrap();
    assert_eq!(error.recovery, Recovery::BackToList);
    assert!(error.message.contains("connection refused"));
    assert!(state.attempt.is_none());

    let effects = handle_key(key(KeyCode::Esc), &mut state);
    drive(&mut state, &api, effects);
    assert_eq!(state.screen, Screen::AssessmentList);
}

#[test]
fn test_unauthorized_start_points_to_login() {
    let api = FakePortal::new(quiz(1, None));
    api.fail_next_start(Error::Unauthorized);
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    assert_eq!(state.screen, Screen::PageError);
    assert_eq!(state.page_error.as_ref().unwrap().recovery, Recovery::Login);
}

#[test]
fn test_deferred_submit_dropped_when_start_fails() {
    let api = FakePortal::new(quiz(1, Some(10)));
    api.fail_next_start(Error::Status(503));
    let mut state = open_preamble(&api);
    let start_effects = state.begin_attempt();
    state.select_choice(0);
    state.request_submit(SubmitTrigger::Manual);
    assert_eq!(state.screen, Screen::Submitting);

    drive(&mut state, &api, start_effects);
    assert_eq!(api.submit_count(), 0);
    assert_eq!(state.screen, Screen::PageError);
    assert!(state.attempt.is_none());
}

#[test]
fn test_warning_opens_dialog_once() {
    let api = FakePortal::new(quiz(1, Some(5)));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    state.on_timer(TimerEvent::Tick(120));
    state.on_timer(TimerEvent::Warning);
    assert_eq!(state.top_dialog(), Some(&Dialog::TimeWarning));
    state.on_timer(TimerEvent::Warning);
    assert_eq!(state.dialog_stack.len(), 1);

    handle_key(key(KeyCode::Enter), &mut state);
    assert!(!state.has_dialog());
    assert_eq!(state.screen, Screen::Working);
}

#[test]
fn test_closed_attempt_goes_back_to_list() {
    let api = FakePortal::new(quiz(1, None));
    api.fail_next_submit(Error::AttemptClosed);
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);

    let effects = state.request_submit(SubmitTrigger::Manual);
    drive(&mut state, &api, effects);
    assert_eq!(state.screen, Screen::PageError);
    assert_eq!(state.page_error.as_ref().unwrap().recovery, Recovery::BackToList);
    assert!(state.attempt.is_none());

    let effects = handle_key(key(KeyCode::Esc), &mut state);
    drive(&mut state, &api, effects);
    assert_eq!(state.screen, Screen::AssessmentList);
}

#[test]
fn test_leaving_discards_attempt() {
    let api = FakePortal::new(quiz(1, Some(3)));
    let mut state = open_preamble(&api);
    let effects = state.begin_attempt();
    drive(&mut state, &api, effects);
    state.select_choice(0);

    handle_key(ctrl('q'), &mut state);
    assert_eq!(state.top_dialog(), Some(&Dialog::ConfirmLeave));
    let effects = handle_key(key(KeyCode::Enter), &mut state);
    let timers = drive(&mut state, &api, effects);
    assert_eq!(timers, vec![Effect::StopTimer]);
    assert!(state.attempt.is_none());
    assert_eq!(state.screen, Screen::AssessmentList);
    assert_eq!(api.submit_count(), 0);
}
