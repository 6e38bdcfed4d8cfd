use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::executor::block_on;

use crate::event_bus::EventBus;
use crate::generator::*;
use crate::ports::*;
use crate::session::*;
use persona_types::config::{LlmConfig, SessionConfig};
use persona_types::event::{RejectReason, SessionEvent};
use persona_types::persona::PersonaFields;
use persona_types::{ErrorKind, PersonaError};

const MIRA_JSON: &str =
    r##"{"colors":["#FF00AA","#00AAFF"],"quote":"心若星辰，自有光芒","mood":"灵动"}"##;

// ─── Mocks ───────────────────────────────────────────────

/// Port that replays scripted answers and records every request
struct ScriptedPort {
    answers: RefCell<VecDeque<persona_types::Result<String>>>,
    requests: RefCell<Vec<GenerationRequest>>,
}

impl ScriptedPort {
    fn new(answers: Vec<persona_types::Result<String>>) -> Rc<Self> {
        Rc::new(Self {
            answers: RefCell::new(answers.into()),
            requests: RefCell::new(Vec::new()),
        })
    }

    fn always_ok(n: usize) -> Rc<Self> {
        Self::new((0..n).map(|_| Ok(MIRA_JSON.to_string())).collect())
    }

    fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl GenerationPort for ScriptedPort {
    async fn generate_content(
        &self,
        req: GenerationRequest,
    ) -> persona_types::Result<GenerationResponse> {
        self.requests.borrow_mut().push(req);
        let answer = self
            .answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(PersonaError::Transport("script exhausted".to_string())));
        answer.map(|text| GenerationResponse { text, usage: None })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Clock the test moves by hand
#[derive(Clone)]
struct ManualClock(Rc<Cell<u64>>);

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.get()
    }
}

fn generator(port: Rc<ScriptedPort>) -> PersonaGenerator {
    PersonaGenerator::new(port, &LlmConfig::default())
}

fn controller_with_clock(capacity: usize, start: u64) -> (PersonaSessionController, EventBus, Rc<Cell<u64>>) {
    let bus = EventBus::new();
    let time = Rc::new(Cell::new(start));
    let controller = PersonaSessionController::with_clock(
        &SessionConfig { history_capacity: capacity },
        bus.clone(),
        Box::new(ManualClock(time.clone())),
    );
    (controller, bus, time)
}

fn controller() -> PersonaSessionController {
    controller_with_clock(9, 1_000).0
}

fn mira_fields() -> PersonaFields {
    parse_persona_response(MIRA_JSON).unwrap()
}

fn submit_name(c: &mut PersonaSessionController, g: &PersonaGenerator, name: &str) -> SubmitOutcome {
    c.edit_input(name);
    block_on(c.submit(g))
}

// ─── EventBus Tests ──────────────────────────────────────

#[test]
fn test_event_bus_emit_and_drain() {
    let bus = EventBus::new();
    assert!(!bus.has_pending());

    bus.emit(SessionEvent::SubmitStarted { name: "a".to_string() });
    bus.emit(SessionEvent::HistorySelected { timestamp: 1 });
    assert!(bus.has_pending());

    assert_eq!(bus.drain().len(), 2);
    assert!(!bus.has_pending());
    assert!(bus.drain().is_empty());
}

#[test]
fn test_event_bus_clone_shares_state() {
    let bus1 = EventBus::new();
    let bus2 = bus1.clone();
    bus1.emit(SessionEvent::HistorySelected { timestamp: 7 });
    assert!(bus2.has_pending());
    assert_eq!(bus2.drain().len(), 1);
    assert!(!bus1.has_pending());
}

#[test]
fn test_event_bus_clear_drops_undelivered() {
    let bus = EventBus::default();
    bus.emit(SessionEvent::SubmitFailed { message: "x".to_string() });
    bus.clear();
    assert!(!bus.has_pending());
    assert!(bus.drain().is_empty());
}

// ─── Generator Tests ─────────────────────────────────────

#[test]
fn test_prompt_mentions_name_and_language() {
    let prompt = build_prompt("Mira");
    assert!(prompt.contains("\"Mira\""));
    assert!(prompt.contains("中文"));
    assert!(prompt.contains("2 到 3"));
}

#[test]
fn test_schema_requires_all_fields() {
    let schema = persona_schema();
    assert_eq!(schema["type"], "object");
    let required: Vec<&str> = schema["required"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(required, vec!["colors", "quote", "mood"]);
    assert_eq!(schema["properties"]["colors"]["type"], "array");
    assert_eq!(schema["properties"]["colors"]["items"]["type"], "string");
}

#[test]
fn test_parse_valid_response() {
    let fields = parse_persona_response(MIRA_JSON).unwrap();
    assert_eq!(fields.colors, vec!["#FF00AA", "#00AAFF"]);
    assert_eq!(fields.quote, "心若星辰，自有光芒");
    assert_eq!(fields.mood, "灵动");
}

#[test]
fn test_parse_strips_code_fence() {
    let fenced = format!("```json\n{}\n```", MIRA_JSON);
    let fields = parse_persona_response(&fenced).unwrap();
    assert_eq!(fields.mood, "灵动");
}

#[test]
fn test_parse_strips_fence_tag_in_any_case() {
    for tag in ["JSON", "Json", ""] {
        let fenced = format!("```{}\n{}\n```", tag, MIRA_JSON);
        let fields = parse_persona_response(&fenced).unwrap();
        assert_eq!(fields.quote, "心若星辰，自有光芒");
    }

    let inline = format!("```JSON{}```", MIRA_JSON);
    assert_eq!(parse_persona_response(&inline).unwrap().mood, "灵动");
}

#[test]
fn test_parse_missing_quote_is_parse_failure() {
    let result = parse_persona_response(r##"{"colors":["#FF00AA","#00AAFF"],"mood":"灵动"}"##);
    assert!(matches!(result, Err(PersonaError::ResponseParse(_))));
}

#[test]
fn test_parse_wrong_shape_is_parse_failure() {
    let result = parse_persona_response(r##"{"colors":"#FF00AA","quote":"q","mood":"m"}"##);
    assert!(matches!(result, Err(PersonaError::ResponseParse(_))));
}

#[test]
fn test_parse_not_json_is_parse_failure() {
    assert!(matches!(
        parse_persona_response("Sorry, I can't help with that."),
        Err(PersonaError::ResponseParse(_))
    ));
    assert!(matches!(
        parse_persona_response("   "),
        Err(PersonaError::ResponseParse(_))
    ));
}

#[test]
fn test_parse_empty_colors_is_parse_failure() {
    let result = parse_persona_response(r#"{"colors":[],"quote":"q","mood":"m"}"#);
    assert!(matches!(result, Err(PersonaError::ResponseParse(_))));
}

#[test]
fn test_generate_makes_one_call_with_schema() {
    let port = ScriptedPort::always_ok(1);
    let g = generator(port.clone());

    let fields = block_on(g.generate("Mira")).unwrap();
    assert_eq!(fields.mood, "灵动");
    assert_eq!(port.calls(), 1);

    let req = &port.requests.borrow()[0];
    assert!(req.prompt.contains("Mira"));
    assert_eq!(req.schema, persona_schema());
    assert_eq!(req.schema_name, SCHEMA_NAME);
    assert_eq!(req.model, LlmConfig::default().model);
}

#[test]
fn test_generate_empty_name_makes_no_call() {
    let port = ScriptedPort::always_ok(1);
    let g = generator(port.clone());
    assert_eq!(block_on(g.generate("  ")), Err(PersonaError::InvalidName));
    assert_eq!(port.calls(), 0);
}

#[test]
fn test_generate_propagates_port_errors_without_retry() {
    let port = ScriptedPort::new(vec![
        Err(PersonaError::Transport("connection reset".to_string())),
        Ok(MIRA_JSON.to_string()),
    ]);
    let g = generator(port.clone());
    let result = block_on(g.generate("Mira"));
    assert_eq!(result, Err(PersonaError::Transport("connection reset".to_string())));
    assert_eq!(port.calls(), 1);
}

// ─── Session Controller Tests ────────────────────────────

#[test]
fn test_initial_state() {
    let c = controller();
    let s = c.state();
    assert!(s.input_text.is_empty());
    assert!(s.active_persona.is_none());
    assert!(s.history.is_empty());
    assert!(!s.is_loading);
    assert!(s.last_error.is_none());
    assert!(!s.can_submit());
    assert_eq!(c.capacity(), 9);
}

#[test]
fn test_mira_scenario() {
    let (mut c, bus, _) = controller_with_clock(9, 1_700_000_000_000);
    let g = generator(ScriptedPort::always_ok(1));

    let outcome = submit_name(&mut c, &g, "Mira");
    let SubmitOutcome::Generated(record) = outcome else {
        panic!("expected a generated record");
    };

    let s = c.state();
    let active = s.active_persona.as_ref().unwrap();
    assert_eq!(active.name, "Mira");
    assert_eq!(active.colors, vec!["#FF00AA", "#00AAFF"]);
    assert_eq!(active.quote, "心若星辰，自有光芒");
    assert_eq!(active.mood, "灵动");
    assert_eq!(active.timestamp, 1_700_000_000_000);
    assert!(Rc::ptr_eq(active, &s.history[0]));
    assert!(Rc::ptr_eq(active, &record));
    assert!(s.input_text.is_empty());
    assert!(!s.is_loading);

    let events = bus.drain();
    assert!(matches!(events[0], SessionEvent::SubmitStarted { .. }));
    assert!(matches!(events.last(), Some(SessionEvent::PersonaGenerated { .. })));
}

#[test]
fn test_trim_is_idempotent() {
    let mut c = controller();
    let g = generator(ScriptedPort::always_ok(2));

    submit_name(&mut c, &g, "  Alice  ");
    submit_name(&mut c, &g, "Alice");

    let s = c.state();
    assert_eq!(s.history.len(), 2);
    assert_eq!(s.history[0].name, "Alice");
    assert_eq!(s.history[1].name, "Alice");
}

#[test]
fn test_generator_receives_trimmed_name() {
    let port = ScriptedPort::always_ok(1);
    let mut c = controller();
    let g = generator(port.clone());
    submit_name(&mut c, &g, "  Alice  ");
    assert!(port.requests.borrow()[0].prompt.contains("\"Alice\""));
}

#[test]
fn test_history_bound_keeps_most_recent_first() {
    let (mut c, _, time) = controller_with_clock(9, 100);
    let g = generator(ScriptedPort::always_ok(12));

    for i in 0..12 {
        time.set(100 + i);
        submit_name(&mut c, &g, &format!("name{}", i));
    }

    let names: Vec<String> = c.state().history.iter().map(|r| r.name.clone()).collect();
    let expected: Vec<String> = (3..12).rev().map(|i| format!("name{}", i)).collect();
    assert_eq!(c.state().history.len(), 9);
    assert_eq!(names, expected);
    assert_eq!(c.state().active_persona.as_ref().unwrap().name, "name11");
}

#[test]
fn test_capacity_zero_still_shows_latest() {
    let (mut c, _, _) = controller_with_clock(0, 1);
    let g = generator(ScriptedPort::always_ok(2));
    submit_name(&mut c, &g, "a");
    submit_name(&mut c, &g, "b");
    assert_eq!(c.state().history.len(), 1);
    assert_eq!(c.state().history[0].name, "b");
}

#[test]
fn test_timestamps_unique_with_frozen_clock() {
    let (mut c, _, _) = controller_with_clock(9, 500);
    let g = generator(ScriptedPort::always_ok(3));
    for name in ["a", "b", "c"] {
        submit_name(&mut c, &g, name);
    }
    let stamps: Vec<u64> = c.state().history.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![502, 501, 500]);
}

#[test]
fn test_timestamps_never_go_backwards() {
    let (mut c, _, time) = controller_with_clock(9, 1_000);
    let g = generator(ScriptedPort::always_ok(2));
    submit_name(&mut c, &g, "a");
    time.set(10);
    submit_name(&mut c, &g, "b");
    assert_eq!(c.state().history[0].timestamp, 1_001);
}

#[test]
fn test_no_reentrant_submit() {
    let (mut c, bus, _) = controller_with_clock(9, 1);
    c.edit_input("Mira");
    let pending = c.begin_submit("Mira").unwrap();
    assert!(c.state().is_loading);
    let _ = bus.drain();

    let second = c.begin_submit("Other");
    assert_eq!(second.unwrap_err(), RejectReason::AlreadyLoading);
    c.edit_input("changed while loading");

    let s = c.state();
    assert_eq!(s.input_text, "Mira");
    assert!(s.history.is_empty());
    assert!(s.is_loading);
    assert_eq!(
        bus.drain(),
        vec![SessionEvent::SubmitRejected { reason: RejectReason::AlreadyLoading }]
    );

    c.finish(pending, Ok(mira_fields()));
    assert!(!c.state().is_loading);
    assert_eq!(c.state().history.len(), 1);
}

#[test]
fn test_submit_while_loading_makes_no_call() {
    let port = ScriptedPort::always_ok(1);
    let g = generator(port.clone());
    let mut c = controller();
    c.edit_input("Mira");
    let _pending = c.begin_submit("Mira").unwrap();

    assert_eq!(
        block_on(c.submit(&g)),
        SubmitOutcome::Rejected(RejectReason::AlreadyLoading)
    );
    assert_eq!(port.calls(), 0);
}

#[test]
fn test_empty_submit_is_rejected() {
    let port = ScriptedPort::always_ok(1);
    let g = generator(port.clone());
    let mut c = controller();

    assert_eq!(
        submit_name(&mut c, &g, "   "),
        SubmitOutcome::Rejected(RejectReason::EmptyName)
    );
    assert!(!c.state().is_loading);
    assert!(c.state().history.is_empty());
    assert_eq!(port.calls(), 0);

    assert_eq!(block_on(c.submit(&g)), SubmitOutcome::Rejected(RejectReason::EmptyName));
}

#[test]
fn test_failure_preserves_prior_state() {
    let port = ScriptedPort::new(vec![
        Ok(MIRA_JSON.to_string()),
        Err(PersonaError::Transport("HTTP 503".to_string())),
    ]);
    let g = generator(port);
    let mut c = controller();

    submit_name(&mut c, &g, "Mira");
    let before_active = c.state().active_persona.clone().unwrap();
    let before_history = c.state().history.clone();

    let outcome = submit_name(&mut c, &g, "Nova");
    assert!(matches!(outcome, SubmitOutcome::Failed(PersonaError::Transport(_))));

    let s = c.state();
    assert!(Rc::ptr_eq(s.active_persona.as_ref().unwrap(), &before_active));
    assert_eq!(s.history.len(), before_history.len());
    assert!(Rc::ptr_eq(&s.history[0], &before_history[0]));
    assert!(!s.is_loading);
    assert!(!s.error_message().unwrap().is_empty());
    // typed name survives for a retry
    assert_eq!(s.input_text, "Nova");
}

#[test]
fn test_authorization_failure_scenario() {
    let g = generator(ScriptedPort::new(vec![Err(PersonaError::Authorization(
        "API key not valid".to_string(),
    ))]));
    let mut c = controller();

    submit_name(&mut c, &g, "Mira");

    let s = c.state();
    assert_eq!(s.last_error.as_ref().unwrap().kind(), ErrorKind::Authorization);
    assert!(s.error_message().unwrap().contains("密钥"));
    assert!(!s.is_loading);
    assert!(s.active_persona.is_none());
}

#[test]
fn test_missing_credential_is_configuration_error() {
    let g = generator(ScriptedPort::new(vec![Err(PersonaError::MissingCredential)]));
    let mut c = controller();
    submit_name(&mut c, &g, "Mira");
    assert_eq!(
        c.state().last_error.as_ref().unwrap().kind(),
        ErrorKind::Configuration
    );
}

#[test]
fn test_malformed_response_creates_no_record() {
    let g = generator(ScriptedPort::new(vec![Ok(
        r##"{"colors":["#FF00AA","#00AAFF"],"mood":"灵动"}"##.to_string(),
    )]));
    let mut c = controller();

    let outcome = submit_name(&mut c, &g, "Mira");
    assert!(matches!(outcome, SubmitOutcome::Failed(PersonaError::ResponseParse(_))));
    assert!(c.state().history.is_empty());
    assert!(c.state().active_persona.is_none());
    assert_eq!(c.state().error_message().unwrap(), "AI 响应解析失败");
}

#[test]
fn test_next_submit_clears_error() {
    let g = generator(ScriptedPort::new(vec![
        Err(PersonaError::Transport("down".to_string())),
        Ok(MIRA_JSON.to_string()),
    ]));
    let mut c = controller();
    submit_name(&mut c, &g, "Mira");
    assert!(c.state().last_error.is_some());

    let pending = c.begin_submit("Mira").unwrap();
    assert!(c.state().last_error.is_none());
    c.finish(pending, Ok(mira_fields()));
}

#[test]
fn test_edit_input_clears_error() {
    let g = generator(ScriptedPort::new(vec![Err(PersonaError::MissingCredential)]));
    let mut c = controller();
    submit_name(&mut c, &g, "Mira");
    assert!(c.state().last_error.is_some());

    c.edit_input("Mira");
    assert!(c.state().last_error.is_some(), "unchanged text is not an edit");

    c.edit_input("Mir");
    assert!(c.state().last_error.is_none());
    assert_eq!(c.state().input_text, "Mir");
}

#[test]
fn test_select_history_is_non_mutating() {
    let (mut c, bus, time) = controller_with_clock(9, 10);
    let g = generator(ScriptedPort::always_ok(3));
    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        time.set(10 + i as u64);
        submit_name(&mut c, &g, name);
    }
    let _ = bus.drain();
    let before: Vec<Rc<_>> = c.state().history.clone();
    let target = before[2].clone();

    assert!(c.select_history(target.timestamp));

    let s = c.state();
    assert!(Rc::ptr_eq(s.active_persona.as_ref().unwrap(), &target));
    assert_eq!(s.history.len(), before.len());
    for (a, b) in s.history.iter().zip(before.iter()) {
        assert!(Rc::ptr_eq(a, b));
    }
    assert_eq!(
        bus.drain(),
        vec![SessionEvent::HistorySelected { timestamp: target.timestamp }]
    );
}

#[test]
fn test_select_unknown_history_entry() {
    let mut c = controller();
    assert!(!c.select_history(12345));
    assert!(c.state().active_persona.is_none());
}

#[test]
fn test_reset() {
    let mut c = controller();
    let g = generator(ScriptedPort::always_ok(1));
    submit_name(&mut c, &g, "Mira");
    c.edit_input("next");

    c.reset();
    let s = c.state();
    assert!(s.history.is_empty());
    assert!(s.active_persona.is_none());
    assert!(s.input_text.is_empty());
    assert!(!s.is_loading);
}

#[test]
fn test_reset_discards_undelivered_events() {
    let (mut c, bus, _) = controller_with_clock(9, 1_000);
    let g = generator(ScriptedPort::always_ok(1));
    submit_name(&mut c, &g, "Mira");
    assert!(bus.has_pending());

    c.reset();
    assert!(bus.drain().is_empty());
}
