use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use slimbrave::catalog::Catalog;
use slimbrave::policy::DnsMode;
use slimbrave::rows::{self, Row};
use slimbrave::ui::{
    action_from_key, parse_scripted_keys, transition, Button, Focus, NavAction, NavEffect,
    NavState,
};

fn key_event(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn step(state: &mut NavState, rows: &mut [Row], action: NavAction) -> NavEffect {
    transition(state, rows, action)
        .expect("valid transition")
        .effect
}

#[test]
fn navigation_module_walks_every_selectable_row_then_enters_button_bar() {
    let catalog = Catalog::builtin();
    let mut rows = rows::project(&catalog);
    let mut state = NavState::new(&rows, 6);
    let selectable = rows::selectable_indices(&rows);

    let mut visited = vec![state.cursor_row];
    for _ in 1..selectable.len() {
        step(&mut state, &mut rows, NavAction::Down);
        visited.push(state.cursor_row);
        assert!(state.cursor_row >= state.scroll_offset);
        assert!(state.cursor_row < state.scroll_offset + state.viewport_height);
    }
    assert_eq!(visited, selectable);

    step(&mut state, &mut rows, NavAction::Down);
    assert_eq!(state.focus, Focus::ButtonBar);
    assert_eq!(state.button, Button::Import);

    step(&mut state, &mut rows, NavAction::Up);
    assert_eq!(state.focus, Focus::Listing);
    assert_eq!(Some(&state.cursor_row), selectable.last());
}

#[test]
fn navigation_module_custom_mode_exposes_template_row_for_editing() {
    let catalog = Catalog::builtin();
    let mut rows = rows::project(&catalog);
    let mut state = NavState::new(&rows, 8);
    let dns_row = rows
        .iter()
        .position(|row| matches!(row, Row::DnsMode { .. }))
        .expect("dns row");
    while state.cursor_row != dns_row {
        step(&mut state, &mut rows, NavAction::Down);
    }

    for _ in 0..3 {
        step(&mut state, &mut rows, NavAction::Toggle);
    }
    assert_eq!(rows::dns_mode(&rows), DnsMode::Custom);

    step(&mut state, &mut rows, NavAction::Down);
    assert!(matches!(rows[state.cursor_row], Row::DnsTemplate { .. }));
    step(&mut state, &mut rows, NavAction::Activate);
    for ch in "https://dns.example/q".chars() {
        step(&mut state, &mut rows, NavAction::Input(ch));
    }
    let effect = step(&mut state, &mut rows, NavAction::Confirm);
    assert_eq!(
        effect,
        NavEffect::UpdateTemplate("https://dns.example/q".to_string())
    );
    assert_eq!(state.focus, Focus::Listing);

    step(&mut state, &mut rows, NavAction::Up);
    step(&mut state, &mut rows, NavAction::Right);
    assert_eq!(rows::dns_mode(&rows), DnsMode::Automatic);
    assert_eq!(state.cursor_row, dns_row);
}

#[test]
fn navigation_module_cancelled_prompt_returns_to_button_bar_without_effect() {
    let catalog = Catalog::builtin();
    let mut rows = rows::project(&catalog);
    let mut state = NavState::new(&rows, 8);

    step(&mut state, &mut rows, NavAction::SwitchZone);
    step(&mut state, &mut rows, NavAction::Right);
    assert_eq!(state.button, Button::Export);
    step(&mut state, &mut rows, NavAction::Activate);
    step(&mut state, &mut rows, NavAction::Input('x'));

    let result = transition(&mut state, &mut rows, NavAction::Cancel).expect("cancel");
    assert_eq!(result.effect, NavEffect::None);
    assert_eq!(state.focus, Focus::ButtonBar);

    step(&mut state, &mut rows, NavAction::Left);
    step(&mut state, &mut rows, NavAction::Left);
    assert_eq!(state.button, Button::Quit);
    assert_eq!(
        step(&mut state, &mut rows, NavAction::Activate),
        NavEffect::Quit
    );
}

#[test]
fn navigation_module_rejects_prompt_actions_outside_prompts() {
    let catalog = Catalog::builtin();
    let mut rows = rows::project(&catalog);
    let mut state = NavState::new(&rows, 8);

    let err = transition(&mut state, &mut rows, NavAction::Confirm).expect_err("invalid");
    assert_eq!(
        err.to_string(),
        "invalid transition: focus=listing action=confirm"
    );
}

#[test]
fn navigation_module_scripted_keys_map_to_listing_actions() {
    let keys = parse_scripted_keys("down,space,tab,type:q").expect("parse");
    let mapped = keys
        .iter()
        .map(|key| action_from_key(&Focus::Listing, *key))
        .collect::<Vec<_>>();
    assert_eq!(
        mapped,
        vec![
            Some(NavAction::Down),
            Some(NavAction::Toggle),
            Some(NavAction::SwitchZone),
            Some(NavAction::Quit),
        ]
    );
    assert_eq!(
        action_from_key(&Focus::Listing, key_event(KeyCode::Esc)),
        Some(NavAction::Quit)
    );
    assert!(parse_scripted_keys("down,warp").is_err());
}
