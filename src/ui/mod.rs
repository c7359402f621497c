//! Interactive terminal front end: navigation state machine, session effects,
//! rendering and the crossterm event loop.

pub mod navigation;
pub mod render;
pub mod session;
pub mod terminal;

pub use navigation::{
    action_from_key, parse_scripted_keys, transition, Button, Focus, NavAction, NavEffect,
    NavError, NavState, NavTransition, Prompt, PromptPurpose, Zone,
};
pub use session::{Flow, Session, Status};
