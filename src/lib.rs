//! Mood-adaptive personal task manager.
//!
//! The [`organizer`] derives date buckets, filtered lists and a mood-based
//! focus set from a task list; [`flow`] drives the linear onboarding and
//! evening reflection wizards. [`session`] ties both to the persisted store.

pub mod domain;
pub mod flow;
pub mod organizer;
pub mod persistence;
pub mod session;
pub mod ticker;
